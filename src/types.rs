//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 入力側（CSV/Excelの行）の表現を扱います。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// セルの値を表す列挙型
///
/// CSV/Excelパーサーが生成する1セル分のスカラー値です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// 空セル
    Null,

    /// 論理値
    Bool(bool),

    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),
}

impl RawValue {
    /// 値が空（`Null`または空文字列）かどうかを判定
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 偽値（空、`false`、`0`、`NaN`）かどうかを判定
    ///
    /// バリエーション属性値の抽出時に除外される値です。
    pub fn is_falsy(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Bool(b) => !b,
            RawValue::Number(n) => *n == 0.0 || n.is_nan(),
            RawValue::String(s) => s.is_empty(),
        }
    }

    /// 値を文字列として取得
    ///
    /// 整数値の数値は小数点なしで出力します（`1.0` → `"1"`）。`Null`は空文字列。
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Null => String::new(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::Number(n) => format_number(*n),
            RawValue::String(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// 1行分のデータ（列名 → 値）
///
/// 列の順序は入力ファイルの列順を保持します。
pub type DataRow = IndexMap<String, RawValue>;

/// 行ソースが生成するデータセット
///
/// `headers`は未マッピング列の検出に使用する順序付きヘッダー一覧です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// ヘッダー（列名）一覧
    pub headers: Vec<String>,

    /// データ行
    pub rows: Vec<DataRow>,
}

impl RowSet {
    /// ヘッダーとデータ行からRowSetを生成
    pub fn new(headers: Vec<String>, rows: Vec<DataRow>) -> Self {
        Self { headers, rows }
    }

    /// データ行のみからRowSetを生成する
    ///
    /// ヘッダーは最初の行の列名から取得します。
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        let headers = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self { headers, rows }
    }

    /// データ行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// データ行が存在しないか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 数値を文字列化する（整数値は小数点なし）
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
