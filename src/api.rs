//! Public API Types
//!
//! 公開APIで使用する列挙型とオプション構造体を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// フィールドのデータ型
///
/// マッピング設定の`dataType`に対応します。値の変換（coercion）の方法を決定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 文字列（変換なし、デフォルト）
    #[default]
    String,

    /// 数値
    ///
    /// 通貨記号を除去したうえで数値として解釈します。解釈できない場合は元の値のまま。
    Number,

    /// 論理値
    ///
    /// 設定の真偽値語彙（`transformations.boolean`）に一致した場合のみ変換します。
    Boolean,

    /// 日付
    ///
    /// Excelのシリアル値や一般的な日付表記を`YYYY-MM-DD`に正規化します。
    Date,
}

/// マッピング設定のスキーマ種別
///
/// 設定は（会社, スキーマ）の組でキャッシュされます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Schema {
    /// カタログ（`<catalog>`ドキュメント）
    Catalog,
}

impl Schema {
    /// 設定ファイル名の語幹（例: `catalog` → `catalog.json`）
    pub fn file_stem(&self) -> &'static str {
        match self {
            Schema::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// 入力ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FileKind {
    /// CSV（1行目がヘッダー）
    Csv,

    /// Excelワークブック（最初のシートのみ）
    Workbook,
}

impl FileKind {
    /// 拡張子から入力ファイル形式を判定する
    ///
    /// 大文字小文字は区別しません。`csv`、`xlsx`、`xls`以外は`None`。
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" | "xls" => Some(FileKind::Workbook),
            _ => None,
        }
    }
}

/// XML出力オプション
///
/// `ProductRecord::to_xml()`などに渡します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// `<?xml version="1.0" encoding="UTF-8"?>`宣言を先頭に出力するか
    pub include_declaration: bool,

    /// 1階層あたりのインデント幅（スペース数）。0の場合は改行・インデントなし
    pub indent: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            include_declaration: false,
            indent: 2,
        }
    }
}

impl XmlOptions {
    /// XML宣言付きのオプションを返す
    pub fn with_declaration(mut self) -> Self {
        self.include_declaration = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path(Path::new("a.csv")), Some(FileKind::Csv));
        assert_eq!(
            FileKind::from_path(Path::new("dir/Products.XLSX")),
            Some(FileKind::Workbook)
        );
        assert_eq!(FileKind::from_path(Path::new("old.xls")), Some(FileKind::Workbook));
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_data_type_deserialize() {
        let t: DataType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(t, DataType::Boolean);
        assert_eq!(DataType::default(), DataType::String);
    }

    #[test]
    fn test_schema_display() {
        assert_eq!(Schema::Catalog.to_string(), "catalog");
    }
}
