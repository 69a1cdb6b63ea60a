//! Record Tree Module
//!
//! フィールドリゾルバーが書き込む入れ子構造のレコードを表現するモジュール。
//! ドット区切りのパス（例: `pageAttributes.pageKeywords`）を事前に解析し、
//! 明示的なタグ付きツリーを走査して値を書き込みます。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{format_number, RawValue};

/// レコードツリーのノード
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// 値なし
    Null,
    /// 論理値
    Bool(bool),
    /// 数値
    Number(f64),
    /// 文字列
    Text(String),
    /// オブジェクト（キー順を保持）
    Object(IndexMap<String, RecordValue>),
    /// 配列
    Array(Vec<RecordValue>),
}

impl RecordValue {
    /// スカラー値を文字列として取得する
    ///
    /// オブジェクトと配列は`None`。
    pub fn as_text(&self) -> Option<String> {
        match self {
            RecordValue::Null => Some(String::new()),
            RecordValue::Bool(b) => Some(b.to_string()),
            RecordValue::Number(n) => Some(format_number(*n)),
            RecordValue::Text(s) => Some(s.clone()),
            RecordValue::Object(_) | RecordValue::Array(_) => None,
        }
    }

    /// オブジェクトの場合、キーに対応する値を取得する
    pub fn field(&self, key: &str) -> Option<&RecordValue> {
        match self {
            RecordValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// 値が空（`Null`または空文字列）かどうか
    pub fn is_empty(&self) -> bool {
        match self {
            RecordValue::Null => true,
            RecordValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<RawValue> for RecordValue {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Null => RecordValue::Null,
            RawValue::Bool(b) => RecordValue::Bool(b),
            RawValue::Number(n) => RecordValue::Number(n),
            RawValue::String(s) => RecordValue::Text(s),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        RecordValue::Text(value.to_string())
    }
}

/// 解析済みのドット区切りパス
///
/// 空のセグメントを含むパス（`a..b`、`.a`など）は生成できません。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// ドット区切り文字列からパスを解析する
    ///
    /// # 戻り値
    ///
    /// * `Ok(FieldPath)` - 解析に成功した場合
    /// * `Err(String)` - 空のパス、または空のセグメントを含む場合
    pub fn parse(path: &str) -> Result<Self, String> {
        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(format!("Invalid field path: '{}'", path));
        }
        Ok(Self { segments })
    }

    /// パスのセグメント
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// パスがいずれかのセグメントに`name`を含むか
    pub fn contains_segment(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.contains(name))
    }

    /// 単一セグメントのパスで、その名前が`name`と一致するか
    pub fn is_exactly(&self, name: &str) -> bool {
        self.segments.len() == 1 && self.segments[0] == name
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FieldPath::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// 1商品分の入れ子レコード
///
/// フィールドリゾルバーの出力であり、`ProductRecord::from_data()`の入力です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductData {
    root: IndexMap<String, RecordValue>,
}

impl ProductData {
    /// 空のレコードを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// パスの位置に値を設定する（同じパスへの後勝ち）
    ///
    /// 途中のオブジェクトは必要に応じて作成します。途中にオブジェクト以外の値が
    /// ある場合は空のオブジェクトで置き換えます。
    pub fn set(&mut self, path: &FieldPath, value: RecordValue) {
        if let Some((parent, key)) = self.parent_mut(path) {
            parent.insert(key.to_string(), value);
        }
    }

    /// パスの位置の配列に値を追加する
    ///
    /// 配列が存在しない場合は新規に作成します（既存の非配列値は置き換え）。
    pub fn push(&mut self, path: &FieldPath, value: RecordValue) {
        let Some((parent, key)) = self.parent_mut(path) else {
            return;
        };
        let slot = parent
            .entry(key.to_string())
            .or_insert_with(|| RecordValue::Array(Vec::new()));
        if !matches!(slot, RecordValue::Array(_)) {
            *slot = RecordValue::Array(Vec::new());
        }
        if let RecordValue::Array(items) = slot {
            items.push(value);
        }
    }

    /// トップレベルのキーに値を設定する
    pub fn set_key(&mut self, key: &str, value: RecordValue) {
        self.root.insert(key.to_string(), value);
    }

    /// パスの位置の値を取得する
    pub fn get(&self, path: &FieldPath) -> Option<&RecordValue> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.root.get(first)?;
        for segment in rest {
            current = current.field(segment)?;
        }
        Some(current)
    }

    /// トップレベルのキーで値を取得する
    pub fn get_key(&self, key: &str) -> Option<&RecordValue> {
        self.root.get(key)
    }

    /// レコードが空か
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// パスの親オブジェクトと末尾のキーを取得する（空のパスは`None`）
    fn parent_mut<'a>(
        &mut self,
        path: &'a FieldPath,
    ) -> Option<(&mut IndexMap<String, RecordValue>, &'a str)> {
        let (last, parents) = path.segments().split_last()?;

        let mut current = &mut self.root;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| RecordValue::Object(IndexMap::new()));
            if !matches!(slot, RecordValue::Object(_)) {
                *slot = RecordValue::Object(IndexMap::new());
            }
            let RecordValue::Object(map) = slot else {
                return None;
            };
            current = map;
        }
        Some((current, last.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    #[test]
    fn test_field_path_parse() {
        let p = path("pageAttributes.pageKeywords");
        assert_eq!(p.segments(), &["pageAttributes", "pageKeywords"]);
        assert_eq!(p.to_string(), "pageAttributes.pageKeywords");
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
    }

    #[test]
    fn test_field_path_segment_checks() {
        assert!(path("displayName").is_exactly("displayName"));
        assert!(!path("x.displayName").is_exactly("displayName"));
        assert!(path("x.displayName").contains_segment("displayName"));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut data = ProductData::new();
        data.set(&path("pageAttributes.pageTitle"), "Shoe".into());
        data.set(&path("pageAttributes.pageKeywords"), "a, b".into());

        assert_eq!(
            data.get(&path("pageAttributes.pageTitle")),
            Some(&RecordValue::Text("Shoe".to_string()))
        );
        assert_eq!(
            data.get(&path("pageAttributes.pageKeywords")),
            Some(&RecordValue::Text("a, b".to_string()))
        );
    }

    #[test]
    fn test_set_last_writer_wins() {
        let mut data = ProductData::new();
        data.set(&path("brand"), "A".into());
        data.set(&path("brand"), "B".into());
        assert_eq!(data.get_key("brand"), Some(&RecordValue::Text("B".to_string())));
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut data = ProductData::new();
        data.set(&path("storeAttributes"), "oops".into());
        data.set(&path("storeAttributes.forcePriceFlag"), RecordValue::Bool(true));
        assert_eq!(
            data.get(&path("storeAttributes.forcePriceFlag")),
            Some(&RecordValue::Bool(true))
        );
    }

    #[test]
    fn test_push_appends() {
        let mut data = ProductData::new();
        data.push(&path("customAttributes"), "a".into());
        data.push(&path("customAttributes"), "b".into());
        match data.get_key("customAttributes") {
            Some(RecordValue::Array(items)) => assert_eq!(items.len(), 2),
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_push_through_scalar_parent() {
        let mut data = ProductData::new();
        data.set(&path("variations"), "oops".into());
        data.push(&path("variations.variants"), "a".into());
        match data.get(&path("variations.variants")) {
            Some(RecordValue::Array(items)) => assert_eq!(items, &vec![RecordValue::from("a")]),
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_get_missing_path() {
        let data = ProductData::new();
        assert!(data.get(&path("a.b")).is_none());
        assert!(data.is_empty());
    }
}
