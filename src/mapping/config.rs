//! Mapping Configuration Module
//!
//! 会社ごとのマッピング設定（JSON）を表現する型と、読み込み時の形式検証を提供する。
//! 形式の検証は読み込み時に一度だけ行い、行ごとの処理では再検証しません。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::api::DataType;
use crate::error::ImpexError;
use crate::record::FieldPath;
use crate::types::RawValue;

/// SFCCカタログの既定の名前空間
pub const DEFAULT_CATALOG_NAMESPACE: &str = "http://www.demandware.com/xml/impex/catalog/2006-10-31";

/// ロケール未指定時のフォールバック
pub const DEFAULT_LOCALE: &str = "x-default";

/// カスタム属性配列の書き込み先パス
const CUSTOM_ATTRIBUTES_PATH: &str = "customAttributes";

/// ローカライズ文字列として書き込むパスのセグメント名
const LOCALIZED_SEGMENTS: [&str; 3] = ["displayName", "shortDescription", "longDescription"];

/// 会社ごとのマッピング設定
///
/// 読み込み後は不変であり、`ConfigStore`から`Arc`で共有されます。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::MappingConfiguration;
///
/// let json = r#"{
///     "companyName": "Acme",
///     "catalog": { "catalogId": "acme", "defaultCurrency": "USD", "defaultLocale": "en_US" },
///     "columnMappings": { "product-id": { "objectAttribute": "productId", "required": true } },
///     "headerMappings": { "product-id": "SKU" }
/// }"#;
/// let mapping = MappingConfiguration::from_json_str(json).unwrap();
/// assert_eq!(mapping.header_for("product-id"), Some("SKU"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfiguration {
    /// 会社名
    pub company_name: String,

    /// 説明
    #[serde(default)]
    pub description: String,

    /// 設定のバージョン
    #[serde(default)]
    pub version: String,

    /// カタログヘッダー情報
    pub catalog: CatalogHeader,

    /// フィールドキー → フィールド設定（宣言順を保持）
    pub column_mappings: IndexMap<String, FieldConfig>,

    /// フィールドキー → 外部ヘッダー名（複数ヘッダーはカンマ区切り）
    #[serde(default)]
    pub header_mappings: IndexMap<String, String>,

    /// 値の変換設定
    #[serde(default)]
    pub transformations: Transformations,

    /// バリエーショングループ化の設定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_settings: Option<VariationSettings>,
}

/// カタログヘッダー情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogHeader {
    /// カタログID（`catalog-id`属性）
    pub catalog_id: String,

    /// 既定の通貨
    pub default_currency: String,

    /// 既定のロケール
    pub default_locale: String,

    /// ルート要素の名前空間
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// 画像設定（`<image-settings>`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_settings: Option<ImageSettings>,
}

fn default_namespace() -> String {
    DEFAULT_CATALOG_NAMESPACE.to_string()
}

/// 画像設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSettings {
    /// 内部ロケーション
    pub internal_location: InternalLocation,

    /// ビュータイプ一覧（出力順）
    #[serde(default)]
    pub view_types: Vec<String>,

    /// 画像を切り替えるバリエーション属性ID
    #[serde(default)]
    pub variation_attribute_id: Option<String>,

    /// alt属性のパターン
    #[serde(default)]
    pub alt_pattern: Option<String>,

    /// title属性のパターン
    #[serde(default)]
    pub title_pattern: Option<String>,
}

/// 画像の内部ロケーション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalLocation {
    /// ベースパス（`base-path`属性）
    pub base_path: String,
}

/// 1フィールド分の設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// 書き込み先のドット区切りパス。未指定のフィールドはレコードに書き込まれない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_attribute: Option<FieldPath>,

    /// データ型
    #[serde(default)]
    pub data_type: DataType,

    /// 必須フィールドか（空の場合に警告を出す）
    #[serde(default)]
    pub required: bool,

    /// 既定値
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RawValue>,

    /// ローカライズ文字列のロケール
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// 分類カテゴリのカタログID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,

    /// 複数ヘッダーの連結値を持つフィールドか
    #[serde(default)]
    pub multiple_header: bool,

    /// 説明
    #[serde(default)]
    pub description: String,
}

/// フィールドの書き込み方式
///
/// 書き込み先パスとフィールド設定から読み込み時に決定されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// `customAttributes`配列に`{attributeId, value}`を追加
    CustomAttribute,

    /// `{value, locale}`のローカライズ文字列として設定
    Localized {
        /// ロケール（未指定時は`x-default`）
        locale: String,
    },

    /// `{categoryId, catalogId}`の分類カテゴリとして設定
    Classification {
        /// カタログID
        catalog_id: String,
    },

    /// パスへの直接代入（後勝ち）
    Plain,
}

impl FieldConfig {
    /// 書き込み先パスと書き込み方式を取得する
    ///
    /// # 戻り値
    ///
    /// `objectAttribute`が未指定の場合は`None`。
    pub fn target(&self) -> Option<(&FieldPath, FieldTarget)> {
        let path = self.object_attribute.as_ref()?;
        let target = if path.is_exactly(CUSTOM_ATTRIBUTES_PATH) {
            FieldTarget::CustomAttribute
        } else if LOCALIZED_SEGMENTS.iter().any(|s| path.contains_segment(s)) {
            FieldTarget::Localized {
                locale: self
                    .locale
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            }
        } else if let Some(catalog_id) = &self.catalog_id {
            FieldTarget::Classification {
                catalog_id: catalog_id.clone(),
            }
        } else {
            FieldTarget::Plain
        };
        Some((path, target))
    }
}

/// 値の変換設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformations {
    /// 真偽値の語彙
    #[serde(default)]
    pub boolean: BooleanVocabulary,

    /// 通貨表記の変換
    #[serde(default)]
    pub currency: CurrencyTransform,
}

/// 真偽値の語彙
///
/// 照合は大文字小文字を区別せず、前後の空白を除去して行います。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanVocabulary {
    /// `true`として扱うトークン
    #[serde(rename = "true", default)]
    pub truthy: Vec<String>,

    /// `false`として扱うトークン
    #[serde(rename = "false", default)]
    pub falsy: Vec<String>,
}

/// 通貨表記の変換設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyTransform {
    /// 数値変換の前に除去する記号
    #[serde(default)]
    pub remove_symbols: Vec<String>,
}

/// バリエーショングループ化の設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationSettings {
    /// グループ化を行うか
    #[serde(default)]
    pub enabled: bool,

    /// マスター商品IDの列名
    #[serde(default)]
    pub master_id_column: String,

    /// バリアント商品IDの列名
    #[serde(default)]
    pub variant_id_column: String,

    /// バリエーション属性の定義（宣言順）
    #[serde(default)]
    pub attributes: Vec<VariationAttributeConfig>,

    /// マスター商品に適用するフィールドキー（空の場合は`variant_fields`以外すべて）
    #[serde(default)]
    pub master_fields: Vec<String>,

    /// バリアント固有のフィールドキー
    #[serde(default)]
    pub variant_fields: Vec<String>,
}

impl VariationSettings {
    /// フィールドがマスター商品のレコードに含まれるか
    pub fn is_master_field(&self, field_key: &str) -> bool {
        if self.master_fields.is_empty() {
            !self.variant_fields.iter().any(|f| f == field_key)
        } else {
            self.master_fields.iter().any(|f| f == field_key)
        }
    }
}

/// バリエーション属性の定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationAttributeConfig {
    /// 属性ID
    pub attribute_id: String,

    /// 値を取得する列名
    pub source_column: String,

    /// 表示名（未指定時は属性ID）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// 並び順（未指定時は999）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
}

impl VariationAttributeConfig {
    /// 並び順の未指定時の値
    pub const UNSPECIFIED_SORT_ORDER: u32 = 999;

    /// 実効的な並び順
    pub fn effective_sort_order(&self) -> u32 {
        self.sort_order.unwrap_or(Self::UNSPECIFIED_SORT_ORDER)
    }
}

impl MappingConfiguration {
    /// JSON文字列から設定を読み込み、形式を検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(MappingConfiguration)` - 読み込みと検証に成功した場合
    /// * `Err(ImpexError::Json)` - JSONとして解析できない場合
    /// * `Err(ImpexError::Config)` - 形式の検証に失敗した場合
    pub fn from_json_str(json: &str) -> Result<Self, ImpexError> {
        let config: MappingConfiguration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// ファイルから設定を読み込み、形式を検証する
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImpexError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// 設定の形式を検証する
    ///
    /// # 検証内容
    ///
    /// - カタログIDが空でないこと
    /// - 複数ヘッダーフィールドにヘッダー名が設定されていること
    /// - ヘッダー名の設定が既知のフィールドキーを参照していること
    /// - 真偽値の語彙が重複しないこと
    /// - 有効なバリエーション設定にID列が設定され、属性IDが一意であること
    pub fn validate(&self) -> Result<(), ImpexError> {
        if self.catalog.catalog_id.trim().is_empty() {
            return Err(ImpexError::Config(
                "catalog.catalogId must not be empty".to_string(),
            ));
        }

        for key in self.header_mappings.keys() {
            if !self.column_mappings.contains_key(key) {
                return Err(ImpexError::Config(format!(
                    "headerMappings references unknown field '{}'",
                    key
                )));
            }
        }

        for (key, field) in &self.column_mappings {
            if field.multiple_header && self.header_aliases(key).is_empty() {
                return Err(ImpexError::Config(format!(
                    "Field '{}' is marked multipleHeader but has no header mapping",
                    key
                )));
            }
        }

        let vocabulary = &self.transformations.boolean;
        let truthy: HashSet<String> = vocabulary
            .truthy
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        if let Some(overlap) = vocabulary
            .falsy
            .iter()
            .map(|t| t.trim().to_lowercase())
            .find(|t| truthy.contains(t))
        {
            return Err(ImpexError::Config(format!(
                "Boolean token '{}' appears in both true and false vocabularies",
                overlap
            )));
        }

        if let Some(settings) = self.variation_settings.as_ref().filter(|s| s.enabled) {
            if settings.master_id_column.trim().is_empty()
                || settings.variant_id_column.trim().is_empty()
            {
                return Err(ImpexError::Config(
                    "variationSettings requires masterIdColumn and variantIdColumn".to_string(),
                ));
            }
            let mut seen = HashSet::new();
            for attribute in &settings.attributes {
                if !seen.insert(attribute.attribute_id.as_str()) {
                    return Err(ImpexError::Config(format!(
                        "Duplicate variation attribute id '{}'",
                        attribute.attribute_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// フィールドキーに対応するヘッダー名（設定値そのまま）
    pub fn header_for(&self, field_key: &str) -> Option<&str> {
        self.header_mappings.get(field_key).map(|h| h.as_str())
    }

    /// フィールドキーに対応するヘッダー名の一覧
    ///
    /// 複数ヘッダーフィールドの場合はカンマで分割し、前後の空白を除去します。
    pub fn header_aliases(&self, field_key: &str) -> Vec<&str> {
        let Some(header) = self.header_for(field_key) else {
            return Vec::new();
        };
        let multiple = self
            .column_mappings
            .get(field_key)
            .map(|f| f.multiple_header)
            .unwrap_or(false);
        if multiple {
            header
                .split(',')
                .map(|h| h.trim())
                .filter(|h| !h.is_empty())
                .collect()
        } else {
            vec![header]
        }
    }

    /// ヘッダーに対応するフィールドキー（宣言順）
    pub fn fields_for_header(&self, header: &str) -> Vec<&str> {
        self.column_mappings
            .keys()
            .filter(|key| self.header_aliases(key).contains(&header))
            .map(|key| key.as_str())
            .collect()
    }

    /// いずれかのフィールドに関連付けられた列名の集合
    ///
    /// フィールドキー自体と、すべてのヘッダー名（複数ヘッダーは分割後）を含みます。
    pub fn known_columns(&self) -> HashSet<&str> {
        let mut known: HashSet<&str> = self.column_mappings.keys().map(|k| k.as_str()).collect();
        for key in self.column_mappings.keys() {
            known.extend(self.header_aliases(key));
        }
        if let Some(settings) = &self.variation_settings {
            known.insert(settings.master_id_column.as_str());
            known.insert(settings.variant_id_column.as_str());
            known.extend(settings.attributes.iter().map(|a| a.source_column.as_str()));
        }
        known
    }

    /// 有効なバリエーション設定
    pub fn active_variation_settings(&self) -> Option<&VariationSettings> {
        self.variation_settings.as_ref().filter(|s| s.enabled)
    }
}
