//! Product Record Module
//!
//! カタログの1商品を表す型付きレコードを定義するモジュール。
//! フィールドリゾルバーが生成した入れ子レコード（`ProductData`）から構築します。

use serde::Serialize;

use super::validation::{validate_product, ValidationResult};
use super::xml::render_fragment;
use crate::api::XmlOptions;
use crate::error::ImpexError;
use crate::record::{ProductData, RecordValue};

/// ローカライズ文字列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedString {
    /// 値
    pub value: String,
    /// ロケール（`xml:lang`属性）
    pub locale: Option<String>,
}

impl LocalizedString {
    /// ロケール付きの文字列を生成
    pub fn new(value: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            locale: Some(locale.into()),
        }
    }
}

/// カスタム属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttribute {
    /// 属性ID
    pub attribute_id: String,
    /// 値
    pub value: String,
}

/// 分類カテゴリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCategory {
    /// カテゴリID
    pub category_id: String,
    /// カタログID（`catalog-id`属性）
    pub catalog_id: Option<String>,
}

/// SFCCのフラグ要素に出力する`"true"`/`"false"`トークン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagToken {
    /// `"true"`（既定値）
    #[default]
    True,
    /// `"false"`
    False,
}

impl FlagToken {
    /// トークンの文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagToken::True => "true",
            FlagToken::False => "false",
        }
    }

    /// レコードの値からトークンを決定する
    ///
    /// 明示的な`false`（論理値または文字列）のみ`False`、それ以外は`True`。
    fn from_record(value: Option<&RecordValue>) -> Self {
        match value {
            Some(RecordValue::Bool(false)) => FlagToken::False,
            Some(RecordValue::Text(s)) if s.trim().eq_ignore_ascii_case("false") => FlagToken::False,
            _ => FlagToken::True,
        }
    }
}

impl From<bool> for FlagToken {
    fn from(value: bool) -> Self {
        if value {
            FlagToken::True
        } else {
            FlagToken::False
        }
    }
}

/// SEO用のページ属性
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAttributes {
    /// ページタイトル
    pub page_title: Option<String>,
    /// ページ説明
    pub page_description: Option<String>,
    /// ページキーワード
    pub page_keywords: Option<String>,
}

impl PageAttributes {
    /// 出力する（要素名, 値）の組（空の値は除外）
    pub(crate) fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("page-title", &self.page_title),
            ("page-description", &self.page_description),
            ("page-keywords", &self.page_keywords),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

/// ストア属性フラグ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAttributes {
    /// 価格の強制
    pub force_price_flag: Option<bool>,
    /// 在庫対象外
    pub non_inventory_flag: Option<bool>,
    /// 売上対象外
    pub non_revenue_flag: Option<bool>,
    /// 割引対象外
    pub non_discountable_flag: Option<bool>,
}

impl StoreAttributes {
    /// 出力する（要素名, 値）の組（未設定は除外）
    pub(crate) fn entries(&self) -> Vec<(&'static str, bool)> {
        [
            ("force-price-flag", self.force_price_flag),
            ("non-inventory-flag", self.non_inventory_flag),
            ("non-revenue-flag", self.non_revenue_flag),
            ("non-discountable-flag", self.non_discountable_flag),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// カタログの1商品
///
/// 商品IDは生成後に変更できません。フラグ（online/available/searchable）は
/// 明示的に`false`が設定されない限り`"true"`になります。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{ProductRecord, XmlOptions};
///
/// let mut product = ProductRecord::new("PROD-1");
/// product.brand = Some("Acme".to_string());
/// assert!(product.validate().is_valid);
///
/// let xml = product.to_xml(XmlOptions::default()).unwrap();
/// assert!(xml.starts_with("<product product-id=\"PROD-1\">"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    product_id: String,

    pub display_name: Option<LocalizedString>,
    pub short_description: Option<LocalizedString>,
    pub long_description: Option<LocalizedString>,
    pub brand: Option<String>,
    pub online_flag: FlagToken,
    pub available_flag: FlagToken,
    pub searchable_flag: FlagToken,
    pub tax_class_id: Option<String>,
    pub classification_category: Option<ClassificationCategory>,
    pub custom_attributes: Vec<CustomAttribute>,
    pub ean: Option<String>,
    pub upc: Option<String>,
    pub unit: Option<String>,
    pub min_order_quantity: Option<f64>,
    pub step_quantity: Option<f64>,
    pub online_from: Option<String>,
    pub sitemap_included_flag: Option<bool>,
    pub sitemap_changefrequency: Option<String>,
    pub sitemap_priority: Option<f64>,
    pub page_attributes: Option<PageAttributes>,
    pub store_attributes: Option<StoreAttributes>,
    pub manufacturer_sku: Option<String>,
    pub pinterest_enabled_flag: Option<bool>,
    pub facebook_enabled_flag: Option<bool>,
}

impl ProductRecord {
    /// 商品IDのみを持つレコードを生成
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            display_name: None,
            short_description: None,
            long_description: None,
            brand: None,
            online_flag: FlagToken::True,
            available_flag: FlagToken::True,
            searchable_flag: FlagToken::True,
            tax_class_id: None,
            classification_category: None,
            custom_attributes: Vec::new(),
            ean: None,
            upc: None,
            unit: None,
            min_order_quantity: None,
            step_quantity: None,
            online_from: None,
            sitemap_included_flag: None,
            sitemap_changefrequency: None,
            sitemap_priority: None,
            page_attributes: None,
            store_attributes: None,
            manufacturer_sku: None,
            pinterest_enabled_flag: None,
            facebook_enabled_flag: None,
        }
    }

    /// 入れ子レコードから商品を構築する
    ///
    /// 解釈できない値は欠落として扱います。ただし数値フィールドに数値として
    /// 解釈できない文字列がある場合は`NaN`を設定し、検証で検出されるようにします。
    pub fn from_data(data: &ProductData) -> Self {
        let product_id = data
            .get_key("productId")
            .or_else(|| data.get_key("product-id"))
            .and_then(text)
            .unwrap_or_default();

        let mut product = Self::new(product_id);
        product.display_name = data.get_key("displayName").and_then(localized);
        product.short_description = data.get_key("shortDescription").and_then(localized);
        product.long_description = data.get_key("longDescription").and_then(localized);
        product.brand = data.get_key("brand").and_then(text);
        product.online_flag = FlagToken::from_record(data.get_key("onlineFlag"));
        product.available_flag = FlagToken::from_record(data.get_key("availableFlag"));
        product.searchable_flag = FlagToken::from_record(data.get_key("searchableFlag"));
        product.tax_class_id = data.get_key("taxClassId").and_then(text);
        product.classification_category =
            data.get_key("classificationCategory").and_then(classification);
        product.custom_attributes = data
            .get_key("customAttributes")
            .map(custom_attributes)
            .unwrap_or_default();
        product.ean = data.get_key("ean").and_then(text);
        product.upc = data.get_key("upc").and_then(text);
        product.unit = data.get_key("unit").and_then(text);
        product.min_order_quantity = data.get_key("minOrderQuantity").and_then(number);
        product.step_quantity = data.get_key("stepQuantity").and_then(number);
        product.online_from = data.get_key("onlineFrom").and_then(text);
        product.sitemap_included_flag = data.get_key("sitemapIncludedFlag").and_then(boolean);
        product.sitemap_changefrequency = data.get_key("sitemapChangefrequency").and_then(text);
        product.sitemap_priority = data.get_key("sitemapPriority").and_then(number);
        product.page_attributes = data.get_key("pageAttributes").and_then(page_attributes);
        product.store_attributes = data.get_key("storeAttributes").and_then(store_attributes);
        product.manufacturer_sku = data.get_key("manufacturerSku").and_then(text);
        product.pinterest_enabled_flag = data.get_key("pinterestEnabledFlag").and_then(boolean);
        product.facebook_enabled_flag = data.get_key("facebookEnabledFlag").and_then(boolean);
        product
    }

    /// 商品ID
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// フィールド単位の業務ルールで検証する
    pub fn validate(&self) -> ValidationResult {
        validate_product(self)
    }

    /// `<product>`要素のXMLを生成する
    pub fn to_xml(&self, options: XmlOptions) -> Result<String, ImpexError> {
        render_fragment(self, None, options)
    }
}

/// スカラー値を空でない文字列として取得
fn text(value: &RecordValue) -> Option<String> {
    value.as_text().filter(|s| !s.is_empty())
}

fn number(value: &RecordValue) -> Option<f64> {
    match value {
        RecordValue::Number(n) => Some(*n),
        RecordValue::Text(s) if s.trim().is_empty() => None,
        RecordValue::Text(s) => Some(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
        RecordValue::Bool(_) => Some(f64::NAN),
        RecordValue::Null | RecordValue::Object(_) | RecordValue::Array(_) => None,
    }
}

fn boolean(value: &RecordValue) -> Option<bool> {
    match value {
        RecordValue::Bool(b) => Some(*b),
        RecordValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        RecordValue::Number(n) if *n == 1.0 => Some(true),
        RecordValue::Number(n) if *n == 0.0 => Some(false),
        _ => None,
    }
}

fn localized(value: &RecordValue) -> Option<LocalizedString> {
    match value {
        RecordValue::Object(_) => {
            let text = value.field("value").and_then(text)?;
            let locale = value
                .field("locale")
                .and_then(|l| l.as_text())
                .filter(|l| !l.is_empty());
            Some(LocalizedString {
                value: text,
                locale,
            })
        }
        other => text(other).map(|value| LocalizedString {
            value,
            locale: None,
        }),
    }
}

fn classification(value: &RecordValue) -> Option<ClassificationCategory> {
    match value {
        RecordValue::Object(_) => Some(ClassificationCategory {
            category_id: value.field("categoryId").and_then(text)?,
            catalog_id: value.field("catalogId").and_then(text),
        }),
        other => text(other).map(|category_id| ClassificationCategory {
            category_id,
            catalog_id: None,
        }),
    }
}

fn custom_attributes(value: &RecordValue) -> Vec<CustomAttribute> {
    let RecordValue::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            Some(CustomAttribute {
                attribute_id: item.field("attributeId")?.as_text()?,
                value: item.field("value")?.as_text()?,
            })
        })
        .collect()
}

fn page_attributes(value: &RecordValue) -> Option<PageAttributes> {
    if !matches!(value, RecordValue::Object(_)) {
        return None;
    }
    Some(PageAttributes {
        page_title: value.field("pageTitle").and_then(text),
        page_description: value.field("pageDescription").and_then(text),
        page_keywords: value.field("pageKeywords").and_then(text),
    })
}

fn store_attributes(value: &RecordValue) -> Option<StoreAttributes> {
    if !matches!(value, RecordValue::Object(_)) {
        return None;
    }
    Some(StoreAttributes {
        force_price_flag: value.field("forcePriceFlag").and_then(boolean),
        non_inventory_flag: value.field("nonInventoryFlag").and_then(boolean),
        non_revenue_flag: value.field("nonRevenueFlag").and_then(boolean),
        non_discountable_flag: value.field("nonDiscountableFlag").and_then(boolean),
    })
}
