//! Variation Module
//!
//! マスター商品のバリエーション情報（属性とバリアント一覧）と、
//! 商品レコードにバリエーションを組み合わせた`CatalogProduct`を定義するモジュール。

use indexmap::IndexMap;
use serde::Serialize;

use super::product::{LocalizedString, ProductRecord};
use super::validation::ValidationResult;
use super::xml::render_fragment;
use crate::api::XmlOptions;
use crate::error::ImpexError;

/// バリエーション属性の1つの値
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationAttributeValue {
    /// 値
    pub value: String,
    /// 表示値
    pub display_value: LocalizedString,
}

/// バリエーション属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationAttribute {
    /// 属性ID
    pub attribute_id: String,
    /// 表示名
    pub display_name: LocalizedString,
    /// 値の一覧（初出順）
    pub values: Vec<VariationAttributeValue>,
}

/// バリアント
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// バリアントの商品ID
    pub product_id: String,
    /// 属性ID → 値
    pub attribute_values: IndexMap<String, String>,
}

/// マスター商品のバリエーション情報
///
/// 属性は属性ID、バリアントは商品IDで一意です。同じIDを追加すると、
/// 元の位置のまま後から追加した内容で置き換えます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variations {
    attributes: Vec<VariationAttribute>,
    variants: Vec<Variant>,
}

impl Variations {
    /// 空のバリエーション情報を生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 属性を追加する（同じ属性IDは置き換え）
    pub fn add_attribute(&mut self, attribute: VariationAttribute) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.attribute_id == attribute.attribute_id)
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// バリアントを追加する（同じ商品IDは置き換え）
    pub fn add_variant(&mut self, variant: Variant) {
        match self
            .variants
            .iter_mut()
            .find(|v| v.product_id == variant.product_id)
        {
            Some(existing) => *existing = variant,
            None => self.variants.push(variant),
        }
    }

    /// 属性の一覧
    pub fn attributes(&self) -> &[VariationAttribute] {
        &self.attributes
    }

    /// バリアントの一覧
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// 属性とバリアントの両方が存在し、`<variations>`ブロックを出力するか
    pub fn is_renderable(&self) -> bool {
        !self.attributes.is_empty() && !self.variants.is_empty()
    }

    /// バリアント全体での属性の値（空を除く、初出順で重複なし）
    pub fn values_for(&self, attribute_id: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for variant in &self.variants {
            if let Some(value) = variant.attribute_values.get(attribute_id) {
                if !value.is_empty() && !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        values
    }
}

/// カタログに出力する1商品
///
/// 単純な商品は`variations`が`None`、マスター商品は`Some`です。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// 商品レコード
    pub product: ProductRecord,
    /// バリエーション情報（マスター商品のみ）
    pub variations: Option<Variations>,
}

impl CatalogProduct {
    /// 単純な商品を生成
    pub fn simple(product: ProductRecord) -> Self {
        Self {
            product,
            variations: None,
        }
    }

    /// マスター商品を生成
    pub fn master(product: ProductRecord, variations: Variations) -> Self {
        Self {
            product,
            variations: Some(variations),
        }
    }

    /// 商品ID
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }

    /// マスター商品か
    pub fn is_master(&self) -> bool {
        self.variations.is_some()
    }

    /// 商品レコードを検証する
    pub fn validate(&self) -> ValidationResult {
        self.product.validate()
    }

    /// `<product>`要素のXMLを生成する
    ///
    /// バリエーション情報が出力可能な場合、`</product>`の直前に
    /// `<variations>`ブロックを出力します。
    pub fn to_xml(&self, options: XmlOptions) -> Result<String, ImpexError> {
        render_fragment(&self.product, self.variations.as_ref(), options)
    }
}

impl From<ProductRecord> for CatalogProduct {
    fn from(product: ProductRecord) -> Self {
        Self::simple(product)
    }
}
