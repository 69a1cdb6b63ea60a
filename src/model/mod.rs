//! Product Model Module
//!
//! カタログ商品の型付きレコード、検証、XMLシリアライズを提供する。

mod product;
mod validation;
mod variation;
pub(crate) mod xml;

pub use product::{
    ClassificationCategory, CustomAttribute, FlagToken, LocalizedString, PageAttributes,
    ProductRecord, StoreAttributes,
};
pub use validation::{ValidationCode, ValidationIssue, ValidationResult, MAX_PRODUCT_ID_LENGTH};
pub use variation::{CatalogProduct, Variant, VariationAttribute, VariationAttributeValue, Variations};
