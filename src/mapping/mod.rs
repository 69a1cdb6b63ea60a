//! Mapping Module
//!
//! 会社ごとのマッピング設定の定義・読み込み・キャッシュと、
//! 設定に基づいて行をレコードへ解決するフィールドリゾルバーを提供する。

mod config;
mod resolver;
mod store;

pub use config::{
    BooleanVocabulary, CatalogHeader, CurrencyTransform, FieldConfig, FieldTarget, ImageSettings,
    InternalLocation, MappingConfiguration, Transformations, VariationAttributeConfig,
    VariationSettings, DEFAULT_CATALOG_NAMESPACE, DEFAULT_LOCALE,
};
pub use resolver::FieldResolver;
pub use store::{CompanyInfo, ConfigKey, ConfigSource, ConfigStore};
