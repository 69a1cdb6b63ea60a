//! sfcc-impex - Mapping-driven converter from tabular product data to SFCC catalog XML
//!
//! This crate reads product rows from CSV files or Excel workbooks, maps each
//! column onto a Salesforce B2C Commerce (SFCC) catalog field using a
//! per-company JSON mapping configuration, validates the resulting products and
//! renders them as a catalog import XML document.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sfcc_impex::{convert_company_rows, source, ConfigStore, Schema};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Mapping configurations bundled with the crate
//!     let store = ConfigStore::bundled();
//!
//!     // Read rows from a CSV or Excel file
//!     let rows = source::read_path("products.xlsx")?;
//!
//!     // Convert; row-level problems are collected, never thrown
//!     let result = convert_company_rows(&store, "Typhoon", Schema::Catalog, &rows);
//!     for error in &result.errors {
//!         eprintln!("row {}: {}", error.row, error.message);
//!     }
//!     if let Some(xml) = result.xml_content {
//!         std::fs::write("catalog.xml", xml)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use sfcc_impex::{source, ConfigStore, ConverterBuilder, Schema};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load mappings from a directory laid out as <root>/<company>/catalog.json
//!     let store = ConfigStore::from_dir("config/companies");
//!
//!     let converter = ConverterBuilder::new()
//!         .with_mapping(store.load("Typhoon", Schema::Catalog)?)
//!         .with_indent(4)
//!         .with_variation_grouping(false) // one product per row
//!         .report_unmapped_columns(false)
//!         .build()?;
//!
//!     let rows = source::read_path("products.csv")?;
//!     let report = converter.quality_report(&rows);
//!     println!("{:.1}% valid", report.validation_rate);
//!     Ok(())
//! }
//! ```
//!
//! # Single Products
//!
//! ```rust
//! use sfcc_impex::{ProductRecord, XmlOptions};
//!
//! let mut product = ProductRecord::new("SKU-1");
//! product.brand = Some("Acme".to_string());
//! assert!(product.validate().is_valid);
//!
//! let xml = product.to_xml(XmlOptions::default()).unwrap();
//! assert!(xml.contains("<brand>Acme</brand>"));
//! ```

mod analysis;
mod api;
mod builder;
mod coercion;
mod error;
mod grouping;
mod mapping;
mod model;
mod output;
mod record;
mod report;
mod security;
pub mod source;
mod types;

// 公開API
pub use analysis::{analyze_columns, ColumnAnalysis};
pub use api::{DataType, FileKind, Schema, XmlOptions};
pub use builder::{convert_company_rows, Converter, ConverterBuilder};
pub use error::ImpexError;
pub use grouping::{partition_rows, GroupingOutcome, SourcedProduct, VariantGrouper};
pub use mapping::{
    BooleanVocabulary, CatalogHeader, CompanyInfo, ConfigKey, ConfigSource, ConfigStore,
    CurrencyTransform, FieldConfig, FieldResolver, FieldTarget, ImageSettings, InternalLocation,
    MappingConfiguration, Transformations, VariationAttributeConfig, VariationSettings,
    DEFAULT_CATALOG_NAMESPACE, DEFAULT_LOCALE,
};
pub use model::{
    CatalogProduct, ClassificationCategory, CustomAttribute, FlagToken, LocalizedString,
    PageAttributes, ProductRecord, StoreAttributes, ValidationCode, ValidationIssue,
    ValidationResult, Variant, VariationAttribute, VariationAttributeValue, Variations,
    MAX_PRODUCT_ID_LENGTH,
};
pub use record::{FieldPath, ProductData, RecordValue};
pub use report::{
    ConversionError, ConversionResult, ConversionStats, ConversionWarning, DataQualityReport,
    ErrorKind, FieldFill, ProductSummary, RowInspection, WarningKind,
};
pub use types::{DataRow, RawValue, RowSet};
