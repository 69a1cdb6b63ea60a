//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。
//! `Converter`はカタログ組み立て処理（解決 → グループ化 → 検証 → XML生成）のファサードです。

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::analysis::{analyze_columns, ColumnAnalysis};
use crate::api::{Schema, XmlOptions};
use crate::error::ImpexError;
use crate::grouping::{GroupingOutcome, SourcedProduct, VariantGrouper};
use crate::mapping::{ConfigStore, FieldResolver, MappingConfiguration, VariationSettings};
use crate::model::{CatalogProduct, ProductRecord};
use crate::output::CatalogDocument;
use crate::report::{
    ConversionError, ConversionResult, ConversionStats, ConversionWarning, DataQualityReport,
    ErrorKind, FieldFill, ProductSummary, RowInspection, WarningKind,
};
use crate::types::{DataRow, RowSet};

/// インデント幅の上限
const MAX_INDENT: usize = 8;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// XMLの1階層あたりのインデント幅
    pub indent: usize,

    /// バリエーショングループ化の指定（Noneの場合はマッピング設定に従う）
    pub grouping: Option<bool>,

    /// 未マッピング列の警告を出すか
    pub report_unmapped_columns: bool,

    /// 必須フィールドの欠落を警告するか
    pub warn_missing_required: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            grouping: None,
            report_unmapped_columns: true,
            warn_missing_required: true,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// マッピング設定は必須です。それ以外の設定項目にはデフォルト値があります。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{ConfigStore, ConverterBuilder, Schema};
///
/// # fn main() -> Result<(), sfcc_impex::ImpexError> {
/// let store = ConfigStore::bundled();
/// let converter = ConverterBuilder::new()
///     .with_mapping(store.load("Typhoon", Schema::Catalog)?)
///     .with_indent(4)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// マッピング設定
    mapping: Option<Arc<MappingConfiguration>>,

    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定でビルダーを生成
    ///
    /// # デフォルト値
    ///
    /// - インデント: 2
    /// - バリエーショングループ化: マッピング設定の`variationSettings.enabled`に従う
    /// - 未マッピング列の警告: 有効
    /// - 必須フィールド欠落の警告: 有効
    pub fn new() -> Self {
        Self {
            mapping: None,
            config: ConversionConfig::default(),
        }
    }

    /// マッピング設定を指定
    pub fn with_mapping(mut self, mapping: Arc<MappingConfiguration>) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// XMLのインデント幅を指定（0で改行・インデントなし）
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.config.indent = indent;
        self
    }

    /// バリエーショングループ化の有無を明示的に指定
    ///
    /// `true`を指定する場合、マッピング設定に`variationSettings`が必要です。
    pub fn with_variation_grouping(mut self, enabled: bool) -> Self {
        self.config.grouping = Some(enabled);
        self
    }

    /// 未マッピング列の警告を出すかを指定
    pub fn report_unmapped_columns(mut self, report: bool) -> Self {
        self.config.report_unmapped_columns = report;
        self
    }

    /// 必須フィールドの欠落を警告するかを指定
    pub fn warn_missing_required(mut self, warn: bool) -> Self {
        self.config.warn_missing_required = warn;
        self
    }

    /// 設定を検証してConverterを構築
    ///
    /// # 発生し得るエラー
    ///
    /// * `ImpexError::Config(String)`: 設定の検証に失敗した場合
    ///   * マッピング設定が指定されていない
    ///   * インデント幅が上限（8）を超える
    ///   * グループ化を指定したが、`variationSettings`がないかID列が空
    pub fn build(self) -> Result<Converter, ImpexError> {
        let mapping = self.mapping.ok_or_else(|| {
            ImpexError::Config("A mapping configuration is required (use with_mapping)".to_string())
        })?;

        if self.config.indent > MAX_INDENT {
            return Err(ImpexError::Config(format!(
                "Invalid indent: {} (maximum is {})",
                self.config.indent, MAX_INDENT
            )));
        }

        let grouping = match (self.config.grouping, mapping.variation_settings.as_ref()) {
            (Some(false), _) => None,
            (Some(true), None) => {
                return Err(ImpexError::Config(format!(
                    "Variation grouping requested but company '{}' has no variationSettings",
                    mapping.company_name
                )));
            }
            (Some(true), Some(settings)) => {
                if settings.master_id_column.trim().is_empty()
                    || settings.variant_id_column.trim().is_empty()
                {
                    return Err(ImpexError::Config(
                        "Variation grouping requires masterIdColumn and variantIdColumn".to_string(),
                    ));
                }
                Some(VariationSettings {
                    enabled: true,
                    ..settings.clone()
                })
            }
            (None, settings) => settings.filter(|s| s.enabled).cloned(),
        };

        Ok(Converter {
            mapping,
            grouping,
            config: self.config,
        })
    }
}

/// カタログ変換のファサード
///
/// 行の解決、バリエーショングループ化、検証、カタログXMLの生成を行います。
/// 行単位の問題は`ConversionResult`に蓄積され、処理は中断されません。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{ConfigStore, ConverterBuilder, DataRow, RawValue, RowSet, Schema};
///
/// # fn main() -> Result<(), sfcc_impex::ImpexError> {
/// let store = ConfigStore::bundled();
/// let converter = ConverterBuilder::new()
///     .with_mapping(store.load("ExampleCorp", Schema::Catalog)?)
///     .build()?;
///
/// let mut row = DataRow::new();
/// row.insert("product-id".to_string(), RawValue::from("SKU-1"));
/// row.insert("display-name".to_string(), RawValue::from("Mug"));
/// let result = converter.convert(&RowSet::from_rows(vec![row]));
///
/// assert!(result.success);
/// assert!(result.xml_content.unwrap().contains("<product product-id=\"SKU-1\">"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// マッピング設定
    mapping: Arc<MappingConfiguration>,

    /// 実効的なバリエーション設定（Noneの場合は1行1商品）
    grouping: Option<VariationSettings>,

    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    /// マッピング設定
    pub fn mapping(&self) -> &MappingConfiguration {
        &self.mapping
    }

    /// バリエーショングループ化が有効か
    pub fn is_grouping(&self) -> bool {
        self.grouping.is_some()
    }

    /// データセットをカタログXMLに変換
    ///
    /// # 処理フロー
    ///
    /// 1. ヘッダーと設定の差分から未マッピング列の警告を生成
    /// 2. 商品を構築（グループ化が有効な場合はマスター商品に集約）
    /// 3. 各商品を検証し、有効・無効に分類
    /// 4. 無効な商品ごとに1件のエラーを生成
    /// 5. 有効な商品を入力順にカタログXMLとして出力
    pub fn convert(&self, rows: &RowSet) -> ConversionResult {
        self.convert_with_headers(&rows.headers, &rows.rows)
    }

    /// 行の配列をカタログXMLに変換
    ///
    /// ヘッダーは最初の行の列名から取得します。
    pub fn convert_rows(&self, rows: &[DataRow]) -> ConversionResult {
        let headers: Vec<String> = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        self.convert_with_headers(&headers, rows)
    }

    fn convert_with_headers(&self, headers: &[String], rows: &[DataRow]) -> ConversionResult {
        let started = Instant::now();
        let resolver = FieldResolver::new(&self.mapping);
        let mut warnings = Vec::new();

        if self.config.report_unmapped_columns {
            if let Some(warning) = self.unmapped_columns_warning(headers) {
                warn!(company = %self.mapping.company_name, "{}", warning.message);
                warnings.push(warning);
            }
        }

        if self.config.warn_missing_required {
            for (index, row) in rows.iter().enumerate() {
                for (field, column) in resolver.missing_required(row) {
                    warnings.push(ConversionWarning {
                        row: index + 1,
                        column: column.map(|c| c.to_string()),
                        message: format!("Required field '{}' has no value", field),
                        kind: WarningKind::MissingData,
                    });
                }
            }
        }

        let outcome = self.group_rows(&resolver, rows);
        if !outcome.dropped_rows.is_empty() {
            warn!(
                count = outcome.dropped_rows.len(),
                "Rows without a master id were excluded from grouping"
            );
        }
        let master_column = self
            .grouping
            .as_ref()
            .map(|s| s.master_id_column.clone());
        for row in &outcome.dropped_rows {
            warnings.push(ConversionWarning {
                row: *row,
                column: master_column.clone(),
                message: "Row skipped: master id is empty".to_string(),
                kind: WarningKind::MissingData,
            });
        }

        let mut valid: Vec<&CatalogProduct> = Vec::new();
        let mut errors = Vec::new();
        for sourced in &outcome.products {
            let validation = sourced.product.validate();
            if validation.is_valid {
                valid.push(&sourced.product);
            } else {
                debug!(
                    row = sourced.source_row,
                    product_id = sourced.product.product_id(),
                    "Product failed validation"
                );
                errors.push(ConversionError {
                    row: sourced.source_row,
                    column: Some("product-id".to_string()),
                    field: Some("product".to_string()),
                    message: validation.summary(),
                    kind: ErrorKind::Validation,
                });
            }
        }
        let invalid_count = errors.len();

        let xml_content = if valid.is_empty() {
            None
        } else {
            match self.render_catalog(valid.iter().copied()) {
                Ok(xml) => Some(xml),
                Err(e) => {
                    errors.push(ConversionError {
                        row: 0,
                        column: None,
                        field: None,
                        message: e.to_string(),
                        kind: ErrorKind::Xml,
                    });
                    None
                }
            }
        };

        let stats = ConversionStats {
            total_rows: rows.len(),
            processed_rows: if xml_content.is_some() { valid.len() } else { 0 },
            skipped_rows: invalid_count,
            validation_errors: invalid_count,
        };

        info!(
            company = %self.mapping.company_name,
            total = stats.total_rows,
            processed = stats.processed_rows,
            skipped = stats.skipped_rows,
            warnings = warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Conversion finished"
        );

        ConversionResult {
            success: errors.is_empty(),
            xml_content,
            errors,
            warnings,
            stats,
        }
    }

    /// 行から商品を構築する（検証は行わない）
    pub fn build_products(&self, rows: &[DataRow]) -> GroupingOutcome {
        let resolver = FieldResolver::new(&self.mapping);
        self.group_rows(&resolver, rows)
    }

    fn group_rows(&self, resolver: &FieldResolver<'_>, rows: &[DataRow]) -> GroupingOutcome {
        VariantGrouper::new(resolver, self.grouping.as_ref()).group(rows)
    }

    /// 商品を入力順にカタログXMLとして出力
    pub fn render_catalog<'p, I>(&self, products: I) -> Result<String, ImpexError>
    where
        I: IntoIterator<Item = &'p CatalogProduct>,
    {
        CatalogDocument::new(&self.mapping.catalog, self.config.indent).render(products)
    }

    /// 先頭`max_items`行から構築した有効な商品のカタログXML
    ///
    /// 有効な商品がない場合はXMLコメントを返します。
    pub fn preview(&self, rows: &[DataRow], max_items: usize) -> Result<String, ImpexError> {
        let limit = max_items.min(rows.len());
        let outcome = self.build_products(&rows[..limit]);
        let valid: Vec<&CatalogProduct> = outcome
            .products
            .iter()
            .map(|sourced| &sourced.product)
            .filter(|product| product.validate().is_valid)
            .collect();

        if valid.is_empty() {
            return Ok("<!-- No valid products to preview -->".to_string());
        }
        self.render_catalog(valid)
    }

    /// 1行を解決・検証した結果
    ///
    /// グループ化は行わず、行を単独の商品として扱います。
    pub fn inspect_row(&self, row: &DataRow) -> RowInspection {
        let resolver = FieldResolver::new(&self.mapping);
        let product = ProductRecord::from_data(&resolver.resolve(row));
        let validation = product.validate();
        let xml_preview = if validation.is_valid {
            product
                .to_xml(XmlOptions {
                    include_declaration: false,
                    indent: self.config.indent,
                })
                .ok()
        } else {
            None
        };

        RowInspection {
            is_valid: validation.is_valid,
            product_id: product.product_id().to_string(),
            errors: validation.errors,
            xml_preview,
        }
    }

    /// データ品質レポートを生成
    pub fn quality_report(&self, rows: &RowSet) -> DataQualityReport {
        let outcome = self.build_products(&rows.rows);

        let mut issue_counts = BTreeMap::new();
        let mut valid: Vec<&SourcedProduct> = Vec::new();
        for sourced in &outcome.products {
            let validation = sourced.product.validate();
            if validation.is_valid {
                valid.push(sourced);
            }
            for issue in validation.errors {
                *issue_counts.entry(issue.code).or_insert(0) += 1;
            }
        }

        let total_products = outcome.products.len();
        let validation_rate = if total_products == 0 {
            0.0
        } else {
            valid.len() as f64 / total_products as f64 * 100.0
        };

        let field_fill = self
            .mapping
            .column_mappings
            .keys()
            .filter_map(|key| {
                let aliases: HashSet<&str> = self.mapping.header_aliases(key).into_iter().collect();
                if aliases.is_empty() {
                    return None;
                }
                let filled = rows
                    .rows
                    .iter()
                    .filter(|row| {
                        row.iter()
                            .any(|(column, value)| aliases.contains(column.as_str()) && !value.is_empty())
                    })
                    .count();
                Some((
                    key.clone(),
                    FieldFill {
                        filled,
                        empty: rows.len() - filled,
                    },
                ))
            })
            .collect();

        let sample_products = valid
            .iter()
            .take(DataQualityReport::MAX_SAMPLES)
            .map(|sourced| {
                let product = &sourced.product.product;
                ProductSummary {
                    product_id: product.product_id().to_string(),
                    display_name: product.display_name.as_ref().map(|n| n.value.clone()),
                    brand: product.brand.clone(),
                }
            })
            .collect();

        DataQualityReport {
            total_rows: rows.len(),
            total_products,
            valid_products: valid.len(),
            invalid_products: total_products - valid.len(),
            validation_rate,
            issue_counts,
            field_fill,
            sample_products,
        }
    }

    /// 列ごとの分析結果
    ///
    /// `analyze_columns`の結果に、各列を読むフィールドキー（設定の宣言順）を加えます。
    pub fn column_analysis(&self, rows: &RowSet) -> Vec<ColumnAnalysis> {
        let mut columns = analyze_columns(rows);
        for column in &mut columns {
            column.mapped_fields = self
                .mapping
                .column_mappings
                .keys()
                .filter(|key| {
                    self.mapping
                        .header_aliases(key)
                        .contains(&column.source_column.as_str())
                })
                .cloned()
                .collect();
        }
        columns
    }

    fn unmapped_columns_warning(&self, headers: &[String]) -> Option<ConversionWarning> {
        let known = self.mapping.known_columns();
        let unmapped: Vec<&str> = headers
            .iter()
            .map(|h| h.as_str())
            .filter(|h| !h.is_empty() && !known.contains(h))
            .collect();
        if unmapped.is_empty() {
            return None;
        }
        Some(ConversionWarning {
            row: 0,
            column: None,
            message: format!("Unmapped columns (ignored): {}", unmapped.join(", ")),
            kind: WarningKind::Mapping,
        })
    }
}

/// 会社名を指定してデータセットを変換する
///
/// マッピング設定の読み込みに失敗した場合も`Err`は返さず、
/// 処理件数0の失敗結果（エラー1件）を返します。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{convert_company_rows, ConfigStore, RowSet, Schema};
///
/// let store = ConfigStore::bundled();
/// let result = convert_company_rows(&store, "Unknown", Schema::Catalog, &RowSet::default());
/// assert!(!result.success);
/// assert_eq!(result.stats.processed_rows, 0);
/// ```
pub fn convert_company_rows(store: &ConfigStore, company: &str, schema: Schema, rows: &RowSet) -> ConversionResult {
    let converter = store
        .load(company, schema)
        .and_then(|mapping| ConverterBuilder::new().with_mapping(mapping).build());

    match converter {
        Ok(converter) => converter.convert(rows),
        Err(e) => {
            warn!(company, %schema, error = %e, "Could not load mapping configuration");
            ConversionResult::configuration_failure(rows.len(), e.to_string())
        }
    }
}
