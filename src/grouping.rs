//! Variant Grouping Module
//!
//! SKU単位のフラットな行を、マスター商品IDの列でグループ化し、
//! バリエーション属性とバリアント一覧を持つマスター商品に集約するモジュール。
//!
//! # アルゴリズム
//!
//! 1. マスターID列の値で行をグループ化（初出順）。マスターIDが空の行は除外
//! 2. グループの先頭行をマスター項目に限定して解決し、商品IDをマスターIDに設定
//! 3. 属性ごとに、グループ内の偽値でない値を初出順・重複なしで収集（値がなければ属性ごと除外）
//! 4. 属性を`sortOrder`の昇順で安定ソート（未指定は999）
//! 5. 各行を1つのバリアントとして追加

use indexmap::IndexMap;
use tracing::debug;

use crate::mapping::{FieldResolver, VariationAttributeConfig, VariationSettings, DEFAULT_LOCALE};
use crate::model::{
    CatalogProduct, LocalizedString, ProductRecord, Variant, VariationAttribute,
    VariationAttributeValue, Variations,
};
use crate::record::RecordValue;
use crate::types::DataRow;

/// 入力の行に対応付けられた商品
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedProduct {
    /// 商品
    pub product: CatalogProduct,
    /// 元の行番号（1始まり）。グループの場合は先頭行
    pub source_row: usize,
}

/// グループ化の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingOutcome {
    /// マスター商品（グループの初出順）
    pub products: Vec<SourcedProduct>,
    /// マスターIDが空のため除外された行番号（1始まり）
    pub dropped_rows: Vec<usize>,
}

/// バリエーショングループ化エンジン
#[derive(Debug)]
pub struct VariantGrouper<'a> {
    resolver: &'a FieldResolver<'a>,
    settings: Option<&'a VariationSettings>,
}

impl<'a> VariantGrouper<'a> {
    /// グループ化エンジンを生成
    ///
    /// # 引数
    ///
    /// * `resolver` - マスター項目の解決に使用するリゾルバー
    /// * `settings` - バリエーション設定。`None`または無効な場合は各行を単独の商品として扱う
    pub fn new(resolver: &'a FieldResolver<'a>, settings: Option<&'a VariationSettings>) -> Self {
        Self { resolver, settings }
    }

    /// 行をマスター商品に集約する
    pub fn group(&self, rows: &[DataRow]) -> GroupingOutcome {
        let Some(settings) = self.settings.filter(|s| s.enabled) else {
            return self.ungrouped(rows);
        };

        let (groups, dropped) = partition_rows(rows, &settings.master_id_column);
        debug!(
            groups = groups.len(),
            dropped = dropped.len(),
            "Partitioned rows by master id"
        );

        let products = groups
            .into_iter()
            .filter_map(|(master_id, indices)| {
                let first = *indices.first()?;
                let members: Vec<&DataRow> = indices.iter().map(|&i| &rows[i]).collect();
                Some(SourcedProduct {
                    product: self.build_master(settings, &master_id, &members),
                    source_row: first + 1,
                })
            })
            .collect();

        GroupingOutcome {
            products,
            dropped_rows: dropped.into_iter().map(|i| i + 1).collect(),
        }
    }

    fn ungrouped(&self, rows: &[DataRow]) -> GroupingOutcome {
        let products = rows
            .iter()
            .enumerate()
            .map(|(i, row)| SourcedProduct {
                product: CatalogProduct::master(
                    ProductRecord::from_data(&self.resolver.resolve(row)),
                    Variations::new(),
                ),
                source_row: i + 1,
            })
            .collect();
        GroupingOutcome {
            products,
            dropped_rows: Vec::new(),
        }
    }

    fn build_master(&self, settings: &VariationSettings, master_id: &str, members: &[&DataRow]) -> CatalogProduct {
        let mut data = match members.first() {
            Some(first) => self
                .resolver
                .resolve_filtered(first, |key| settings.is_master_field(key)),
            None => Default::default(),
        };
        data.set_key("productId", RecordValue::Text(master_id.to_string()));

        let mut variations = Variations::new();
        for attribute in extract_attributes(&settings.attributes, members) {
            variations.add_attribute(attribute);
        }
        for variant in extract_variants(settings, members) {
            variations.add_variant(variant);
        }

        CatalogProduct::master(ProductRecord::from_data(&data), variations)
    }
}

/// 行をマスターID列の値でグループ化する
///
/// # 戻り値
///
/// （マスターID → 行インデックス（初出順）, 除外された行インデックス）。
/// インデックスは0始まりです。
pub fn partition_rows(rows: &[DataRow], master_column: &str) -> (IndexMap<String, Vec<usize>>, Vec<usize>) {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    let mut dropped = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let master_id = row
            .get(master_column)
            .map(|v| v.to_text().trim().to_string())
            .unwrap_or_default();
        if master_id.is_empty() {
            dropped.push(index);
        } else {
            groups.entry(master_id).or_default().push(index);
        }
    }

    (groups, dropped)
}

fn extract_attributes(definitions: &[VariationAttributeConfig], members: &[&DataRow]) -> Vec<VariationAttribute> {
    let mut extracted: Vec<(u32, VariationAttribute)> = definitions
        .iter()
        .filter_map(|definition| {
            let mut values: Vec<String> = Vec::new();
            for row in members {
                let Some(value) = row.get(&definition.source_column) else {
                    continue;
                };
                if value.is_falsy() {
                    continue;
                }
                let text = value.to_text();
                if !values.contains(&text) {
                    values.push(text);
                }
            }
            if values.is_empty() {
                return None;
            }

            let display_name = definition
                .display_name
                .clone()
                .unwrap_or_else(|| definition.attribute_id.clone());
            Some((
                definition.effective_sort_order(),
                VariationAttribute {
                    attribute_id: definition.attribute_id.clone(),
                    display_name: LocalizedString::new(display_name, DEFAULT_LOCALE),
                    values: values
                        .into_iter()
                        .map(|value| VariationAttributeValue {
                            display_value: LocalizedString::new(value.clone(), DEFAULT_LOCALE),
                            value,
                        })
                        .collect(),
                },
            ))
        })
        .collect();

    // sort_by_keyは安定ソート
    extracted.sort_by_key(|(order, _)| *order);
    extracted.into_iter().map(|(_, attribute)| attribute).collect()
}

fn extract_variants(settings: &VariationSettings, members: &[&DataRow]) -> Vec<Variant> {
    members
        .iter()
        .map(|row| {
            let cell = |column: &str| row.get(column).map(|v| v.to_text()).unwrap_or_default();
            Variant {
                product_id: cell(&settings.variant_id_column),
                attribute_values: settings
                    .attributes
                    .iter()
                    .map(|a| (a.attribute_id.clone(), cell(&a.source_column)))
                    .collect(),
            }
        })
        .collect()
}
