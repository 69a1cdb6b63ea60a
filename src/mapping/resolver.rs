//! Field Resolver Module
//!
//! 1行分の生データ（列名 → 値）を、マッピング設定に従って入れ子のレコードへ
//! 変換するモジュール。
//!
//! # 処理の流れ
//!
//! 1. 行の各列について、その列をヘッダーに持つすべてのフィールドを宣言順に解決
//! 2. データ型に応じて値を変換し、フィールドの書き込み方式でレコードに書き込み
//! 3. 複数ヘッダーフィールドは連結値を最後に一度だけ書き込み
//! 4. どの列からも値が設定されなかったフィールドに既定値を書き込み
//!
//! 解決処理は失敗しません。未マッピングの列は無視されます。

use indexmap::IndexMap;
use std::collections::HashSet;

use super::config::{FieldConfig, FieldTarget, MappingConfiguration};
use crate::coercion::ValueCoercer;
use crate::record::{FieldPath, ProductData, RecordValue};
use crate::types::{DataRow, RawValue};

/// 複数ヘッダーの連結区切り
const MULTI_HEADER_SEPARATOR: &str = ", ";

/// 1フィールド分の解決計画
#[derive(Debug)]
struct FieldPlan<'a> {
    key: &'a str,
    field: &'a FieldConfig,
    aliases: Vec<&'a str>,
    target: Option<(&'a FieldPath, FieldTarget)>,
}

/// フィールドリゾルバー
///
/// 生成時にマッピング設定から解決計画を組み立て、行ごとの処理では再計算しません。
#[derive(Debug)]
pub struct FieldResolver<'a> {
    plans: Vec<FieldPlan<'a>>,
    coercer: ValueCoercer<'a>,
}

impl<'a> FieldResolver<'a> {
    /// マッピング設定からリゾルバーを生成
    pub fn new(config: &'a MappingConfiguration) -> Self {
        let plans = config
            .column_mappings
            .iter()
            .map(|(key, field)| FieldPlan {
                key: key.as_str(),
                field,
                aliases: config.header_aliases(key),
                target: field.target(),
            })
            .collect();

        Self {
            plans,
            coercer: ValueCoercer::new(&config.transformations),
        }
    }

    /// 行をレコードに解決する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sfcc_impex::{ConfigStore, DataRow, FieldResolver, RawValue, Schema};
    ///
    /// let store = ConfigStore::bundled();
    /// let mapping = store.load("Typhoon", Schema::Catalog).unwrap();
    /// let resolver = FieldResolver::new(&mapping);
    ///
    /// let mut row = DataRow::new();
    /// row.insert("MARCA".to_string(), RawValue::from("Nike"));
    /// row.insert("DEPORTE".to_string(), RawValue::from("Running"));
    /// let data = resolver.resolve(&row);
    /// assert!(data.get_key("pageAttributes").is_some());
    /// ```
    pub fn resolve(&self, row: &DataRow) -> ProductData {
        self.resolve_filtered(row, |_| true)
    }

    /// 許可されたフィールドのみを対象に行をレコードに解決する
    ///
    /// # 引数
    ///
    /// * `row` - 生データの行
    /// * `allow` - フィールドキーを受け取り、解決対象とするかを返す関数
    pub fn resolve_filtered<F>(&self, row: &DataRow, allow: F) -> ProductData
    where
        F: Fn(&str) -> bool,
    {
        let mut data = ProductData::new();
        let mut populated: HashSet<&str> = HashSet::new();

        for (column, value) in row {
            for plan in &self.plans {
                if plan.field.multiple_header || !allow(plan.key) {
                    continue;
                }
                if !plan.aliases.iter().any(|alias| alias == column) {
                    continue;
                }

                let coerced = self.coercer.coerce(value, plan.field.data_type);
                if let Some((path, target)) = &plan.target {
                    write_value(&mut data, path, target, plan.key, coerced);
                }
                if !value.is_empty() {
                    populated.insert(plan.key);
                }
            }
        }

        for plan in &self.plans {
            if !allow(plan.key) {
                continue;
            }
            let Some((path, target)) = &plan.target else {
                continue;
            };

            if plan.field.multiple_header {
                let joined = concatenate(row, &plan.aliases);
                write_value(&mut data, path, target, plan.key, RawValue::String(joined));
            } else if !populated.contains(plan.key) {
                if let Some(default) = &plan.field.default_value {
                    write_value(&mut data, path, target, plan.key, default.clone());
                }
            }
        }

        data
    }

    /// 行の中で値が空の必須フィールド
    ///
    /// # 戻り値
    ///
    /// （フィールドキー, 先頭のヘッダー名）の一覧。既定値を持つフィールドは除外します。
    pub fn missing_required(&self, row: &DataRow) -> Vec<(&'a str, Option<&'a str>)> {
        self.plans
            .iter()
            .filter(|plan| plan.field.required && plan.field.default_value.is_none())
            .filter(|plan| {
                !plan
                    .aliases
                    .iter()
                    .any(|alias| row.get(*alias).is_some_and(|v| !v.is_empty()))
            })
            .map(|plan| (plan.key, plan.aliases.first().copied()))
            .collect()
    }
}

/// 複数ヘッダーの値をヘッダーの宣言順に連結する
///
/// 最初の空でない値より前の空の値は読み飛ばし、それ以降の空の値は
/// 区切りごと残します（`"Nike, , M"`）。行に存在しない列は連結しません。
fn concatenate(row: &DataRow, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .fold(String::new(), |mut joined, value| {
            if !joined.is_empty() {
                joined.push_str(MULTI_HEADER_SEPARATOR);
            }
            joined.push_str(&value.to_text());
            joined
        })
}

fn write_value(data: &mut ProductData, path: &FieldPath, target: &FieldTarget, key: &str, value: RawValue) {
    match target {
        FieldTarget::CustomAttribute => {
            let mut entry = IndexMap::new();
            entry.insert("attributeId".to_string(), RecordValue::from(key));
            entry.insert("value".to_string(), RecordValue::from(value));
            data.push(path, RecordValue::Object(entry));
        }
        FieldTarget::Localized { locale } => {
            let mut entry = IndexMap::new();
            entry.insert("value".to_string(), RecordValue::Text(value.to_text()));
            entry.insert("locale".to_string(), RecordValue::Text(locale.clone()));
            data.set(path, RecordValue::Object(entry));
        }
        FieldTarget::Classification { catalog_id } => {
            let mut entry = IndexMap::new();
            entry.insert("categoryId".to_string(), RecordValue::Text(value.to_text()));
            entry.insert("catalogId".to_string(), RecordValue::Text(catalog_id.clone()));
            data.set(path, RecordValue::Object(entry));
        }
        FieldTarget::Plain => data.set(path, RecordValue::from(value)),
    }
}
