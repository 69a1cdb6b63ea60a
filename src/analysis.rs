//! Column Analysis Module
//!
//! 入力ファイルの列ごとに、値の例・推定データ型・対応しそうなカタログ要素を求める。
//! マッピング設定を新しく作成する際の下調べに使います。

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::api::DataType;
use crate::types::{RawValue, RowSet};

/// 真偽値とみなす表記
static BOOLEAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(true|false|yes|no|y|n|1|0|si)$").expect("valid boolean regex")
});

/// 日付とみなす表記（`YYYY-MM-DD`で始まる、または`DD/MM/YYYY`・`DD-MM-YYYY`を含む）
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4}").expect("valid date regex")
});

/// 列名から要素を推定する規則
struct ElementRule {
    patterns: &'static [&'static str],
    element: &'static str,
    confidence: f64,
}

/// 先頭から順に評価し、最初に一致した規則を採用する
const ELEMENT_RULES: [ElementRule; 12] = [
    ElementRule {
        patterns: &["product.id", "productid", "sku", "id"],
        element: "product-id",
        confidence: 0.9,
    },
    ElementRule {
        patterns: &["product.name", "productname", "name", "title"],
        element: "display-name",
        confidence: 0.8,
    },
    ElementRule {
        patterns: &["description", "desc", "long.description"],
        element: "long-description",
        confidence: 0.8,
    },
    ElementRule {
        patterns: &["short.description", "short.desc", "summary"],
        element: "short-description",
        confidence: 0.8,
    },
    ElementRule {
        patterns: &["price", "cost", "amount"],
        element: "custom-attribute",
        confidence: 0.7,
    },
    ElementRule {
        patterns: &["category", "cat", "category.id"],
        element: "classification-category",
        confidence: 0.7,
    },
    ElementRule {
        patterns: &["brand", "manufacturer"],
        element: "brand",
        confidence: 0.8,
    },
    ElementRule {
        patterns: &["online", "active", "enabled"],
        element: "online-flag",
        confidence: 0.8,
    },
    ElementRule {
        patterns: &["searchable"],
        element: "searchable-flag",
        confidence: 0.9,
    },
    ElementRule {
        patterns: &["image", "img", "picture"],
        element: "image",
        confidence: 0.7,
    },
    ElementRule {
        patterns: &["ean", "ean13"],
        element: "ean",
        confidence: 0.9,
    },
    ElementRule {
        patterns: &["upc"],
        element: "upc",
        confidence: 0.9,
    },
];

/// どの規則にも一致しない列の推定
const FALLBACK_ELEMENT: &str = "custom-attribute";
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// 列の分析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAnalysis {
    /// 列名
    pub source_column: String,
    /// 先頭行からの値の例（最大5件、欠落セルは`Null`）
    pub sample_values: Vec<RawValue>,
    /// 値の例から推定したデータ型
    pub suggested_type: DataType,
    /// 列名から推定したカタログ要素
    pub suggested_element: String,
    /// 推定の確度（0.0〜1.0）
    pub confidence: f64,
    /// この列を読むフィールドキー（マッピング適用時のみ）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mapped_fields: Vec<String>,
}

impl ColumnAnalysis {
    /// 値の例の最大数
    pub const MAX_SAMPLES: usize = 5;
}

/// 全列を分析する
///
/// # 引数
///
/// * `rows` - 行ソースから読み込んだ行
///
/// # 戻り値
///
/// ヘッダー順の分析結果。`mapped_fields`は常に空です。
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{analyze_columns, DataRow, DataType, RawValue, RowSet};
///
/// let row: DataRow = [
///     ("SKU".to_string(), RawValue::from("A-1")),
///     ("ACTIVE".to_string(), RawValue::from("yes")),
/// ]
/// .into_iter()
/// .collect();
/// let columns = analyze_columns(&RowSet::from_rows(vec![row]));
///
/// assert_eq!(columns[0].suggested_element, "product-id");
/// assert_eq!(columns[1].suggested_type, DataType::Boolean);
/// ```
pub fn analyze_columns(rows: &RowSet) -> Vec<ColumnAnalysis> {
    rows.headers
        .iter()
        .map(|header| {
            let sample_values: Vec<RawValue> = rows
                .rows
                .iter()
                .take(ColumnAnalysis::MAX_SAMPLES)
                .map(|row| row.get(header).cloned().unwrap_or(RawValue::Null))
                .collect();
            let (element, confidence) = suggest_element(header);

            ColumnAnalysis {
                source_column: header.clone(),
                suggested_type: detect_data_type(&sample_values),
                sample_values,
                suggested_element: element.to_string(),
                confidence,
                mapped_fields: Vec::new(),
            }
        })
        .collect()
}

/// 値の例からデータ型を推定する
///
/// 空の値を除いたうえで、すべて真偽値表記なら`Boolean`、すべて数値なら`Number`、
/// 1つでも日付表記を含めば`Date`、それ以外は`String`とします。
pub(crate) fn detect_data_type(values: &[RawValue]) -> DataType {
    let present: Vec<&RawValue> = values.iter().filter(|v| !v.is_empty()).collect();
    if present.is_empty() {
        return DataType::String;
    }

    if present.iter().all(|v| BOOLEAN_PATTERN.is_match(&v.to_text())) {
        return DataType::Boolean;
    }
    if present.iter().all(|v| is_numeric(v)) {
        return DataType::Number;
    }
    if present.iter().any(|v| DATE_PATTERN.is_match(&v.to_text())) {
        return DataType::Date;
    }
    DataType::String
}

fn is_numeric(value: &RawValue) -> bool {
    match value {
        RawValue::Null => false,
        RawValue::Bool(_) => true,
        RawValue::Number(n) => !n.is_nan(),
        RawValue::String(s) => s.trim().parse::<f64>().is_ok_and(|n| !n.is_nan()),
    }
}

/// 列名から対応するカタログ要素と確度を推定する
///
/// 小文字化した列名が規則のパターンを含む、またはパターンに含まれる場合に一致します。
pub(crate) fn suggest_element(column: &str) -> (&'static str, f64) {
    let name = column.trim().to_lowercase();
    if name.is_empty() {
        return (FALLBACK_ELEMENT, FALLBACK_CONFIDENCE);
    }

    ELEMENT_RULES
        .iter()
        .find(|rule| {
            rule.patterns
                .iter()
                .any(|pattern| name.contains(pattern) || pattern.contains(name.as_str()))
        })
        .map(|rule| (rule.element, rule.confidence))
        .unwrap_or((FALLBACK_ELEMENT, FALLBACK_CONFIDENCE))
}
