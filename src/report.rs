//! Conversion Report Module
//!
//! 変換結果（`ConversionResult`）と、データ品質レポート・単一行の検査結果を定義する。
//! 行単位の問題はすべてここに蓄積され、呼び出し元に返されます。

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{ValidationCode, ValidationIssue};

/// エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// 商品レコードの検証エラー
    Validation,
    /// XML生成の失敗
    Xml,
    /// マッピング設定の読み込み失敗
    Configuration,
}

/// 警告の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// 必須値の欠落、または除外された行
    MissingData,
    /// 未マッピングの列
    Mapping,
}

/// 変換エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionError {
    /// 行番号（1始まり、0は行に依存しないエラー）
    pub row: usize,
    /// 列名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// フィールド名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// メッセージ
    pub message: String,
    /// 種類
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

/// 変換の警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    /// 行番号（1始まり、0は行に依存しない警告）
    pub row: usize,
    /// 列名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// メッセージ
    pub message: String,
    /// 種類
    #[serde(rename = "type")]
    pub kind: WarningKind,
}

/// 変換の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    /// 入力行数
    pub total_rows: usize,
    /// XMLに出力した商品数
    pub processed_rows: usize,
    /// 検証エラーで除外した商品数
    pub skipped_rows: usize,
    /// 検証エラーのあった商品数
    pub validation_errors: usize,
}

/// 1回の変換の結果
///
/// 検証エラーがあっても、有効な商品のみからなる`xml_content`を含みます。
/// `success`はエラーが1件もない場合のみ`true`です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// エラーがない場合に`true`
    pub success: bool,
    /// カタログXML（有効な商品がない場合は`None`）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_content: Option<String>,
    /// エラー
    pub errors: Vec<ConversionError>,
    /// 警告
    pub warnings: Vec<ConversionWarning>,
    /// 統計
    pub stats: ConversionStats,
}

impl ConversionResult {
    /// 設定の読み込み失敗による結果
    ///
    /// 処理件数0、全行をスキップ扱いとした失敗結果を返します。
    pub(crate) fn configuration_failure(total_rows: usize, message: String) -> Self {
        Self {
            success: false,
            xml_content: None,
            errors: vec![ConversionError {
                row: 0,
                column: None,
                field: None,
                message,
                kind: ErrorKind::Configuration,
            }],
            warnings: Vec::new(),
            stats: ConversionStats {
                total_rows,
                processed_rows: 0,
                skipped_rows: total_rows,
                validation_errors: 0,
            },
        }
    }

    /// 種類を指定してエラーを抽出する
    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &ConversionError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// 種類を指定して警告を抽出する
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ConversionWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// 単一行の検査結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowInspection {
    /// 検証に成功したか
    pub is_valid: bool,
    /// 解決後の商品ID
    pub product_id: String,
    /// 検証エラー
    pub errors: Vec<ValidationIssue>,
    /// 有効な場合の`<product>`要素
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_preview: Option<String>,
}

/// フィールドごとの入力充足状況
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFill {
    /// 値のある行数
    pub filled: usize,
    /// 値のない行数
    pub empty: usize,
}

/// 有効な商品の概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// 商品ID
    pub product_id: String,
    /// 表示名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// ブランド
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

/// データ品質レポート
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    /// 入力行数
    pub total_rows: usize,
    /// 構築した商品数
    pub total_products: usize,
    /// 有効な商品数
    pub valid_products: usize,
    /// 無効な商品数
    pub invalid_products: usize,
    /// 有効率（%）
    pub validation_rate: f64,
    /// 検証エラーのコード別件数
    pub issue_counts: BTreeMap<ValidationCode, usize>,
    /// フィールドキー → 入力充足状況（設定の宣言順）
    pub field_fill: IndexMap<String, FieldFill>,
    /// 有効な商品の例（最大5件）
    pub sample_products: Vec<ProductSummary>,
}

impl DataQualityReport {
    /// レポートに含める商品例の最大数
    pub const MAX_SAMPLES: usize = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_failure() {
        let result = ConversionResult::configuration_failure(7, "missing".to_string());
        assert!(!result.success);
        assert!(result.xml_content.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 0);
        assert_eq!(result.errors[0].kind, ErrorKind::Configuration);
        assert_eq!(result.stats.processed_rows, 0);
        assert_eq!(result.stats.skipped_rows, 7);
        assert_eq!(result.stats.total_rows, 7);
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = ConversionResult {
            success: false,
            xml_content: None,
            errors: vec![ConversionError {
                row: 2,
                column: Some("product-id".to_string()),
                field: Some("product".to_string()),
                message: "productId: Product ID is required".to_string(),
                kind: ErrorKind::Validation,
            }],
            warnings: vec![ConversionWarning {
                row: 0,
                column: None,
                message: "Unmapped columns (ignored): X".to_string(),
                kind: WarningKind::Mapping,
            }],
            stats: ConversionStats {
                total_rows: 2,
                processed_rows: 1,
                skipped_rows: 1,
                validation_errors: 1,
            },
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("xmlContent").is_none());
        assert_eq!(json["errors"][0]["type"], "validation");
        assert_eq!(json["errors"][0]["column"], "product-id");
        assert_eq!(json["warnings"][0]["type"], "mapping");
        assert!(json["warnings"][0].get("column").is_none());
        assert_eq!(json["stats"]["processedRows"], 1);
        assert_eq!(json["stats"]["validationErrors"], 1);
    }

    #[test]
    fn test_warning_kind_kebab_case() {
        let json = serde_json::to_string(&WarningKind::MissingData).unwrap();
        assert_eq!(json, "\"missing-data\"");
    }

    #[test]
    fn test_filters_by_kind() {
        let mut result = ConversionResult::configuration_failure(0, "x".to_string());
        result.warnings.push(ConversionWarning {
            row: 1,
            column: None,
            message: "m".to_string(),
            kind: WarningKind::MissingData,
        });
        assert_eq!(result.errors_of(ErrorKind::Configuration).count(), 1);
        assert_eq!(result.errors_of(ErrorKind::Validation).count(), 0);
        assert_eq!(result.warnings_of(WarningKind::MissingData).count(), 1);
    }
}
