//! Validation Module
//!
//! 商品レコードのフィールド単位の業務ルール検証を提供する。
//! 検証は純粋関数であり、レコードを変更しません。

use serde::Serialize;

use super::product::ProductRecord;
use crate::coercion::parse_date;

/// 商品IDの最大文字数
pub const MAX_PRODUCT_ID_LENGTH: usize = 100;

/// EANの桁数範囲
const EAN_LENGTH: std::ops::RangeInclusive<usize> = 8..=14;

/// UPCの桁数
const UPC_LENGTH: usize = 12;

/// 検証エラーのコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// 必須フィールドが空
    RequiredField,
    /// 最大長を超過
    MaxLengthExceeded,
    /// 使用できない文字を含む
    InvalidCharacters,
    /// EANの形式が不正
    InvalidEan,
    /// UPCの形式が不正
    InvalidUpc,
    /// 最小注文数量が不正
    InvalidMinOrderQuantity,
    /// 注文数量の刻みが不正
    InvalidStepQuantity,
    /// サイトマップ優先度が範囲外
    InvalidSitemapPriority,
    /// 日付として解釈できない
    InvalidDate,
}

impl ValidationCode {
    /// コードの文字列表現（例: `REQUIRED_FIELD`）
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::RequiredField => "REQUIRED_FIELD",
            ValidationCode::MaxLengthExceeded => "MAX_LENGTH_EXCEEDED",
            ValidationCode::InvalidCharacters => "INVALID_CHARACTERS",
            ValidationCode::InvalidEan => "INVALID_EAN",
            ValidationCode::InvalidUpc => "INVALID_UPC",
            ValidationCode::InvalidMinOrderQuantity => "INVALID_MIN_ORDER_QUANTITY",
            ValidationCode::InvalidStepQuantity => "INVALID_STEP_QUANTITY",
            ValidationCode::InvalidSitemapPriority => "INVALID_SITEMAP_PRIORITY",
            ValidationCode::InvalidDate => "INVALID_DATE",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1件の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// フィールド名（レコードのキー名）
    pub field: String,
    /// メッセージ
    pub message: String,
    /// コード
    pub code: ValidationCode,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>, code: ValidationCode) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code,
        }
    }
}

/// 検証結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// エラーがない場合に`true`
    pub is_valid: bool,
    /// 検出されたエラー（検出順）
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// `field: message`をカンマ区切りで連結した要約
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 指定したコードのエラーを含むか
    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// 商品レコードを検証する
pub(crate) fn validate_product(product: &ProductRecord) -> ValidationResult {
    let mut issues = Vec::new();

    check_product_id(product.product_id(), &mut issues);

    if let Some(ean) = &product.ean {
        if !is_digits_with_length(ean, |len| EAN_LENGTH.contains(&len)) {
            issues.push(ValidationIssue::new(
                "ean",
                "EAN must contain 8 to 14 digits",
                ValidationCode::InvalidEan,
            ));
        }
    }

    if let Some(upc) = &product.upc {
        if !is_digits_with_length(upc, |len| len == UPC_LENGTH) {
            issues.push(ValidationIssue::new(
                "upc",
                "UPC must contain exactly 12 digits",
                ValidationCode::InvalidUpc,
            ));
        }
    }

    if let Some(quantity) = product.min_order_quantity {
        if !(quantity.is_finite() && quantity >= 0.0) {
            issues.push(ValidationIssue::new(
                "minOrderQuantity",
                "Minimum order quantity must be a number greater than or equal to 0",
                ValidationCode::InvalidMinOrderQuantity,
            ));
        }
    }

    if let Some(step) = product.step_quantity {
        if !(step.is_finite() && step > 0.0) {
            issues.push(ValidationIssue::new(
                "stepQuantity",
                "Step quantity must be a number greater than 0",
                ValidationCode::InvalidStepQuantity,
            ));
        }
    }

    if let Some(priority) = product.sitemap_priority {
        if !(0.0..=1.0).contains(&priority) {
            issues.push(ValidationIssue::new(
                "sitemapPriority",
                "Sitemap priority must be between 0 and 1",
                ValidationCode::InvalidSitemapPriority,
            ));
        }
    }

    if let Some(online_from) = &product.online_from {
        if parse_date(online_from).is_none() {
            issues.push(ValidationIssue::new(
                "onlineFrom",
                format!("Invalid date: {}", online_from),
                ValidationCode::InvalidDate,
            ));
        }
    }

    ValidationResult::from_issues(issues)
}

/// 商品IDの検証（必須・最大長・文字種は排他的に1件のみ報告）
fn check_product_id(product_id: &str, issues: &mut Vec<ValidationIssue>) {
    if product_id.trim().is_empty() {
        issues.push(ValidationIssue::new(
            "productId",
            "Product ID is required",
            ValidationCode::RequiredField,
        ));
    } else if product_id.chars().count() > MAX_PRODUCT_ID_LENGTH {
        issues.push(ValidationIssue::new(
            "productId",
            format!("Product ID must be at most {} characters", MAX_PRODUCT_ID_LENGTH),
            ValidationCode::MaxLengthExceeded,
        ));
    } else if !product_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        issues.push(ValidationIssue::new(
            "productId",
            "Product ID may only contain letters, digits, '_' and '-'",
            ValidationCode::InvalidCharacters,
        ));
    }
}

fn is_digits_with_length(value: &str, accept_len: impl Fn(usize) -> bool) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && accept_len(digits.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> ProductRecord {
        ProductRecord::new(id)
    }

    fn codes(result: &ValidationResult) -> Vec<ValidationCode> {
        result.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_valid_minimal_product() {
        let result = product("PROD-1").validate();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.summary(), "");
    }

    #[test]
    fn test_product_id_rules_are_exclusive() {
        assert_eq!(codes(&product("").validate()), vec![ValidationCode::RequiredField]);
        assert_eq!(codes(&product("   ").validate()), vec![ValidationCode::RequiredField]);
        assert_eq!(
            codes(&product(&"a".repeat(101)).validate()),
            vec![ValidationCode::MaxLengthExceeded]
        );
        // 長すぎて不正文字も含む場合は最大長のみ
        assert_eq!(
            codes(&product(&"é".repeat(101)).validate()),
            vec![ValidationCode::MaxLengthExceeded]
        );
        assert_eq!(
            codes(&product("has space").validate()),
            vec![ValidationCode::InvalidCharacters]
        );
        assert!(product(&"a".repeat(100)).validate().is_valid);
    }

    #[test]
    fn test_ean_and_upc() {
        let mut p = product("P1");
        p.ean = Some("4006 3810 0000 2".to_string());
        p.upc = Some("036000291452".to_string());
        assert!(p.validate().is_valid);

        p.ean = Some("1234567".to_string());
        p.upc = Some("03600029145X".to_string());
        assert_eq!(
            codes(&p.validate()),
            vec![ValidationCode::InvalidEan, ValidationCode::InvalidUpc]
        );
    }

    #[test]
    fn test_quantities() {
        let mut p = product("P1");
        p.min_order_quantity = Some(0.0);
        p.step_quantity = Some(1.0);
        assert!(p.validate().is_valid);

        p.min_order_quantity = Some(-1.0);
        p.step_quantity = Some(0.0);
        assert_eq!(
            codes(&p.validate()),
            vec![
                ValidationCode::InvalidMinOrderQuantity,
                ValidationCode::InvalidStepQuantity
            ]
        );

        p.min_order_quantity = Some(f64::NAN);
        p.step_quantity = Some(f64::INFINITY);
        assert_eq!(p.validate().errors.len(), 2);
    }

    #[test]
    fn test_sitemap_priority() {
        let mut p = product("P1");
        p.sitemap_priority = Some(1.0);
        assert!(p.validate().is_valid);
        p.sitemap_priority = Some(1.5);
        assert!(p.validate().has_code(ValidationCode::InvalidSitemapPriority));
        p.sitemap_priority = Some(f64::NAN);
        assert!(p.validate().has_code(ValidationCode::InvalidSitemapPriority));
    }

    #[test]
    fn test_online_from() {
        let mut p = product("P1");
        p.online_from = Some("2024-03-01".to_string());
        assert!(p.validate().is_valid);
        p.online_from = Some("someday".to_string());
        let result = p.validate();
        assert_eq!(codes(&result), vec![ValidationCode::InvalidDate]);
        assert_eq!(result.summary(), "onlineFrom: Invalid date: someday");
    }

    #[test]
    fn test_errors_accumulate() {
        let mut p = product("");
        p.ean = Some("abc".to_string());
        p.sitemap_priority = Some(-0.1);
        let result = p.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.summary().starts_with("productId: Product ID is required, ean:"));
    }

    #[test]
    fn test_validation_is_pure() {
        let mut p = product("bad id");
        p.upc = Some("1".to_string());
        let before = p.clone();
        let first = p.validate();
        let second = p.validate();
        assert_eq!(first, second);
        assert_eq!(p, before);
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ValidationCode::InvalidMinOrderQuantity).unwrap();
        assert_eq!(json, "\"INVALID_MIN_ORDER_QUANTITY\"");
        assert_eq!(ValidationCode::RequiredField.to_string(), "REQUIRED_FIELD");
    }
}
