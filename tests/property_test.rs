//! プロパティベーステスト
//!
//! proptestで商品IDの検証規則、XML生成の冪等性、グループ化の決定性を検証します。

use proptest::prelude::*;
use sfcc_impex::{
    partition_rows, DataRow, ProductRecord, RawValue, ValidationCode, XmlOptions,
    MAX_PRODUCT_ID_LENGTH,
};

fn product_id_codes(id: &str) -> Vec<ValidationCode> {
    ProductRecord::new(id)
        .validate()
        .errors
        .iter()
        .filter(|e| e.field == "productId")
        .map(|e| e.code)
        .collect()
}

proptest! {
    /// 規則に合う商品IDはエラーにならない
    #[test]
    fn valid_product_ids_pass(id in "[A-Za-z0-9_-]{1,100}") {
        prop_assert!(product_id_codes(&id).is_empty());
    }

    /// 規則に合わない商品IDは必ず1件だけエラーになる
    #[test]
    fn invalid_product_ids_report_exactly_one_code(id in "\\PC{0,120}") {
        let valid = !id.trim().is_empty()
            && id.chars().count() <= MAX_PRODUCT_ID_LENGTH
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        let codes = product_id_codes(&id);

        if valid {
            prop_assert!(codes.is_empty());
        } else {
            prop_assert_eq!(codes.len(), 1);
            let expected = if id.trim().is_empty() {
                ValidationCode::RequiredField
            } else if id.chars().count() > MAX_PRODUCT_ID_LENGTH {
                ValidationCode::MaxLengthExceeded
            } else {
                ValidationCode::InvalidCharacters
            };
            prop_assert_eq!(codes[0], expected);
        }
    }

    /// XML生成は冪等で、検証は状態を変更しない
    #[test]
    fn to_xml_is_idempotent(
        id in "[A-Za-z0-9]{1,20}",
        brand in proptest::option::of("\\PC{0,30}"),
        indent in 0usize..=8,
    ) {
        let mut product = ProductRecord::new(id);
        product.brand = brand;
        let options = XmlOptions { include_declaration: true, indent };

        let before = product.validate();
        let first = product.to_xml(options).unwrap();
        let second = product.to_xml(options).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(before, product.validate());
    }

    /// グループは初出順に並び、すべての行はいずれかに属するか除外される
    #[test]
    fn partition_is_total_and_ordered(masters in proptest::collection::vec("[ABC]?", 0..30)) {
        let rows: Vec<DataRow> = masters
            .iter()
            .map(|m| {
                let mut row = DataRow::new();
                row.insert("MASTER".to_string(), RawValue::from(m.as_str()));
                row
            })
            .collect();

        let (groups, dropped) = partition_rows(&rows, "MASTER");

        let grouped: usize = groups.values().map(|v| v.len()).sum();
        prop_assert_eq!(grouped + dropped.len(), rows.len());

        let mut seen = Vec::new();
        for m in &masters {
            if !m.is_empty() && !seen.contains(m) {
                seen.push(m.clone());
            }
        }
        let keys: Vec<String> = groups.keys().cloned().collect();
        prop_assert_eq!(keys, seen);
    }
}
