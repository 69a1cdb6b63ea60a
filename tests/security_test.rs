//! Security Tests
//!
//! 入力ファイルの制限、設定ディレクトリのパストラバーサル、
//! XMLへの値の埋め込み（エスケープ）に対する対策を検証します。

use sfcc_impex::{
    source, ConfigStore, ConverterBuilder, DataRow, ImpexError, ProductRecord, RawValue, Schema,
    XmlOptions,
};
use std::fs::File;
use std::io::Write;

const COMPANY_DOC: &str = r#"{
    "companyName": "Local",
    "catalog": { "catalogId": "local", "defaultCurrency": "USD", "defaultLocale": "en_US" },
    "columnMappings": {
        "product-id": { "objectAttribute": "productId", "required": true },
        "display-name": { "objectAttribute": "displayName" },
        "note": { "objectAttribute": "customAttributes" }
    },
    "headerMappings": { "product-id": "ID", "display-name": "NAME", "note": "NOTE" }
}"#;

/// 上限（10MB）を超える入力ファイルは読み込まない
#[test]
fn test_input_file_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.csv");
    {
        let mut file = File::create(&path).unwrap();
        file.write_all(b"ID,NAME\n").unwrap();
        let line = format!("P-1,{}\n", "x".repeat(1023));
        for _ in 0..10_241 {
            file.write_all(line.as_bytes()).unwrap();
        }
    }

    match source::read_path(&path) {
        Err(ImpexError::SecurityViolation(msg)) => assert!(msg.contains("exceeds")),
        other => panic!("Expected SecurityViolation, got {:?}", other.map(|r| r.len())),
    }
}

/// 対応外の拡張子
#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    std::fs::write(&path, "[]").unwrap();

    assert!(matches!(
        source::read_path(&path),
        Err(ImpexError::UnsupportedFormat(_))
    ));
}

/// 拡張子を偽装したファイルは解析エラーになる
#[test]
fn test_disguised_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.xlsx");
    std::fs::write(&path, "ID,NAME\nP-1,Mug\n").unwrap();

    assert!(matches!(source::read_path(&path), Err(ImpexError::Parse(_))));
}

/// 会社名を経由したパストラバーサル
#[test]
fn test_company_name_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("companies");
    std::fs::create_dir_all(inner.join("Local")).unwrap();
    std::fs::write(inner.join("Local").join("catalog.json"), COMPANY_DOC).unwrap();
    // ストアのルート外に置かれた設定
    std::fs::create_dir_all(dir.path().join("Secret")).unwrap();
    std::fs::write(dir.path().join("Secret").join("catalog.json"), COMPANY_DOC).unwrap();

    let store = ConfigStore::from_dir(&inner);
    assert!(store.load("Local", Schema::Catalog).is_ok());

    for name in ["../Secret", "..", "Local/../../Secret", "..\\Secret", "", "C:Secret"] {
        assert!(
            matches!(
                store.load(name, Schema::Catalog),
                Err(ImpexError::ConfigNotFound { .. })
            ),
            "company name {:?} should be rejected",
            name
        );
    }
}

/// 値に含まれるXMLの特殊文字はエスケープされる
#[test]
fn test_xml_injection_is_escaped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Local")).unwrap();
    std::fs::write(dir.path().join("Local").join("catalog.json"), COMPANY_DOC).unwrap();
    let store = ConfigStore::from_dir(dir.path());

    let converter = ConverterBuilder::new()
        .with_mapping(store.load("Local", Schema::Catalog).unwrap())
        .build()
        .unwrap();

    let mut row = DataRow::new();
    row.insert("ID".to_string(), RawValue::from("P-1"));
    row.insert(
        "NAME".to_string(),
        RawValue::from("</display-name><product product-id=\"evil\">"),
    );
    row.insert("NOTE".to_string(), RawValue::from("a & b < c"));
    let result = converter.convert_rows(&[row]);

    let xml = result.xml_content.unwrap();
    assert_eq!(xml.matches("<product ").count(), 1);
    assert!(!xml.contains("product-id=\"evil\""));
    assert!(xml.contains("&lt;/display-name&gt;"));
    assert!(xml.contains("a &amp; b &lt; c"));
}

/// 属性値に含まれる引用符はエスケープされる
#[test]
fn test_attribute_quote_escaping() {
    let mut product = ProductRecord::new("P-1");
    product.custom_attributes.push(sfcc_impex::CustomAttribute {
        attribute_id: "x\" onload=\"y".to_string(),
        value: "v".to_string(),
    });
    let xml = product.to_xml(XmlOptions::default()).unwrap();
    assert!(xml.contains("attribute-id=\"x&quot; onload=&quot;y\""));
}
