//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! 変換処理中の行単位の問題（バリデーション違反、未マッピング列など）は
//! このエラー型では表現せず、`ConversionResult`に蓄積されます。
//! ここで扱うのは、処理そのものを継続できない問題のみです。

use thiserror::Error;

/// sfcc-impexクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io` / `Parse` / `Csv` / `Json` / `Xml`: 下位ライブラリ由来のエラー
/// - `Config`: マッピング設定の形式検証に失敗したエラー
/// - `ConfigNotFound`: 会社・スキーマに対応するマッピング設定が存在しない
/// - `UnsupportedFormat`: 入力ファイル形式がサポート対象外
/// - `SecurityViolation`: 入力ファイルのサイズ制限などに違反
///
/// # 使用例
///
/// ```rust,no_run
/// use sfcc_impex::{ConfigStore, ImpexError, Schema};
///
/// let store = ConfigStore::bundled();
/// match store.load("Unknown", Schema::Catalog) {
///     Err(ImpexError::ConfigNotFound { company, .. }) => {
///         println!("no mapping for {}", company);
///     }
///     _ => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum ImpexError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVファイルの解析中に発生したエラー
    #[error("Failed to parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    /// マッピング設定（JSON）の解析エラー
    #[error("Failed to parse mapping document: {0}")]
    Json(#[from] serde_json::Error),

    /// XML書き込み中のエラー
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// マッピング設定の読み込み時、または`ConverterBuilder::build()`時に
    /// 無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// マッピング設定が見つからないエラー
    ///
    /// 変換全体を中断する唯一のエラーです。
    #[error("Mapping configuration not found for company '{company}' (schema: {schema})")]
    ConfigNotFound {
        /// 会社名
        company: String,
        /// スキーマ名（例: `catalog`）
        schema: String,
    },

    /// サポートされていない入力ファイル形式
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: ImpexError = io_err.into();

        match error {
            ImpexError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let error: ImpexError = calamine::Error::Msg("Corrupted file").into();
        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let error: ImpexError = json_err.into();
        assert!(error.to_string().starts_with("Failed to parse mapping document"));
    }

    #[test]
    fn test_config_not_found_display() {
        let error = ImpexError::ConfigNotFound {
            company: "Acme".to_string(),
            schema: "catalog".to_string(),
        };
        let error_msg = error.to_string();
        assert!(error_msg.contains("'Acme'"));
        assert!(error_msg.contains("catalog"));
    }

    // ?演算子による変換の確認
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), ImpexError> {
            let _file = std::fs::File::open("nonexistent_file.csv")?;
            Ok(())
        }

        assert!(matches!(io_operation(), Err(ImpexError::Io(_))));
    }

    #[test]
    fn test_all_error_formats() {
        let config_err = ImpexError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let unsupported = ImpexError::UnsupportedFormat("pdf".to_string());
        assert!(unsupported.to_string().starts_with("Unsupported file format"));

        let security = ImpexError::SecurityViolation("too large".to_string());
        assert!(security.to_string().starts_with("Security violation"));
    }
}
