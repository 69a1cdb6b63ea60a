//! Security Module
//!
//! 入力ファイルと設定ディレクトリの参照に対する制限を実装するモジュール。
//! 巨大ファイルの読み込みと、会社名を経由したパストラバーサルを防ぎます。

use std::path::Path;

use crate::api::FileKind;
use crate::error::ImpexError;

/// 入力制限の設定
#[derive(Debug, Clone)]
pub(crate) struct InputLimits {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 10MB (10_485_760 bytes)
    pub max_input_file_size: u64,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_file_size: 10_485_760, // 10MB
        }
    }
}

/// 入力ファイルの検証
///
/// # 引数
///
/// * `path` - 入力ファイルのパス
/// * `limits` - 入力制限
///
/// # 戻り値
///
/// * `Ok(FileKind)` - 拡張子から判定した入力形式
/// * `Err(ImpexError::UnsupportedFormat)` - 拡張子が`csv`/`xlsx`/`xls`以外の場合
/// * `Err(ImpexError::SecurityViolation)` - ファイルサイズが上限を超える場合
/// * `Err(ImpexError::Io)` - ファイルのメタデータを取得できない場合
pub(crate) fn validate_input_file(path: &Path, limits: &InputLimits) -> Result<FileKind, ImpexError> {
    let kind = FileKind::from_path(path).ok_or_else(|| {
        ImpexError::UnsupportedFormat(format!(
            "{} (expected .csv, .xlsx or .xls)",
            path.display()
        ))
    })?;

    let size = std::fs::metadata(path)?.len();
    if size > limits.max_input_file_size {
        return Err(ImpexError::SecurityViolation(format!(
            "Input file size ({} bytes) exceeds maximum allowed size ({} bytes)",
            size, limits.max_input_file_size
        )));
    }

    Ok(kind)
}

/// 会社名の検証
///
/// 会社名は設定ディレクトリ直下のディレクトリ名として使用されるため、
/// パス区切りや`..`を含む名前を拒否します。
///
/// # 戻り値
///
/// * `Ok(())` - 名前が安全な場合
/// * `Err(String)` - 名前が危険な場合
pub(crate) fn validate_company_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Empty company name is not allowed".to_string());
    }

    if name.contains('/') || name.contains('\\') {
        return Err(format!("Path separator in company name is not allowed: {}", name));
    }

    if name.contains("..") {
        return Err(format!("Path traversal detected: {}", name));
    }

    if name.contains(':') {
        return Err(format!("Drive prefix in company name is not allowed: {}", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_input_limits_default() {
        assert_eq!(InputLimits::default().max_input_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_validate_company_name_valid() {
        assert!(validate_company_name("Typhoon").is_ok());
        assert!(validate_company_name("Example Corp").is_ok());
        assert!(validate_company_name("acme-2024").is_ok());
    }

    #[test]
    fn test_validate_company_name_empty() {
        assert!(validate_company_name("").is_err());
        assert!(validate_company_name("   ").is_err());
    }

    #[test]
    fn test_validate_company_name_traversal() {
        assert!(validate_company_name("..").is_err());
        assert!(validate_company_name("../etc").is_err());
        assert!(validate_company_name("a/b").is_err());
        assert!(validate_company_name("a\\b").is_err());
        assert!(validate_company_name("C:").is_err());
    }

    #[test]
    fn test_validate_input_file_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            validate_input_file(&path, &InputLimits::default()),
            Err(ImpexError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validate_input_file_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[b'a'; 64]).unwrap();
        drop(file);

        let limits = InputLimits {
            max_input_file_size: 16,
        };
        assert!(matches!(
            validate_input_file(&path, &limits),
            Err(ImpexError::SecurityViolation(_))
        ));
        assert_eq!(
            validate_input_file(&path, &InputLimits::default()).unwrap(),
            FileKind::Csv
        );
    }

    #[test]
    fn test_validate_input_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(matches!(
            validate_input_file(&path, &InputLimits::default()),
            Err(ImpexError::Io(_))
        ));
    }
}
