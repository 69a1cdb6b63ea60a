//! Row Source Module
//!
//! CSVファイルおよびExcelワークブックを読み込み、`RowSet`（ヘッダー + 行）を生成する。
//! すべての行ソースは同じ`RowSet`を返すため、変換処理は入力形式に依存しません。

mod delimited;
mod workbook;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::api::FileKind;
use crate::error::ImpexError;
use crate::security::{validate_input_file, InputLimits};
use crate::types::RowSet;

pub use delimited::read_csv;
pub use workbook::read_workbook;

/// ファイルを読み込んでRowSetを生成する
///
/// 拡張子（`.csv` / `.xlsx` / `.xls`）から形式を判定します。
///
/// # 発生し得るエラー
///
/// * `ImpexError::UnsupportedFormat` - 拡張子が対応外の場合
/// * `ImpexError::SecurityViolation` - ファイルサイズが上限（10MB）を超える場合
/// * `ImpexError::Csv` / `ImpexError::Parse` - ファイルの解析に失敗した場合
///
/// # 使用例
///
/// ```rust,no_run
/// let rows = sfcc_impex::source::read_path("products.csv")?;
/// println!("{} rows", rows.len());
/// # Ok::<(), sfcc_impex::ImpexError>(())
/// ```
pub fn read_path(path: impl AsRef<Path>) -> Result<RowSet, ImpexError> {
    let path = path.as_ref();
    let kind = validate_input_file(path, &InputLimits::default())?;
    let file = BufReader::new(File::open(path)?);

    let rows = match kind {
        FileKind::Csv => read_csv(file)?,
        FileKind::Workbook => read_workbook(file)?,
    };
    debug!(path = %path.display(), ?kind, rows = rows.len(), "Loaded row source");
    Ok(rows)
}
