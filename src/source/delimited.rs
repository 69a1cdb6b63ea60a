//! CSV Row Source
//!
//! csvクレートでカンマ区切りのファイルを読み込む。先頭行をヘッダーとして扱い、
//! すべてのセルを文字列として保持します（型変換はマッピング設定側で行う）。

use std::io::Read;

use csv::{ReaderBuilder, Trim};

use crate::error::ImpexError;
use crate::types::{DataRow, RawValue, RowSet};

/// CSVを読み込んでRowSetを生成する
///
/// * ヘッダーとセルの前後の空白は除去します
/// * すべてのセルが空の行はスキップします
/// * 列数が不揃いの行は許容し、不足するセルは行に含めません
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::source::read_csv;
///
/// let rows = read_csv("SKU,NAME\nA-1, Mug \n,\n".as_bytes()).unwrap();
/// assert_eq!(rows.headers, vec!["SKU", "NAME"]);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows.rows[0]["NAME"].to_text(), "Mug");
/// ```
pub fn read_csv<R: Read>(reader: R) -> Result<RowSet, ImpexError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let row: DataRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), RawValue::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(RowSet::new(headers, rows))
}
