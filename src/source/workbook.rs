//! Workbook Row Source
//!
//! calamineでExcelワークブックの先頭シートを読み込む。
//! 先頭行をヘッダーとし、セルの型（数値・真偽値・日付）はそのまま保持します。

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::ImpexError;
use crate::types::{DataRow, RawValue, RowSet};

/// ワークブックの先頭シートを読み込んでRowSetを生成する
///
/// # 引数
///
/// * `reader` - ワークブックを読み込むためのリーダー（Readトレイトを実装）
///
/// # 戻り値
///
/// * `Ok(RowSet)` - 読み込みに成功した場合
/// * `Err(ImpexError::Parse)` - ワークブックの解析に失敗した場合
/// * `Err(ImpexError::Config)` - シートが1枚もない、または先頭シートが空の場合
///
/// # セルの変換
///
/// | セル | RawValue |
/// |------|----------|
/// | 空 | `Null` |
/// | 整数・小数 | `Number` |
/// | 真偽値 | `Bool` |
/// | 日付 | `Number`（Excelシリアル値） |
/// | 文字列・エラー | `String` |
pub fn read_workbook<R: Read>(mut reader: R) -> Result<RowSet, ImpexError> {
    // calamineはClone可能なリーダーを要求するため、一度メモリに読み込む
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImpexError::Config("workbook is empty".to_string()))??;

    let mut iter = range.rows();
    let header_row = iter
        .next()
        .ok_or_else(|| ImpexError::Config("workbook is empty".to_string()))?;

    // 列インデックス → ヘッダー名（空のヘッダーは除外）
    let columns: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| (i, raw_value(cell).to_text().trim().to_string()))
        .filter(|(_, header)| !header.is_empty())
        .collect();
    let headers = columns.iter().map(|(_, h)| h.clone()).collect();

    let rows = iter
        .filter(|cells| cells.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|cells| {
            columns
                .iter()
                .map(|(i, header)| {
                    let value = cells.get(*i).map(raw_value).unwrap_or(RawValue::Null);
                    (header.clone(), value)
                })
                .collect::<DataRow>()
        })
        .collect();

    Ok(RowSet::new(headers, rows))
}

/// calamineのセル値をRawValueに変換する
fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Null,
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::String(s) => RawValue::String(s.trim().to_string()),
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::String(s.clone()),
        Data::Error(e) => RawValue::String(e.to_string()),
    }
}
