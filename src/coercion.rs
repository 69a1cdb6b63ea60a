//! Coercion Module
//!
//! セル値をフィールドのデータ型に合わせて変換するモジュール。
//! すべての変換関数は全域関数であり、解釈できない値は元の値のまま返します。
//! 1行の変換失敗で処理全体を中断しないための前提条件です。

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::api::DataType;
use crate::mapping::Transformations;
use crate::types::RawValue;

/// 値の変換器
///
/// マッピング設定の`transformations`セクションを参照して、データ型ごとの
/// 変換を行うファサードです。
#[derive(Debug)]
pub(crate) struct ValueCoercer<'a> {
    transformations: &'a Transformations,
    date_coercer: DateCoercer,
}

impl<'a> ValueCoercer<'a> {
    pub fn new(transformations: &'a Transformations) -> Self {
        Self {
            transformations,
            date_coercer: DateCoercer,
        }
    }

    /// 値をデータ型に合わせて変換する
    ///
    /// # 引数
    ///
    /// * `value` - 生のセル値
    /// * `data_type` - フィールドのデータ型
    ///
    /// # 戻り値
    ///
    /// 変換後の値。変換できない場合は`value`の複製。
    pub fn coerce(&self, value: &RawValue, data_type: DataType) -> RawValue {
        match data_type {
            DataType::Boolean => self.coerce_boolean(value),
            DataType::Number => self.coerce_number(value),
            DataType::Date => self.date_coercer.coerce(value),
            DataType::String => value.clone(),
        }
    }

    /// 真偽値語彙による変換
    ///
    /// 小文字化・トリム後の値が`true`語彙に含まれれば`true`、`false`語彙に
    /// 含まれれば`false`。どちらでもなければ元の値。
    fn coerce_boolean(&self, value: &RawValue) -> RawValue {
        let token = value.to_text().trim().to_lowercase();
        let vocabulary = &self.transformations.boolean;
        if vocabulary.truthy.iter().any(|t| t.trim().to_lowercase() == token) {
            RawValue::Bool(true)
        } else if vocabulary.falsy.iter().any(|t| t.trim().to_lowercase() == token) {
            RawValue::Bool(false)
        } else {
            value.clone()
        }
    }

    /// 数値への変換
    ///
    /// 設定された通貨記号を除去してから解釈します。
    fn coerce_number(&self, value: &RawValue) -> RawValue {
        let text = match value {
            RawValue::String(s) => s,
            _ => return value.clone(),
        };

        let mut cleaned = text.clone();
        for symbol in &self.transformations.currency.remove_symbols {
            if !symbol.is_empty() {
                cleaned = cleaned.replace(symbol.as_str(), "");
            }
        }

        match cleaned.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => RawValue::Number(n),
            _ => value.clone(),
        }
    }
}

/// 日付変換器
///
/// Excelのシリアル日付値、および一般的な日付文字列を`YYYY-MM-DD`に正規化します。
/// 1900年エポック（1899年12月30日起算）のみを扱います。
#[derive(Debug)]
pub(crate) struct DateCoercer;

impl DateCoercer {
    /// 受け付ける日付文字列の書式
    const DATE_FORMATS: [&'static str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

    /// Excelが扱える最大のシリアル値（9999年12月31日）
    const MAX_SERIAL: f64 = 2_958_465.0;

    /// 受け付ける日時文字列の書式
    const DATETIME_FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    pub fn coerce(&self, value: &RawValue) -> RawValue {
        let date = match value {
            RawValue::Number(serial) => self.serial_to_date(*serial),
            RawValue::String(s) => parse_date(s),
            _ => None,
        };

        match date {
            Some(d) => RawValue::String(d.format("%Y-%m-%d").to_string()),
            None => value.clone(),
        }
    }

    /// Excelのシリアル値を日付に変換する
    ///
    /// # エポックシステム
    ///
    /// - 1900年システム: 1899年12月30日起算
    ///   - Excelの1900年うるう年バグにより、シリアル値61以降はこの起算日で一致する
    ///   - シリアル値1 = 1899年12月31日として扱われるが、実データでは問題にならない
    fn serial_to_date(&self, serial: f64) -> Option<NaiveDate> {
        if !serial.is_finite() || !(1.0..=Self::MAX_SERIAL).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(Duration::days(serial.floor() as i64))
    }
}

/// 日付文字列を解釈する
///
/// RFC 3339、日時書式、日付書式の順に試行します。
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    for format in DateCoercer::DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    DateCoercer::DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{BooleanVocabulary, CurrencyTransform};

    fn transformations() -> Transformations {
        Transformations {
            boolean: BooleanVocabulary {
                truthy: vec!["true".into(), "yes".into(), "1".into(), "si".into()],
                falsy: vec!["false".into(), "no".into(), "0".into()],
            },
            currency: CurrencyTransform {
                remove_symbols: vec!["$".into(), "€".into(), ",".into()],
            },
        }
    }

    #[test]
    fn test_boolean_vocabulary_true() {
        let t = transformations();
        let coercer = ValueCoercer::new(&t);
        assert_eq!(
            coercer.coerce(&RawValue::from("Yes"), DataType::Boolean),
            RawValue::Bool(true)
        );
        assert_eq!(
            coercer.coerce(&RawValue::from("  1 "), DataType::Boolean),
            RawValue::Bool(true)
        );
        // 数値セルも文字列表現で照合される
        assert_eq!(
            coercer.coerce(&RawValue::Number(1.0), DataType::Boolean),
            RawValue::Bool(true)
        );
    }

    #[test]
    fn test_boolean_vocabulary_false() {
        let t = transformations();
        let coercer = ValueCoercer::new(&t);
        assert_eq!(
            coercer.coerce(&RawValue::from("NO"), DataType::Boolean),
            RawValue::Bool(false)
        );
    }

    #[test]
    fn test_boolean_unknown_passes_through() {
        let t = transformations();
        let coercer = ValueCoercer::new(&t);
        assert_eq!(
            coercer.coerce(&RawValue::from("maybe"), DataType::Boolean),
            RawValue::from("maybe")
        );
        assert_eq!(coercer.coerce(&RawValue::Null, DataType::Boolean), RawValue::Null);
    }

    #[test]
    fn test_number_strips_currency_symbols() {
        let t = transformations();
        let coercer = ValueCoercer::new(&t);
        assert_eq!(
            coercer.coerce(&RawValue::from("$1,299.50"), DataType::Number),
            RawValue::Number(1299.5)
        );
        assert_eq!(
            coercer.coerce(&RawValue::from("abc"), DataType::Number),
            RawValue::from("abc")
        );
        assert_eq!(
            coercer.coerce(&RawValue::Number(3.0), DataType::Number),
            RawValue::Number(3.0)
        );
    }

    #[test]
    fn test_string_is_untouched() {
        let t = transformations();
        let coercer = ValueCoercer::new(&t);
        assert_eq!(
            coercer.coerce(&RawValue::from(" padded "), DataType::String),
            RawValue::from(" padded ")
        );
    }

    #[test]
    fn test_date_from_excel_serial() {
        // シリアル値45000 = 2023-03-15
        assert_eq!(
            DateCoercer.coerce(&RawValue::Number(45000.0)),
            RawValue::from("2023-03-15")
        );
        // シリアル値60 = 1900-02-28
        assert_eq!(
            DateCoercer.coerce(&RawValue::Number(60.0)),
            RawValue::from("1900-02-28")
        );
    }

    #[test]
    fn test_date_from_text() {
        assert_eq!(
            DateCoercer.coerce(&RawValue::from("2024-01-31T10:00:00")),
            RawValue::from("2024-01-31")
        );
        assert_eq!(
            DateCoercer.coerce(&RawValue::from("31/01/2024")),
            RawValue::from("2024-01-31")
        );
        assert_eq!(
            DateCoercer.coerce(&RawValue::from("2024-01-31T10:00:00Z")),
            RawValue::from("2024-01-31")
        );
    }

    #[test]
    fn test_date_invalid_passes_through() {
        assert_eq!(
            DateCoercer.coerce(&RawValue::from("not a date")),
            RawValue::from("not a date")
        );
        assert_eq!(DateCoercer.coerce(&RawValue::Number(-5.0)), RawValue::Number(-5.0));
    }

    #[test]
    fn test_date_out_of_range_serial_passes_through() {
        // Excelの範囲外のシリアル値は日付にせずそのまま残す
        assert_eq!(DateCoercer.coerce(&RawValue::Number(1e15)), RawValue::Number(1e15));
        assert_eq!(
            DateCoercer.coerce(&RawValue::Number(f64::MAX)),
            RawValue::Number(f64::MAX)
        );
        assert_eq!(
            DateCoercer.coerce(&RawValue::Number(2_958_465.0)),
            RawValue::from("9999-12-31")
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date(""), None);
    }
}
