use super::candle::Candle;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One row of exchange history: `[time, low, high, open, close, volume]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricRate {
    /// Bucket start, unix seconds
    pub time: i64,
    pub low: Decimal,
    pub high: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl HistoricRate {
    /// Parse a raw JSON row. Returns `None` for anything that is not a
    /// six-element numeric array.
    pub fn from_row(row: &Value) -> Option<Self> {
        let arr = row.as_array()?;
        if arr.len() < 6 {
            return None;
        }

        Some(Self {
            time: arr[0].as_i64()?,
            low: decimal_from_value(&arr[1])?,
            high: decimal_from_value(&arr[2])?,
            open: decimal_from_value(&arr[3])?,
            close: decimal_from_value(&arr[4])?,
            volume: decimal_from_value(&arr[5])?,
        })
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.time, 0).single()
    }

    pub fn to_candle(&self) -> Candle {
        Candle::new(self.open, self.high, self.low, self.close)
    }
}

/// Converts through the number's textual form so no binary float rounding
/// leaks into the decimal.
fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_row_parsing_keeps_column_order() {
        let row = json!([1700000060, 67900.5, 68150.25, 68000, 68100.1, 12.75]);
        let rate = HistoricRate::from_row(&row).unwrap();

        assert_eq!(rate.time, 1700000060);
        assert_eq!(rate.low, dec!(67900.5));
        assert_eq!(rate.high, dec!(68150.25));
        assert_eq!(rate.open, dec!(68000));
        assert_eq!(rate.close, dec!(68100.1));
        assert_eq!(rate.volume, dec!(12.75));

        let candle = rate.to_candle();
        assert_eq!(candle.open, dec!(68000));
        assert_eq!(candle.high, dec!(68150.25));
        assert_eq!(candle.low, dec!(67900.5));
        assert_eq!(candle.close, dec!(68100.1));
    }

    #[test]
    fn test_close_is_exact_decimal() {
        // 0.1 + 0.2 style values must not pick up float noise
        let row = json!([1, 0.1, 0.3, 0.2, 0.3, 1]);
        let rate = HistoricRate::from_row(&row).unwrap();
        assert_eq!(rate.close, dec!(0.3));
        assert_eq!(rate.open + rate.low, dec!(0.3));
    }

    #[test]
    fn test_string_numbers_are_accepted() {
        let row = json!([1, "1.5", "2.5", "2", "2.25", "100"]);
        let rate = HistoricRate::from_row(&row).unwrap();
        assert_eq!(rate.close, dec!(2.25));
    }

    #[test]
    fn test_malformed_rows_are_rejected() {
        assert!(HistoricRate::from_row(&json!([1, 2, 3])).is_none());
        assert!(HistoricRate::from_row(&json!({"time": 1})).is_none());
        assert!(HistoricRate::from_row(&json!([1, 2, 3, null, 5, 6])).is_none());
        assert!(HistoricRate::from_row(&json!(["x", 2, 3, 4, 5, 6])).is_none());
    }

    #[test]
    fn test_timestamp() {
        let row = json!([1704067200, 1, 1, 1, 1, 0]);
        let rate = HistoricRate::from_row(&row).unwrap();
        assert_eq!(
            rate.timestamp().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
