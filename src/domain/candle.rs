//! OHLCV candle.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// One OHLCV bar.
///
/// Deserializes from the kline array form the exchanges return:
/// `[openTimeMs, open, high, low, close, volume, ...]` — numbers or numeric
/// strings, with any trailing elements ignored. Ordering of a candle series
/// is whatever the exchange returned; no timestamp ordering is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CandleVisitor;

        impl<'de> Visitor<'de> for CandleVisitor {
            type Value = Candle;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a kline array [timestamp, open, high, low, close, volume, ...]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Candle, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let timestamp_ms = next_i64(&mut seq, 0)?;
                let open = next_f64(&mut seq, 1)?;
                let high = next_f64(&mut seq, 2)?;
                let low = next_f64(&mut seq, 3)?;
                let close = next_f64(&mut seq, 4)?;
                let volume = next_f64(&mut seq, 5)?;

                // Binance klines carry 12 elements; drain the tail.
                while seq.next_element::<serde_json::Value>()?.is_some() {}

                Ok(Candle {
                    timestamp_ms,
                    open,
                    high,
                    low,
                    close,
                    volume,
                })
            }
        }

        fn next_value<'de, A: SeqAccess<'de>>(
            seq: &mut A,
            index: usize,
        ) -> Result<serde_json::Value, A::Error> {
            seq.next_element::<serde_json::Value>()?
                .ok_or_else(|| de::Error::invalid_length(index, &"at least 6 elements"))
        }

        fn next_i64<'de, A: SeqAccess<'de>>(seq: &mut A, index: usize) -> Result<i64, A::Error> {
            let v = next_value(seq, index)?;
            match &v {
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f as i64))
                    .ok_or_else(|| de::Error::custom(format!("Invalid timestamp: {}", n))),
                serde_json::Value::String(s) => s
                    .parse::<i64>()
                    .map_err(|_| de::Error::custom(format!("Invalid timestamp: {}", s))),
                other => Err(de::Error::custom(format!("Invalid timestamp: {}", other))),
            }
        }

        fn next_f64<'de, A: SeqAccess<'de>>(seq: &mut A, index: usize) -> Result<f64, A::Error> {
            let v = next_value(seq, index)?;
            match &v {
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| de::Error::custom(format!("Invalid number: {}", n))),
                serde_json::Value::String(s) => s
                    .parse::<f64>()
                    .map_err(|_| de::Error::custom(format!("Invalid number: {}", s))),
                other => Err(de::Error::custom(format!("Invalid number: {}", other))),
            }
        }

        deserializer.deserialize_seq(CandleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_from_numeric_array() {
        let c: Candle =
            serde_json::from_str("[1620000000000, 100.0, 105.0, 95.0, 102.0, 10.0]").unwrap();
        assert_eq!(c.timestamp_ms, 1620000000000);
        assert_eq!(c.open, 100.0);
        assert_eq!(c.high, 105.0);
        assert_eq!(c.low, 95.0);
        assert_eq!(c.close, 102.0);
        assert_eq!(c.volume, 10.0);
    }

    #[test]
    fn test_candle_from_binance_kline_row() {
        // Binance sends prices as strings and appends six more elements.
        let raw = r#"[1620000000000, "100.0", "105.0", "95.0", "102.0", "10.0",
                      1620000059999, "1020.0", 42, "5.0", "510.0", "0"]"#;
        let c: Candle = serde_json::from_str(raw).unwrap();
        assert_eq!(c.timestamp_ms, 1620000000000);
        assert_eq!(c.close, 102.0);
        assert_eq!(c.volume, 10.0);
    }

    #[test]
    fn test_candle_rejects_short_array() {
        let r: Result<Candle, _> = serde_json::from_str("[1620000000000, 100.0, 105.0]");
        assert!(r.is_err());
    }

    #[test]
    fn test_candle_rejects_non_numeric_field() {
        let r: Result<Candle, _> =
            serde_json::from_str(r#"[1620000000000, "abc", 105.0, 95.0, 102.0, 10.0]"#);
        assert!(r.is_err());
    }
}
