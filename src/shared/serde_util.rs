//! Custom serde helpers for exchange wire formats.

/// Deserializes a field that the exchange sends either as a JSON number or
/// as a numeric string into `f64`.
///
/// Binance serializes most monetary amounts as strings (`"12.5"`); BitMEX
/// sends plain numbers. Wire types that appear in both use this helper.
pub mod flex_f64 {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid number: {}", s))),
        }
    }
}

/// Deserializes a Unix-millis integer into `chrono::DateTime<Utc>`.
pub mod timestamp_ms {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", millis)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(with = "flex_f64")]
        value: f64,
    }

    #[test]
    fn test_flex_f64_accepts_number() {
        let p: Probe = serde_json::from_str(r#"{"value": 12.5}"#).unwrap();
        assert_eq!(p.value, 12.5);
    }

    #[test]
    fn test_flex_f64_accepts_numeric_string() {
        let p: Probe = serde_json::from_str(r#"{"value": "12.5"}"#).unwrap();
        assert_eq!(p.value, 12.5);
    }

    #[test]
    fn test_flex_f64_rejects_garbage_string() {
        let r: Result<Probe, _> = serde_json::from_str(r#"{"value": "abc"}"#);
        assert!(r.is_err());
    }

    #[derive(Deserialize)]
    struct TsProbe {
        #[serde(with = "timestamp_ms")]
        at: chrono::DateTime<chrono::Utc>,
    }

    #[test]
    fn test_timestamp_ms() {
        let p: TsProbe = serde_json::from_str(r#"{"at": 1620000000000}"#).unwrap();
        assert_eq!(p.at.timestamp_millis(), 1620000000000);
    }
}
