//! Shared newtypes used across both exchange clients.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw format the exchanges send, so they can be used
//! directly in wire types without conversion overhead.

pub mod serde_util;

use serde::{Deserialize, Serialize};

// ─── Network ─────────────────────────────────────────────────────────────────

/// Which environment a client talks to, selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Production,
    Testnet,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Production => write!(f, "production"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

// ─── Side ────────────────────────────────────────────────────────────────────

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// BitMEX wire form: `"Buy"` / `"Sell"`.
    pub fn as_bitmex(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }

    /// Binance wire form: `"BUY"` / `"SELL"`.
    pub fn as_binance(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_bitmex())
    }
}

// ─── BinSize ─────────────────────────────────────────────────────────────────

/// Candle bucket interval.
///
/// BitMEX `trade/bucketed` accepts exactly these four bin sizes; Binance
/// klines accept a superset, of which these are the common subset used here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinSize {
    #[default]
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
}

impl BinSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
        }
    }

    /// Duration of one bucket in seconds.
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Hour1 => 3600,
            Self::Day1 => 86400,
        }
    }
}

impl std::fmt::Display for BinSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Utilities ───────────────────────────────────────────────────────────────

/// Number of decimal places in a price/quantity step.
///
/// Exchanges that publish a tick size instead of a precision (BitMEX) get
/// their precision derived from the step: `0.5` → 1, `0.01` → 2, `1.0` → 0.
pub fn decimals_from_step(step: f64) -> u32 {
    let mut v = step.abs();
    let mut places = 0u32;
    while v.fract() > 1e-9 && (1.0 - v.fract()) > 1e-9 && places < 12 {
        v *= 10.0;
        places += 1;
    }
    places
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_wire_forms() {
        assert_eq!(Side::Buy.as_bitmex(), "Buy");
        assert_eq!(Side::Sell.as_bitmex(), "Sell");
        assert_eq!(Side::Buy.as_binance(), "BUY");
        assert_eq!(Side::Sell.as_binance(), "SELL");
    }

    #[test]
    fn test_bin_size_serde() {
        let b: BinSize = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(b, BinSize::Hour1);
        assert_eq!(b.seconds(), 3600);
        assert_eq!(serde_json::to_string(&BinSize::Minute5).unwrap(), "\"5m\"");
    }

    #[test]
    fn test_decimals_from_step() {
        assert_eq!(decimals_from_step(1.0), 0);
        assert_eq!(decimals_from_step(0.5), 1);
        assert_eq!(decimals_from_step(0.01), 2);
        assert_eq!(decimals_from_step(0.00001), 5);
        assert_eq!(decimals_from_step(25.0), 0);
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Testnet.to_string(), "testnet");
    }
}
