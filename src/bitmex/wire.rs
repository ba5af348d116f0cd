//! Raw serde structs matching BitMEX REST responses.
//!
//! Decoding is all-or-nothing: a row missing a required field fails the
//! whole call with a decode error instead of producing a partial list.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Balance, Candle, Contract, OrderStatus};
use crate::shared::decimals_from_step;

// ─── Instruments ─────────────────────────────────────────────────────────────

/// One row of `GET /instrument/active`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentWire {
    pub symbol: String,
    pub underlying: String,
    pub quote_currency: String,
    pub tick_size: f64,
    /// Absent on index instruments.
    pub lot_size: Option<f64>,
}

impl From<InstrumentWire> for Contract {
    fn from(w: InstrumentWire) -> Self {
        Contract {
            symbol: w.symbol,
            base_asset: w.underlying,
            quote_asset: w.quote_currency,
            // BitMEX publishes steps, not precisions.
            price_precision: decimals_from_step(w.tick_size),
            quantity_precision: w.lot_size.map(decimals_from_step).unwrap_or(0),
        }
    }
}

// ─── Margin ──────────────────────────────────────────────────────────────────

/// One row of `GET /user/margin?currency=all`. Amounts are in the
/// currency's native unit (satoshis for XBt) — no conversion is applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginWire {
    pub currency: String,
    pub init_margin: f64,
    pub maint_margin: f64,
    pub margin_balance: f64,
    pub wallet_balance: f64,
    pub unrealised_pnl: f64,
}

impl From<&MarginWire> for Balance {
    fn from(w: &MarginWire) -> Self {
        Balance {
            initial_margin: w.init_margin,
            maintenance_margin: w.maint_margin,
            margin_balance: w.margin_balance,
            wallet_balance: w.wallet_balance,
            unrealized_pnl: w.unrealised_pnl,
        }
    }
}

// ─── Bucketed trades ─────────────────────────────────────────────────────────

/// One row of `GET /trade/bucketed`.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketedBinWire {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<BucketedBinWire> for Candle {
    fn from(w: BucketedBinWire) -> Self {
        Candle {
            timestamp_ms: w.timestamp.timestamp_millis(),
            open: w.open,
            high: w.high,
            low: w.low,
            close: w.close,
            volume: w.volume,
        }
    }
}

// ─── Orders ──────────────────────────────────────────────────────────────────

/// One order row from the `order` endpoint (create, cancel, and query all
/// return the same shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWire {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub ord_status: String,
    /// Null until the order has a fill.
    pub avg_px: Option<f64>,
}

impl From<OrderWire> for OrderStatus {
    fn from(w: OrderWire) -> Self {
        OrderStatus {
            order_id: w.order_id,
            status: w.ord_status,
            avg_price: w.avg_px.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_list_preserves_order_and_count() {
        let raw = r#"[
            {"symbol": "XBTUSD", "underlying": "XBT", "quoteCurrency": "USD",
             "tickSize": 0.5, "lotSize": 100},
            {"symbol": "ETHUSD", "underlying": "ETH", "quoteCurrency": "USD",
             "tickSize": 0.05, "lotSize": 1}
        ]"#;
        let rows: Vec<InstrumentWire> = serde_json::from_str(raw).unwrap();
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["XBTUSD", "ETHUSD"]);
    }

    #[test]
    fn test_instrument_missing_symbol_fails_whole_decode() {
        let raw = r#"[
            {"symbol": "XBTUSD", "underlying": "XBT", "quoteCurrency": "USD",
             "tickSize": 0.5, "lotSize": 100},
            {"underlying": "ETH", "quoteCurrency": "USD", "tickSize": 0.05, "lotSize": 1}
        ]"#;
        let rows: Result<Vec<InstrumentWire>, _> = serde_json::from_str(raw);
        assert!(rows.is_err());
    }

    #[test]
    fn test_instrument_to_contract_derives_precision_from_steps() {
        let w = InstrumentWire {
            symbol: "XBTUSD".into(),
            underlying: "XBT".into(),
            quote_currency: "USD".into(),
            tick_size: 0.5,
            lot_size: Some(100.0),
        };
        let c = Contract::from(w);
        assert_eq!(c.price_precision, 1);
        assert_eq!(c.quantity_precision, 0);
        assert_eq!(c.base_asset, "XBT");
    }

    #[test]
    fn test_margin_to_balance() {
        let raw = r#"{"currency": "XBt", "initMargin": 0.0, "maintMargin": 12.5,
                      "marginBalance": 1000000.0, "walletBalance": 999000.0,
                      "unrealisedPnl": 1000.0}"#;
        let w: MarginWire = serde_json::from_str(raw).unwrap();
        let b = Balance::from(&w);
        assert_eq!(b.maintenance_margin, 12.5);
        assert_eq!(b.unrealized_pnl, 1000.0);
        assert_eq!(w.currency, "XBt");
    }

    #[test]
    fn test_bucketed_bin_to_candle() {
        let raw = r#"{"timestamp": "2021-05-03T00:00:00.000Z", "symbol": "XBTUSD",
                      "open": 100.0, "high": 105.0, "low": 95.0, "close": 102.0,
                      "volume": 10.0}"#;
        let w: BucketedBinWire = serde_json::from_str(raw).unwrap();
        let c = Candle::from(w);
        assert_eq!(c.timestamp_ms, 1620000000000);
        assert_eq!(c.close, 102.0);
    }

    #[test]
    fn test_order_without_fill_has_zero_avg_price() {
        let raw = r#"{"orderID": "abc-123", "ordStatus": "New", "avgPx": null}"#;
        let w: OrderWire = serde_json::from_str(raw).unwrap();
        let s = OrderStatus::from(w);
        assert_eq!(s.order_id, "abc-123");
        assert_eq!(s.status, "New");
        assert_eq!(s.avg_price, 0.0);
    }
}
