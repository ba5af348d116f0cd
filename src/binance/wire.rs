//! Raw serde structs matching Binance USDT-M Futures REST responses.
//!
//! Binance serializes monetary amounts as strings; numeric fields go
//! through the `flex_f64` helper. Decoding is all-or-nothing — a missing
//! required field fails the whole call.

use serde::Deserialize;

use crate::domain::{Balance, Contract, OrderStatus};
use crate::shared::serde_util::flex_f64;

// ─── Exchange info ───────────────────────────────────────────────────────────

/// `GET /fapi/v1/exchangeInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfoWire {
    pub symbols: Vec<SymbolWire>,
}

/// One tradable symbol from exchange info.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolWire {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub price_precision: u32,
    pub quantity_precision: u32,
}

impl From<SymbolWire> for Contract {
    fn from(w: SymbolWire) -> Self {
        Contract {
            symbol: w.symbol,
            base_asset: w.base_asset,
            quote_asset: w.quote_asset,
            price_precision: w.price_precision,
            quantity_precision: w.quantity_precision,
        }
    }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// `GET /fapi/v2/account` — only the asset rows are consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountWire {
    pub assets: Vec<AssetWire>,
}

/// One margin asset row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWire {
    pub asset: String,
    #[serde(with = "flex_f64")]
    pub initial_margin: f64,
    #[serde(with = "flex_f64")]
    pub maint_margin: f64,
    #[serde(with = "flex_f64")]
    pub margin_balance: f64,
    #[serde(with = "flex_f64")]
    pub wallet_balance: f64,
    #[serde(with = "flex_f64")]
    pub unrealized_profit: f64,
}

impl From<&AssetWire> for Balance {
    fn from(w: &AssetWire) -> Self {
        Balance {
            initial_margin: w.initial_margin,
            maintenance_margin: w.maint_margin,
            margin_balance: w.margin_balance,
            wallet_balance: w.wallet_balance,
            unrealized_pnl: w.unrealized_profit,
        }
    }
}

// ─── Orders ──────────────────────────────────────────────────────────────────

/// One order row from `/fapi/v1/order` (create, cancel, and query all
/// return the same shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWire {
    pub order_id: u64,
    pub status: String,
    /// `"0"` until the order has a fill.
    #[serde(with = "flex_f64")]
    pub avg_price: f64,
}

impl From<OrderWire> for OrderStatus {
    fn from(w: OrderWire) -> Self {
        OrderStatus {
            order_id: w.order_id.to_string(),
            status: w.status,
            avg_price: w.avg_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_list_preserves_order_and_count() {
        let raw = r#"{"symbols": [
            {"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT",
             "pricePrecision": 2, "quantityPrecision": 3},
            {"symbol": "ETHUSDT", "baseAsset": "ETH", "quoteAsset": "USDT",
             "pricePrecision": 2, "quantityPrecision": 3}
        ]}"#;
        let info: ExchangeInfoWire = serde_json::from_str(raw).unwrap();
        let symbols: Vec<&str> = info.symbols.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_symbol_missing_field_fails_whole_decode() {
        let raw = r#"{"symbols": [
            {"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT",
             "pricePrecision": 2, "quantityPrecision": 3},
            {"baseAsset": "ETH", "quoteAsset": "USDT",
             "pricePrecision": 2, "quantityPrecision": 3}
        ]}"#;
        let info: Result<ExchangeInfoWire, _> = serde_json::from_str(raw);
        assert!(info.is_err());
    }

    #[test]
    fn test_symbol_to_contract() {
        let raw = r#"{"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT",
                      "pricePrecision": 2, "quantityPrecision": 3}"#;
        let w: SymbolWire = serde_json::from_str(raw).unwrap();
        let c = Contract::from(w);
        assert_eq!(c.symbol, "BTCUSDT");
        assert_eq!(c.price_precision, 2);
        assert_eq!(c.quantity_precision, 3);
    }

    #[test]
    fn test_asset_row_decodes_string_amounts() {
        let raw = r#"{"asset": "USDT", "initialMargin": "10.5", "maintMargin": "5.25",
                      "marginBalance": "1000.0", "walletBalance": "990.0",
                      "unrealizedProfit": "10.0"}"#;
        let w: AssetWire = serde_json::from_str(raw).unwrap();
        let b = Balance::from(&w);
        assert_eq!(b.initial_margin, 10.5);
        assert_eq!(b.maintenance_margin, 5.25);
        assert_eq!(b.unrealized_pnl, 10.0);
        assert_eq!(w.asset, "USDT");
    }

    #[test]
    fn test_order_to_status_stringifies_id() {
        let raw = r#"{"orderId": 283194212, "status": "NEW", "avgPrice": "0"}"#;
        let w: OrderWire = serde_json::from_str(raw).unwrap();
        let s = OrderStatus::from(w);
        assert_eq!(s.order_id, "283194212");
        assert_eq!(s.status, "NEW");
        assert_eq!(s.avg_price, 0.0);
    }
}
