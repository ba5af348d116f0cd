//! Binance Futures stream wire types — subscribe commands and event-tagged
//! messages.

use serde::{Deserialize, Serialize};

use crate::shared::serde_util::flex_f64;

// ─── Streams ─────────────────────────────────────────────────────────────────

/// Market streams this client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    BookTicker,
    AggTrade,
    MarkPrice,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::BookTicker => "bookTicker",
            StreamKind::AggTrade => "aggTrade",
            StreamKind::MarkPrice => "markPrice",
        }
    }
}

/// Stream name for one symbol, e.g. `btcusdt@aggTrade`.
pub fn stream_name(symbol: &str, kind: StreamKind) -> String {
    format!("{}@{}", symbol.to_lowercase(), kind.as_str())
}

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Control messages sent to the stream endpoint.
///
/// Wire shape: `{"method": "SUBSCRIBE", "params": [...], "id": 1}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method")]
pub enum StreamCommand {
    #[serde(rename = "SUBSCRIBE")]
    Subscribe { params: Vec<String>, id: u64 },
}

impl StreamCommand {
    pub fn subscribe(streams: Vec<String>, id: u64) -> Self {
        StreamCommand::Subscribe { params: streams, id }
    }
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Inbound stream event, dispatched by its `"e"` tag.
///
/// Frames without a recognized tag (subscribe acks `{"result":null,"id":1}`,
/// unknown events) fail this decode and surface as `WsEvent::Unhandled`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "e")]
pub enum StreamEvent {
    #[serde(rename = "bookTicker")]
    BookTicker(BookTickerEvent),
    #[serde(rename = "aggTrade")]
    AggTrade(AggTradeEvent),
    #[serde(rename = "markPriceUpdate")]
    MarkPrice(MarkPriceEvent),
    #[serde(rename = "ACCOUNT_UPDATE")]
    AccountUpdate(serde_json::Value),
}

/// Which handler an event routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Book,
    Trade,
    MarkPrice,
    Account,
}

impl StreamEvent {
    pub fn route(&self) -> Route {
        match self {
            StreamEvent::BookTicker(_) => Route::Book,
            StreamEvent::AggTrade(_) => Route::Trade,
            StreamEvent::MarkPrice(_) => Route::MarkPrice,
            StreamEvent::AccountUpdate(_) => Route::Account,
        }
    }
}

/// Best bid/ask update.
#[derive(Debug, Clone, Deserialize)]
pub struct BookTickerEvent {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b", with = "flex_f64")]
    pub bid_price: f64,
    #[serde(rename = "B", with = "flex_f64")]
    pub bid_qty: f64,
    #[serde(rename = "a", with = "flex_f64")]
    pub ask_price: f64,
    #[serde(rename = "A", with = "flex_f64")]
    pub ask_qty: f64,
}

/// Aggregated trade.
#[derive(Debug, Clone, Deserialize)]
pub struct AggTradeEvent {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p", with = "flex_f64")]
    pub price: f64,
    #[serde(rename = "q", with = "flex_f64")]
    pub quantity: f64,
    #[serde(rename = "T")]
    pub trade_time_ms: i64,
    #[serde(rename = "m")]
    pub buyer_is_maker: bool,
}

/// Mark price / funding update.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkPriceEvent {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p", with = "flex_f64")]
    pub mark_price: f64,
    #[serde(rename = "r", with = "flex_f64")]
    pub funding_rate: f64,
    #[serde(rename = "T")]
    pub next_funding_time_ms: i64,
}
