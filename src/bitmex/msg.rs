//! BitMEX realtime wire types — subscribe ops and table-tagged messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Channels ────────────────────────────────────────────────────────────────

/// Realtime channels this client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    OrderBookL2,
    Trade,
    Instrument,
    Margin,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::OrderBookL2 => "orderBookL2",
            Channel::Trade => "trade",
            Channel::Instrument => "instrument",
            Channel::Margin => "margin",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Control messages sent to the realtime endpoint.
///
/// Wire shape: `{"op": "subscribe", "args": ["trade"]}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op")]
pub enum ControlOut {
    #[serde(rename = "subscribe")]
    Subscribe { args: Vec<String> },
}

impl ControlOut {
    pub fn subscribe(channel: Channel) -> Self {
        ControlOut::Subscribe {
            args: vec![channel.as_str().to_string()],
        }
    }
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Inbound data frame, dispatched by its `"table"` tag.
///
/// Frames without a recognized table (welcome banner, subscribe acks,
/// unknown tables) fail this decode and surface as `WsEvent::Unhandled`,
/// which the dispatcher logs and drops.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "table")]
pub enum StreamMessage {
    #[serde(rename = "orderBookL2")]
    OrderBook(TableUpdate<BookLevel>),
    #[serde(rename = "trade")]
    Trade(TableUpdate<TradeRow>),
    #[serde(rename = "instrument")]
    Instrument(TableUpdate<serde_json::Value>),
    #[serde(rename = "margin")]
    Margin(TableUpdate<serde_json::Value>),
}

/// Which of the four handlers a message routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    OrderBook,
    Trade,
    Instrument,
    Margin,
}

impl StreamMessage {
    pub fn route(&self) -> Route {
        match self {
            StreamMessage::OrderBook(_) => Route::OrderBook,
            StreamMessage::Trade(_) => Route::Trade,
            StreamMessage::Instrument(_) => Route::Instrument,
            StreamMessage::Margin(_) => Route::Margin,
        }
    }
}

/// Common envelope of every table message.
#[derive(Debug, Clone, Deserialize)]
pub struct TableUpdate<T> {
    /// `"partial"`, `"insert"`, `"update"`, or `"delete"`.
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

fn default_action() -> String {
    "partial".to_string()
}

/// One `orderBookL2` level. Size and price are absent on deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct BookLevel {
    pub symbol: String,
    pub id: u64,
    pub side: String,
    pub size: Option<f64>,
    pub price: Option<f64>,
}

/// One `trade` row.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRow {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: String,
    pub size: f64,
    pub price: f64,
}
