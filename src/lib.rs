//! # tradewire
//!
//! Thin REST + WebSocket connectivity for crypto derivatives exchanges.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — shared newtypes, domain models, error taxonomy
//! 2. **Auth** — credentials + HMAC-SHA256 request signing
//! 3. **HTTP API** — `HttpClient` with typed status mapping, no retries
//! 4. **WebSocket** — `WsClient<In, Out>` on a background tokio task
//! 5. **Exchange clients** — `BitmexClient` / `BinanceFuturesClient`
//!
//! There is deliberately no reconnect/backoff, no order management, and no
//! pagination beyond a single page: every failure surfaces as a typed error
//! and recovery is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradewire::prelude::*;
//!
//! let creds = Credentials::new("key", "secret");
//! let client = BitmexClient::connect(creds, Network::Testnet).await?;
//! let symbols = client.active_symbols().await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and serde helpers used across both exchanges.
pub mod shared;

/// Passive data models: contracts, balances, candles, order status.
pub mod domain;

/// Typed error taxonomy.
pub mod error;

/// Endpoint URL constants.
pub mod network;

/// Environment-sourced process configuration.
pub mod config;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Credentials and HMAC-SHA256 request signing.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// REST transport with typed status mapping.
pub mod http;

// ── Layer 4: WebSocket ───────────────────────────────────────────────────────

/// WebSocket transport: background task, events, no reconnection.
pub mod ws;

// ── Layer 5: Exchange clients ────────────────────────────────────────────────

/// BitMEX REST + realtime client.
pub mod bitmex;

/// Binance USDT-M Futures REST + stream client.
pub mod binance;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{BinSize, Network, Side};

    // Domain models
    pub use crate::domain::{Balance, Candle, Contract, OrderStatus};

    // Errors
    pub use crate::error::{ConnectError, HttpError, WsError};

    // Auth
    pub use crate::auth::Credentials;

    // Exchange clients
    pub use crate::binance::BinanceFuturesClient;
    pub use crate::bitmex::BitmexClient;

    // WebSocket types
    pub use crate::ws::{ReadyState, WsConfig, WsEvent};

    // Configuration
    pub use crate::config::AppConfig;
}
