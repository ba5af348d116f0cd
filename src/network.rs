//! Endpoint URL constants for both exchanges.

/// BitMEX production REST base URL.
pub const BITMEX_API_URL: &str = "https://www.bitmex.com/api/v1";

/// BitMEX production realtime WebSocket URL.
pub const BITMEX_WS_URL: &str = "wss://ws.bitmex.com/realtime";

/// BitMEX testnet REST base URL.
pub const BITMEX_TESTNET_API_URL: &str = "https://testnet.bitmex.com/api/v1";

/// BitMEX testnet realtime WebSocket URL.
pub const BITMEX_TESTNET_WS_URL: &str = "wss://ws.testnet.bitmex.com/realtime";

/// Binance USDT-M Futures production REST base URL.
pub const BINANCE_FUTURES_API_URL: &str = "https://fapi.binance.com";

/// Binance USDT-M Futures production stream URL.
pub const BINANCE_FUTURES_WS_URL: &str = "wss://fstream.binance.com/ws";

/// Binance USDT-M Futures testnet REST base URL.
pub const BINANCE_FUTURES_TESTNET_API_URL: &str = "https://testnet.binancefuture.com";

/// Binance USDT-M Futures testnet stream URL.
pub const BINANCE_FUTURES_TESTNET_WS_URL: &str = "wss://stream.binancefuture.com/ws";
