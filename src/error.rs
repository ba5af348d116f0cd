//! Typed error taxonomy.
//!
//! The original connectivity surface printed status codes and let key errors
//! crash the caller; here every failure mode is a typed variant. Nothing is
//! retried or recovered — propagation is the caller's problem.

use thiserror::Error;

/// Top-level crate error.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// HTTP-layer errors.
///
/// A non-2xx status is a typed failure, never a success payload: `Rejected`
/// carries the exchange's error body verbatim for the caller to inspect.
#[derive(Error, Debug)]
pub enum HttpError {
    /// DNS, connect, TLS, or timeout failure below the HTTP layer.
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not match the expected schema.
    /// The whole call fails — there are no partial results.
    #[error("Decode failure: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The exchange rejected the request (5xx or unclassified status).
    #[error("Exchange rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Connection closed: code={code:?} reason={reason}")]
    Closed { code: Option<u16>, reason: String },
}

/// Configuration errors raised while reading the process environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
