//! WebSocket layer — transport, events, configuration.
//!
//! The transport is one `WsClient<In, Out>` generic over the exchange's
//! inbound and outbound message schemas; each exchange module instantiates
//! it with its own tagged wire enums. The connection has two states,
//! disconnected → connected, and **no reconnection**: when the socket
//! closes or errors, the background task ends and the client stays
//! disconnected until the process restarts it explicitly.

mod client;

pub use client::{WsClient, WsSender};

use std::time::Duration;

// ─── ReadyState ──────────────────────────────────────────────────────────────

/// Connection state, readable from any task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl From<u8> for ReadyState {
    fn from(v: u8) -> Self {
        match v {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// Events emitted by the transport to the consumer.
#[derive(Debug, Clone)]
pub enum WsEvent<In> {
    /// A frame that decoded into the inbound schema.
    Message(In),
    /// A text frame that did not match the schema (unknown dispatch tag,
    /// control acks, welcome banners). Logged and dropped by dispatchers.
    Unhandled(String),
    /// Connection established.
    Connected,
    /// Connection lost. Terminal — no reconnect follows.
    Disconnected { code: Option<u16>, reason: String },
}

// ─── WsConfig ────────────────────────────────────────────────────────────────

/// Configuration for the WS transport.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    /// Deadline for the initial TCP/TLS/upgrade handshake.
    pub connect_timeout: Duration,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(30),
        }
    }
}
