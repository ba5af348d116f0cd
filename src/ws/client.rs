//! WebSocket transport — `WsClient<In, Out>`.
//!
//! A background tokio task owns the socket; the public API talks to it over
//! mpsc channels. The task makes exactly one connection attempt and runs
//! until the socket closes, errors, or the client sends the stop command —
//! there is no reconnection and no resubscription. Protocol-level pings are
//! answered; there is no application keepalive.

use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::{ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command<Out> {
    Send(Out),
    Disconnect,
}

// ─── WsSender ────────────────────────────────────────────────────────────────

/// Cloneable send handle detached from the client.
///
/// Lets the owning exchange client keep sending subscribe ops after the
/// `WsClient` itself has been moved into its dispatcher task.
pub struct WsSender<Out>(mpsc::Sender<Command<Out>>);

impl<Out> Clone for WsSender<Out> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Out> WsSender<Out> {
    /// Fire-and-forget send. No acknowledgment is tracked.
    pub fn send(&self, msg: Out) -> Result<(), WsError> {
        self.0.try_send(Command::Send(msg)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WsError::SendFailed("Command channel full".into()),
            mpsc::error::TrySendError::Closed(_) => WsError::NotConnected,
        })
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// WebSocket client generic over the inbound/outbound message schemas.
pub struct WsClient<In, Out> {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command<Out>>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent<In>>>,
    event_tx: mpsc::Sender<WsEvent<In>>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU8>,
}

impl<In, Out> WsClient<In, Out>
where
    In: DeserializeOwned + Send + 'static,
    Out: Serialize + Send + Sync + 'static,
{
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU8::new(ReadyState::Closed as u8)),
        }
    }

    /// Spawn the background task and start the single connection attempt.
    ///
    /// Connection outcome arrives on the event stream: `Connected` on
    /// success, `Disconnected` on failure. A failed or dropped connection is
    /// terminal for this client.
    pub fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        self.cmd_tx = Some(cmd_tx);
        self.ready_state
            .store(ReadyState::Connecting as u8, Ordering::SeqCst);

        let handle = tokio::spawn(run_task(
            self.config.clone(),
            self.event_tx.clone(),
            cmd_rx,
            Arc::clone(&self.ready_state),
        ));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Stop signal + join: sends a graceful close to the background task and
    /// waits (bounded) for it to finish.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        self.ready_state
            .store(ReadyState::Closed as u8, Ordering::SeqCst);
        Ok(())
    }

    /// Fire-and-forget send. No acknowledgment is tracked.
    pub fn send(&self, msg: Out) -> Result<(), WsError> {
        match &self.cmd_tx {
            Some(tx) => tx.try_send(Command::Send(msg)).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    WsError::SendFailed("Command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => WsError::NotConnected,
            }),
            None => Err(WsError::NotConnected),
        }
    }

    /// Detached send handle for use outside the task that owns `self`.
    pub fn sender(&self) -> Result<WsSender<Out>, WsError> {
        match &self.cmd_tx {
            Some(tx) => Ok(WsSender(tx.clone())),
            None => Err(WsError::NotConnected),
        }
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Stream of events from the connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped before
    /// calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent<In>> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

impl<In, Out> Drop for WsClient<In, Out> {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task<In, Out>(
    config: WsConfig,
    event_tx: mpsc::Sender<WsEvent<In>>,
    mut cmd_rx: mpsc::Receiver<Command<Out>>,
    ready_state: Arc<AtomicU8>,
) where
    In: DeserializeOwned + Send + 'static,
    Out: Serialize + Send + 'static,
{
    let emit = |event: WsEvent<In>| {
        let _ = event_tx.try_send(event);
    };

    // Single connection attempt. On failure the task ends — the client
    // stays disconnected until it is rebuilt.
    let (sink, stream) = match attempt_connect(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("WebSocket connection to {} failed: {}", config.url, e);
            ready_state.store(ReadyState::Closed as u8, Ordering::SeqCst);
            emit(WsEvent::Disconnected {
                code: None,
                reason: e,
            });
            return;
        }
    };

    ready_state.store(ReadyState::Open as u8, Ordering::SeqCst);
    emit(WsEvent::Connected);

    let reason = run_connected(&emit, &mut cmd_rx, sink, stream).await;
    ready_state.store(ReadyState::Closed as u8, Ordering::SeqCst);

    if let Some((code, reason)) = reason {
        emit(WsEvent::Disconnected { code, reason });
    }
}

/// The connected loop — runs until the connection breaks or a Disconnect
/// command arrives. Returns `Some((code, reason))` when the consumer should
/// see a `Disconnected` event (i.e. the close was not user-requested).
async fn run_connected<In, Out>(
    emit: &impl Fn(WsEvent<In>),
    cmd_rx: &mut mpsc::Receiver<Command<Out>>,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> Option<(Option<u16>, String)>
where
    In: DeserializeOwned,
    Out: Serialize,
{
    loop {
        tokio::select! {
            // ── a) Incoming WS frame ─────────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match serde_json::from_str::<In>(text_str) {
                            Ok(inbound) => emit(WsEvent::Message(inbound)),
                            Err(_) => emit(WsEvent::Unhandled(text_str.to_string())),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        return Some((Some(code), reason));
                    }
                    Some(Ok(_)) => {} // Binary, Frame — ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        return Some((None, reason));
                    }
                    None => {
                        return Some((None, "Stream ended".into()));
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(out)) => {
                        if let Err(e) = send_msg(&mut sink, &out).await {
                            tracing::warn!("Send failed: {}", e);
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return None;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Establish the connection, guarded by the configured deadline.
async fn attempt_connect(
    config: &WsConfig,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(config.connect_timeout, connect_async(config.url.as_str()))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Serialize and send an outbound message over the sink.
async fn send_msg<Out: Serialize>(
    sink: &mut SplitSink<WsStream, Message>,
    msg: &Out,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
