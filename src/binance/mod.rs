//! Binance USDT-M Futures client — REST + market streams.
//!
//! Same shape as the BitMEX client: construction fetches contracts and
//! balances, then opens the stream socket on a background task with no
//! reconnection. Signing differs: the HMAC digest rides as a trailing
//! `signature` query parameter and the API key as the `X-MBX-APIKEY`
//! header.

pub mod msg;
pub mod wire;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::auth::sign::{encode_form, now_ms, signed_query, Params};
use crate::auth::Credentials;
use crate::domain::{Balance, Candle, Contract, OrderStatus};
use crate::error::{ConnectError, HttpError, WsError};
use crate::http::{Headers, HttpClient};
use crate::network;
use crate::shared::{BinSize, Network, Side};
use crate::ws::{WsClient, WsConfig, WsEvent, WsSender};

use msg::{stream_name, AggTradeEvent, BookTickerEvent, MarkPriceEvent, StreamCommand, StreamEvent, StreamKind};
use wire::{AccountWire, ExchangeInfoWire, OrderWire};

/// Maximum kline rows per request — the documented endpoint cap. Single
/// page only; longer ranges come back truncated.
pub const MAX_KLINE_LIMIT: u32 = 1500;

type Stream = WsClient<StreamEvent, StreamCommand>;

// ─── Client ──────────────────────────────────────────────────────────────────

/// Binance USDT-M Futures REST + stream client.
pub struct BinanceFuturesClient {
    credentials: Credentials,
    http: HttpClient,
    contracts: Vec<Contract>,
    balances: Vec<Balance>,
    stream: Option<StreamTask>,
    next_ws_id: AtomicU64,
}

struct StreamTask {
    sender: WsSender<StreamCommand>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BinanceFuturesClient {
    /// Build a client against the chosen environment.
    ///
    /// Blocks on two REST round-trips (exchange info, account) before
    /// opening the stream socket.
    pub async fn connect(credentials: Credentials, net: Network) -> Result<Self, ConnectError> {
        let (api_url, ws_url) = match net {
            Network::Production => (
                network::BINANCE_FUTURES_API_URL,
                network::BINANCE_FUTURES_WS_URL,
            ),
            Network::Testnet => (
                network::BINANCE_FUTURES_TESTNET_API_URL,
                network::BINANCE_FUTURES_TESTNET_WS_URL,
            ),
        };

        let mut client = Self {
            credentials,
            http: HttpClient::new(api_url),
            contracts: Vec::new(),
            balances: Vec::new(),
            stream: None,
            next_ws_id: AtomicU64::new(1),
        };

        client.contracts = client.instruments().await?;
        client.balances = client.margin_balances().await?;

        let mut ws: Stream = WsClient::new(WsConfig::new(ws_url));
        ws.connect()?;
        let sender = ws.sender()?;
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_stream(ws, stop_rx));
        client.stream = Some(StreamTask {
            sender,
            stop_tx,
            handle,
        });

        tracing::info!(
            "BinanceFuturesClient initialized against {} ({} contracts)",
            net,
            client.contracts.len()
        );
        Ok(client)
    }

    /// Contracts fetched at construction.
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    /// Margin snapshots fetched at construction.
    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    // ── REST: instruments ────────────────────────────────────────────────

    /// Symbols of every listed contract, in exchange order.
    pub async fn active_symbols(&self) -> Result<Vec<String>, HttpError> {
        let info: ExchangeInfoWire = self.http.get("fapi/v1/exchangeInfo", &Vec::new()).await?;
        Ok(info.symbols.into_iter().map(|s| s.symbol).collect())
    }

    /// Full contract descriptors.
    pub async fn instruments(&self) -> Result<Vec<Contract>, HttpError> {
        let info: ExchangeInfoWire = self.http.get("fapi/v1/exchangeInfo", &Vec::new()).await?;
        Ok(info.symbols.into_iter().map(Contract::from).collect())
    }

    // ── REST: account ────────────────────────────────────────────────────

    /// Margin snapshot per asset.
    pub async fn margin_balances(&self) -> Result<Vec<Balance>, HttpError> {
        let account = self.fetch_account().await?;
        Ok(account.assets.iter().map(Balance::from).collect())
    }

    /// Asset codes carried by the account response.
    pub async fn balance_currencies(&self) -> Result<Vec<String>, HttpError> {
        let account = self.fetch_account().await?;
        Ok(account.assets.into_iter().map(|a| a.asset).collect())
    }

    async fn fetch_account(&self) -> Result<AccountWire, HttpError> {
        let query = self.sign(Vec::new());
        self.http
            .get(&format!("fapi/v2/account?{}", query), &self.auth_headers())
            .await
    }

    // ── REST: candles ────────────────────────────────────────────────────

    /// Historical klines for one symbol. Single page of at most
    /// [`MAX_KLINE_LIMIT`] rows.
    pub async fn historical_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, HttpError> {
        let params = kline_params(symbol, bin_size, start, end);
        let path_query = format!("fapi/v1/klines?{}", encode_form(&params));
        self.http.get(&path_query, &Vec::new()).await
    }

    // ── REST: orders ─────────────────────────────────────────────────────

    /// Place a limit order. `type` is always the literal `"LIMIT"` with
    /// `timeInForce` GTC. No client-order-id: a retry after a network
    /// failure can duplicate the order.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        price: f64,
        quantity: f64,
    ) -> Result<OrderStatus, HttpError> {
        let query = self.sign(order_params(symbol, side, price, quantity));
        let row: OrderWire = self
            .http
            .post(&format!("fapi/v1/order?{}", query), &self.auth_headers())
            .await?;
        Ok(OrderStatus::from(row))
    }

    /// Cancel an order. Binance requires the symbol alongside the id.
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<OrderStatus, HttpError> {
        let query = self.sign(vec![
            param("symbol", symbol),
            param("orderId", order_id),
        ]);
        let row: OrderWire = self
            .http
            .delete(&format!("fapi/v1/order?{}", query), &self.auth_headers())
            .await?;
        Ok(OrderStatus::from(row))
    }

    /// Look up an order. Binance requires the symbol alongside the id.
    pub async fn order_status(&self, symbol: &str, order_id: u64) -> Result<OrderStatus, HttpError> {
        let query = self.sign(vec![
            param("symbol", symbol),
            param("orderId", order_id),
        ]);
        let row: OrderWire = self
            .http
            .get(&format!("fapi/v1/order?{}", query), &self.auth_headers())
            .await?;
        Ok(OrderStatus::from(row))
    }

    // ── Streams ──────────────────────────────────────────────────────────

    /// Fire-and-forget stream subscription with an incrementing request id.
    /// No acknowledgment is tracked.
    pub fn subscribe(&self, symbol: &str, kind: StreamKind) -> Result<(), WsError> {
        match &self.stream {
            Some(task) => {
                let id = self.next_ws_id.fetch_add(1, Ordering::Relaxed);
                task.sender
                    .send(StreamCommand::subscribe(vec![stream_name(symbol, kind)], id))
            }
            None => Err(WsError::NotConnected),
        }
    }

    /// Explicit shutdown: signals the stream task to stop and joins it.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.stream.take() {
            let _ = task.stop_tx.send(true);
            let _ = timeout(std::time::Duration::from_secs(10), task.handle).await;
        }
        tracing::info!("BinanceFuturesClient shut down");
    }

    // ── Signed request plumbing ──────────────────────────────────────────

    fn auth_headers(&self) -> Headers {
        vec![("X-MBX-APIKEY", self.credentials.api_key.clone())]
    }

    fn sign(&self, params: Params) -> String {
        signed_query(params, now_ms(), self.credentials.secret())
    }
}

// ─── Request builders ────────────────────────────────────────────────────────

fn param(k: &str, v: impl ToString) -> (String, String) {
    (k.to_string(), v.to_string())
}

fn kline_params(symbol: &str, bin_size: BinSize, start: DateTime<Utc>, end: DateTime<Utc>) -> Params {
    vec![
        param("symbol", symbol),
        param("interval", bin_size.as_str()),
        param("limit", MAX_KLINE_LIMIT),
        param("startTime", start.timestamp_millis()),
        param("endTime", end.timestamp_millis()),
    ]
}

fn order_params(symbol: &str, side: Side, price: f64, quantity: f64) -> Params {
    vec![
        param("symbol", symbol),
        param("side", side.as_binance()),
        param("type", "LIMIT"),
        param("timeInForce", "GTC"),
        param("quantity", quantity),
        param("price", price),
    ]
}

// ─── Stream task ─────────────────────────────────────────────────────────────

/// Receive loop: routes events to the handlers until the socket drops or
/// the stop signal fires. No reconnection on exit.
async fn run_stream(mut ws: Stream, mut stop_rx: watch::Receiver<bool>) {
    {
        let events = ws.events();
        tokio::pin!(events);

        loop {
            tokio::select! {
                ev = events.next() => match ev {
                    Some(WsEvent::Connected) => {
                        tracing::info!("BinanceFuturesClient websocket connection opened");
                    }
                    Some(WsEvent::Message(event)) => dispatch(event),
                    Some(WsEvent::Unhandled(raw)) => {
                        tracing::info!("BinanceFuturesClient received unknown message: {}", raw);
                    }
                    Some(WsEvent::Disconnected { code, reason }) => {
                        tracing::info!(
                            "BinanceFuturesClient websocket connection closed: code={:?} reason={}",
                            code,
                            reason
                        );
                        break;
                    }
                    None => break,
                },
                _ = stop_rx.changed() => break,
            }
        }
    }

    let _ = ws.disconnect().await;
}

fn dispatch(event: StreamEvent) {
    match event {
        StreamEvent::BookTicker(e) => on_book_ticker(e),
        StreamEvent::AggTrade(e) => on_agg_trade(e),
        StreamEvent::MarkPrice(e) => on_mark_price(e),
        StreamEvent::AccountUpdate(e) => on_account_update(e),
    }
}

// The handlers keep no state — they observe the feed and log it.

fn on_book_ticker(event: BookTickerEvent) {
    tracing::debug!(
        "bookTicker {} bid {}@{} ask {}@{}",
        event.symbol,
        event.bid_qty,
        event.bid_price,
        event.ask_qty,
        event.ask_price
    );
}

fn on_agg_trade(event: AggTradeEvent) {
    tracing::debug!("aggTrade {} {} @ {}", event.symbol, event.quantity, event.price);
}

fn on_mark_price(event: MarkPriceEvent) {
    tracing::debug!("markPrice {} {} funding {}", event.symbol, event.mark_price, event.funding_rate);
}

fn on_account_update(event: serde_json::Value) {
    tracing::debug!("account update: {}", event);
}
