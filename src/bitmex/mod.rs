//! BitMEX client — REST + realtime.
//!
//! Construction fetches the active contracts and margin balances (two
//! blocking REST round-trips), then opens the realtime socket on a
//! background task. The socket is never reconnected: once it drops, the
//! client stays disconnected until the process rebuilds it.

pub mod msg;
pub mod wire;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::auth::sign::{encode_form, now_ms, signed_form, Params};
use crate::auth::Credentials;
use crate::domain::{Balance, Candle, Contract, OrderStatus};
use crate::error::{ConnectError, HttpError, WsError};
use crate::http::{Headers, HttpClient};
use crate::network;
use crate::shared::{BinSize, Network, Side};
use crate::ws::{WsClient, WsConfig, WsEvent, WsSender};

use msg::{BookLevel, Channel, ControlOut, StreamMessage, TableUpdate, TradeRow};
use wire::{BucketedBinWire, InstrumentWire, MarginWire, OrderWire};

/// Fixed page size for bucketed trade history. The endpoint returns at most
/// one page: callers needing more than 5000 bars get a truncated result.
pub const MAX_BUCKET_COUNT: u32 = 5000;

type Stream = WsClient<StreamMessage, ControlOut>;

// ─── Client ──────────────────────────────────────────────────────────────────

/// BitMEX REST + realtime client.
pub struct BitmexClient {
    credentials: Credentials,
    http: HttpClient,
    contracts: Vec<Contract>,
    balances: Vec<Balance>,
    stream: Option<StreamTask>,
}

struct StreamTask {
    sender: WsSender<ControlOut>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BitmexClient {
    /// Build a client against the chosen environment.
    ///
    /// Blocks on two REST round-trips (contracts, balances) before opening
    /// the realtime socket, exactly like process startup in the original
    /// deployment.
    pub async fn connect(credentials: Credentials, net: Network) -> Result<Self, ConnectError> {
        let (api_url, ws_url) = match net {
            Network::Production => (network::BITMEX_API_URL, network::BITMEX_WS_URL),
            Network::Testnet => (network::BITMEX_TESTNET_API_URL, network::BITMEX_TESTNET_WS_URL),
        };

        let mut client = Self {
            credentials,
            http: HttpClient::new(api_url),
            contracts: Vec::new(),
            balances: Vec::new(),
            stream: None,
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

        tracing::info!("BitmexClient initialized against {} ({} contracts)", net, client.contracts.len());
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

    /// Symbols of every active instrument, in the order the exchange
    /// returned them. A row missing the symbol field fails the whole call.
    pub async fn active_symbols(&self) -> Result<Vec<String>, HttpError> {
        let rows: Vec<InstrumentWire> = self.http.get("instrument/active", &Vec::new()).await?;
        Ok(rows.into_iter().map(|r| r.symbol).collect())
    }

    /// Full contract descriptors for every active instrument.
    pub async fn instruments(&self) -> Result<Vec<Contract>, HttpError> {
        let rows: Vec<InstrumentWire> = self.http.get("instrument/active", &Vec::new()).await?;
        Ok(rows.into_iter().map(Contract::from).collect())
    }

    // ── REST: margin ─────────────────────────────────────────────────────

    /// Margin snapshot per currency.
    pub async fn margin_balances(&self) -> Result<Vec<Balance>, HttpError> {
        let rows = self.fetch_margins().await?;
        Ok(rows.iter().map(Balance::from).collect())
    }

    /// Currency codes carried by the margin response.
    pub async fn balance_currencies(&self) -> Result<Vec<String>, HttpError> {
        let rows = self.fetch_margins().await?;
        Ok(rows.into_iter().map(|r| r.currency).collect())
    }

    async fn fetch_margins(&self) -> Result<Vec<MarginWire>, HttpError> {
        self.private_get("user/margin", vec![param("currency", "all")])
            .await
    }

    // ── REST: candles ────────────────────────────────────────────────────

    /// Historical OHLCV buckets for one symbol.
    ///
    /// Single page of at most [`MAX_BUCKET_COUNT`] bars — there is no
    /// pagination; longer ranges come back truncated.
    pub async fn historical_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, HttpError> {
        let params = bucketed_params(symbol, bin_size, start, end);
        let path_query = format!("trade/bucketed?{}", encode_form(&params));
        let rows: Vec<BucketedBinWire> = self.http.get(&path_query, &Vec::new()).await?;
        Ok(rows.into_iter().map(Candle::from).collect())
    }

    // ── REST: orders ─────────────────────────────────────────────────────

    /// Place a limit order. `ordType` is always the literal `"Limit"`.
    ///
    /// There is no client-order-id, so a retry after a network failure can
    /// duplicate the order — a documented gap, not a feature.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        price: f64,
        quantity: f64,
    ) -> Result<OrderStatus, HttpError> {
        let form = order_form(symbol, side, price, quantity);
        let row: OrderWire = self.private_post_form("order", form).await?;
        Ok(OrderStatus::from(row))
    }

    /// Cancel an order by exchange order id.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Vec<OrderStatus>, HttpError> {
        let rows: Vec<OrderWire> = self
            .private_delete_form("order", vec![param("orderID", order_id)])
            .await?;
        Ok(rows.into_iter().map(OrderStatus::from).collect())
    }

    /// Look up an order by exchange order id.
    pub async fn order_status(&self, order_id: &str) -> Result<OrderStatus, HttpError> {
        let rows: Vec<OrderWire> = self
            .private_get("order", vec![param("orderID", order_id)])
            .await?;
        rows.into_iter()
            .find(|r| r.order_id == order_id)
            .map(OrderStatus::from)
            .ok_or_else(|| HttpError::NotFound(format!("order {}", order_id)))
    }

    // ── Realtime ─────────────────────────────────────────────────────────

    /// Fire-and-forget channel subscription. No acknowledgment is tracked
    /// and there is no resubscription, since reconnection does not exist.
    pub fn subscribe(&self, channel: Channel) -> Result<(), WsError> {
        match &self.stream {
            Some(task) => task.sender.send(ControlOut::subscribe(channel)),
            None => Err(WsError::NotConnected),
        }
    }

    /// Explicit shutdown: signals the stream task to stop and joins it.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.stream.take() {
            let _ = task.stop_tx.send(true);
            let _ = timeout(std::time::Duration::from_secs(10), task.handle).await;
        }
        tracing::info!("BitmexClient shut down");
    }

    // ── Signed request plumbing ──────────────────────────────────────────

    fn auth_headers(&self, signature: String) -> Headers {
        vec![
            ("api-key", self.credentials.api_key.clone()),
            ("api-signature", signature),
        ]
    }

    async fn private_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Params,
    ) -> Result<T, HttpError> {
        let (params, signature) = signed_form(params, now_ms(), self.credentials.secret());
        let path_query = format!("{}?{}", path, encode_form(&params));
        self.http.get(&path_query, &self.auth_headers(signature)).await
    }

    async fn private_post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Params,
    ) -> Result<T, HttpError> {
        let (form, signature) = signed_form(params, now_ms(), self.credentials.secret());
        self.http
            .post_form(path, &form, &self.auth_headers(signature))
            .await
    }

    async fn private_delete_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Params,
    ) -> Result<T, HttpError> {
        let (form, signature) = signed_form(params, now_ms(), self.credentials.secret());
        self.http
            .delete_form(path, &form, &self.auth_headers(signature))
            .await
    }
}

// ─── Request builders ────────────────────────────────────────────────────────

fn param(k: &str, v: impl ToString) -> (String, String) {
    (k.to_string(), v.to_string())
}

fn bucketed_params(symbol: &str, bin_size: BinSize, start: DateTime<Utc>, end: DateTime<Utc>) -> Params {
    vec![
        param("symbol", symbol),
        param("binSize", bin_size.as_str()),
        param("count", MAX_BUCKET_COUNT),
        param("startTime", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        param("endTime", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
    ]
}

fn order_form(symbol: &str, side: Side, price: f64, quantity: f64) -> Params {
    vec![
        param("symbol", symbol),
        param("side", side.as_bitmex()),
        param("price", price),
        param("orderQty", quantity),
        param("ordType", "Limit"),
    ]
}

// ─── Stream task ─────────────────────────────────────────────────────────────

/// Receive loop: routes table messages to the four handlers until the
/// socket drops or the stop signal fires. No reconnection on exit.
async fn run_stream(mut ws: Stream, mut stop_rx: watch::Receiver<bool>) {
    {
        let events = ws.events();
        tokio::pin!(events);

        loop {
            tokio::select! {
                ev = events.next() => match ev {
                    Some(WsEvent::Connected) => {
                        tracing::info!("BitmexClient websocket connection opened");
                    }
                    Some(WsEvent::Message(msg)) => dispatch(msg),
                    Some(WsEvent::Unhandled(raw)) => {
                        tracing::info!("BitmexClient received unknown message: {}", raw);
                    }
                    Some(WsEvent::Disconnected { code, reason }) => {
                        tracing::info!(
                            "BitmexClient websocket connection closed: code={:?} reason={}",
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

fn dispatch(msg: StreamMessage) {
    match msg {
        StreamMessage::OrderBook(update) => on_order_book_update(update),
        StreamMessage::Trade(update) => on_trade_update(update),
        StreamMessage::Instrument(update) => on_instrument_update(update),
        StreamMessage::Margin(update) => on_margin_update(update),
    }
}

// The four handlers keep no state — they observe the feed and log it.

fn on_order_book_update(update: TableUpdate<BookLevel>) {
    tracing::debug!("orderBookL2 {}: {} level(s)", update.action, update.data.len());
}

fn on_trade_update(update: TableUpdate<TradeRow>) {
    for trade in &update.data {
        tracing::debug!("trade {} {} {} @ {}", trade.symbol, trade.side, trade.size, trade.price);
    }
}

fn on_instrument_update(update: TableUpdate<serde_json::Value>) {
    tracing::debug!("instrument {}: {} row(s)", update.action, update.data.len());
}

fn on_margin_update(update: TableUpdate<serde_json::Value>) {
    tracing::debug!("margin {}: {} row(s)", update.action, update.data.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bucketed_params_never_exceed_page_limit() {
        let start = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 5, 3, 0, 0, 0).unwrap();
        let params = bucketed_params("XBTUSD", BinSize::Minute1, start, end);

        let count: u32 = params
            .iter()
            .find(|(k, _)| k == "count")
            .map(|(_, v)| v.parse().unwrap())
            .expect("count param present");
        assert!(count <= 5000);
    }

    #[test]
    fn test_bucketed_params_carry_iso_bounds() {
        let start = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 5, 3, 0, 0, 0).unwrap();
        let params = bucketed_params("XBTUSD", BinSize::Hour1, start, end);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("binSize"), "1h");
        assert_eq!(get("startTime"), "2021-05-01T00:00:00.000Z");
    }

    #[test]
    fn test_order_form_always_limit() {
        for side in [Side::Buy, Side::Sell] {
            let form = order_form("XBTUSD", side, 57000.5, 100.0);
            let ord_type = form
                .iter()
                .find(|(k, _)| k == "ordType")
                .map(|(_, v)| v.as_str())
                .unwrap();
            assert_eq!(ord_type, "Limit");
        }
    }

    #[test]
    fn test_order_form_field_order_is_stable() {
        // The signature covers the encoded form, so field order matters.
        let form = order_form("XBTUSD", Side::Buy, 57000.0, 100.0);
        let keys: Vec<&str> = form.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["symbol", "side", "price", "orderQty", "ordType"]);
    }
}
