//! Integration tests for the BitMEX realtime transport.
//!
//! These tests connect to the public testnet endpoints and exercise the
//! connect → subscribe → receive → disconnect lifecycle.
//!
//! All tests are `#[ignore]` because they require network access.
//!
//! Run with:
//! ```bash
//! cargo test --test bitmex_realtime_integration -- --ignored
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use tradewire::bitmex::msg::{Channel, ControlOut, StreamMessage};
use tradewire::http::HttpClient;
use tradewire::ws::{WsClient, WsConfig, WsEvent};

const WS_URL: &str = "wss://ws.testnet.bitmex.com/realtime";
const API_URL: &str = "https://testnet.bitmex.com/api/v1";
const TEST_TIMEOUT: Duration = Duration::from_secs(15);

type Stream = WsClient<StreamMessage, ControlOut>;

/// Connect and wait for the `Connected` event.
async fn connected_client() -> Stream {
    let mut client = Stream::new(WsConfig::new(WS_URL));
    client.connect().expect("connect should succeed");

    {
        let events = client.events();
        tokio::pin!(events);

        let first = timeout(TEST_TIMEOUT, events.next())
            .await
            .expect("timed out waiting for Connected")
            .expect("event stream ended");
        assert!(
            matches!(first, WsEvent::Connected),
            "first event should be Connected, got: {first:?}"
        );
    }

    client
}

#[tokio::test]
#[ignore]
async fn test_connect_and_disconnect() {
    let mut client = connected_client().await;
    assert!(client.is_connected());
    client.disconnect().await.expect("disconnect should succeed");
    assert!(!client.is_connected());
}

#[tokio::test]
#[ignore]
async fn test_subscribe_receives_instrument_data() {
    let mut client = connected_client().await;
    client
        .send(ControlOut::subscribe(Channel::Instrument))
        .expect("send should succeed");

    {
        let events = client.events();
        tokio::pin!(events);

        // The welcome banner and subscribe ack surface as Unhandled; wait
        // for the first parsed table message.
        let message = timeout(TEST_TIMEOUT, async {
            while let Some(ev) = events.next().await {
                if let WsEvent::Message(msg) = ev {
                    return msg;
                }
            }
            panic!("event stream ended without a table message");
        })
        .await
        .expect("timed out waiting for instrument data");

        assert!(matches!(message, StreamMessage::Instrument(_)));
    }

    client.disconnect().await.ok();
}

#[tokio::test]
#[ignore]
async fn test_rest_active_instruments_decode() {
    let http = HttpClient::new(API_URL);
    let rows: Vec<serde_json::Value> = http
        .get("instrument/active", &Vec::new())
        .await
        .expect("instrument list should decode");
    assert!(!rows.is_empty());
    assert!(rows[0].get("symbol").is_some());
}
