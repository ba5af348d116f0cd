//! Entry point: wires configuration, logging, and the enabled exchange
//! clients, then parks until Ctrl-C.
//!
//! The original deployment opened an empty GUI window here; the window is
//! an external collaborator this core never populates, so the process runs
//! headless instead.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use tradewire::binance::msg::StreamKind;
use tradewire::bitmex::msg::Channel;
use tradewire::prelude::*;

/// Console + persistent `info.log` file, filtered by `RUST_LOG` (default
/// `info`). Subscriber lifecycle is owned here — the library only emits.
fn init_tracing() -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("info.log")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to open log file: {}", e);
        std::process::exit(1);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), ConnectError> {
    let net = config.network();
    tracing::info!("Starting against {} endpoints", net);

    let mut bitmex = None;
    if let Some(credentials) = config.bitmex.clone() {
        let client = BitmexClient::connect(credentials, net).await?;
        client.subscribe(Channel::Instrument)?;
        client.subscribe(Channel::Trade)?;
        bitmex = Some(client);
    }

    let mut binance = None;
    if let Some(credentials) = config.binance.clone() {
        let client = BinanceFuturesClient::connect(credentials, net).await?;
        client.subscribe("BTCUSDT", StreamKind::BookTicker)?;
        binance = Some(client);
    }

    if bitmex.is_none() && binance.is_none() {
        tracing::warn!("No exchange enabled — idling until Ctrl-C");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }

    tracing::info!("Shutting down");
    if let Some(client) = bitmex {
        client.shutdown().await;
    }
    if let Some(client) = binance {
        client.shutdown().await;
    }

    Ok(())
}
