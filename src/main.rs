use std::sync::Arc;

use anyhow::Context;
use position_book::api::routes::{AppState, app_router};
use position_book::book::{self, PositionBook, SharedBook};
use position_book::config::Config;
use position_book::stream::{self, StreamConfig};
use tokio::sync::{RwLock, watch};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let shared_book: SharedBook = Arc::new(RwLock::new(PositionBook::new()));
    let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());

    let events = stream::subscribe(StreamConfig {
        url: config.stream_url.clone(),
        ..StreamConfig::default()
    });
    tokio::spawn(book::run_ingest(
        shared_book.clone(),
        events,
        snapshot_tx,
        config.snapshot_order,
    ));

    let app_state = AppState {
        book: shared_book,
        snapshots: snapshot_rx,
        snapshot_order: config.snapshot_order,
    };

    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Serving position snapshots on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
