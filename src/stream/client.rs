//! SSE client for the upstream trade feed with auto-reconnection.

use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::stream::sse::EventParser;
use crate::types::trade::TradeEvent;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status: {0}")]
    Status(StatusCode),
    #[error("Stream ended by server")]
    Closed,
}

/// Trade feed configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Feed URL
    pub url: String,
    /// Initial reconnection delay in milliseconds
    pub initial_reconnect_delay: u64,
    /// Maximum reconnection delay in milliseconds
    pub max_reconnect_delay: u64,
    /// Maximum reconnection attempts (0 = infinite)
    pub max_reconnect_attempts: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/api/stream".to_string(),
            initial_reconnect_delay: 1000,
            max_reconnect_delay: 30000,
            max_reconnect_attempts: 0, // Infinite retries
        }
    }
}

/// Spawn the feed task and return the channel of parsed trade events.
/// Malformed payloads are dropped here and never reach the consumer; closing
/// the receiver shuts the task down.
pub fn subscribe(config: StreamConfig) -> mpsc::Receiver<TradeEvent> {
    let (tx, rx) = mpsc::channel(1024);
    tokio::spawn(connection_task(config, tx));
    rx
}

/// Main connection task with auto-reconnection.
async fn connection_task(config: StreamConfig, tx: mpsc::Sender<TradeEvent>) {
    let client = reqwest::Client::new();
    let mut attempts: u32 = 0;
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(config.initial_reconnect_delay),
        max_interval: Duration::from_millis(config.max_reconnect_delay),
        max_elapsed_time: None,
        ..Default::default()
    };

    loop {
        match connect_and_read(&client, &config, &tx).await {
            Ok(()) => {
                info!("Trade stream closed");
                return;
            }
            Err(e) => {
                error!("Trade stream error: {}", e);

                if config.max_reconnect_attempts > 0 && attempts >= config.max_reconnect_attempts {
                    error!("Giving up on trade stream after {} attempts", attempts);
                    return;
                }
                attempts += 1;

                if let Some(delay) = backoff.next_backoff() {
                    warn!("Reconnecting in {:?} (attempt {})", delay, attempts);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Connect and read one feed session, forwarding well-formed `trade` events.
async fn connect_and_read(
    client: &reqwest::Client,
    config: &StreamConfig,
    tx: &mpsc::Sender<TradeEvent>,
) -> Result<(), StreamError> {
    info!("Connecting to trade stream: {}", config.url);

    let response = client
        .get(&config.url)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(StreamError::Status(response.status()));
    }
    info!("Trade stream connected");

    let mut parser = EventParser::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for frame in parser.push(&chunk) {
            if frame.event != "trade" {
                debug!("Ignoring '{}' event", frame.event);
                continue;
            }
            match serde_json::from_str::<TradeEvent>(&frame.data) {
                Ok(trade) => {
                    if tx.send(trade).await.is_err() {
                        info!("Trade consumer dropped, closing stream");
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!("Dropping bad trade payload: {}", e);
                }
            }
        }
    }

    // Transport closed from the server side; the caller decides on reconnect.
    Err(StreamError::Closed)
}
