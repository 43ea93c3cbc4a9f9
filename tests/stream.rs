//! Ingestion adapter integration tests: SSE framing, payload filtering,
//! reconnect give-up, wire shape of trade events.

use std::time::Duration;

use axum::{Router, http::header, routing::get};
use position_book::stream::{EventParser, StreamConfig, subscribe};
use position_book::types::trade::TradeEvent;
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// --- SSE frame parser ---

#[test]
fn parses_single_frame() {
    let mut parser = EventParser::new();
    let events = parser.push(b"event: trade\ndata: {\"qty\":1}\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "trade");
    assert_eq!(events[0].data, "{\"qty\":1}");
}

#[test]
fn event_name_defaults_to_message() {
    let mut parser = EventParser::new();
    let events = parser.push(b"data: hello\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "message");
    assert_eq!(events[0].data, "hello");
}

#[test]
fn joins_multi_line_data() {
    let mut parser = EventParser::new();
    let events = parser.push(b"data: first\ndata: second\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "first\nsecond");
}

#[test]
fn ignores_comments_id_and_retry() {
    let mut parser = EventParser::new();
    let events = parser.push(b": keep-alive\nid: 7\nretry: 100\ndata: x\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "message");
    assert_eq!(events[0].data, "x");
}

#[test]
fn frame_without_data_is_not_dispatched() {
    let mut parser = EventParser::new();
    let events = parser.push(b"event: trade\n\n");
    assert!(events.is_empty());
    // The dangling event name must not leak into the next frame.
    let events = parser.push(b"data: x\n\n");
    assert_eq!(events[0].event, "message");
}

#[test]
fn handles_chunks_split_mid_line() {
    let mut parser = EventParser::new();
    assert!(parser.push(b"eve").is_empty());
    assert!(parser.push(b"nt: trade\ndata: pay").is_empty());
    let events = parser.push(b"load\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "trade");
    assert_eq!(events[0].data, "payload");
}

#[test]
fn handles_crlf_line_endings() {
    let mut parser = EventParser::new();
    let events = parser.push(b"event: trade\r\ndata: x\r\n\r\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "trade");
    assert_eq!(events[0].data, "x");
}

#[test]
fn dispatches_consecutive_frames() {
    let mut parser = EventParser::new();
    let events = parser.push(b"data: one\n\ndata: two\n\n");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].data, "one");
    assert_eq!(events[1].data, "two");
}

// --- trade event wire shape ---

#[test]
fn deserializes_feed_payload_with_aliases() {
    let json = r#"{
        "tradeId": "T-1001",
        "account": "ACC1",
        "securityId": "SEC1",
        "idSource": "RIC",
        "qty": -25,
        "price": 101.5,
        "ric": "VOD.L",
        "ticker": "VOD",
        "isin": "GB00BH4HKS39"
    }"#;
    let trade: TradeEvent = serde_json::from_str(json).unwrap();
    assert_eq!(trade.trade_id, "T-1001");
    assert_eq!(trade.account, "ACC1");
    assert_eq!(trade.security_id, "SEC1");
    assert_eq!(trade.qty, -25);
    assert_eq!(trade.ric.as_deref(), Some("VOD.L"));
    assert_eq!(trade.cusip, None);
}

// --- adapter against an in-process feed ---

const FEED_BODY: &str = "event: trade\n\
data: {\"tradeId\":\"t1\",\"account\":\"ACC1\",\"securityId\":\"SEC1\",\"qty\":10,\"price\":101.5}\n\
\n\
event: trade\n\
data: not-json\n\
\n\
event: heartbeat\n\
data: {}\n\
\n\
event: trade\n\
data: {\"tradeId\":\"t2\",\"account\":\"ACC2\",\"securityId\":\"SEC2\",\"qty\":-4,\"price\":99.0}\n\
\n";

/// Spawn a feed server on a random port and return the stream URL.
async fn spawn_feed(body: &'static str) -> String {
    let app = Router::new().route(
        "/api/stream",
        get(move || async move { ([(header::CONTENT_TYPE, "text/event-stream")], body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/stream", addr)
}

#[tokio::test]
async fn forwards_only_well_formed_trade_events_in_order() {
    let url = spawn_feed(FEED_BODY).await;
    let mut events = subscribe(StreamConfig {
        url,
        initial_reconnect_delay: 10,
        max_reconnect_delay: 20,
        max_reconnect_attempts: 1,
    });

    let first = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert_eq!(first.trade_id, "t1");
    assert_eq!(first.account, "ACC1");
    assert_eq!(first.qty, 10);

    // The malformed payload and the heartbeat never reach the channel.
    let second = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert_eq!(second.trade_id, "t2");
    assert_eq!(second.qty, -4);
}

#[tokio::test]
async fn gives_up_after_configured_reconnect_attempts() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut events = subscribe(StreamConfig {
        url: format!("http://{}/api/stream", addr),
        initial_reconnect_delay: 10,
        max_reconnect_delay: 20,
        max_reconnect_attempts: 2,
    });

    // Task exhausts its attempts and closes the channel.
    let closed = timeout(RECV_TIMEOUT, events.recv()).await.unwrap();
    assert!(closed.is_none());
}
