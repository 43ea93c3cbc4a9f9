//! Trade feed ingestion: SSE client, frame parsing, reconnect handling.

mod client;
mod sse;

pub use client::{StreamConfig, StreamError, subscribe};
pub use sse::{EventParser, SseEvent};
