use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::api::ws::ws_handler;
use crate::book::{SharedBook, Snapshot, SnapshotOrder};
use crate::types::position::Position;

#[derive(Clone)]
pub struct AppState {
    pub book: SharedBook,
    pub snapshots: watch::Receiver<Snapshot>,
    pub snapshot_order: SnapshotOrder,
}

/// Messages pushed to WebSocket subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WsMessage {
    Snapshot { positions: Vec<Position> },
}

#[derive(Debug, Deserialize)]
struct PositionsQuery {
    order: Option<SnapshotOrder>,
}

async fn health() -> &'static str {
    "healthy"
}

/// Current snapshot; `?order=insertion|recency` overrides the configured
/// ordering for this request.
async fn get_positions(
    State(state): State<AppState>,
    Query(query): Query<PositionsQuery>,
) -> Json<Snapshot> {
    let order = query.order.unwrap_or(state.snapshot_order);
    let guard = state.book.read().await;
    Json(guard.snapshot(order))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/positions", get(get_positions))
        .route("/ws", get(ws_handler))
        .with_state(state)
}
