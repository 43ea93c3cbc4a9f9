use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tokio::select;

use crate::api::routes::{AppState, WsMessage};

// WebSocket handler - accepts upgrade and handles the connection
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// Push the full snapshot to one client: once on subscribe, then after every
// applied trade. The watch channel holds only the latest snapshot, so a slow
// client skips intermediates instead of backing up ingestion.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut snapshots = state.snapshots.clone();

    // Current snapshot first, so a new subscriber renders without waiting
    // for the next trade.
    let msg = WsMessage::Snapshot {
        positions: snapshots.borrow_and_update().clone(),
    };
    if let Ok(json) = serde_json::to_string(&msg) {
        if socket.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    loop {
        select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Publisher gone, the service is shutting down
                    return;
                }
                let msg = WsMessage::Snapshot {
                    positions: snapshots.borrow_and_update().clone(),
                };
                if let Ok(json) = serde_json::to_string(&msg) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_))) => {
                        // Client closed connection
                        return;
                    }
                    Some(Err(_)) | None => {
                        // Client disconnected or error
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary, ping, pong)
                    }
                }
            }
        }
    }
}
