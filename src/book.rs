//! Position aggregation: apply trades, materialize ordered snapshots.
//! Testable without a live trade stream.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc, watch};
use tracing::warn;

use crate::types::position::Position;
use crate::types::trade::TradeEvent;

// Type alias for shared book state
pub type SharedBook = Arc<RwLock<PositionBook>>;

/// Full materialization of the book at one point in time.
pub type Snapshot = Vec<Position>;

/// Ordering policy for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotOrder {
    /// Positions in the order their keys were first created.
    Insertion,
    /// Most recently touched first; equal timestamps keep creation order.
    Recency,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradeError {
    #[error("trade '{0}' has an empty account")]
    EmptyAccount(String),
    #[error("trade '{0}' has an empty security id")]
    EmptySecurityId(String),
}

/// Key for one (account, security) pair.
pub fn position_key(account: &str, security_id: &str) -> String {
    format!("{}-{}", account, security_id)
}

/// The book of net positions. Positions are created lazily on first trade,
/// accumulated in place afterwards, and never removed while the book lives.
pub struct PositionBook {
    positions: HashMap<String, Position>,
    // Keys in creation order, one entry per position.
    insertion: Vec<String>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            insertion: Vec::new(),
        }
    }

    /// Apply one trade: update or create the position for its key, stamping
    /// `last_updated` with the current wall clock.
    pub fn apply(&mut self, trade: &TradeEvent) -> Result<(), TradeError> {
        self.apply_at(trade, Utc::now())
    }

    /// Apply with an explicit timestamp. Rejects trades with an empty account
    /// or security id and leaves the book untouched. A zero-qty trade still
    /// moves `last_updated`.
    pub fn apply_at(&mut self, trade: &TradeEvent, at: DateTime<Utc>) -> Result<(), TradeError> {
        if trade.account.is_empty() {
            return Err(TradeError::EmptyAccount(trade.trade_id.clone()));
        }
        if trade.security_id.is_empty() {
            return Err(TradeError::EmptySecurityId(trade.trade_id.clone()));
        }

        let key = position_key(&trade.account, &trade.security_id);
        match self.positions.get_mut(&key) {
            Some(position) => {
                position.total_shares += trade.qty;
                position.last_updated = at;
            }
            None => {
                self.positions.insert(
                    key.clone(),
                    Position {
                        key: key.clone(),
                        account: trade.account.clone(),
                        security_id: trade.security_id.clone(),
                        total_shares: trade.qty,
                        last_updated: at,
                    },
                );
                self.insertion.push(key);
            }
        }
        Ok(())
    }

    /// Every tracked position in the requested order. Reflects all trades
    /// applied before the call and none after.
    pub fn snapshot(&self, order: SnapshotOrder) -> Snapshot {
        let mut positions: Snapshot = self
            .insertion
            .iter()
            .filter_map(|key| self.positions.get(key))
            .cloned()
            .collect();
        if order == SnapshotOrder::Recency {
            // Stable sort: creation order survives for equal timestamps.
            positions.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        }
        positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for PositionBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain the event channel: apply each trade and republish the snapshot after
/// every update. Rejected trades are logged and dropped without republishing.
/// Runs until the sending side closes.
pub async fn run_ingest(
    book: SharedBook,
    mut events: mpsc::Receiver<TradeEvent>,
    published: watch::Sender<Snapshot>,
    order: SnapshotOrder,
) {
    while let Some(trade) = events.recv().await {
        let snapshot = {
            let mut guard = book.write().await;
            if let Err(e) = guard.apply(&trade) {
                warn!("Rejected trade: {}", e);
                continue;
            }
            guard.snapshot(order)
        };
        // Send fails only when no receiver is left; ingestion keeps going.
        let _ = published.send(snapshot);
    }
}
