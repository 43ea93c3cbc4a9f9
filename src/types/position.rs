use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Net position per (account, security). Shares are signed: positive = long,
/// negative = short. `key` is `account + "-" + securityId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub key: String,
    pub account: String,
    pub security_id: String,
    pub total_shares: i64,
    pub last_updated: DateTime<Utc>,
}
