use serde::{Deserialize, Serialize};

/// One execution report from the upstream trade feed. Quantity is signed:
/// positive = buy, negative = sell. `price` and the identifier aliases are
/// carried through untouched; aggregation keys on account + security only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub trade_id: String,
    pub account: String,
    pub security_id: String,
    pub qty: i64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cusip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sedol: Option<String>,
}
