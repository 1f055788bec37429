// Canonical persisted records. The wire-level RPC shapes live in
// blockchain::models; these are what the store holds and what the query
// surface serves.

use serde::{Deserialize, Serialize};

/// One indexed transaction, keyed by its hash. `event_emitters` holds the
/// checksummed address of every log-emitting contract, in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: String,
    pub block_number: i64,
    pub transaction_index: i64,
    pub from: String,
    pub to: String,
    pub contract_address: String,
    pub event_emitters: Vec<String>,
    pub status: i64,
    pub input: String,
    pub value: String,
}

/// Last fully-indexed block for one chain. A single row per chain id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub chain_id: i64,
    pub number: i64,
}
