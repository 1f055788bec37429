use crate::models::TransactionRecord;
use alloy_primitives::Address;
use serde::Deserialize;
use tracing::warn;

// Wire shapes as returned by the node. Quantities arrive as 0x-prefixed hex
// strings and addresses arrive unchecksummed; everything is normalized on the
// way into a TransactionRecord.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: String,
    pub hash: String,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: String,
    pub block_number: Option<String>,
    pub transaction_index: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub contract_address: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Option<String>,
}

/// Parse a 0x-prefixed hex quantity. Returns None for anything malformed.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16).ok()
}

/// EIP-55 checksummed form of a raw address string, or None if it does not
/// parse as an address.
pub fn checksummed(raw: &str) -> Option<String> {
    raw.parse::<Address>().ok().map(|addr| addr.to_checksum(None))
}

fn checksummed_or_empty(raw: Option<&str>) -> String {
    raw.and_then(checksummed).unwrap_or_default()
}

/// Normalize a raw receipt into the canonical record.
///
/// Address fields that are absent or malformed degrade to an empty string; a
/// malformed log address is dropped from `event_emitters` without failing the
/// receipt. `input` and `value` come from the originating transaction when
/// one is supplied, and stay empty otherwise.
pub fn normalize_receipt(
    receipt: &RpcReceipt,
    transaction: Option<&RpcTransaction>,
) -> TransactionRecord {
    let quantity = |field: &Option<String>| {
        field.as_deref().and_then(parse_quantity).unwrap_or(0) as i64
    };

    let event_emitters = receipt
        .logs
        .iter()
        .filter_map(|log| {
            let raw = log.address.as_deref()?;
            let emitter = checksummed(raw);
            if emitter.is_none() {
                warn!(
                    "dropping malformed log address {:?} on receipt {}",
                    raw, receipt.transaction_hash
                );
            }
            emitter
        })
        .collect();

    TransactionRecord {
        hash: receipt.transaction_hash.clone(),
        block_number: quantity(&receipt.block_number),
        transaction_index: quantity(&receipt.transaction_index),
        from: checksummed_or_empty(receipt.from.as_deref()),
        to: checksummed_or_empty(receipt.to.as_deref()),
        contract_address: checksummed_or_empty(receipt.contract_address.as_deref()),
        event_emitters,
        status: quantity(&receipt.status),
        input: transaction.map(|tx| tx.input.clone()).unwrap_or_default(),
        value: transaction.map(|tx| tx.value.clone()).unwrap_or_default(),
    }
}
