use crate::blockchain::client::{ClientError, NodeApi};
use crate::blockchain::models::{normalize_receipt, parse_quantity, RpcBlock, RpcTransaction};
use crate::db::{checkpoint, transaction};
use futures::future::join_all;
use sqlx::SqlitePool;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Index one block: fetch every receipt concurrently, normalize, attach
/// input/value from the originating transactions, order, persist, and only
/// then advance the checkpoint. Any client or persistence failure aborts the
/// whole block with the checkpoint untouched, so a later tick retries it.
///
/// Returns the number of records persisted.
pub async fn process_block(
    node: &dyn NodeApi,
    pool: &SqlitePool,
    chain_id: i64,
    block: &RpcBlock,
) -> Result<usize, ProcessError> {
    let block_number = parse_quantity(&block.number).ok_or_else(|| {
        ClientError::Malformed(format!("block number {:?} is not a hex quantity", block.number))
    })? as i64;

    debug!(
        "processing block {} with {} transactions",
        block_number,
        block.transactions.len()
    );

    let receipt_results = join_all(
        block
            .transactions
            .iter()
            .map(|tx| node.fetch_tx_receipt(&tx.hash)),
    )
    .await;

    let by_hash: HashMap<&str, &RpcTransaction> = block
        .transactions
        .iter()
        .map(|tx| (tx.hash.as_str(), tx))
        .collect();

    let mut records = Vec::with_capacity(block.transactions.len());

    for (tx, result) in block.transactions.iter().zip(receipt_results) {
        let Some(receipt) = result? else {
            warn!(
                "no receipt for transaction {} in block {}",
                tx.hash, block_number
            );
            continue;
        };

        let matching = by_hash.get(receipt.transaction_hash.as_str()).copied();
        if matching.is_none() {
            warn!(
                "receipt {} has no matching transaction in block {}",
                receipt.transaction_hash, block_number
            );
        }

        records.push(normalize_receipt(&receipt, matching));
    }

    records.sort_by_key(|record| (record.block_number, record.transaction_index));

    if !records.is_empty() {
        transaction::upsert_transactions(pool, &records).await?;
        debug!("persisted {} records for block {}", records.len(), block_number);
    }

    checkpoint::advance_checkpoint(pool, chain_id, block_number).await?;

    Ok(records.len())
}
