//! Shared test fixtures: an in-memory database with the real schema and a
//! scripted node that records which blocks were fetched.

use crate::blockchain::client::{ClientError, NodeApi};
use crate::blockchain::models::{RpcBlock, RpcLog, RpcReceipt, RpcTransaction};
use crate::config::Config;
use crate::db::connection;
use crate::state::AppState;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// EIP-55 test vectors, so the expected checksummed forms are known-good.
pub const SENDER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const SENDER_CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const RECEIVER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
pub const RECEIVER_CHECKSUMMED: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const EMITTER: &str = "0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb";
pub const EMITTER_CHECKSUMMED: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
pub const EMITTER_2: &str = "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb";
pub const EMITTER_2_CHECKSUMMED: &str = "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb";

pub fn hex(n: u64) -> String {
    format!("{n:#x}")
}

pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    connection::init_schema(&pool).await.expect("schema");
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        rpc_url: "http://127.0.0.1:8545".to_string(),
        chain_id: 39916801,
        polling_interval: Duration::from_millis(10),
        polling_batch_size: 12,
        rpc_timeout_secs: 5,
        rpc_retry_max: 1,
        node_cache_ttl: Duration::from_secs(10),
    }
}

pub async fn setup_state() -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        db_pool: setup_pool().await,
    })
}

pub fn make_block(number: u64, tx_hashes: &[&str]) -> RpcBlock {
    RpcBlock {
        number: hex(number),
        hash: format!("0xblock{number}"),
        transactions: tx_hashes
            .iter()
            .map(|hash| RpcTransaction {
                hash: hash.to_string(),
                input: format!("0xcafe{number}"),
                value: "0x0".to_string(),
            })
            .collect(),
    }
}

pub fn make_receipt(
    block_number: u64,
    index: u64,
    hash: &str,
    log_addresses: &[&str],
) -> RpcReceipt {
    RpcReceipt {
        transaction_hash: hash.to_string(),
        block_number: Some(hex(block_number)),
        transaction_index: Some(hex(index)),
        from: Some(SENDER.to_string()),
        to: Some(RECEIVER.to_string()),
        contract_address: None,
        status: Some("0x1".to_string()),
        logs: log_addresses
            .iter()
            .map(|address| RpcLog {
                address: Some(address.to_string()),
            })
            .collect(),
    }
}

/// Scripted node. Blocks and receipts are seeded up front; every
/// `fetch_block` call is recorded so tests can assert the exact fetch
/// sequence, and individual receipt fetches can be told to fail.
pub struct MockNode {
    blocks: Mutex<HashMap<u64, RpcBlock>>,
    receipts: Mutex<HashMap<String, RpcReceipt>>,
    tip: Mutex<u64>,
    failing_receipts: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<u64>>,
}

impl MockNode {
    pub fn new(tip: u64) -> Self {
        Self {
            blocks: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            tip: Mutex::new(tip),
            failing_receipts: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn add_block(&self, block: RpcBlock) {
        let number = crate::blockchain::models::parse_quantity(&block.number).expect("block number");
        self.blocks.lock().unwrap().insert(number, block);
    }

    pub fn add_receipt(&self, receipt: RpcReceipt) {
        self.receipts
            .lock()
            .unwrap()
            .insert(receipt.transaction_hash.clone(), receipt);
    }

    /// Seed one block of `tx_count` transactions, each with a matching
    /// single-log receipt.
    pub fn seed_block(&self, number: u64, tx_count: usize) {
        let hashes: Vec<String> = (0..tx_count).map(|i| format!("0xb{number}t{i}")).collect();
        let refs: Vec<&str> = hashes.iter().map(String::as_str).collect();
        self.add_block(make_block(number, &refs));
        for (i, hash) in hashes.iter().enumerate() {
            self.add_receipt(make_receipt(number, i as u64, hash, &[EMITTER]));
        }
    }

    pub fn set_tip(&self, tip: u64) {
        *self.tip.lock().unwrap() = tip;
    }

    pub fn fail_receipt(&self, hash: &str) {
        self.failing_receipts.lock().unwrap().insert(hash.to_string());
    }

    pub fn fetched_blocks(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn fetch_block(&self, number: u64) -> Result<Option<RpcBlock>, ClientError> {
        self.fetched.lock().unwrap().push(number);
        Ok(self.blocks.lock().unwrap().get(&number).cloned())
    }

    async fn fetch_latest_block(&self) -> Result<Option<RpcBlock>, ClientError> {
        let tip = *self.tip.lock().unwrap();
        Ok(self.blocks.lock().unwrap().get(&tip).cloned())
    }

    async fn fetch_tx_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ClientError> {
        if self.failing_receipts.lock().unwrap().contains(hash) {
            return Err(ClientError::Malformed(format!(
                "injected failure for receipt {hash}"
            )));
        }
        Ok(self.receipts.lock().unwrap().get(hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        Ok(*self.tip.lock().unwrap())
    }

    async fn balance_of(&self, _address: &str) -> Result<String, ClientError> {
        Ok("0x0".to_string())
    }
}
