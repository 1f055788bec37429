use crate::blockchain::models::{parse_quantity, RpcBlock, RpcReceipt};
use crate::cache::{self, LatestBlockCache, TipCache};
use crate::config::Config;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The node surface the crawler is written against. `RpcClient` is the real
/// implementation; tests drive the pipeline with a scripted one.
///
/// A block or receipt the node does not know yet is `Ok(None)`, never an
/// error.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn fetch_block(&self, number: u64) -> Result<Option<RpcBlock>, ClientError>;
    async fn fetch_latest_block(&self) -> Result<Option<RpcBlock>, ClientError>;
    async fn fetch_tx_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ClientError>;
    async fn block_number(&self) -> Result<u64, ClientError>;
    async fn balance_of(&self, address: &str) -> Result<String, ClientError>;
}

pub struct RpcClient {
    http: reqwest::Client,
    rpc_url: String,
    retry_max: usize,
    tip_cache: TipCache,
    latest_block_cache: LatestBlockCache,
}

impl RpcClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()?;

        info!("Initializing RPC client for endpoint {}", config.rpc_url);

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            retry_max: config.rpc_retry_max,
            tip_cache: cache::init_tip_cache(config),
            latest_block_cache: cache::init_latest_block_cache(config),
        })
    }

    /// Single JSON-RPC 2.0 round trip. Transport failures are retried with
    /// exponential backoff; an error object from the node is surfaced as-is,
    /// and a null `result` comes back as `None`.
    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ClientError> {
        let body = json!({
            "method": method,
            "params": params,
            "id": 1,
            "jsonrpc": "2.0",
        });

        let request = || async {
            let response = self
                .http
                .post(&self.rpc_url)
                .json(&body)
                .send()
                .await?
                .error_for_status()?;

            response
                .json::<RpcEnvelope<T>>()
                .await
                .map_err(ClientError::from)
        };

        let envelope = request
            .retry(ExponentialBuilder::default().with_max_times(self.retry_max))
            .when(|err| matches!(err, ClientError::Network(_)))
            .await?;

        if let Some(error) = envelope.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(envelope.result)
    }
}

#[async_trait]
impl NodeApi for RpcClient {
    async fn fetch_block(&self, number: u64) -> Result<Option<RpcBlock>, ClientError> {
        self.send("eth_getBlockByNumber", json!([format!("{number:#x}"), true]))
            .await
    }

    async fn fetch_latest_block(&self) -> Result<Option<RpcBlock>, ClientError> {
        if let Some(block) = self.latest_block_cache.get(&()).await {
            debug!("serving latest block from cache");
            return Ok(Some(block));
        }

        let block: Option<RpcBlock> =
            self.send("eth_getBlockByNumber", json!(["latest", true])).await?;

        if let Some(block) = &block {
            self.latest_block_cache.insert((), block.clone()).await;
            // The latest block also tells us the tip height.
            if let Some(height) = parse_quantity(&block.number) {
                self.tip_cache.insert((), height).await;
            }
        }

        Ok(block)
    }

    async fn fetch_tx_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ClientError> {
        self.send("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        if let Some(height) = self.tip_cache.get(&()).await {
            debug!("serving tip height {} from cache", height);
            return Ok(height);
        }

        let raw: String = self
            .send("eth_blockNumber", json!([]))
            .await?
            .ok_or_else(|| ClientError::Malformed("eth_blockNumber returned no result".into()))?;

        let height = parse_quantity(&raw).ok_or_else(|| {
            ClientError::Malformed(format!("eth_blockNumber returned {raw:?}"))
        })?;

        self.tip_cache.insert((), height).await;

        Ok(height)
    }

    async fn balance_of(&self, address: &str) -> Result<String, ClientError> {
        self.send("eth_getBalance", json!([address, "latest"]))
            .await?
            .ok_or_else(|| ClientError::Malformed("eth_getBalance returned no result".into()))
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}
