// Configuration consumed by the crawler:
// - RPC endpoint URL and per-call timeout
// - Database connection string
// - Polling interval and catch-up batch size
// - Chain id used for checkpoint identity
// - Node cache TTL (tip height / latest block contents)

use dotenv::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rpc_url: String,
    pub chain_id: i64,
    pub polling_interval: Duration,
    pub polling_batch_size: u64,
    pub rpc_timeout_secs: u64,
    pub rpc_retry_max: usize,
    pub node_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data.db".to_string());
        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
        let chain_id = env::var("CHAIN_ID")
            .unwrap_or_else(|_| "39916801".to_string())
            .parse()
            .unwrap_or(39916801);
        let polling_interval = env::var("POLLING_INTERVAL_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(10000));
        let polling_batch_size = env::var("POLLING_SIZE")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .unwrap_or(12);
        let rpc_timeout_secs = env::var("RPC_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(30))
            .unwrap_or(30);
        let rpc_retry_max = env::var("RPC_RETRY_MAX")
            .map(|v| v.parse().unwrap_or(3))
            .unwrap_or(3);
        let node_cache_ttl = env::var("NODE_CACHE_TTL_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(10000));

        Self {
            database_url,
            rpc_url,
            chain_id,
            polling_interval,
            polling_batch_size,
            rpc_timeout_secs,
            rpc_retry_max,
            node_cache_ttl,
        }
    }
}
