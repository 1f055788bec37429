use crate::blockchain::models::RpcBlock;
use crate::config::Config;
use moka::future::Cache;

// Short-lived node-side caches. Both hold a single entry and expire on the
// configured TTL, so a tick that lands inside the window reuses the previous
// answer instead of hitting the node again.

pub type TipCache = Cache<(), u64>;
pub type LatestBlockCache = Cache<(), RpcBlock>;

pub fn init_tip_cache(config: &Config) -> TipCache {
    Cache::builder()
        .time_to_live(config.node_cache_ttl)
        .max_capacity(1)
        .build()
}

pub fn init_latest_block_cache(config: &Config) -> LatestBlockCache {
    Cache::builder()
        .time_to_live(config.node_cache_ttl)
        .max_capacity(1)
        .build()
}
