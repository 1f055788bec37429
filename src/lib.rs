pub mod blockchain;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use blockchain::client::{ClientError, NodeApi, RpcClient};
pub use blockchain::crawler::{Crawler, Mode};
pub use blockchain::processor::{process_block, ProcessError};
pub use db::checkpoint;
pub use db::connection;
pub use db::transaction;
pub use models::{Checkpoint, TransactionRecord};
