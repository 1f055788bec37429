pub mod checkpoint;
pub mod connection;
pub mod transaction;

pub const INIT_SCHEMA: &str = r#"
-- Canonical transaction records, one row per transaction hash
CREATE TABLE IF NOT EXISTS transactions (
    hash TEXT PRIMARY KEY,
    block_number INTEGER NOT NULL,
    transaction_index INTEGER NOT NULL,
    from_address TEXT NOT NULL DEFAULT '',
    to_address TEXT NOT NULL DEFAULT '',
    contract_address TEXT NOT NULL DEFAULT '',
    event_emitters TEXT NOT NULL DEFAULT '[]',
    status INTEGER NOT NULL,
    input TEXT NOT NULL DEFAULT '',
    value TEXT NOT NULL DEFAULT ''
);

-- One row per chain: the last fully-indexed block
CREATE TABLE IF NOT EXISTS checkpoints (
    chain_id INTEGER PRIMARY KEY,
    number INTEGER NOT NULL
);

-- Canonical index order plus the secondary lookups the query API relies on
CREATE INDEX IF NOT EXISTS idx_transactions_block_order ON transactions(block_number, transaction_index);
CREATE INDEX IF NOT EXISTS idx_transactions_from ON transactions(from_address);
CREATE INDEX IF NOT EXISTS idx_transactions_to ON transactions(to_address);
CREATE INDEX IF NOT EXISTS idx_transactions_contract ON transactions(contract_address);
"#;
