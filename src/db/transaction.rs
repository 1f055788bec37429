use crate::models::TransactionRecord;
use sqlx::{Pool, Row, Sqlite};

/// Bulk insert-or-replace keyed by hash, inside one database transaction.
/// Re-running it with the same records is a no-op on the final state, which
/// is what makes block reprocessing safe.
pub async fn upsert_transactions(
    pool: &Pool<Sqlite>,
    records: &[TransactionRecord],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for record in records {
        let emitters =
            serde_json::to_string(&record.event_emitters).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO transactions
            (hash, block_number, transaction_index, from_address, to_address,
             contract_address, event_emitters, status, input, value)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(hash) DO UPDATE SET
                block_number = excluded.block_number,
                transaction_index = excluded.transaction_index,
                from_address = excluded.from_address,
                to_address = excluded.to_address,
                contract_address = excluded.contract_address,
                event_emitters = excluded.event_emitters,
                status = excluded.status,
                input = excluded.input,
                value = excluded.value
            "#,
        )
        .bind(&record.hash)
        .bind(record.block_number)
        .bind(record.transaction_index)
        .bind(&record.from)
        .bind(&record.to)
        .bind(&record.contract_address)
        .bind(emitters)
        .bind(record.status)
        .bind(&record.input)
        .bind(&record.value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Transactions touching an address (as sender, receiver, created contract,
/// or event emitter), newest first, with the total match count for paging.
pub async fn get_transactions_by_address(
    pool: &Pool<Sqlite>,
    address: &str,
    offset: i64,
    limit: i64,
) -> Result<(Vec<TransactionRecord>, i64), sqlx::Error> {
    const ADDRESS_FILTER: &str = r#"
        from_address = ?1 OR to_address = ?1 OR contract_address = ?1
        OR EXISTS (SELECT 1 FROM json_each(transactions.event_emitters) WHERE json_each.value = ?1)
    "#;

    let total_count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM transactions WHERE {ADDRESS_FILTER}"
    ))
    .bind(address)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        r#"SELECT hash, block_number, transaction_index, from_address, to_address,
                  contract_address, event_emitters, status, input, value
           FROM transactions
           WHERE {ADDRESS_FILTER}
           ORDER BY block_number DESC, transaction_index DESC
           LIMIT ?2 OFFSET ?3"#
    ))
    .bind(address)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows.iter().map(record_from_row).collect(), total_count))
}

/// The `limit` most recently indexed transactions.
pub async fn latest_transactions(
    pool: &Pool<Sqlite>,
    limit: i64,
) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT hash, block_number, transaction_index, from_address, to_address,
                  contract_address, event_emitters, status, input, value
           FROM transactions
           ORDER BY block_number DESC, transaction_index DESC
           LIMIT ?"#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(record_from_row).collect())
}

/// All records for one block in canonical index order.
pub async fn block_transactions(
    pool: &Pool<Sqlite>,
    block_number: i64,
) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT hash, block_number, transaction_index, from_address, to_address,
                  contract_address, event_emitters, status, input, value
           FROM transactions
           WHERE block_number = ?
           ORDER BY block_number ASC, transaction_index ASC"#,
    )
    .bind(block_number)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(record_from_row).collect())
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> TransactionRecord {
    let emitters: String = row.get("event_emitters");

    TransactionRecord {
        hash: row.get("hash"),
        block_number: row.get("block_number"),
        transaction_index: row.get("transaction_index"),
        from: row.get("from_address"),
        to: row.get("to_address"),
        contract_address: row.get("contract_address"),
        event_emitters: serde_json::from_str(&emitters).unwrap_or_default(),
        status: row.get("status"),
        input: row.get("input"),
        value: row.get("value"),
    }
}
