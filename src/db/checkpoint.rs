use crate::models::Checkpoint;
use sqlx::{Pool, Row, Sqlite};

pub async fn get_checkpoint(
    pool: &Pool<Sqlite>,
    chain_id: i64,
) -> Result<Option<Checkpoint>, sqlx::Error> {
    let row = sqlx::query("SELECT chain_id, number FROM checkpoints WHERE chain_id = ?")
        .bind(chain_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Checkpoint {
        chain_id: row.get("chain_id"),
        number: row.get("number"),
    }))
}

/// Idempotent upsert keyed by chain id. The MAX() guard keeps the checkpoint
/// monotonically non-decreasing even if an older block is ever reprocessed.
pub async fn advance_checkpoint(
    pool: &Pool<Sqlite>,
    chain_id: i64,
    number: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO checkpoints (chain_id, number) VALUES (?, ?)
        ON CONFLICT(chain_id) DO UPDATE SET
            number = MAX(checkpoints.number, excluded.number)
        "#,
    )
    .bind(chain_id)
    .bind(number)
    .execute(pool)
    .await?;

    Ok(())
}
