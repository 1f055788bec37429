use crate::db::INIT_SCHEMA;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

pub async fn establish_connection(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Create database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    init_schema(&pool).await?;

    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(INIT_SCHEMA).execute(pool).await?;
    Ok(())
}
