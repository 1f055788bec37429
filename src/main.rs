// Initialize configuration
// Set up logging
// Create database connection pool
// Start the block crawler task
// Wait for ctrl-c and shut down cleanly

use chain_crawler_service::blockchain::crawler::Crawler;
use chain_crawler_service::config::Config;
use chain_crawler_service::state::AppState;
use chain_crawler_service::{connection, RpcClient};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chain-crawler-service");

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    // Setup database connection
    let db_pool = connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Create the RPC client
    let node = Arc::new(RpcClient::new(&config)?);

    // Create shared state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db_pool: db_pool.clone(),
    });

    // Start the crawler task
    let shutdown = CancellationToken::new();
    let crawler = Crawler::new(app_state, node);
    let crawler_shutdown = shutdown.clone();
    let crawler_handle = tokio::spawn(async move {
        crawler.run(crawler_shutdown).await;
    });
    tracing::info!("Block crawler task started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
    crawler_handle.await?;

    Ok(())
}
