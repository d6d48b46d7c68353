use prk_todos::adapters::{AppState, HttpServer, Templates};
use prk_todos::config::AppConfig;
use prk_todos::storage::sqlite::SqliteStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(database = %config.database_path.display(), "Opening todo database");
    let storage = SqliteStorage::new(&config.database_path, config.max_connections).await?;
    let state = AppState::new(storage.clone(), Templates::new()?);

    HttpServer::new(state, &config).await?.run().await?;
    storage.close().await;
    Ok(())
}
