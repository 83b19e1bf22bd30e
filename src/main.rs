// src/main.rs
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use expense_tracker::config::Config;
use expense_tracker::database::db::{connection, migrate};
use expense_tracker::backend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = connection::get_db_pool(&config.database).await?;
    migrate::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    backend::run_server(pool, &config).await?;
    Ok(())
}
