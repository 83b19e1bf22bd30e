use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Connection settings for the SQLite store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Everything the binary needs, collected once at startup and passed down
/// explicitly. No module reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
}

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl Config {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(s) => s.parse().context("DB_MAX_CONNECTIONS must be a number")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
            },
            bind_addr,
        })
    }
}
