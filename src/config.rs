//! Process configuration
//!
//! Read once at startup from the environment (and an optional `.env`).

use std::path::PathBuf;

/// Default ledger location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "data/orders.db";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite ledger file (`KITT_ORDERS_DB`)
    pub db_path: PathBuf,
    /// HTTP listen address (`KITT_BIND_ADDR`)
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("KITT_ORDERS_DB")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let bind_addr = lookup("KITT_BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Self {
            db_path: PathBuf::from(db_path),
            bind_addr,
        }
    }
}
