//! Runtime configuration, sourced from the process environment.

use std::time::Duration;

use crate::errors::{Error, Result};

const DEFAULT_RPC_URL: &str = "https://soroban-testnet.stellar.org";
const DEFAULT_DATABASE_URL: &str = "sqlite:sale-indexer.db";
const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint serving `getEvents`.
    pub rpc_url: String,
    /// Strkey contract id of the deployed token sale.
    pub contract_id: String,
    /// SQLite database location, `sqlite:` prefix optional.
    pub database_url: String,
    /// TCP port the REST API binds on.
    pub api_port: u16,
    /// Delay between successful poll iterations.
    pub poll_interval: Duration,
    /// Maximum events requested per `getEvents` page.
    pub page_limit: u32,
    /// Ledger to scan from when no checkpoint exists yet.
    pub start_ledger: u32,
}

impl Config {
    /// Assemble the configuration from environment variables.
    ///
    /// Only `CONTRACT_ID` is mandatory; everything else falls back to a
    /// testnet-friendly default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rpc_url: var("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.into()),
            contract_id: var("CONTRACT_ID")
                .ok_or_else(|| Error::Config("CONTRACT_ID must be set".into()))?,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            api_port: parsed("API_PORT")?.unwrap_or(DEFAULT_API_PORT),
            poll_interval: Duration::from_secs(
                parsed("POLL_INTERVAL_SECS")?.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            page_limit: parsed("EVENTS_PAGE_LIMIT")?.unwrap_or(DEFAULT_PAGE_LIMIT),
            start_ledger: parsed("START_LEDGER")?.unwrap_or(0),
        })
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match var(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} has an unparseable value: {raw}"))),
    }
}
