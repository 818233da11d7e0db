//! Error taxonomy shared across the indexer.
//!
//! Everything fallible in the crate returns [`Result`]; `anyhow` appears
//! only at the binary boundary in `main`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failure: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed RPC payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("rate limited by the RPC endpoint")]
    Throttled,

    #[error("RPC rejected the request (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
