//! Token sale event indexer.
//!
//! Two halves sharing one SQLite database: a background task that follows
//! the sale contract's on-chain events ([`indexer`]), and an axum REST API
//! that serves the accumulated log ([`api`]).

mod api;
mod config;
mod db;
mod errors;
mod events;
mod indexer;
mod rpc;

use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::indexer::Indexer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real deployments set the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let pool = db::open(&config.database_url).await?;

    let http = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("building HTTP client")?;

    tokio::spawn(Indexer::new(&config, pool.clone(), http).run());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("serving API on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api::router(pool)).await?;

    Ok(())
}
