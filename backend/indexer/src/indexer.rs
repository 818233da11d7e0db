//! The background sync loop: poll `getEvents`, store what came back,
//! advance the checkpoint.
//!
//! Retry policy lives here, not in the RPC client: retryable failures
//! (transport, throttling, soft RPC errors) back off exponentially up to
//! [`MAX_BACKOFF`]; a fatal RPC error means the request itself is wrong
//! (bad contract id, unsupported method) and stops the task.

use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::{self, Checkpoint};
use crate::errors::Result;
use crate::rpc::{self, RpcClient};

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub struct Indexer {
    pool: SqlitePool,
    rpc: RpcClient,
    poll_interval: Duration,
    page_limit: u32,
    start_ledger: u32,
}

impl Indexer {
    pub fn new(config: &Config, pool: SqlitePool, http: Client) -> Self {
        Self {
            pool,
            rpc: RpcClient::new(http, config.rpc_url.clone(), config.contract_id.clone()),
            poll_interval: config.poll_interval,
            page_limit: config.page_limit,
            start_ledger: config.start_ledger,
        }
    }

    /// Run until the process exits or a fatal RPC error surfaces.
    pub async fn run(self) {
        let mut checkpoint = match db::load_checkpoint(&self.pool).await {
            Ok(cp) if cp.ledger > 0 => cp,
            Ok(_) => Checkpoint {
                ledger: i64::from(self.start_ledger),
                cursor: None,
            },
            Err(e) => {
                error!("cannot load sync checkpoint: {e}");
                return;
            }
        };
        info!(ledger = checkpoint.ledger, "sync starting");

        let mut backoff = INITIAL_BACKOFF;
        loop {
            match self.sync_once(&mut checkpoint).await {
                Ok(written) => {
                    if written > 0 {
                        info!(written, ledger = checkpoint.ledger, "stored new events");
                    }
                    backoff = INITIAL_BACKOFF;
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) if rpc::retryable(&e) => {
                    warn!("poll failed, retrying in {backoff:?}: {e}");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => {
                    error!("sync stopped on fatal error: {e}");
                    return;
                }
            }
        }
    }

    /// One poll iteration; advances `checkpoint` on success.
    async fn sync_once(&self, checkpoint: &mut Checkpoint) -> Result<u64> {
        let page = self
            .rpc
            .events_page(
                checkpoint.ledger as u32,
                checkpoint.cursor.as_deref(),
                self.page_limit,
            )
            .await?;

        let written = if page.events.is_empty() {
            0
        } else {
            db::record_events(&self.pool, &page.events).await?
        };

        // A returned cursor means more pages remain in the current range;
        // keep the start ledger until pagination drains. Otherwise jump to
        // the newest ledger the RPC has seen.
        if let Some(latest) = page.latest_ledger {
            checkpoint.ledger = checkpoint.ledger.max(latest as i64);
        }
        checkpoint.cursor = page.cursor;
        db::store_checkpoint(&self.pool, checkpoint).await?;

        Ok(written)
    }
}
