//! SQLite persistence: schema migration, event writes, checkpointing and
//! the queries behind the REST API.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, SaleEvent, SaleSummary};

/// Where the poller left off. `ledger` is the next scan start; `cursor`
/// resumes pagination mid-range when a page boundary fell inside one.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    pub ledger: i64,
    pub cursor: Option<String>,
}

/// Open the SQLite pool and apply pending migrations.
pub async fn open(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database ready at {url}");
    Ok(pool)
}

// ── Checkpoint ───────────────────────────────────────────────────────

pub async fn load_checkpoint(pool: &SqlitePool) -> Result<Checkpoint> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT ledger, cursor FROM sync_checkpoint WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row
        .map(|(ledger, cursor)| Checkpoint { ledger, cursor })
        .unwrap_or_default())
}

pub async fn store_checkpoint(pool: &SqlitePool, checkpoint: &Checkpoint) -> Result<()> {
    sqlx::query("UPDATE sync_checkpoint SET ledger = ?1, cursor = ?2 WHERE id = 1")
        .bind(checkpoint.ledger)
        .bind(checkpoint.cursor.as_deref())
        .execute(pool)
        .await?;
    Ok(())
}

// ── Writes ───────────────────────────────────────────────────────────

/// Insert a batch of decoded events, skipping rows already present.
///
/// Uniqueness is keyed on `(ledger, tx_hash, kind, account)`, so replaying
/// an already-indexed ledger range is harmless. Returns the number of rows
/// actually written.
pub async fn record_events(pool: &SqlitePool, events: &[SaleEvent]) -> Result<u64> {
    let mut written = 0;
    for event in events {
        written += sqlx::query(
            "INSERT OR IGNORE INTO events \
             (kind, account, amount, is_contribution, ledger, timestamp, contract_id, tx_hash) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&event.kind)
        .bind(&event.account)
        .bind(&event.amount)
        .bind(event.is_contribution)
        .bind(event.ledger)
        .bind(event.timestamp)
        .bind(&event.contract_id)
        .bind(&event.tx_hash)
        .execute(pool)
        .await?
        .rows_affected();
    }
    Ok(written)
}

// ── Reads ────────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str = "id, kind, account, amount, is_contribution, ledger, \
                              timestamp, contract_id, tx_hash, ingested_at";

/// All indexed events in ledger order, newest last, capped at `limit`.
pub async fn recent_events(pool: &SqlitePool, limit: i64) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM events ORDER BY ledger, id LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Events touching one account, in ledger order, capped at `limit`.
pub async fn events_for_account(
    pool: &SqlitePool,
    account: &str,
    limit: i64,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM events WHERE account = ?1 ORDER BY ledger, id LIMIT ?2"
    ))
    .bind(account)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fold the indexed transfer log into an aggregate view of the sale.
///
/// Amounts are summed in Rust as `i128`: the contract emits 128-bit values
/// which neither SQLite integers nor its SUM() can hold.
pub async fn sale_summary(pool: &SqlitePool) -> Result<SaleSummary> {
    let transfers: Vec<(Option<String>, Option<bool>)> = sqlx::query_as(
        "SELECT amount, is_contribution FROM events WHERE kind = 'fund_transfer'",
    )
    .fetch_all(pool)
    .await?;

    let mut contribution_count = 0i64;
    let mut contributed_total = 0i128;
    let mut payout_count = 0i64;
    let mut paid_out_total = 0i128;
    for (amount, is_contribution) in transfers {
        let amount: i128 = amount.and_then(|a| a.parse().ok()).unwrap_or(0);
        if is_contribution == Some(true) {
            contribution_count += 1;
            contributed_total += amount;
        } else {
            payout_count += 1;
            paid_out_total += amount;
        }
    }

    let goal_reached = kind_seen(pool, "goal_reached").await?;
    let cap_reached = kind_seen(pool, "cap_reached").await?;

    // The pause latch is whatever the latest pause/unpause event says.
    let last_pause: Option<(String,)> = sqlx::query_as(
        "SELECT kind FROM events WHERE kind IN ('paused', 'unpaused') \
         ORDER BY ledger DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    let last_ledger: Option<(Option<i64>,)> = sqlx::query_as("SELECT MAX(ledger) FROM events")
        .fetch_optional(pool)
        .await?;

    Ok(SaleSummary {
        contribution_count,
        contributed_total: contributed_total.to_string(),
        payout_count,
        paid_out_total: paid_out_total.to_string(),
        goal_reached,
        cap_reached,
        paused: matches!(last_pause, Some((kind,)) if kind == "paused"),
        last_ledger: last_ledger.and_then(|(v,)| v).unwrap_or(0),
    })
}

async fn kind_seen(pool: &SqlitePool, kind: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM events WHERE kind = ?1 LIMIT 1")
        .bind(kind)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}
