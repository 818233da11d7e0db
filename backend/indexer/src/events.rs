//! Decoded shapes of the token sale's contract events.
//!
//! The topic vocabulary matches `contracts/token_sale/src/events.rs`; the
//! indexer flattens each payload into one row of the `events` table.

use serde::{Deserialize, Serialize};

/// Classification of an event by its leading topic symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `goal_hit` — the funding goal was crossed.
    GoalReached,
    /// `cap_hit` — the funding cap was crossed and the sale closed.
    CapReached,
    /// `transfer` — value moved through the sale: a contribution,
    /// an owner allocation, a refund or a beneficiary withdrawal.
    FundTransfer,
    /// `paused` — the contribution path was suspended.
    Paused,
    /// `unpaused` — the contribution path was resumed.
    Unpaused,
    /// Emitted by this contract but not part of the known vocabulary.
    Unknown,
}

impl EventKind {
    pub fn from_topic(symbol: &str) -> Self {
        match symbol {
            "goal_hit" => Self::GoalReached,
            "cap_hit" => Self::CapReached,
            "transfer" => Self::FundTransfer,
            "paused" => Self::Paused,
            "unpaused" => Self::Unpaused,
            _ => Self::Unknown,
        }
    }

    /// Stable identifier used in the `kind` column and API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoalReached => "goal_reached",
            Self::CapReached => "cap_reached",
            Self::FundTransfer => "fund_transfer",
            Self::Paused => "paused",
            Self::Unpaused => "unpaused",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded event, ready to be written to the database.
///
/// `amount` is kept as a decimal string: the contract emits `i128` values,
/// which do not fit SQLite's integer column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEvent {
    pub kind: String,
    /// The affected account — contributor or allocation recipient for
    /// transfers, beneficiary for goal/cap events, owner for pause events.
    pub account: Option<String>,
    pub amount: Option<String>,
    /// `Some(true)` for value entering the sale, `Some(false)` for value
    /// leaving it, `None` for non-transfer events.
    pub is_contribution: Option<bool>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A stored event row, as served by the REST API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub kind: String,
    pub account: Option<String>,
    pub amount: Option<String>,
    pub is_contribution: Option<bool>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub ingested_at: i64,
}

/// Aggregate view of the sale derived from the indexed event log.
#[derive(Debug, Clone, Serialize)]
pub struct SaleSummary {
    pub contribution_count: i64,
    /// Sum of all inbound transfer amounts, as a decimal string.
    pub contributed_total: String,
    pub payout_count: i64,
    /// Sum of all outbound transfer amounts (refunds and beneficiary
    /// withdrawals), as a decimal string.
    pub paid_out_total: String,
    pub goal_reached: bool,
    pub cap_reached: bool,
    pub paused: bool,
    pub last_ledger: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_vocabulary_round_trips() {
        for (symbol, kind, stored) in [
            ("goal_hit", EventKind::GoalReached, "goal_reached"),
            ("cap_hit", EventKind::CapReached, "cap_reached"),
            ("transfer", EventKind::FundTransfer, "fund_transfer"),
            ("paused", EventKind::Paused, "paused"),
            ("unpaused", EventKind::Unpaused, "unpaused"),
        ] {
            assert_eq!(EventKind::from_topic(symbol), kind);
            assert_eq!(kind.as_str(), stored);
        }
        assert_eq!(EventKind::from_topic("burn"), EventKind::Unknown);
    }
}
