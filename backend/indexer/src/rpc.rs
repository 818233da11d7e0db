//! JSON-RPC access to Soroban's `getEvents`, and decoding of the returned
//! payloads into [`SaleEvent`]s.
//!
//! [`RpcClient::events_page`] performs exactly one attempt; transient
//! failures surface as retryable errors and the poll loop in
//! [`crate::indexer`] owns the back-off policy.

use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::events::{EventKind, SaleEvent};

/// Request/method errors the RPC will answer identically no matter how
/// often we retry.
const FATAL_RPC_CODES: [i64; 2] = [-32600, -32601];

/// `true` when a failed [`RpcClient::events_page`] call is worth retrying.
pub fn retryable(err: &Error) -> bool {
    match err {
        Error::Transport(_) | Error::Throttled => true,
        Error::Rpc { code, .. } => !FATAL_RPC_CODES.contains(code),
        _ => false,
    }
}

pub struct RpcClient {
    http: Client,
    url: String,
    contract_id: String,
}

/// One page of decoded events plus the pagination handles that came with it.
pub struct EventPage {
    pub events: Vec<SaleEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ── Wire shapes ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope {
    result: Option<RawPage>,
    error: Option<RpcFailure>,
}

#[derive(Deserialize)]
struct RpcFailure {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RawPage {
    events: Vec<EncodedEvent>,
    cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    latest_ledger: Option<u64>,
}

/// An event as the RPC returns it: XDR topics and data pre-decoded into
/// JSON by the endpoint.
#[derive(Debug, Clone, Deserialize)]
struct EncodedEvent {
    topic: Vec<String>,
    value: Value,
    #[serde(rename = "contractId")]
    contract_id: Option<String>,
    #[serde(rename = "txHash")]
    tx_hash: Option<String>,
    ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    ledger_closed_at: Option<String>,
}

impl RpcClient {
    pub fn new(http: Client, url: String, contract_id: String) -> Self {
        Self {
            http,
            url,
            contract_id,
        }
    }

    /// Request one page of this contract's events.
    ///
    /// Pagination follows the `getEvents` contract: a `cursor` from a
    /// previous page takes precedence, otherwise the scan starts at
    /// `start_ledger`.
    pub async fn events_page(
        &self,
        start_ledger: u32,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<EventPage> {
        let mut params = json!({
            "filters": [{ "type": "contract", "contractIds": [self.contract_id] }],
            "pagination": { "limit": limit },
        });
        match cursor {
            Some(cursor) => params["pagination"]["cursor"] = json!(cursor),
            None => params["startLedger"] = json!(start_ledger),
        }

        let response = self
            .http
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Throttled);
        }

        let envelope: Envelope = response.json().await?;
        if let Some(failure) = envelope.error {
            return Err(Error::Rpc {
                code: failure.code,
                message: failure.message,
            });
        }
        let page = envelope.result.ok_or_else(|| Error::Rpc {
            code: 0,
            message: "getEvents returned neither result nor error".into(),
        })?;

        debug!(
            count = page.events.len(),
            latest_ledger = ?page.latest_ledger,
            "fetched events page"
        );

        Ok(EventPage {
            events: page
                .events
                .iter()
                .filter_map(|e| e.decode(&self.contract_id))
                .collect(),
            cursor: page.cursor,
            latest_ledger: page.latest_ledger,
        })
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

impl EncodedEvent {
    fn decode(&self, fallback_contract: &str) -> Option<SaleEvent> {
        let kind = EventKind::from_topic(&symbol_of(self.topic.first()?));

        let (account, amount, is_contribution) = match kind {
            EventKind::GoalReached | EventKind::CapReached => (
                field_as_string(&self.value, &["beneficiary", "address"]),
                field_as_string(&self.value, &["amount_raised", "amount"]),
                None,
            ),
            EventKind::FundTransfer => {
                // The data struct is authoritative for the account; the
                // second topic entry carries the same address as fallback.
                let account = field_as_string(&self.value, &["account", "address"])
                    .or_else(|| self.topic.get(1).map(|t| symbol_of(t)));
                (
                    account,
                    field_as_string(&self.value, &["amount"]),
                    self.value.get("is_contribution").and_then(Value::as_bool),
                )
            }
            // Pause events carry the acting owner as bare data.
            EventKind::Paused | EventKind::Unpaused => (
                self.value
                    .as_str()
                    .map(String::from)
                    .or_else(|| field_as_string(&self.value, &["address", "caller"])),
                None,
                None,
            ),
            EventKind::Unknown => (None, None, None),
        };

        Some(SaleEvent {
            kind: kind.as_str().to_string(),
            account,
            amount,
            is_contribution,
            ledger: self.ledger.unwrap_or(0) as i64,
            timestamp: self.close_time(),
            contract_id: self
                .contract_id
                .clone()
                .unwrap_or_else(|| fallback_contract.to_string()),
            tx_hash: self.tx_hash.clone(),
        })
    }

    /// Ledger close time as Unix seconds, `0` when absent or unparseable.
    fn close_time(&self) -> i64 {
        self.ledger_closed_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.timestamp())
            .unwrap_or(0)
    }
}

/// Unwrap a topic entry.
///
/// Depending on the RPC version a topic arrives either as the bare string
/// or as a decoded XDR wrapper like `{"type":"symbol","value":"transfer"}`.
fn symbol_of(topic: &str) -> String {
    serde_json::from_str::<Value>(topic)
        .ok()
        .and_then(|v| v.get("value").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| topic.to_string())
}

/// First of `keys` present in `value`, stringified.
fn field_as_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => other.as_str().map(String::from),
    })
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(topics: &[&str], value: Value, ledger: u64) -> EncodedEvent {
        EncodedEvent {
            topic: topics.iter().map(|t| t.to_string()).collect(),
            value,
            contract_id: Some("CSALE".to_string()),
            tx_hash: Some("deadbeef".to_string()),
            ledger: Some(ledger),
            ledger_closed_at: Some("2024-06-01T12:00:00Z".to_string()),
        }
    }

    #[test]
    fn symbol_unwraps_xdr_wrapper_and_falls_back() {
        assert_eq!(symbol_of(r#"{"type":"symbol","value":"cap_hit"}"#), "cap_hit");
        assert_eq!(symbol_of("goal_hit"), "goal_hit");
    }

    #[test]
    fn decodes_contribution_transfer() {
        let ev = encoded(
            &[r#"{"type":"symbol","value":"transfer"}"#, "GALICE"],
            json!({ "account": "GALICE", "amount": "2000", "is_contribution": true }),
            500,
        );

        let decoded = ev.decode("CSALE").unwrap();
        assert_eq!(decoded.kind, "fund_transfer");
        assert_eq!(decoded.account.as_deref(), Some("GALICE"));
        assert_eq!(decoded.amount.as_deref(), Some("2000"));
        assert_eq!(decoded.is_contribution, Some(true));
        assert_eq!(decoded.ledger, 500);
        assert_eq!(decoded.timestamp, 1_717_243_200);
    }

    #[test]
    fn transfer_account_falls_back_to_topic() {
        let ev = encoded(
            &[
                r#"{"type":"symbol","value":"transfer"}"#,
                r#"{"type":"address","value":"GBOB"}"#,
            ],
            json!({ "amount": "750", "is_contribution": false }),
            501,
        );

        let decoded = ev.decode("CSALE").unwrap();
        assert_eq!(decoded.account.as_deref(), Some("GBOB"));
        assert_eq!(decoded.is_contribution, Some(false));
    }

    #[test]
    fn decodes_goal_reached() {
        let ev = encoded(
            &[r#"{"type":"symbol","value":"goal_hit"}"#],
            json!({ "beneficiary": "GBENE", "amount_raised": "10000" }),
            502,
        );

        let decoded = ev.decode("CSALE").unwrap();
        assert_eq!(decoded.kind, "goal_reached");
        assert_eq!(decoded.account.as_deref(), Some("GBENE"));
        assert_eq!(decoded.amount.as_deref(), Some("10000"));
        assert_eq!(decoded.is_contribution, None);
    }

    #[test]
    fn decodes_pause_with_bare_address_data() {
        let ev = encoded(&[r#"{"type":"symbol","value":"paused"}"#], json!("GOWNER"), 503);

        let decoded = ev.decode("CSALE").unwrap();
        assert_eq!(decoded.kind, "paused");
        assert_eq!(decoded.account.as_deref(), Some("GOWNER"));
        assert_eq!(decoded.amount, None);
    }

    #[test]
    fn unrecognised_topic_is_kept_as_unknown() {
        let ev = encoded(&[r#"{"type":"symbol","value":"mystery"}"#], json!({}), 504);
        assert_eq!(ev.decode("CSALE").unwrap().kind, "unknown");
    }

    #[test]
    fn retryable_classification() {
        assert!(retryable(&Error::Throttled));
        assert!(retryable(&Error::Rpc {
            code: -32000,
            message: "try later".into(),
        }));
        assert!(!retryable(&Error::Rpc {
            code: -32601,
            message: "no such method".into(),
        }));
        assert!(!retryable(&Error::Config("missing".into())));
    }
}
