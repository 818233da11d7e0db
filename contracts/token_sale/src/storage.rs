//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the sale:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key       | Type         | Description                                |
//! |-----------|--------------|--------------------------------------------|
//! | `Owner`   | `Address`    | Sale administrator                         |
//! | `Paused`  | `bool`       | Pause latch; blocks contributions          |
//! | `Config`  | `SaleConfig` | Immutable sale parameters                  |
//! | `State`   | `SaleState`  | Mutable sale state                         |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                | Type   | Description                               |
//! |--------------------|--------|-------------------------------------------|
//! | `Balance(Address)` | `i128` | Amount contributed by the keyed account   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining.
//!
//! The sale is a singleton, so its config and state live in instance storage
//! and share the contract's lifetime. Only the contributor balance map, whose
//! size grows with the number of contributors, is persistent per-entry.
//! The entry keyed by the contract's own address records owner-side manual
//! allocations made through `allocate_tokens`.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::types::{Sale, SaleConfig, SaleState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Sale administrator (Instance).
    Owner,
    /// Pause latch (Instance).
    Paused,
    /// Immutable sale configuration (Instance).
    Config,
    /// Mutable sale state (Instance).
    State,
    /// Contributed balance keyed by account (Persistent).
    Balance(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Return `true` once `init` has stored the sale configuration.
pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Store the immutable sale configuration. Written exactly once.
pub fn save_config(env: &Env, config: &SaleConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Retrieve the sale configuration.
/// Fails with `NotInitialized` before `init` has run.
pub fn load_config(env: &Env) -> SaleConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

/// Store the mutable sale state.
pub fn save_state(env: &Env, state: &SaleState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

/// Retrieve the mutable sale state.
/// Fails with `NotInitialized` before `init` has run.
pub fn load_state(env: &Env) -> SaleState {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

/// Load the full [`Sale`] view by combining config and state.
pub fn load_sale(env: &Env) -> Sale {
    let config = load_config(env);
    let state = load_state(env);
    Sale {
        beneficiary: config.beneficiary,
        funding_token: config.funding_token,
        reward_token: config.reward_token,
        token_supplier: config.token_supplier,
        funding_goal: config.funding_goal,
        funding_cap: config.funding_cap,
        min_contribution: config.min_contribution,
        start_time: config.start_time,
        reward_decimals: config.reward_decimals,
        rate: state.rate,
        end_time: state.end_time,
        amount_raised: state.amount_raised,
        refund_amount: state.refund_amount,
        goal_reached: state.goal_reached,
        cap_reached: state.cap_reached,
        sale_closed: state.sale_closed,
    }
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Read the contributed balance of `account`, `0` if it never contributed.
pub fn get_balance(env: &Env, account: &Address) -> i128 {
    let key = DataKey::Balance(account.clone());
    match env.storage().persistent().get(&key) {
        Some(balance) => {
            bump_persistent(env, &key);
            balance
        }
        None => 0,
    }
}

/// Overwrite the contributed balance of `account`.
pub fn set_balance(env: &Env, account: &Address, balance: i128) {
    let key = DataKey::Balance(account.clone());
    env.storage().persistent().set(&key, &balance);
    bump_persistent(env, &key);
}
