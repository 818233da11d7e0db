//! # Types
//!
//! Shared data structures of the token sale contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! The sale singleton is internally stored as two separate ledger entries:
//!
//! - [`SaleConfig`] — written once at `init`; never mutated.
//! - [`SaleState`] — written by every mutating entry point.
//!
//! The public API exposes the reconstructed [`Sale`] struct for convenience.
//!
//! ### Latches
//!
//! `goal_reached`, `cap_reached` and `sale_closed` only ever transition
//! `false → true` inside the contract's own checks. The single exception is
//! `goal_reached`, which the owner may clear after the deadline via
//! `owner_unlock_fund` to reopen the refund path.

use soroban_sdk::{contracttype, Address};

/// Immutable sale parameters, written once at `init`.
///
/// Stored separately from mutable state so that the frequent writes
/// (contributions, refunds) touch only the small [`SaleState`] entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Account that receives the raised funds on successful settlement.
    pub beneficiary: Address,
    /// Token contract of the contributed funding asset.
    pub funding_token: Address,
    /// Token contract of the reward asset sold at `rate`.
    pub reward_token: Address,
    /// Account holding the reward-token supply; the contract spends its
    /// allowance via `transfer_from`.
    pub token_supplier: Address,
    /// Minimum total raise for the sale to count as successful.
    pub funding_goal: i128,
    /// Maximum total raise; crossing it closes the sale permanently.
    pub funding_cap: i128,
    /// Smallest accepted single contribution.
    pub min_contribution: i128,
    /// Ledger timestamp the sale window opened at.
    pub start_time: u64,
    /// Declared precision of the reward token, recorded at `init`.
    /// `contribute` multiplies `amount * rate` without any decimal
    /// conversion; funding and reward assets sharing one scale is a
    /// deployment precondition, and this field lets operators audit it.
    pub reward_decimals: u32,
}

/// Mutable sale state, updated on contributions, refunds and admin ops.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    /// Reward units issued per funding unit. Owner-adjustable within bounds.
    pub rate: u32,
    /// Ledger timestamp the sale window closes at. Owner-adjustable, never
    /// into the past.
    pub end_time: u64,
    /// Sum of all accepted contributions and owner-recorded allocations.
    /// Monotonically non-decreasing.
    pub amount_raised: i128,
    /// Sum of all refunds paid out. Monotonically non-decreasing.
    pub refund_amount: i128,
    /// Latched once `amount_raised` crosses `funding_goal`.
    pub goal_reached: bool,
    /// Latched once `amount_raised` crosses `funding_cap`.
    pub cap_reached: bool,
    /// No further contributions once set; latched by the cap check or by
    /// owner termination.
    pub sale_closed: bool,
}

/// Full public view of the sale.
///
/// Used as the `get_sale` return type; reconstructed internally from the
/// split `SaleConfig` + `SaleState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sale {
    pub beneficiary: Address,
    pub funding_token: Address,
    pub reward_token: Address,
    pub token_supplier: Address,
    pub funding_goal: i128,
    pub funding_cap: i128,
    pub min_contribution: i128,
    pub start_time: u64,
    pub reward_decimals: u32,
    pub rate: u32,
    pub end_time: u64,
    pub amount_raised: i128,
    pub refund_amount: i128,
    pub goal_reached: bool,
    pub cap_reached: bool,
    pub sale_closed: bool,
}
