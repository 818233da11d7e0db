//! # Events
//!
//! Typed payloads and publish helpers for every notification the sale emits.
//! Topics carry the short event symbol (plus the affected account for fund
//! transfers); the data is a `#[contracttype]` struct so off-chain consumers
//! decode a stable shape.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// Emitted once when `amount_raised` first crosses the funding goal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalReached {
    pub beneficiary: Address,
    pub amount_raised: i128,
}

/// Emitted once when `amount_raised` first crosses the funding cap.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapReached {
    pub beneficiary: Address,
    pub amount_raised: i128,
}

/// Emitted for every movement of funding-asset value the sale accounts for:
/// contributions and owner allocations (`is_contribution = true`), refunds
/// and beneficiary withdrawals (`is_contribution = false`).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundTransfer {
    pub account: Address,
    pub amount: i128,
    pub is_contribution: bool,
}

/// Publish the goal-reached notification under the `goal_hit` topic.
pub fn goal_reached(env: &Env, beneficiary: &Address, amount_raised: i128) {
    env.events().publish(
        (symbol_short!("goal_hit"),),
        GoalReached {
            beneficiary: beneficiary.clone(),
            amount_raised,
        },
    );
}

/// Publish the cap-reached notification under the `cap_hit` topic.
pub fn cap_reached(env: &Env, beneficiary: &Address, amount_raised: i128) {
    env.events().publish(
        (symbol_short!("cap_hit"),),
        CapReached {
            beneficiary: beneficiary.clone(),
            amount_raised,
        },
    );
}

/// Publish a fund-transfer notification under `("transfer", account)`.
pub fn fund_transfer(env: &Env, account: &Address, amount: i128, is_contribution: bool) {
    env.events().publish(
        (symbol_short!("transfer"), account.clone()),
        FundTransfer {
            account: account.clone(),
            amount,
            is_contribution,
        },
    );
}

/// Publish the pause notification; data is the owner that paused.
pub fn paused(env: &Env, caller: &Address) {
    env.events()
        .publish((symbol_short!("paused"),), caller.clone());
}

/// Publish the unpause notification; data is the owner that unpaused.
pub fn unpaused(env: &Env, caller: &Address) {
    env.events()
        .publish((symbol_short!("unpaused"),), caller.clone());
}
