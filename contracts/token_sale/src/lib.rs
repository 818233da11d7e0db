//! # Token Sale Contract
//!
//! This is the root crate of a time-boxed, capped **token sale**. It exposes
//! the single Soroban contract `TokenSale` whose entry points cover the full
//! sale lifecycle:
//!
//! | Phase        | Entry Point(s)                                          |
//! |--------------|---------------------------------------------------------|
//! | Bootstrap    | [`TokenSale::init`]                                     |
//! | Funding      | [`TokenSale::contribute`]                               |
//! | Admin        | `terminate`, `set_rate`, `set_end`, `allocate_tokens`, `pause`, `unpause` |
//! | Settlement   | `owner_safe_withdrawal`, `owner_unlock_fund`, `safe_withdrawal` |
//! | Queries      | `get_sale`, `get_balance`, `get_owner`, `is_paused`     |
//!
//! ## Architecture
//!
//! Authorization is fully delegated to [`access`]. Storage access is fully
//! delegated to [`storage`]. Event emission is fully delegated to [`events`].
//! This file contains the entry points and the goal/cap checks.
//!
//! ## Settlement model
//!
//! Contributions pull the funding asset into the contract and push reward
//! tokens from the supplier's allowance to the contributor at the current
//! `rate`. After the deadline the sale settles exactly one way: if the goal
//! latched, the owner drains the funding balance to the beneficiary; if not,
//! each contributor reclaims their own balance once. The owner can reopen
//! the refund path post-deadline by clearing the goal latch.
//!
//! Every entry point is a single atomic transition: any precondition failure
//! panics with an [`Error`] and the host reverts all storage writes of the
//! call. Ledger state is always committed before the external token
//! transfers are invoked.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, panic_with_error, token, Address, Env};

mod access;
mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use events::{CapReached, FundTransfer, GoalReached};
pub use types::{Sale, SaleConfig, SaleState};

/// Lowest exchange rate the owner may configure.
pub const LOW_RATE_BOUND: u32 = 5_000;
/// Highest exchange rate the owner may configure.
pub const HIGH_RATE_BOUND: u32 = 10_000;

const SECONDS_PER_MINUTE: u64 = 60;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized   = 1,
    NotInitialized       = 2,
    NotAuthorized        = 3,
    ContractPaused       = 4,
    InvalidConstruction  = 5,
    SaleClosed           = 6,
    AfterDeadline        = 7,
    BeforeDeadline       = 8,
    InvalidAmount        = 9,
    BelowMinContribution = 10,
    InvalidDestination   = 11,
    RateOutOfRange       = 12,
    EndTimeInPast        = 13,
    GoalNotReached       = 14,
    RefundUnavailable    = 15,
}

#[contract]
pub struct TokenSale;

#[contractimpl]
impl TokenSale {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the sale.
    ///
    /// Must be called exactly once after deployment. Subsequent calls panic
    /// with `Error::AlreadyInitialized`.
    ///
    /// - `owner` administers the sale and must sign the transaction.
    /// - `beneficiary` receives the raised funds on successful settlement.
    /// - `token_supplier` holds the reward supply; it must grant this
    ///   contract an allowance on `reward_token` covering the sale.
    /// - The sale window runs from `start_time` for `duration_minutes`.
    ///
    /// The reward token's declared precision is read here and recorded in
    /// the config. Contributions convert at `amount * rate` with no decimal
    /// adjustment, so funding and reward assets must share one scale.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        env: Env,
        owner: Address,
        beneficiary: Address,
        funding_token: Address,
        reward_token: Address,
        token_supplier: Address,
        funding_goal: i128,
        funding_cap: i128,
        min_contribution: i128,
        start_time: u64,
        duration_minutes: u64,
        rate: u32,
    ) {
        owner.require_auth();

        if storage::is_initialized(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }

        let this = env.current_contract_address();
        if beneficiary == this || funding_token == this || reward_token == this {
            panic_with_error!(&env, Error::InvalidConstruction);
        }
        if funding_goal < 0 || funding_goal > funding_cap {
            panic_with_error!(&env, Error::InvalidConstruction);
        }
        if min_contribution < 0 || duration_minutes == 0 {
            panic_with_error!(&env, Error::InvalidConstruction);
        }
        if !(LOW_RATE_BOUND..=HIGH_RATE_BOUND).contains(&rate) {
            panic_with_error!(&env, Error::RateOutOfRange);
        }

        let reward_decimals = token::Client::new(&env, &reward_token).decimals();

        access::set_owner(&env, &owner);
        storage::save_config(
            &env,
            &SaleConfig {
                beneficiary,
                funding_token,
                reward_token,
                token_supplier,
                funding_goal,
                funding_cap,
                min_contribution,
                start_time,
                reward_decimals,
            },
        );
        storage::save_state(
            &env,
            &SaleState {
                rate,
                end_time: start_time + duration_minutes * SECONDS_PER_MINUTE,
                amount_raised: 0,
                refund_amount: 0,
                goal_reached: false,
                cap_reached: false,
                sale_closed: false,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the funding asset in exchange for reward
    /// tokens at the current rate.
    ///
    /// Accepted while the contract is not paused, the deadline has not
    /// passed and the sale is not closed; `amount` must meet the configured
    /// minimum. The contributor's ledger balance and `amount_raised` are
    /// committed before the funding asset is pulled in and the reward
    /// tokens are pushed out of the supplier's allowance. The goal and cap
    /// checks run last, against this call's own ledger update.
    pub fn contribute(env: Env, contributor: Address, amount: i128) {
        contributor.require_auth();
        access::require_not_paused(&env);

        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);

        if env.ledger().timestamp() >= state.end_time {
            panic_with_error!(&env, Error::AfterDeadline);
        }
        if state.sale_closed {
            panic_with_error!(&env, Error::SaleClosed);
        }
        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        if amount < config.min_contribution {
            panic_with_error!(&env, Error::BelowMinContribution);
        }

        let balance = storage::get_balance(&env, &contributor);
        storage::set_balance(&env, &contributor, balance + amount);
        state.amount_raised += amount;
        storage::save_state(&env, &state);

        let reward_amount = amount * i128::from(state.rate);

        let this = env.current_contract_address();
        token::Client::new(&env, &config.funding_token).transfer(&contributor, &this, &amount);
        token::Client::new(&env, &config.reward_token).transfer_from(
            &this,
            &config.token_supplier,
            &contributor,
            &reward_amount,
        );

        events::fund_transfer(&env, &contributor, amount, true);

        check_funding_goal(&env, &config, &mut state);
        check_funding_cap(&env, &config, &mut state);
        storage::save_state(&env, &state);
    }

    // ─────────────────────────────────────────────────────────
    // Admin
    // ─────────────────────────────────────────────────────────

    /// Close the sale permanently. Irreversible.
    pub fn terminate(env: Env, caller: Address) {
        access::require_owner(&env, &caller);
        let mut state = storage::load_state(&env);
        state.sale_closed = true;
        storage::save_state(&env, &state);
    }

    /// Replace the exchange rate.
    ///
    /// Takes effect on the next contribution; no rate history is kept.
    pub fn set_rate(env: Env, caller: Address, rate: u32) {
        access::require_owner(&env, &caller);
        if !(LOW_RATE_BOUND..=HIGH_RATE_BOUND).contains(&rate) {
            panic_with_error!(&env, Error::RateOutOfRange);
        }
        let mut state = storage::load_state(&env);
        state.rate = rate;
        storage::save_state(&env, &state);
    }

    /// Replace the sale deadline.
    ///
    /// The new end time may shorten or lengthen the window but must not lie
    /// in the past.
    pub fn set_end(env: Env, caller: Address, end_time: u64) {
        access::require_owner(&env, &caller);
        if end_time < env.ledger().timestamp() {
            panic_with_error!(&env, Error::EndTimeInPast);
        }
        let mut state = storage::load_state(&env);
        state.end_time = end_time;
        storage::save_state(&env, &state);
    }

    /// Move `token_amount` reward tokens to `to` outside the contribution
    /// path, recording `amount` of funding-asset value as raised.
    ///
    /// The funding-side credit lands on the sale contract's own ledger
    /// entry, not on `to`; only the reward tokens reach the recipient. The
    /// destination must be neither the contract itself nor the supplier.
    pub fn allocate_tokens(env: Env, caller: Address, to: Address, amount: i128, token_amount: i128) {
        access::require_owner(&env, &caller);

        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);

        let this = env.current_contract_address();
        if to == this || to == config.token_supplier {
            panic_with_error!(&env, Error::InvalidDestination);
        }
        if amount < 0 || token_amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let credit = storage::get_balance(&env, &this);
        storage::set_balance(&env, &this, credit + amount);
        state.amount_raised += amount;
        storage::save_state(&env, &state);

        token::Client::new(&env, &config.reward_token).transfer_from(
            &this,
            &config.token_supplier,
            &to,
            &token_amount,
        );

        events::fund_transfer(&env, &to, amount, true);

        check_funding_goal(&env, &config, &mut state);
        check_funding_cap(&env, &config, &mut state);
        storage::save_state(&env, &state);
    }

    /// Pause the contribution path.
    pub fn pause(env: Env, caller: Address) {
        access::require_owner(&env, &caller);
        access::set_paused(&env, true);
        events::paused(&env, &caller);
    }

    /// Reopen the contribution path.
    pub fn unpause(env: Env, caller: Address) {
        access::require_owner(&env, &caller);
        access::set_paused(&env, false);
        events::unpaused(&env, &caller);
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Drain the contract's funding-asset balance to the beneficiary.
    ///
    /// Requires the goal latch. Callable repeatedly; each call transfers
    /// whatever balance exists at call time.
    pub fn owner_safe_withdrawal(env: Env, caller: Address) {
        access::require_owner(&env, &caller);

        let config = storage::load_config(&env);
        let state = storage::load_state(&env);
        if !state.goal_reached {
            panic_with_error!(&env, Error::GoalNotReached);
        }

        let this = env.current_contract_address();
        let funding = token::Client::new(&env, &config.funding_token);
        let balance = funding.balance(&this);
        funding.transfer(&this, &config.beneficiary, &balance);

        events::fund_transfer(&env, &config.beneficiary, balance, false);
    }

    /// Clear the goal latch after the deadline, reopening the refund path.
    ///
    /// An explicit override for exceptional circumstances (disputed funds);
    /// the latch is never cleared by the goal check itself.
    pub fn owner_unlock_fund(env: Env, caller: Address) {
        access::require_owner(&env, &caller);

        let mut state = storage::load_state(&env);
        if env.ledger().timestamp() < state.end_time {
            panic_with_error!(&env, Error::BeforeDeadline);
        }
        state.goal_reached = false;
        storage::save_state(&env, &state);
    }

    /// Refund the caller's entire contributed balance.
    ///
    /// Available after the deadline while the goal latch is clear. The
    /// ledger entry is zeroed before the funding asset moves, so a repeat
    /// call reads a zero balance and is a silent no-op.
    pub fn safe_withdrawal(env: Env, contributor: Address) {
        contributor.require_auth();

        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);

        if env.ledger().timestamp() < state.end_time {
            panic_with_error!(&env, Error::BeforeDeadline);
        }
        if state.goal_reached {
            panic_with_error!(&env, Error::RefundUnavailable);
        }

        let balance = storage::get_balance(&env, &contributor);
        storage::set_balance(&env, &contributor, 0);
        if balance > 0 {
            state.refund_amount += balance;
            storage::save_state(&env, &state);

            let this = env.current_contract_address();
            token::Client::new(&env, &config.funding_token).transfer(
                &this,
                &contributor,
                &balance,
            );

            events::fund_transfer(&env, &contributor, balance, false);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Return the full sale view, config and state combined.
    pub fn get_sale(env: Env) -> Sale {
        storage::load_sale(&env)
    }

    /// Return the contributed balance of `account`, `0` if none.
    pub fn get_balance(env: Env, account: Address) -> i128 {
        storage::get_balance(&env, &account)
    }

    /// Return the sale owner.
    pub fn get_owner(env: Env) -> Address {
        access::get_owner(&env)
    }

    /// Return `true` while the contribution path is paused.
    pub fn is_paused(env: Env) -> bool {
        access::is_paused(&env)
    }
}

// ─────────────────────────────────────────────────────────────
// Goal / cap checks
// ─────────────────────────────────────────────────────────────

/// Latch the goal flag once `amount_raised` crosses the funding goal.
///
/// One-shot: with the flag already set this is a no-op, so re-running after
/// further contributions never emits a duplicate notification. Only
/// `owner_unlock_fund` ever clears the flag.
fn check_funding_goal(env: &Env, config: &SaleConfig, state: &mut SaleState) {
    if !state.goal_reached && state.amount_raised >= config.funding_goal {
        state.goal_reached = true;
        events::goal_reached(env, &config.beneficiary, state.amount_raised);
    }
}

/// Latch the cap flag once `amount_raised` crosses the funding cap, closing
/// the sale at the same time. One-shot like the goal check.
fn check_funding_cap(env: &Env, config: &SaleConfig, state: &mut SaleState) {
    if !state.cap_reached && state.amount_raised >= config.funding_cap {
        state.cap_reached = true;
        state.sale_closed = true;
        events::cap_reached(env, &config.beneficiary, state.amount_raised);
    }
}
