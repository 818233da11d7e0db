//! # Access
//!
//! Owner and pause capability checks.
//!
//! Authorization is fully delegated to this module: every gated entry point
//! calls [`require_owner`] or [`require_not_paused`] before touching sale
//! state, composing the checks instead of inheriting them from a base
//! contract. The owner is the sale administrator set at `init`; the pause
//! latch blocks the contribution path while leaving settlement and admin
//! operations available.

use soroban_sdk::{panic_with_error, Address, Env};

use crate::storage::DataKey;
use crate::Error;

/// Store the sale owner. Written exactly once, from `init`.
pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

/// Retrieve the sale owner.
/// Fails with `NotInitialized` before `init` has run.
pub fn get_owner(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

/// Require that `caller` is the stored owner and has authorized the call.
pub fn require_owner(env: &Env, caller: &Address) {
    caller.require_auth();
    if *caller != get_owner(env) {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

/// Require that the contract is not paused.
pub fn require_not_paused(env: &Env) {
    if is_paused(env) {
        panic_with_error!(env, Error::ContractPaused);
    }
}

/// Flip the pause latch.
pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
}

/// Return `true` while the contract is paused.
pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}
