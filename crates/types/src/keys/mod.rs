// Path: crates/types/src/keys/mod.rs
//! Defines constants for the state key layout.
//!
//! One record per owning identity lives under `registry::{owner}`; balances
//! of the host value system live under `balance::{account}`.

use crate::app::AccountId;

/// The state key prefix for per-owner registry records.
pub const REGISTRY_KEY_PREFIX: &[u8] = b"registry::";
/// The state key prefix for account balances.
pub const BALANCE_KEY_PREFIX: &[u8] = b"balance::";

/// Builds the state key of `owner`'s registry record.
pub fn registry_key(owner: &AccountId) -> Vec<u8> {
    [REGISTRY_KEY_PREFIX, owner.as_ref()].concat()
}

/// Builds the state key of `account`'s balance.
pub fn balance_key(account: &AccountId) -> Vec<u8> {
    [BALANCE_KEY_PREFIX, account.as_ref()].concat()
}

/// Recovers the owner from a registry record key, if the key is well formed.
pub fn owner_from_registry_key(key: &[u8]) -> Option<AccountId> {
    key.strip_prefix(REGISTRY_KEY_PREFIX)
        .and_then(|rest| AccountId::try_from(rest).ok())
}
