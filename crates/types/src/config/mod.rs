// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the registry and its genesis state.
use crate::app::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// Selects which registry `vote_solution` and `release_reward` resolve.
///
/// Problem ids are only unique within one owner's registry. Legacy
/// deployments resolved the registry of these two operations through the
/// caller's own identity, which prevents anyone but the owner from voting.
/// `ProblemOwner` routes through the owner carried by the problem reference
/// instead; `CallerRegistry` keeps the legacy behavior for compatibility.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistryRouting {
    /// Resolve through the owner named in the problem reference.
    #[default]
    ProblemOwner,
    /// Resolve through the caller's identity.
    CallerRegistry,
}

/// Configuration parameters for the registry service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryParams {
    /// How vote and release calls locate the registry.
    #[serde(default)]
    pub routing: RegistryRouting,
}

/// A funded account in the genesis state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisAccount {
    /// The funded account.
    pub account: AccountId,
    /// Its initial balance.
    pub balance: Amount,
}

/// The initial ledger state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisConfig {
    /// Accounts funded before the first call.
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
}

/// The top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CivicConfig {
    /// Registry service parameters.
    #[serde(default)]
    pub registry: RegistryParams,
    /// Genesis state.
    #[serde(default)]
    pub genesis: GenesisConfig,
}
