// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Civic Registry Types
//!
//! This crate is the foundational library of the civic bounty registry. It holds
//! the on-ledger record types (`Registry`, `Problem`, `Solution`), the account
//! identity type, the canonical codec, state key layout, configuration objects
//! and the unified error taxonomy.
//!
//! ## Architectural Role
//!
//! Every other crate in the workspace depends on `civic-types`, so it carries no
//! dependency on them in turn. Keeping the record definitions here gives one
//! canonical binary layout for everything written to state.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::CoreError> = std::result::Result<T, E>;

/// On-ledger data structures: identities, registry records and events.
pub mod app;
/// The canonical, deterministic binary codec for persisted state.
pub mod codec;
/// Configuration structures for the registry and genesis state.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Constants and helpers for the state key layout.
pub mod keys;
