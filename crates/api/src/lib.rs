// Path: crates/api/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Civic Registry API
//!
//! The seams between the registry services and the host that executes them:
//! the `StateAccess` key-value trait, the copy-on-write `StateOverlay` that
//! makes every call atomic, the `TxContext` handed to services, and the
//! `BlockchainService` dispatch trait.

/// Traits for dispatchable services.
pub mod services;
/// Key-value state access and the transactional overlay.
pub mod state;
/// Per-call execution context.
pub mod transaction;

/// Re-exports of the error types services deal in.
pub mod error {
    pub use civic_types::error::*;
}
