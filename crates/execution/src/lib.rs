// Path: crates/execution/src/lib.rs
//! # Civic Execution Crate Lints
//!
//! Panics are disallowed in non-test code; every failure surfaces as a
//! `TransactionError`.
#![forbid(unsafe_code)]
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
//! # Civic Execution
//!
//! The host that owns the ledger state and the service directory, and applies
//! each service call as one atomic transaction.

pub mod app;
pub mod locks;

pub use crate::app::{ExecutionMachine, ServiceCall, TxReceipt};
