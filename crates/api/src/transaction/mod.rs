// Path: crates/api/src/transaction/mod.rs
//! Per-call execution context.

/// The `TxContext` passed to every call.
pub mod context;
