// Path: crates/telemetry/src/lib.rs
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

//! # Civic Telemetry
//!
//! Structured logging for the registry host and its tools. Services log
//! through the `log` facade; the host emits `tracing` events. Both end up in
//! the one subscriber installed here.

/// The initialization routine for global structured logging.
pub mod init;

pub use init::{init_tracing, LogFormat};
