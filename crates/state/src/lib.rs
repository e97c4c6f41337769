// Path: crates/state/src/lib.rs
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

//! # Civic Registry State
//!
//! An ordered, in-memory implementation of `StateAccess` with snapshot
//! persistence to a single file.

pub mod memory;

pub use memory::MemoryStore;
