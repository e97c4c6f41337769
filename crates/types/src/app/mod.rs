// Path: crates/types/src/app/mod.rs
//! Core application-level data structures.

/// Ledger events produced by committed operations.
pub mod events;
/// Account identity.
pub mod identity;
/// Registry, problem and solution records.
pub mod registry;

pub use events::*;
pub use identity::*;
pub use registry::*;
