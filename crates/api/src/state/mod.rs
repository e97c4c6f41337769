// Path: crates/api/src/state/mod.rs
//! Core traits for state access.
//!
//! - `StateAccess`: basic key-value store operations, dyn-safe.
//! - `StateOverlay`: a copy-on-write write set over any `StateAccess`, the unit
//!   of atomic commit.

use civic_types::error::StateError;
use std::sync::Arc;

/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs from the state, in key order.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

mod accessor;
mod overlay;

pub use accessor::*;
pub use overlay::*;
