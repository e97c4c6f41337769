// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for all persisted state.
//!
//! Thin wrappers around `parity-scale-codec` (SCALE). Every record written to
//! state goes through these two functions so that a registry snapshot has one
//! binary representation regardless of which component produced it.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical SCALE byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical SCALE byte representation.
///
/// Fails on malformed input and on trailing bytes, returning a descriptive string.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}
