// Path: crates/services/src/records.rs
//! Typed reads and writes of SCALE-encoded state records.

use civic_api::state::StateAccess;
use civic_types::codec;
use civic_types::error::{StateError, TransactionError};
use parity_scale_codec::{Decode, Encode};

/// Reads and decodes the record at `key`. A corrupt record is an error, not a miss.
pub(crate) fn read<T: Decode, S: StateAccess + ?Sized>(
    state: &S,
    key: &[u8],
) -> Result<Option<T>, TransactionError> {
    state
        .get(key)?
        .map(|bytes| {
            codec::from_bytes_canonical(&bytes)
                .map_err(|e| TransactionError::State(StateError::Decode(e)))
        })
        .transpose()
}

/// Encodes `value` and writes it at `key`.
pub(crate) fn write<T: Encode, S: StateAccess + ?Sized>(
    state: &mut S,
    key: &[u8],
    value: &T,
) -> Result<(), TransactionError> {
    let bytes = codec::to_bytes_canonical(value).map_err(TransactionError::Serialization)?;
    state.insert(key, &bytes)?;
    Ok(())
}

/// Decodes call parameters.
pub(crate) fn decode_params<T: Decode>(params: &[u8]) -> Result<T, TransactionError> {
    codec::from_bytes_canonical(params).map_err(TransactionError::Deserialization)
}

/// Encodes a call's output.
pub(crate) fn encode_output<T: Encode>(output: &T) -> Result<Vec<u8>, TransactionError> {
    codec::to_bytes_canonical(output).map_err(TransactionError::Serialization)
}
