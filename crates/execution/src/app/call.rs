// Path: crates/execution/src/app/call.rs
use civic_types::app::{AccountId, RegistryEvent};
use civic_types::codec;
use civic_types::error::TransactionError;
use parity_scale_codec::Encode;

/// One signed request to a service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    pub signer: AccountId,
    pub service_id: String,
    /// Versioned method name, e.g. `create_problem@v1`.
    pub method: String,
    /// SCALE-encoded method parameters.
    pub params: Vec<u8>,
}

impl ServiceCall {
    /// Builds a call by encoding `params`.
    pub fn new<P: Encode>(
        signer: AccountId,
        service_id: &str,
        method: &str,
        params: &P,
    ) -> Result<Self, TransactionError> {
        Ok(Self {
            signer,
            service_id: service_id.to_string(),
            method: method.to_string(),
            params: codec::to_bytes_canonical(params).map_err(TransactionError::Serialization)?,
        })
    }
}

/// The outcome of a call that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub sequence: u64,
    /// SCALE-encoded method output. Empty for methods that return nothing.
    pub output: Vec<u8>,
    pub events: Vec<RegistryEvent>,
    /// False when the call ran through `simulate` and nothing was written.
    pub committed: bool,
}
