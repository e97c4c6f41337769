// Path: crates/api/src/transaction/context.rs
//! Defines the context handed to a service for one call.

use civic_types::app::{AccountId, RegistryEvent};

/// Context for a single service call.
#[derive(Clone, Debug)]
pub struct TxContext {
    /// The host-assigned number of this call. Rejected calls consume one too.
    pub sequence: u64,
    /// The `AccountId` of the entity that submitted the call.
    /// This is the authoritative source for permission checks within services.
    pub signer_account_id: AccountId,
    /// If true, the call is being simulated and its writes will be discarded.
    pub simulation: bool,
    events: Vec<RegistryEvent>,
}

impl TxContext {
    /// Creates a context for a call submitted by `signer_account_id`.
    pub fn new(sequence: u64, signer_account_id: AccountId) -> Self {
        Self {
            sequence,
            signer_account_id,
            simulation: false,
            events: Vec::new(),
        }
    }

    /// Records an event. Events surface only if the call commits.
    pub fn emit(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    /// The events recorded so far, in emission order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Consumes the context and returns its events.
    pub fn into_events(self) -> Vec<RegistryEvent> {
        self.events
    }
}
