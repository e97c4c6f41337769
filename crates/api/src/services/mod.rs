// Path: crates/api/src/services/mod.rs
//! Traits for pluggable services.

use crate::state::StateAccess;
use crate::transaction::context::TxContext;
use civic_types::app::AccountId;
use civic_types::error::TransactionError;
use std::any::Any;

/// Service lookup by id or concrete type.
pub mod access;

/// The state a call may touch, declared before it runs so the host can
/// serialize conflicting calls and let the rest proceed concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// The call may touch anything; it runs alone.
    Exclusive,
    /// The call touches only the listed registries and, optionally, balances.
    Keys {
        /// Owners whose registry records the call reads or writes.
        registries: Vec<AccountId>,
        /// True if the call reads or writes account balances.
        balances: bool,
    },
}

/// The base trait for any service dispatched by the host.
///
/// A service never commits anything itself: the host hands it a
/// transactional view of the state and commits the resulting write set only
/// when `handle_service_call` returns `Ok`.
pub trait BlockchainService: Any + Send + Sync {
    /// A unique, static, lowercase string identifier for the service.
    fn id(&self) -> &str;

    /// The version of the ABI the service expects from the host.
    fn abi_version(&self) -> u32;

    /// A string identifying the schema of the state this service reads/writes.
    fn state_schema(&self) -> &str;

    /// Provides access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Declares what a call to `method` with `params` may touch.
    ///
    /// The default is `Exclusive`, which is always correct.
    fn access_scope(
        &self,
        method: &str,
        params: &[u8],
        signer: &AccountId,
    ) -> Result<AccessScope, TransactionError> {
        let _ = (method, params, signer);
        Ok(AccessScope::Exclusive)
    }

    /// Handles a dispatched call. `params` and the returned output are
    /// SCALE-encoded.
    ///
    /// # Default Implementation
    /// Returns an `Unsupported` error.
    fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<Vec<u8>, TransactionError> {
        let _ = (state, params, ctx);
        Err(TransactionError::Unsupported(format!(
            "Service '{}' does not implement the method '{}'",
            self.id(),
            method
        )))
    }
}
