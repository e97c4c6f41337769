// Path: crates/execution/src/app/mod.rs
mod call;

pub use call::{ServiceCall, TxReceipt};

use crate::locks::LockTable;
use civic_api::services::access::ServiceDirectory;
use civic_api::services::{AccessScope, BlockchainService};
use civic_api::state::{StateAccess, StateOverlay};
use civic_api::transaction::context::TxContext;
use civic_services::bank::{TransferParams, BANK_SERVICE_ID};
use civic_services::registry::{
    AddSolutionParams, CreateProblemParams, ReleaseRewardParams, VoteSolutionParams,
    REGISTRY_SERVICE_ID,
};
use civic_services::{BankService, ProblemRegistryService};
use civic_state::MemoryStore;
use civic_types::app::{
    AccountId, Amount, Problem, ProblemId, ProblemRef, Registry, SolutionId,
};
use civic_types::codec;
use civic_types::config::{CivicConfig, RegistryParams};
use civic_types::error::{ErrorCode, TransactionError};
use parity_scale_codec::Decode;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Owns the ledger state and dispatches service calls against it.
///
/// # Atomicity
///
/// Every call runs against a `StateOverlay` over the committed store. The
/// overlay's write set is applied with one `batch_apply` only when the service
/// returns `Ok`; a rejected call leaves no trace besides its consumed
/// sequence number.
///
/// # Concurrency
///
/// Before running, a call takes the locks its `AccessScope` names. Calls on
/// different registries that move no value run in parallel; everything else
/// touching the same state is serialized.
pub struct ExecutionMachine {
    store: RwLock<MemoryStore>,
    services: ServiceDirectory,
    locks: LockTable,
    sequence: AtomicU64,
}

impl Debug for ExecutionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionMachine")
            .field("services", &self.services)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("entries", &self.store.read().len())
            .finish()
    }
}

impl ExecutionMachine {
    pub fn new(store: MemoryStore, params: RegistryParams) -> Self {
        tracing::debug!(target: "execution", routing = ?params.routing, entries = store.len(), "[ExecutionMachine] Starting.");
        let services: Vec<Arc<dyn BlockchainService>> = vec![
            Arc::new(ProblemRegistryService::new(params)),
            Arc::new(BankService),
        ];
        Self {
            store: RwLock::new(store),
            services: ServiceDirectory::new(services),
            locks: LockTable::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Builds a fresh ledger funded per `config.genesis`.
    pub fn from_genesis(config: &CivicConfig) -> Result<Self, TransactionError> {
        let machine = Self::new(MemoryStore::new(), config.registry.clone());
        for entry in &config.genesis.accounts {
            machine.deposit(&entry.account, entry.balance)?;
        }
        tracing::info!(
            target: "execution",
            event = "genesis_ready",
            accounts = config.genesis.accounts.len(),
            entries = machine.store.read().len()
        );
        Ok(machine)
    }

    pub fn services(&self) -> &ServiceDirectory {
        &self.services
    }

    /// Applies `call` and commits its writes if it succeeds.
    pub fn apply(&self, call: &ServiceCall) -> Result<TxReceipt, TransactionError> {
        self.dispatch(call, true)
    }

    /// Runs `call` exactly as `apply` would, then discards its writes.
    pub fn simulate(&self, call: &ServiceCall) -> Result<TxReceipt, TransactionError> {
        self.dispatch(call, false)
    }

    fn dispatch(&self, call: &ServiceCall, commit: bool) -> Result<TxReceipt, TransactionError> {
        let service = self.services.get_by_id(&call.service_id).ok_or_else(|| {
            TransactionError::Unsupported(format!("Unknown service '{}'", call.service_id))
        })?;
        let scope = service.access_scope(&call.method, &call.params, &call.signer)?;

        let result = self.run(&scope, call.signer, commit, |state, ctx| {
            service.handle_service_call(state, &call.method, &call.params, ctx)
        });
        match &result {
            Ok(receipt) => tracing::info!(
                target: "execution",
                event = "call_applied",
                service = %call.service_id,
                method = %call.method,
                signer = %call.signer,
                sequence = receipt.sequence,
                committed = receipt.committed,
                events = receipt.events.len()
            ),
            Err(e) => tracing::warn!(
                target: "execution",
                event = "call_rejected",
                service = %call.service_id,
                method = %call.method,
                signer = %call.signer,
                code = e.code(),
                error = %e
            ),
        }
        result
    }

    fn run<F>(
        &self,
        scope: &AccessScope,
        signer: AccountId,
        commit: bool,
        body: F,
    ) -> Result<TxReceipt, TransactionError>
    where
        F: FnOnce(&mut dyn StateAccess, &mut TxContext) -> Result<Vec<u8>, TransactionError>,
    {
        let handles = self.locks.owner_handles(scope);
        let _guard = self.locks.acquire(scope, &handles);

        let sequence = if commit {
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.sequence.load(Ordering::SeqCst)
        };
        let mut ctx = TxContext::new(sequence, signer);
        ctx.simulation = !commit;

        let (output, (inserts, deletes)) = {
            let store = self.store.read();
            let mut overlay = StateOverlay::new(&*store);
            let output = body(&mut overlay, &mut ctx)?;
            (output, overlay.into_ordered_batch())
        };

        if commit && !(inserts.is_empty() && deletes.is_empty()) {
            self.store.write().batch_apply(&inserts, &deletes)?;
            tracing::debug!(
                target: "execution",
                sequence,
                inserts = inserts.len(),
                deletes = deletes.len(),
                "[ExecutionMachine] Committed write set."
            );
        }

        Ok(TxReceipt {
            sequence,
            output,
            events: ctx.into_events(),
            committed: commit,
        })
    }

    // --- Typed entry points ---

    fn apply_typed<T: Decode>(&self, call: ServiceCall) -> Result<(T, TxReceipt), TransactionError> {
        let receipt = self.apply(&call)?;
        let output =
            codec::from_bytes_canonical(&receipt.output).map_err(TransactionError::Deserialization)?;
        Ok((output, receipt))
    }

    pub fn create_problem(
        &self,
        signer: AccountId,
        params: CreateProblemParams,
    ) -> Result<(ProblemRef, TxReceipt), TransactionError> {
        let call = ServiceCall::new(signer, REGISTRY_SERVICE_ID, "create_problem@v1", &params)?;
        let (id, receipt): (ProblemId, _) = self.apply_typed(call)?;
        Ok((ProblemRef::new(signer, id), receipt))
    }

    pub fn add_solution(
        &self,
        signer: AccountId,
        params: AddSolutionParams,
    ) -> Result<(SolutionId, TxReceipt), TransactionError> {
        let call = ServiceCall::new(signer, REGISTRY_SERVICE_ID, "add_solution@v1", &params)?;
        self.apply_typed(call)
    }

    /// Returns the solution's new vote count.
    pub fn vote_solution(
        &self,
        signer: AccountId,
        params: VoteSolutionParams,
    ) -> Result<(u64, TxReceipt), TransactionError> {
        let call = ServiceCall::new(signer, REGISTRY_SERVICE_ID, "vote_solution@v1", &params)?;
        self.apply_typed(call)
    }

    pub fn release_reward(
        &self,
        signer: AccountId,
        params: ReleaseRewardParams,
    ) -> Result<TxReceipt, TransactionError> {
        let call = ServiceCall::new(signer, REGISTRY_SERVICE_ID, "release_reward@v1", &params)?;
        self.apply(&call)
    }

    pub fn transfer(
        &self,
        signer: AccountId,
        params: TransferParams,
    ) -> Result<TxReceipt, TransactionError> {
        let call = ServiceCall::new(signer, BANK_SERVICE_ID, "transfer@v1", &params)?;
        self.apply(&call)
    }

    /// Mints `amount` into `account`. Host-only; no service method reaches it.
    pub fn deposit(&self, account: &AccountId, amount: Amount) -> Result<Amount, TransactionError> {
        let scope = AccessScope::Keys {
            registries: Vec::new(),
            balances: true,
        };
        let receipt = self.run(&scope, *account, true, |state, _ctx| {
            let balance = BankService::deposit(state, account, amount)?;
            codec::to_bytes_canonical(&balance).map_err(TransactionError::Serialization)
        })?;
        tracing::info!(target: "execution", event = "deposit", account = %account, amount);
        codec::from_bytes_canonical(&receipt.output).map_err(TransactionError::Deserialization)
    }

    // --- Queries ---

    pub fn registry(&self, owner: &AccountId) -> Result<Option<Registry>, TransactionError> {
        ProblemRegistryService::registry(&*self.store.read(), owner)
    }

    pub fn problem(&self, at: &ProblemRef) -> Result<Option<Problem>, TransactionError> {
        ProblemRegistryService::problem(&*self.store.read(), at)
    }

    pub fn balance_of(&self, account: &AccountId) -> Result<Amount, TransactionError> {
        BankService::balance_of(&*self.store.read(), account)
    }

    pub fn owners(&self) -> Result<Vec<AccountId>, TransactionError> {
        ProblemRegistryService::owners(&*self.store.read())
    }

    /// The number handed to the most recently applied call.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// A copy of the committed state.
    pub fn snapshot(&self) -> MemoryStore {
        self.store.read().clone()
    }

    pub fn into_store(self) -> MemoryStore {
        self.store.into_inner()
    }
}
