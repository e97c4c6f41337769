// Path: crates/services/src/registry/mod.rs
//! The civic problem/solution/bounty registry.
//!
//! Each owner holds one `Registry` record under `registry::{owner}`. Every
//! operation loads that record, checks its rules against the in-memory copy
//! and writes the record back once at the end, so a rejected call performs no
//! write at all.

use crate::bank::BankService;
use crate::records;
use civic_api::services::{AccessScope, BlockchainService};
use civic_api::state::StateAccess;
use civic_api::transaction::context::TxContext;
use civic_types::app::{
    AccountId, Amount, ContentRef, OpaqueBytes, Problem, ProblemId, ProblemRef, ProblemStatus,
    Registry, RegistryEvent, Solution, SolutionId,
};
use civic_types::config::{RegistryParams, RegistryRouting};
use civic_types::error::{RegistryError, TransactionError};
use civic_types::keys::{owner_from_registry_key, registry_key, REGISTRY_KEY_PREFIX};
use parity_scale_codec::{Decode, Encode};
use std::any::Any;

/// Service id of the registry.
pub const REGISTRY_SERVICE_ID: &str = "registry";

// --- Service Method Parameter Structs (The Service's Public ABI) ---

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CreateProblemParams {
    pub content_ref: ContentRef,
    pub lat: OpaqueBytes,
    pub lng: OpaqueBytes,
    pub bounty_amount: Amount,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct AddSolutionParams {
    pub problem: ProblemRef,
    /// Must equal the signer. Kept explicit for delegated submission later on.
    pub solver: AccountId,
    pub content_ref: ContentRef,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct VoteSolutionParams {
    pub problem: ProblemRef,
    pub solution_id: SolutionId,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRewardParams {
    pub problem: ProblemRef,
    pub solution_id: SolutionId,
}

// --- Registry Service ---

#[derive(Default, Debug, Clone)]
pub struct ProblemRegistryService {
    params: RegistryParams,
}

impl ProblemRegistryService {
    pub fn new(params: RegistryParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RegistryParams {
        &self.params
    }

    /// Where vote and release look for the problem. Under `CallerRegistry`
    /// the owner named in the reference is ignored in favor of the caller.
    fn routed(&self, problem: &ProblemRef, caller: &AccountId) -> ProblemRef {
        match self.params.routing {
            RegistryRouting::ProblemOwner => *problem,
            RegistryRouting::CallerRegistry => ProblemRef::new(*caller, problem.id),
        }
    }

    fn load_existing<S: StateAccess + ?Sized>(
        state: &S,
        at: &ProblemRef,
    ) -> Result<Registry, TransactionError> {
        Self::registry(state, &at.owner)?.ok_or_else(|| RegistryError::ProblemNotFound(*at).into())
    }

    fn store<S: StateAccess + ?Sized>(
        state: &mut S,
        owner: &AccountId,
        registry: &Registry,
    ) -> Result<(), TransactionError> {
        records::write(state, &registry_key(owner), registry)
    }

    fn problem_mut<'r>(
        registry: &'r mut Registry,
        at: &ProblemRef,
    ) -> Result<&'r mut Problem, RegistryError> {
        registry
            .problems
            .get_mut(&at.id)
            .ok_or(RegistryError::ProblemNotFound(*at))
    }

    fn ensure_open(problem: &Problem, at: &ProblemRef) -> Result<(), RegistryError> {
        if problem.is_open() {
            Ok(())
        } else {
            Err(RegistryError::ProblemClosed(*at))
        }
    }

    // --- Queries ---

    /// Reads `owner`'s registry record, if one was ever created.
    pub fn registry<S: StateAccess + ?Sized>(
        state: &S,
        owner: &AccountId,
    ) -> Result<Option<Registry>, TransactionError> {
        records::read(state, &registry_key(owner))
    }

    /// Reads one problem.
    pub fn problem<S: StateAccess + ?Sized>(
        state: &S,
        at: &ProblemRef,
    ) -> Result<Option<Problem>, TransactionError> {
        Ok(Self::registry(state, &at.owner)?.and_then(|mut r| r.problems.remove(&at.id)))
    }

    /// Lists every identity that holds a registry, in key order.
    pub fn owners<S: StateAccess + ?Sized>(state: &S) -> Result<Vec<AccountId>, TransactionError> {
        let mut owners = Vec::new();
        for item in state.prefix_scan(REGISTRY_KEY_PREFIX)? {
            let (key, _) = item?;
            match owner_from_registry_key(&key) {
                Some(owner) => owners.push(owner),
                None => log::warn!(
                    "[Registry] Skipping malformed registry key of length {}",
                    key.len()
                ),
            }
        }
        Ok(owners)
    }

    // --- Operations ---

    /// Creates an empty registry for `owner` unless one exists. Idempotent.
    pub fn ensure_registry<S: StateAccess + ?Sized>(
        &self,
        state: &mut S,
        owner: &AccountId,
    ) -> Result<Registry, TransactionError> {
        if let Some(existing) = Self::registry(state, owner)? {
            return Ok(existing);
        }
        let registry = Registry::default();
        Self::store(state, owner, &registry)?;
        log::debug!("[Registry] Created registry for {}", owner);
        Ok(registry)
    }

    pub fn create_problem(
        &self,
        state: &mut dyn StateAccess,
        params: CreateProblemParams,
        ctx: &mut TxContext,
    ) -> Result<ProblemId, TransactionError> {
        let owner = ctx.signer_account_id;
        let mut registry = self.ensure_registry(state, &owner)?;

        let id = registry.allocate_problem_id();
        registry.problems.insert(
            id,
            Problem {
                id,
                owner,
                content_ref: params.content_ref,
                lat: params.lat,
                lng: params.lng,
                bounty_amount: params.bounty_amount,
                status: ProblemStatus::Open,
                solutions: Vec::new(),
            },
        );
        Self::store(state, &owner, &registry)?;

        let problem = ProblemRef::new(owner, id);
        log::info!(
            "[Registry] Problem {} created with bounty {}",
            problem,
            params.bounty_amount
        );
        ctx.emit(RegistryEvent::ProblemCreated {
            problem,
            bounty_amount: params.bounty_amount,
        });
        Ok(id)
    }

    pub fn add_solution(
        &self,
        state: &mut dyn StateAccess,
        params: AddSolutionParams,
        ctx: &mut TxContext,
    ) -> Result<SolutionId, TransactionError> {
        let caller = ctx.signer_account_id;
        let at = params.problem;
        let mut registry = Self::load_existing(state, &at)?;
        let problem = Self::problem_mut(&mut registry, &at)?;
        Self::ensure_open(problem, &at)?;

        if params.solver != caller {
            return Err(RegistryError::SolverMismatch {
                caller,
                solver: params.solver,
            }
            .into());
        }

        let solution_id = problem.next_solution_id();
        problem.solutions.push(Solution {
            id: solution_id,
            solver: params.solver,
            content_ref: params.content_ref,
            votes: 0,
        });
        Self::store(state, &at.owner, &registry)?;

        log::info!("[Registry] Solution {} added to problem {}", solution_id, at);
        ctx.emit(RegistryEvent::SolutionAdded {
            problem: at,
            solution_id,
            solver: params.solver,
        });
        Ok(solution_id)
    }

    /// Counts one vote. The same caller may vote any number of times.
    pub fn vote_solution(
        &self,
        state: &mut dyn StateAccess,
        params: VoteSolutionParams,
        ctx: &mut TxContext,
    ) -> Result<u64, TransactionError> {
        let voter = ctx.signer_account_id;
        let at = self.routed(&params.problem, &voter);
        let mut registry = Self::load_existing(state, &at)?;
        let problem = Self::problem_mut(&mut registry, &at)?;
        Self::ensure_open(problem, &at)?;

        let solution = problem
            .solution_mut(params.solution_id)
            .ok_or(RegistryError::SolutionNotFound {
                problem: at,
                solution_id: params.solution_id,
            })?;
        solution.votes = solution.votes.saturating_add(1);
        let votes = solution.votes;
        Self::store(state, &at.owner, &registry)?;

        log::debug!(
            "[Registry] Vote for solution {} on {}; tally {}",
            params.solution_id,
            at,
            votes
        );
        ctx.emit(RegistryEvent::SolutionVoted {
            problem: at,
            solution_id: params.solution_id,
            voter,
            votes,
        });
        Ok(votes)
    }

    /// Pays the bounty to the chosen solution's solver and closes the problem.
    ///
    /// The bounty is not escrowed at creation, so the owner must hold it now.
    pub fn release_reward(
        &self,
        state: &mut dyn StateAccess,
        params: ReleaseRewardParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let caller = ctx.signer_account_id;
        let at = self.routed(&params.problem, &caller);
        let mut registry = Self::load_existing(state, &at)?;
        let problem = Self::problem_mut(&mut registry, &at)?;

        if problem.owner != caller {
            return Err(RegistryError::NotOwner { caller, problem: at }.into());
        }
        Self::ensure_open(problem, &at)?;

        let solver = problem
            .solution(params.solution_id)
            .map(|s| s.solver)
            .ok_or(RegistryError::SolutionNotFound {
                problem: at,
                solution_id: params.solution_id,
            })?;
        let amount = problem.bounty_amount;
        let owner = problem.owner;

        BankService::transfer(state, &owner, &solver, amount, ctx)?;

        problem.status = ProblemStatus::Closed {
            chosen: params.solution_id,
        };
        Self::store(state, &at.owner, &registry)?;

        log::info!(
            "[Registry] Problem {} closed; {} paid to {} for solution {}",
            at,
            amount,
            solver,
            params.solution_id
        );
        ctx.emit(RegistryEvent::RewardReleased {
            problem: at,
            solution_id: params.solution_id,
            solver,
            amount,
        });
        Ok(())
    }
}

impl BlockchainService for ProblemRegistryService {
    fn id(&self) -> &str {
        REGISTRY_SERVICE_ID
    }

    fn abi_version(&self) -> u32 {
        1
    }

    fn state_schema(&self) -> &str {
        "v1"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn access_scope(
        &self,
        method: &str,
        params: &[u8],
        signer: &AccountId,
    ) -> Result<AccessScope, TransactionError> {
        let (owner, balances) = match method {
            "create_problem@v1" => (*signer, false),
            "add_solution@v1" => {
                let p: AddSolutionParams = records::decode_params(params)?;
                (p.problem.owner, false)
            }
            "vote_solution@v1" => {
                let p: VoteSolutionParams = records::decode_params(params)?;
                (self.routed(&p.problem, signer).owner, false)
            }
            "release_reward@v1" => {
                let p: ReleaseRewardParams = records::decode_params(params)?;
                (self.routed(&p.problem, signer).owner, true)
            }
            _ => return Ok(AccessScope::Exclusive),
        };
        Ok(AccessScope::Keys {
            registries: vec![owner],
            balances,
        })
    }

    fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<Vec<u8>, TransactionError> {
        match method {
            "create_problem@v1" => {
                let p = records::decode_params(params)?;
                records::encode_output(&self.create_problem(state, p, ctx)?)
            }
            "add_solution@v1" => {
                let p = records::decode_params(params)?;
                records::encode_output(&self.add_solution(state, p, ctx)?)
            }
            "vote_solution@v1" => {
                let p = records::decode_params(params)?;
                records::encode_output(&self.vote_solution(state, p, ctx)?)
            }
            "release_reward@v1" => {
                let p = records::decode_params(params)?;
                self.release_reward(state, p, ctx)?;
                Ok(Vec::new())
            }
            _ => Err(TransactionError::Unsupported(format!(
                "Registry does not support method '{}'",
                method
            ))),
        }
    }
}
