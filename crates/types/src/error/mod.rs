// Path: crates/types/src/error/mod.rs
//! Core error types for the civic bounty registry.

use crate::app::{AccountId, Amount, ProblemRef, SolutionId};
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// The failure categories a caller maps rejected operations onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A referenced problem or solution does not exist.
    Validation,
    /// The operation targets a problem that is already closed.
    StateConflict,
    /// The caller is not the identity the operation requires.
    Authorization,
    /// A value transfer could not complete.
    Transfer,
    /// Storage, codec or dispatch failure unrelated to the registry rules.
    Internal,
}

/// Errors related to the state store.
#[derive(Error, Debug)]
pub enum StateError {
    /// The provided value was invalid.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred during state deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// Errors raised by the problem registry rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No problem exists under the given reference.
    #[error("Problem {0} not found")]
    ProblemNotFound(ProblemRef),
    /// The problem exists but carries no solution with the given id.
    #[error("Solution {solution_id} not found on problem {problem}")]
    SolutionNotFound {
        /// The problem that was searched.
        problem: ProblemRef,
        /// The missing solution id.
        solution_id: SolutionId,
    },
    /// The problem has already been closed by a release.
    #[error("Problem {0} is closed")]
    ProblemClosed(ProblemRef),
    /// A solution may only credit the caller that submits it.
    #[error("Solver {solver} does not match caller {caller}")]
    SolverMismatch {
        /// The submitting identity.
        caller: AccountId,
        /// The identity the solution would credit.
        solver: AccountId,
    },
    /// Only the problem owner may release its bounty.
    #[error("Caller {caller} is not the owner of problem {problem}")]
    NotOwner {
        /// The identity that attempted the release.
        caller: AccountId,
        /// The problem whose owner differs.
        problem: ProblemRef,
    },
}

impl RegistryError {
    /// Maps the error onto its failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ProblemNotFound(_) | Self::SolutionNotFound { .. } => FailureKind::Validation,
            Self::ProblemClosed(_) => FailureKind::StateConflict,
            Self::SolverMismatch { .. } | Self::NotOwner { .. } => FailureKind::Authorization,
        }
    }
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::ProblemNotFound(_) => "REGISTRY_PROBLEM_NOT_FOUND",
            Self::SolutionNotFound { .. } => "REGISTRY_SOLUTION_NOT_FOUND",
            Self::ProblemClosed(_) => "REGISTRY_PROBLEM_CLOSED",
            Self::SolverMismatch { .. } => "REGISTRY_SOLVER_MISMATCH",
            Self::NotOwner { .. } => "REGISTRY_NOT_OWNER",
        }
    }
}

/// Errors raised while moving value between accounts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BankError {
    /// The debited account holds less than the requested amount.
    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        /// The debited account.
        account: AccountId,
        /// The amount the operation needed.
        required: Amount,
        /// The balance held at the time of the operation.
        available: Amount,
    },
    /// Crediting the account would overflow its balance.
    #[error("Balance overflow for {0}")]
    BalanceOverflow(AccountId),
}

impl ErrorCode for BankError {
    fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "BANK_INSUFFICIENT_FUNDS",
            Self::BalanceOverflow(_) => "BANK_BALANCE_OVERFLOW",
        }
    }
}

/// Errors related to transaction processing. Every entry operation returns this.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// An error occurred during serialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred during deserialization.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// An error originating from the registry rules.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    /// An error originating from a value transfer.
    #[error("Bank error: {0}")]
    Bank(#[from] BankError),
    /// An error originating from the state store.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// The requested service or method is not available.
    #[error("Unsupported call: {0}")]
    Unsupported(String),
}

impl TransactionError {
    /// Maps the error onto its failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Bank(_) => FailureKind::Transfer,
            Self::Serialization(_)
            | Self::Deserialization(_)
            | Self::State(_)
            | Self::Unsupported(_) => FailureKind::Internal,
        }
    }
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "TX_SERIALIZATION_ERROR",
            Self::Deserialization(_) => "TX_DESERIALIZATION_ERROR",
            Self::Registry(e) => e.code(),
            Self::Bank(e) => e.code(),
            Self::State(e) => e.code(),
            Self::Unsupported(_) => "TX_UNSUPPORTED",
        }
    }
}

impl From<parity_scale_codec::Error> for TransactionError {
    fn from(e: parity_scale_codec::Error) -> Self {
        TransactionError::State(StateError::Decode(e.to_string()))
    }
}

/// General errors outside the transaction path (configuration, parsing, I/O).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An account id string or byte slice was malformed.
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),
    /// A configuration document could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
    /// An error occurred in the state store.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAccountId(_) => "CORE_INVALID_ACCOUNT_ID",
            Self::Config(_) => "CORE_CONFIG_ERROR",
            Self::State(_) => "CORE_STATE_ERROR",
            Self::Io(_) => "CORE_IO_ERROR",
        }
    }
}
