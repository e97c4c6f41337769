// Path: crates/types/src/app/events.rs

use crate::app::{AccountId, Amount, ProblemRef, SolutionId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An observable state change produced by a committed operation.
///
/// Events are collected while a call executes and surface in its receipt only
/// when the call commits; a rejected call produces none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A problem was added to its owner's registry.
    ProblemCreated {
        /// The new problem.
        problem: ProblemRef,
        /// The promised bounty.
        bounty_amount: Amount,
    },
    /// A solution was appended to a problem.
    SolutionAdded {
        /// The problem the solution belongs to.
        problem: ProblemRef,
        /// The id assigned to the solution.
        solution_id: SolutionId,
        /// The identity credited with the solution.
        solver: AccountId,
    },
    /// A vote was counted for a solution.
    SolutionVoted {
        /// The problem the solution belongs to.
        problem: ProblemRef,
        /// The solution voted for.
        solution_id: SolutionId,
        /// The identity that cast the vote.
        voter: AccountId,
        /// The tally after this vote.
        votes: u64,
    },
    /// A problem was closed and its bounty paid out.
    RewardReleased {
        /// The closed problem.
        problem: ProblemRef,
        /// The chosen solution.
        solution_id: SolutionId,
        /// The identity that received the bounty.
        solver: AccountId,
        /// The amount paid.
        amount: Amount,
    },
    /// Value moved between two accounts.
    Transfer {
        /// The debited account.
        from: AccountId,
        /// The credited account.
        to: AccountId,
        /// The amount moved.
        amount: Amount,
    },
}
