// Path: crates/types/src/app/registry.rs
//! On-ledger records of the civic bounty registry.
//!
//! Ownership is nested and by value: a `Registry` owns its `Problem`s and every
//! `Problem` owns its `Solution`s. The only cross references are the `owner`
//! and `solver` identity fields, which are plain data.

use crate::app::AccountId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Identifier of a problem, unique within one owner's registry.
pub type ProblemId = u64;
/// Identifier of a solution, unique within one problem.
pub type SolutionId = u64;
/// A value amount in the smallest transferable unit of the ledger.
pub type Amount = u64;

/// The first id handed out by a fresh registry and by a fresh problem.
pub const FIRST_ID: u64 = 1;

/// Opaque bytes handed to the registry by an external collaborator.
///
/// Used for content references (addresses of externally stored descriptions
/// and media) and for coordinates. The registry never interprets them. In
/// human-readable encodings they appear as a string when the bytes are valid
/// UTF-8, and as `0x`-prefixed hex otherwise.
#[derive(Encode, Decode, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct OpaqueBytes(pub Vec<u8>);

impl OpaqueBytes {
    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for OpaqueBytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for OpaqueBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Display for OpaqueBytes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}

impl Serialize for OpaqueBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OpaqueBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if let Some(hex_part) = s.strip_prefix("0x") {
            if let Ok(bytes) = hex::decode(hex_part) {
                return Ok(Self(bytes));
            }
        }
        Ok(Self(s.into_bytes()))
    }
}

/// A reference to externally stored content.
pub type ContentRef = OpaqueBytes;

/// A globally unique reference to a problem: ids are only unique within the
/// owner's registry, so the owner travels with the id.
#[derive(
    Encode, Decode, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash,
)]
pub struct ProblemRef {
    /// The identity whose registry holds the problem.
    pub owner: AccountId,
    /// The problem id within that registry.
    pub id: ProblemId,
}

impl ProblemRef {
    /// Creates a new problem reference.
    pub fn new(owner: AccountId, id: ProblemId) -> Self {
        Self { owner, id }
    }
}

impl core::fmt::Display for ProblemRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

/// One proposed fix for a problem and its vote tally.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Solution {
    /// Sequential id within the problem, starting at 1.
    pub id: SolutionId,
    /// The identity credited with the solution.
    pub solver: AccountId,
    /// Reference to the externally stored description of the fix.
    pub content_ref: ContentRef,
    /// Number of votes received. Only ever incremented.
    pub votes: u64,
}

/// Lifecycle of a problem. `Closed` is terminal.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    /// Accepting solutions and votes.
    #[default]
    Open,
    /// The bounty was released to the solver of `chosen`.
    Closed {
        /// The solution whose solver received the bounty.
        chosen: SolutionId,
    },
}

/// One civic issue with its bounty and proposed solutions.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Problem {
    /// Unique id within the owner's registry.
    pub id: ProblemId,
    /// The identity that created the problem. Immutable.
    pub owner: AccountId,
    /// Reference to the externally stored description and media.
    pub content_ref: ContentRef,
    /// Latitude, passed through unvalidated.
    pub lat: OpaqueBytes,
    /// Longitude, passed through unvalidated.
    pub lng: OpaqueBytes,
    /// The reward promised at creation. Never changes.
    pub bounty_amount: Amount,
    /// Open or closed with the chosen solution.
    pub status: ProblemStatus,
    /// Proposed solutions in submission order. Append-only.
    pub solutions: Vec<Solution>,
}

impl Problem {
    /// Returns true while the problem accepts solutions, votes and a release.
    pub fn is_open(&self) -> bool {
        matches!(self.status, ProblemStatus::Open)
    }

    /// The solution chosen at release, set exactly when the problem is closed.
    pub fn chosen(&self) -> Option<SolutionId> {
        match self.status {
            ProblemStatus::Open => None,
            ProblemStatus::Closed { chosen } => Some(chosen),
        }
    }

    /// The id the next appended solution receives.
    pub fn next_solution_id(&self) -> SolutionId {
        self.solutions.len() as SolutionId + FIRST_ID
    }

    /// Finds a solution by id.
    pub fn solution(&self, id: SolutionId) -> Option<&Solution> {
        self.solutions.iter().find(|s| s.id == id)
    }

    /// Finds a solution by id for mutation.
    pub fn solution_mut(&mut self, id: SolutionId) -> Option<&mut Solution> {
        self.solutions.iter_mut().find(|s| s.id == id)
    }
}

/// The per-owner collection of problems; the unit of exclusive ownership and
/// serialized mutation.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Registry {
    /// The id the next created problem receives. Always greater than every key
    /// in `problems`.
    pub next_problem_id: ProblemId,
    /// Problems keyed by id.
    pub problems: BTreeMap<ProblemId, Problem>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            next_problem_id: FIRST_ID,
            problems: BTreeMap::new(),
        }
    }
}

impl Registry {
    /// Hands out the next problem id and advances the counter. Ids are never
    /// reused.
    pub fn allocate_problem_id(&mut self) -> ProblemId {
        let id = self.next_problem_id;
        self.next_problem_id = id.saturating_add(1);
        id
    }
}
