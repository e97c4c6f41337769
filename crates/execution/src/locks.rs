// Path: crates/execution/src/locks.rs
//! Admission locks for concurrent calls.
//!
//! Lock order is fixed: the exclusive gate, then owner locks in ascending
//! `AccountId` order, then the balance lock. Every call acquires a prefix of
//! that order, so two calls can never wait on each other in a cycle.

use civic_api::services::AccessScope;
use civic_types::app::AccountId;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Lock handle for one owner's registry.
pub type OwnerLock = Arc<Mutex<()>>;

/// The locks guarding the ledger, keyed the way `AccessScope` names state.
#[derive(Debug, Default)]
pub struct LockTable {
    gate: RwLock<()>,
    /// Using parking_lot for faster non-async locks. One entry per owner ever
    /// locked; registries are never deleted, so entries are never pruned.
    owners: DashMap<AccountId, OwnerLock>,
    balances: Mutex<()>,
}

/// Held for the whole of a call, including its commit.
#[derive(Debug)]
pub enum ScopeGuard<'a> {
    Exclusive {
        _gate: RwLockWriteGuard<'a, ()>,
    },
    Keys {
        _gate: RwLockReadGuard<'a, ()>,
        _owners: Vec<MutexGuard<'a, ()>>,
        _balances: Option<MutexGuard<'a, ()>>,
    },
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the owner locks `scope` needs, sorted and deduplicated.
    ///
    /// Kept apart from `acquire` so the returned handles outlive the guards
    /// that borrow them.
    pub fn owner_handles(&self, scope: &AccessScope) -> Vec<OwnerLock> {
        let AccessScope::Keys { registries, .. } = scope else {
            return Vec::new();
        };
        let mut owners = registries.clone();
        owners.sort_unstable();
        owners.dedup();
        owners
            .iter()
            .map(|owner| {
                let entry = self.owners.entry(*owner).or_default();
                Arc::clone(entry.value())
            })
            .collect()
    }

    /// Blocks until every lock `scope` names is held.
    pub fn acquire<'a>(&'a self, scope: &AccessScope, handles: &'a [OwnerLock]) -> ScopeGuard<'a> {
        match scope {
            AccessScope::Exclusive => ScopeGuard::Exclusive {
                _gate: self.gate.write(),
            },
            AccessScope::Keys { balances, .. } => {
                let gate = self.gate.read();
                let owners = handles.iter().map(|h| h.lock()).collect();
                let balances = balances.then(|| self.balances.lock());
                ScopeGuard::Keys {
                    _gate: gate,
                    _owners: owners,
                    _balances: balances,
                }
            }
        }
    }

    /// Number of owners that have ever been locked.
    pub fn tracked_owners(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn keys(registries: Vec<AccountId>, balances: bool) -> AccessScope {
        AccessScope::Keys {
            registries,
            balances,
        }
    }

    #[test]
    fn test_handles_are_sorted_and_shared() {
        let table = LockTable::new();
        let a = AccountId([1u8; 32]);
        let b = AccountId([2u8; 32]);

        let first = table.owner_handles(&keys(vec![b, a, b], false));
        assert_eq!(first.len(), 2);
        let second = table.owner_handles(&keys(vec![a], false));
        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert_eq!(table.tracked_owners(), 2);
        assert!(table.owner_handles(&AccessScope::Exclusive).is_empty());
    }

    #[test]
    fn test_same_owner_calls_are_serialized() {
        let table = LockTable::new();
        let scope = keys(vec![AccountId([7u8; 32])], false);
        let inside = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let handles = table.owner_handles(&scope);
                    let _guard = table.acquire(&scope, &handles);
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    inside.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disjoint_owners_do_not_block_each_other() {
        let table = LockTable::new();
        let left = keys(vec![AccountId([1u8; 32])], false);
        let right = keys(vec![AccountId([2u8; 32])], false);

        let left_handles = table.owner_handles(&left);
        let _held = table.acquire(&left, &left_handles);

        // Would deadlock if the right owner shared the left owner's lock.
        let right_handles = table.owner_handles(&right);
        let _also = table.acquire(&right, &right_handles);
    }
}
