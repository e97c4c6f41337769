// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay that makes a service call atomic.

use crate::state::{StateAccess, StateKVPair, StateScanIter};
use civic_types::error::StateError;
use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::{Fuse, Peekable};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A batch of key-value pairs to be inserted or updated in the state.
pub type StateInserts = Vec<(Vec<u8>, Vec<u8>)>;

/// A batch of keys to be deleted from the state.
pub type StateDeletes = Vec<Vec<u8>>;

/// A complete set of state changes (inserts/updates and deletes) from one call.
pub type StateChangeSet = (StateInserts, StateDeletes);

/// The smallest key strictly greater than every key starting with `prefix`,
/// or `None` when no such bound exists (empty or all-`0xFF` prefix).
fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut bound = prefix.to_vec();
    while let Some(last) = bound.pop() {
        if last != 0xFF {
            bound.push(last + 1);
            return Some(bound);
        }
    }
    None
}

enum Step {
    Base,
    Shadowed,
    Write,
}

/// Merges a base scan with the overlay's pending writes, in key order.
/// Pending writes win over base entries; pending deletes hide them.
struct MergedScan<'a> {
    base: Peekable<Fuse<StateScanIter<'a>>>,
    writes: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl Iterator for MergedScan<'_> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match (self.base.peek(), self.writes.peek()) {
                (Some(Err(_)), _) => Step::Base,
                (Some(Ok((base_key, _))), Some((write_key, _))) => {
                    let base_key: &[u8] = base_key;
                    match base_key.cmp(write_key.as_slice()) {
                        Ordering::Less => Step::Base,
                        Ordering::Equal => Step::Shadowed,
                        Ordering::Greater => Step::Write,
                    }
                }
                (Some(Ok(_)), None) => Step::Base,
                (None, Some(_)) => Step::Write,
                (None, None) => return None,
            };

            match step {
                Step::Base => return self.base.next(),
                Step::Shadowed => {
                    self.base.next();
                }
                Step::Write => {}
            }
            // A `None` value is a pending delete; skip it and keep scanning.
            if let Some((key, Some(value))) = self.writes.next() {
                return Some(Ok((Arc::from(key.as_slice()), Arc::from(value.as_slice()))));
            }
        }
    }
}

/// An in-memory, copy-on-write overlay for any `StateAccess`.
///
/// Reads check the local write set first and fall through to `base`. Writes
/// never touch `base`: the host extracts them with `into_ordered_batch` and
/// commits them only when the call succeeded, so a failed call leaves the
/// canonical state exactly as it was.
#[derive(Clone)]
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state accessor.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// True if nothing was written or deleted through the overlay.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consumes the overlay and returns its writes in key order.
    pub fn into_ordered_batch(self) -> StateChangeSet {
        let mut inserts = Vec::new();
        let mut deletes = Vec::new();

        for (key, value) in self.writes {
            match value {
                Some(value) => inserts.push((key, value)),
                None => deletes.push(key),
            }
        }
        (inserts, deletes)
    }
}

impl StateAccess for StateOverlay<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        for (key, value) in inserts {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let base = self.base.prefix_scan(prefix)?.fuse().peekable();
        let end = match prefix_upper_bound(prefix) {
            Some(bound) => Excluded(bound),
            None => Unbounded,
        };
        let writes = self
            .writes
            .range((Included(prefix.to_vec()), end))
            .peekable();

        Ok(Box::new(MergedScan { base, writes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal ordered store used as the overlay base.
    #[derive(Default)]
    struct MapState(BTreeMap<Vec<u8>, Vec<u8>>);

    impl StateAccess for MapState {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
            Ok(self.0.get(key).cloned())
        }

        fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
            self.0.insert(key.to_vec(), value.to_vec());
            Ok(())
        }

        fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
            self.0.remove(key);
            Ok(())
        }

        fn batch_apply(
            &mut self,
            inserts: &[(Vec<u8>, Vec<u8>)],
            deletes: &[Vec<u8>],
        ) -> Result<(), StateError> {
            for key in deletes {
                self.delete(key)?;
            }
            for (key, value) in inserts {
                self.insert(key, value)?;
            }
            Ok(())
        }

        fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
            let items: Vec<_> = self
                .0
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))))
                .collect();
            Ok(Box::new(items.into_iter()))
        }
    }

    fn keys(scan: StateScanIter<'_>) -> Vec<Vec<u8>> {
        scan.map(|item| item.unwrap().0.to_vec()).collect()
    }

    #[test]
    fn test_writes_are_invisible_to_base_until_committed() {
        let mut base = MapState::default();
        base.insert(b"a", b"1").unwrap();

        let (inserts, deletes) = {
            let mut overlay = StateOverlay::new(&base);
            overlay.insert(b"a", b"2").unwrap();
            overlay.insert(b"b", b"3").unwrap();
            assert_eq!(overlay.get(b"a").unwrap(), Some(b"2".to_vec()));
            assert_eq!(base.get(b"a").unwrap(), Some(b"1".to_vec()));
            overlay.into_ordered_batch()
        };
        assert!(deletes.is_empty());

        base.batch_apply(&inserts, &deletes).unwrap();
        assert_eq!(base.get(b"a").unwrap(), Some(b"2".to_vec()));
        assert_eq!(base.get(b"b").unwrap(), Some(b"3".to_vec()));
    }

    #[test]
    fn test_dropped_overlay_leaves_base_untouched() {
        let mut base = MapState::default();
        base.insert(b"k", b"v").unwrap();
        {
            let mut overlay = StateOverlay::new(&base);
            overlay.delete(b"k").unwrap();
            assert_eq!(overlay.get(b"k").unwrap(), None);
            assert!(!overlay.is_empty());
        }
        assert_eq!(base.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_prefix_scan_merges_in_key_order() {
        let mut base = MapState::default();
        base.insert(b"p::1", b"base").unwrap();
        base.insert(b"p::3", b"base").unwrap();
        base.insert(b"p::5", b"base").unwrap();
        base.insert(b"q::1", b"other").unwrap();

        let mut overlay = StateOverlay::new(&base);
        overlay.insert(b"p::2", b"new").unwrap();
        overlay.insert(b"p::3", b"updated").unwrap();
        overlay.delete(b"p::5").unwrap();

        let scanned: Vec<_> = overlay
            .prefix_scan(b"p::")
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        let keys: Vec<_> = scanned.iter().map(|(k, _)| k.to_vec()).collect();
        assert_eq!(keys, vec![b"p::1".to_vec(), b"p::2".to_vec(), b"p::3".to_vec()]);
        assert_eq!(scanned[2].1.as_ref(), b"updated");
    }

    #[test]
    fn test_prefix_upper_bound_handles_ff_bytes() {
        assert_eq!(prefix_upper_bound(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_upper_bound(&[0x01, 0xFF]), Some(vec![0x02]));
        assert_eq!(prefix_upper_bound(&[0xFF, 0xFF]), None);
        assert_eq!(prefix_upper_bound(b""), None);

        let mut base = MapState::default();
        base.insert(&[0xFF, 0x01], b"x").unwrap();
        let mut overlay = StateOverlay::new(&base);
        overlay.insert(&[0xFF, 0x02], b"y").unwrap();
        assert_eq!(overlay.prefix_scan(&[0xFF]).unwrap().count(), 2);
        assert_eq!(keys(overlay.prefix_scan(b"").unwrap()).len(), 2);
    }
}
