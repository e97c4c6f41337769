// Path: crates/state/src/memory.rs
//! Ordered in-memory key-value store.

use civic_api::state::{StateAccess, StateScanIter};
use civic_types::codec;
use civic_types::error::{CoreError, StateError};
use std::collections::BTreeMap;
use std::ops::Bound::{Included, Unbounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Version tag written in front of every snapshot file.
const SNAPSHOT_MAGIC: &[u8; 8] = b"CIVICv1\0";

/// An ordered in-memory key-value store.
///
/// Snapshots are the magic tag followed by the SCALE encoding of every
/// `(key, value)` pair in key order, so two stores with equal contents
/// persist to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encodes the full contents as snapshot bytes.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, StateError> {
        let entries: Vec<(&Vec<u8>, &Vec<u8>)> = self.data.iter().collect();
        let body = codec::to_bytes_canonical(&entries).map_err(StateError::InvalidValue)?;
        Ok([SNAPSHOT_MAGIC.as_slice(), &body].concat())
    }

    /// Rebuilds a store from snapshot bytes.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, StateError> {
        let body = bytes
            .strip_prefix(SNAPSHOT_MAGIC.as_slice())
            .ok_or_else(|| StateError::Decode("missing snapshot header".into()))?;
        let entries: Vec<(Vec<u8>, Vec<u8>)> =
            codec::from_bytes_canonical(body).map_err(StateError::Decode)?;
        Ok(Self {
            data: entries.into_iter().collect(),
        })
    }

    /// Writes a snapshot to `path`, replacing any existing file.
    pub fn persist(&self, path: &Path) -> Result<(), CoreError> {
        let bytes = self.to_snapshot()?;
        let tmp = sibling_tmp_path(path);
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, path)?;
        log::debug!(
            "persisted {} keys ({} bytes) to {}",
            self.data.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Loads a snapshot from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let store = Self::from_snapshot(&bytes)?;
                log::debug!("loaded {} keys from {}", store.len(), path.display());
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no snapshot at {}; starting empty", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `path` with `.tmp` appended to its full file name, so the staging file
/// never coincides with the target.
fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl StateAccess for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.data.remove(key);
        }
        for (key, value) in inserts {
            self.data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let prefix = prefix.to_vec();
        let iter = self
            .data
            .range::<Vec<u8>, _>((Included(prefix.clone()), Unbounded))
            .take_while(move |(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))));
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(b"registry::a", b"1").unwrap();
        store.insert(b"registry::b", b"2").unwrap();
        store.insert(b"balance::a", b"3").unwrap();
        store
    }

    #[test]
    fn test_prefix_scan_stays_within_prefix() {
        let store = seeded();
        let keys: Vec<_> = store
            .prefix_scan(b"registry::")
            .unwrap()
            .map(|item| item.unwrap().0.to_vec())
            .collect();
        assert_eq!(keys, vec![b"registry::a".to_vec(), b"registry::b".to_vec()]);
        assert_eq!(store.prefix_scan(b"none::").unwrap().count(), 0);
    }

    #[test]
    fn test_batch_apply_deletes_then_inserts() {
        let mut store = seeded();
        store
            .batch_apply(
                &[(b"balance::a".to_vec(), b"9".to_vec())],
                &[b"balance::a".to_vec(), b"registry::b".to_vec()],
            )
            .unwrap();
        assert_eq!(store.get(b"balance::a").unwrap(), Some(b"9".to_vec()));
        assert_eq!(store.get(b"registry::b").unwrap(), None);
    }

    #[test]
    fn test_snapshot_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let store = seeded();
        store.persist(&path).unwrap();
        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_persist_to_tmp_named_target_stages_beside_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.tmp");
        assert_eq!(sibling_tmp_path(&path), dir.path().join("ledger.tmp.tmp"));

        let store = seeded();
        store.persist(&path).unwrap();
        store.persist(&path).unwrap();
        assert_eq!(MemoryStore::load(&path).unwrap(), store);
        assert!(!dir.path().join("ledger.tmp.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_empty_and_bad_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = MemoryStore::load(&dir.path().join("absent.bin")).unwrap();
        assert!(missing.is_empty());

        let err = MemoryStore::from_snapshot(b"garbage").unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
    }
}
