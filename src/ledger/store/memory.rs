// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{collections::BTreeMap, ops::Bound, sync::Arc};

use parking_lot::RwLock;

use super::{BatchOp, Entry, KvRead, KvStore, StoreError, WriteBatch};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory store.
///
/// Snapshots share the map until the next write, which then copies it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<Arc<Map>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every entry, in key order.
    pub fn entries(&self) -> Vec<Entry> {
        self.map.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// A point-in-time view of a [`MemoryStore`].
#[derive(Clone, Debug)]
pub struct MemorySnapshot(Arc<Map>);

fn seek(map: &Map, prefix: &[u8], from: Bound<&[u8]>) -> Option<Entry> {
    let start = match from {
        Bound::Included(key) | Bound::Excluded(key) if key < prefix => Bound::Included(prefix),
        Bound::Unbounded => Bound::Included(prefix),
        bound => bound,
    };
    map.range::<[u8], _>((start, Bound::Unbounded))
        .next()
        .filter(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
}

impl KvRead for MemorySnapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.0.get(key).cloned())
    }

    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError> {
        Ok(seek(&self.0, prefix, from))
    }
}

impl KvRead for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.read().get(key).cloned())
    }

    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError> {
        Ok(seek(&self.map.read(), prefix, from))
    }
}

impl KvStore for MemoryStore {
    type Snapshot = MemorySnapshot;

    fn snapshot(&self) -> Result<Self::Snapshot, StoreError> {
        Ok(MemorySnapshot(self.map.read().clone()))
    }

    fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.map.write();
        let map = Arc::make_mut(&mut guard);
        for op in batch.into_ops() {
            match op {
                BatchOp::Put(key, value) => {
                    map.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn snapshot_is_isolated_from_writes() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::default();
        batch.put(b"k1".to_vec(), b"v1".to_vec());
        store.write(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        let mut batch = WriteBatch::default();
        batch.put(b"k2".to_vec(), b"v2".to_vec());
        batch.delete(b"k1".to_vec());
        store.write(batch).unwrap();

        assert_eq!(snapshot.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(snapshot.get(b"k2").unwrap(), None);
        assert_eq!(store.entries(), vec![(b"k2".to_vec(), b"v2".to_vec())]);
    }

    #[test]
    fn seek_respects_bounds() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::default();
        for key in [&b"p1"[..], b"p2", b"q1"] {
            batch.put(key.to_vec(), Vec::new());
        }
        store.write(batch).unwrap();

        assert_eq!(store.seek(b"p", Bound::Unbounded).unwrap().unwrap().0, b"p1");
        assert_eq!(store.seek(b"p", Bound::Included(b"p2")).unwrap().unwrap().0, b"p2");
        assert_eq!(store.seek(b"p", Bound::Excluded(b"p2")).unwrap(), None);
        assert_eq!(store.seek(b"r", Bound::Unbounded).unwrap(), None);
    }
}
