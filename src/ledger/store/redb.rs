// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{ops::Bound, path::Path};

use ::redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition};

use super::{BatchOp, Entry, KvRead, KvStore, StoreError, WriteBatch};

/// The single table holding the ledger namespace.
const LEDGER_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("ledger");

type LedgerTable = ReadOnlyTable<&'static [u8], &'static [u8]>;

macro_rules! impl_from_redb {
    ($($err:ident),*) => {
        $(
            impl From<::redb::$err> for StoreError {
                fn from(err: ::redb::$err) -> Self {
                    Self::backend(err)
                }
            }
        )*
    };
}

impl_from_redb!(DatabaseError, TransactionError, TableError, StorageError, CommitError);

/// A store persisted in a [`redb`](::redb) database file.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Opens the database at `path`, creating it if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        txn.open_table(LEDGER_TABLE)?;
        txn.commit()?;
        Ok(Self { db })
    }

    fn read_table(&self) -> Result<LedgerTable, StoreError> {
        Ok(self.db.begin_read()?.open_table(LEDGER_TABLE)?)
    }
}

/// A read transaction on a [`RedbStore`].
pub struct RedbSnapshot(LedgerTable);

fn get(table: &impl ReadableTable<&'static [u8], &'static [u8]>, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(table.get(key)?.map(|value| value.value().to_vec()))
}

fn seek(
    table: &impl ReadableTable<&'static [u8], &'static [u8]>,
    prefix: &[u8],
    from: Bound<&[u8]>,
) -> Result<Option<Entry>, StoreError> {
    let start = match from {
        Bound::Included(key) | Bound::Excluded(key) if key < prefix => Bound::Included(prefix),
        Bound::Unbounded => Bound::Included(prefix),
        bound => bound,
    };
    match table.range::<&[u8]>((start, Bound::Unbounded))?.next() {
        Some(entry) => {
            let (key, value) = entry?;
            Ok(key
                .value()
                .starts_with(prefix)
                .then(|| (key.value().to_vec(), value.value().to_vec())))
        }
        None => Ok(None),
    }
}

impl KvRead for RedbSnapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.0, key)
    }

    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError> {
        seek(&self.0, prefix, from)
    }
}

impl KvRead for RedbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.read_table()?, key)
    }

    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError> {
        seek(&self.read_table()?, prefix, from)
    }
}

impl KvStore for RedbStore {
    type Snapshot = RedbSnapshot;

    fn snapshot(&self) -> Result<Self::Snapshot, StoreError> {
        Ok(RedbSnapshot(self.read_table()?))
    }

    fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(LEDGER_TABLE)?;
            for op in batch.into_ops() {
                match op {
                    BatchOp::Put(key, value) => {
                        table.insert(key.as_slice(), value.as_slice())?;
                    }
                    BatchOp::Delete(key) => {
                        table.remove(key.as_slice())?;
                    }
                }
            }
        }
        // Dropping an uncommitted transaction discards every write of the batch.
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reopened_store_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            let mut batch = WriteBatch::default();
            batch.put(b"a1".to_vec(), b"one".to_vec());
            batch.put(b"a2".to_vec(), b"two".to_vec());
            store.write(batch).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get(b"a2").unwrap(), Some(b"two".to_vec()));
        assert_eq!(
            store.seek(b"a", Bound::Excluded(b"a1")).unwrap(),
            Some((b"a2".to_vec(), b"two".to_vec()))
        );
    }

    #[test]
    fn snapshot_does_not_see_later_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("ledger.redb")).unwrap();
        let snapshot = store.snapshot().unwrap();
        let mut batch = WriteBatch::default();
        batch.put(b"k".to_vec(), b"v".to_vec());
        store.write(batch).unwrap();
        assert_eq!(snapshot.get(b"k").unwrap(), None);
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
