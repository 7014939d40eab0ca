// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The ordered key-value store that holds the ledger.
//!
//! Backends only know about bytes: [`KvRead`] for point and prefix reads and [`KvStore`] for snapshots and atomic
//! batches. [`LedgerRead`] and [`LedgerBatch`] add the ledger records on top of any backend.

mod memory;
#[cfg(feature = "redb")]
mod redb;

use std::ops::Bound;

use mongodb::bson;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "redb")]
pub use self::redb::RedbStore;
pub use self::memory::{MemorySnapshot, MemoryStore};
use super::{error::CodecError, keys, LedgerError};
use crate::model::{MilestoneIndex, Output, OutputId, Receipt, Spent, TransactionId, TreasuryOutput, TreasuryUpdate};

/// The errors of a storage backend.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a backend error, preserving it as the source.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// A single key-value pair.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Read access to an ordered key-value namespace.
pub trait KvRead {
    /// Gets the value stored at `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Whether a value is stored at `key`.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns the first entry whose key starts with `prefix` and lies at or past `from`. An unbounded `from` starts
    /// at the prefix itself.
    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError>;
}

impl<T: KvRead + ?Sized> KvRead for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn seek(&self, prefix: &[u8], from: Bound<&[u8]>) -> Result<Option<Entry>, StoreError> {
        (**self).seek(prefix, from)
    }
}

/// An ordered key-value store that supports point-in-time snapshots and atomic batches.
pub trait KvStore: KvRead + Send + Sync {
    /// A consistent read view of the store.
    type Snapshot: KvRead + Send + 'static;

    /// Takes a snapshot of the current state.
    fn snapshot(&self) -> Result<Self::Snapshot, StoreError>;

    /// Applies every operation of the batch, or none of them.
    fn write(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// A list of writes committed together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

#[allow(missing_docs)]
impl WriteBatch {
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put(key, value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete(key));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Stored alongside the output record once the output is consumed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SpentRecord {
    transaction_id: TransactionId,
    milestone_index: MilestoneIndex,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bson::to_vec(value)?)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(bson::from_slice(bytes)?)
}

fn decode_ledger_index(bytes: &[u8]) -> Result<MilestoneIndex, CodecError> {
    let bytes: [u8; MilestoneIndex::LENGTH] = bytes.try_into().map_err(|_| CodecError::Malformed("ledger index"))?;
    Ok(u32::from_le_bytes(bytes).into())
}

/// Typed reads of the ledger records, available on stores and snapshots alike.
pub trait LedgerRead: KvRead {
    /// The index of the last applied milestone, or 0 for an empty ledger.
    fn read_ledger_index(&self) -> Result<MilestoneIndex, LedgerError> {
        Ok(match self.get(&keys::ledger_index())? {
            Some(bytes) => decode_ledger_index(&bytes)?,
            None => MilestoneIndex::default(),
        })
    }

    /// Gets an output, spent or not.
    fn read_output(&self, output_id: &OutputId) -> Result<Output, LedgerError> {
        self.read_output_opt(output_id)?.ok_or(LedgerError::NotFound(*output_id))
    }

    /// Gets an output, spent or not. A missing output is not an error.
    fn read_output_opt(&self, output_id: &OutputId) -> Result<Option<Output>, LedgerError> {
        match self.get(&keys::output(output_id))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether the output was ever created.
    fn contains_output(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        Ok(self.has(&keys::output(output_id))?)
    }

    /// Whether the output is part of the unspent set.
    fn is_output_unspent(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        Ok(self.has(&keys::unspent(output_id))?)
    }

    /// Gets the spent record of an output.
    fn read_spent(&self, output_id: &OutputId) -> Result<Option<Spent>, LedgerError> {
        let record = match self.get(&keys::spent(output_id))? {
            Some(bytes) => decode::<SpentRecord>(&bytes)?,
            None => return Ok(None),
        };
        Ok(Some(Spent {
            output: self.read_output(output_id)?,
            transaction_id: record.transaction_id,
            milestone_index: record.milestone_index,
        }))
    }

    /// Gets the treasury output that has not been spent yet.
    fn unspent_treasury_output(&self) -> Result<Option<TreasuryOutput>, LedgerError> {
        match self.seek(&keys::treasury_prefix(false), Bound::Unbounded)? {
            Some((_, bytes)) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Gets the receipts, optionally only those for one legacy milestone, ordered by migration.
    fn read_receipts(&self, migrated_at: Option<MilestoneIndex>) -> Result<Vec<Receipt>, LedgerError> {
        let prefix = keys::receipt_prefix(migrated_at);
        let mut receipts = Vec::new();
        let mut last: Option<Vec<u8>> = None;
        while let Some((key, bytes)) = self.seek(&prefix, last.as_deref().map_or(Bound::Unbounded, Bound::Excluded))? {
            receipts.push(decode(&bytes)?);
            last = Some(key);
        }
        Ok(receipts)
    }
}
impl<T: KvRead + ?Sized> LedgerRead for T {}

/// Collects the record changes of one milestone into a single [`WriteBatch`].
#[derive(Debug, Default)]
pub struct LedgerBatch {
    batch: WriteBatch,
}

impl LedgerBatch {
    /// Writes the output record and every index entry of an unspent output.
    pub fn put_unspent(&mut self, output: &Output) -> Result<(), LedgerError> {
        self.batch.put(keys::output(&output.output_id), encode(output)?);
        for key in keys::index_keys(output) {
            self.batch.put(key, Vec::new());
        }
        Ok(())
    }

    /// Writes only the output record, for outputs created and consumed by the same milestone.
    pub fn put_output(&mut self, output: &Output) -> Result<(), LedgerError> {
        self.batch.put(keys::output(&output.output_id), encode(output)?);
        Ok(())
    }

    /// Removes every index entry of an output from the unspent set. The output record is kept.
    pub fn delete_unspent(&mut self, output: &Output) {
        for key in keys::index_keys(output) {
            self.batch.delete(key);
        }
    }

    /// Writes the spent record.
    pub fn put_spent(&mut self, spent: &Spent) -> Result<(), LedgerError> {
        let record = SpentRecord {
            transaction_id: spent.transaction_id,
            milestone_index: spent.milestone_index,
        };
        self.batch.put(keys::spent(&spent.output_id()), encode(&record)?);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn set_ledger_index(&mut self, index: MilestoneIndex) {
        self.batch.put(keys::ledger_index(), index.0.to_le_bytes().to_vec());
    }

    /// Moves the spent treasury output aside and stores the created one as unspent.
    pub fn put_treasury_update(&mut self, update: &TreasuryUpdate) -> Result<(), LedgerError> {
        let spent = TreasuryOutput {
            spent: true,
            ..update.spent
        };
        self.batch.delete(keys::treasury(false, &spent.milestone_id));
        self.batch.put(keys::treasury(true, &spent.milestone_id), encode(&spent)?);
        self.put_treasury_output(&update.created)
    }

    /// Stores an unspent treasury output.
    pub fn put_treasury_output(&mut self, output: &TreasuryOutput) -> Result<(), LedgerError> {
        let output = TreasuryOutput { spent: false, ..*output };
        self.batch.put(keys::treasury(false, &output.milestone_id), encode(&output)?);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn put_receipt(&mut self, receipt: &Receipt) -> Result<(), LedgerError> {
        self.batch.put(keys::receipt(receipt.migrated_at, receipt.milestone_index), encode(receipt)?);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    #[allow(missing_docs)]
    pub fn into_inner(self) -> WriteBatch {
        self.batch
    }
}

/// Iterates lazily over the entries below a prefix of a snapshot, in key order.
///
/// Every step is one seek past the previously returned key, so dropping the iterator early costs nothing.
pub struct PrefixIter<R> {
    reader: R,
    prefix: Vec<u8>,
    from: Option<Bound<Vec<u8>>>,
}

impl<R: KvRead> PrefixIter<R> {
    /// Creates an iterator over every key starting with `prefix`.
    pub fn new(reader: R, prefix: Vec<u8>) -> Self {
        Self::starting_at(reader, prefix, None)
    }

    /// Creates an iterator that starts at `start` (inclusive) instead of at the prefix.
    pub fn starting_at(reader: R, prefix: Vec<u8>, start: Option<Vec<u8>>) -> Self {
        Self {
            reader,
            prefix,
            from: Some(start.map_or(Bound::Unbounded, Bound::Included)),
        }
    }

    /// The reader the entries are taken from.
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

impl<R: KvRead> Iterator for PrefixIter<R> {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.from.take()?;
        let from_ref = match &from {
            Bound::Included(key) => Bound::Included(key.as_slice()),
            Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
            Bound::Unbounded => Bound::Unbounded,
        };
        match self.reader.seek(&self.prefix, from_ref) {
            Ok(Some((key, value))) => {
                self.from = Some(Bound::Excluded(key.clone()));
                Some(Ok((key, value)))
            }
            Ok(None) => None,
            // The iterator is fused after an error.
            Err(e) => Some(Err(e)),
        }
    }
}
