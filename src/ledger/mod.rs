// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The UTXO ledger engine.
//!
//! [`LedgerEngine`] owns the store handle and the single ledger write lock. Confirmations are applied through
//! [`LedgerEngine::apply_confirmation`], queries go through the iterators of the [`iteration`] module.

mod confirmation;
mod error;
pub mod iteration;
pub mod keys;
pub mod store;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

pub use self::{
    error::{CodecError, LedgerError},
    iteration::{OutputFilter, Page, PageCursor},
};
use self::store::{KvStore, LedgerRead};
use crate::model::{MilestoneIndex, Output, OutputId, Receipt, Spent, TreasuryOutput};

/// An aggregate view of the ledger taken from a single snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// The index of the last applied milestone.
    pub ledger_index: MilestoneIndex,
    /// The sum of the amounts of all unspent outputs.
    #[serde(with = "crate::model::util::stringify")]
    pub balance: u64,
    /// The number of unspent outputs.
    pub output_count: usize,
    /// The unspent treasury output.
    pub treasury: Option<TreasuryOutput>,
}

/// The ledger engine.
#[derive(Debug)]
pub struct LedgerEngine<S> {
    store: S,
    write_lock: RwLock<()>,
}

impl<S: KvStore> LedgerEngine<S> {
    /// Creates an engine on top of a store, which may already hold a ledger.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: RwLock::new(()),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Acquires the ledger write lock. Holding it is required by
    /// [`apply_confirmation_without_locking`](Self::apply_confirmation_without_locking).
    pub fn write_lock_ledger(&self) -> RwLockWriteGuard<'_, ()> {
        self.write_lock.write()
    }

    /// Acquires the ledger read lock, which keeps confirmations out while it is held.
    pub fn read_lock_ledger(&self) -> RwLockReadGuard<'_, ()> {
        self.write_lock.read()
    }

    /// The index of the last applied milestone.
    pub fn ledger_index(&self) -> Result<MilestoneIndex, LedgerError> {
        self.store.read_ledger_index()
    }

    /// Gets an output, spent or not. A missing output is an error.
    pub fn read_output(&self, output_id: &OutputId) -> Result<Output, LedgerError> {
        self.store.read_output(output_id)
    }

    /// Whether the output was ever created.
    pub fn contains_output(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        self.store.contains_output(output_id)
    }

    /// Whether the output is part of the unspent set.
    pub fn is_output_unspent(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        self.store.is_output_unspent(output_id)
    }

    /// Gets the spent record of an output.
    pub fn read_spent(&self, output_id: &OutputId) -> Result<Option<Spent>, LedgerError> {
        self.store.read_spent(output_id)
    }

    /// Gets the treasury output that has not been spent yet.
    pub fn unspent_treasury_output(&self) -> Result<Option<TreasuryOutput>, LedgerError> {
        self.store.unspent_treasury_output()
    }

    /// Gets the receipts, optionally only those for one legacy milestone.
    pub fn receipts(&self, migrated_at: Option<MilestoneIndex>) -> Result<Vec<Receipt>, LedgerError> {
        self.store.read_receipts(migrated_at)
    }

    /// Reads the ledger index, balance and treasury from one snapshot.
    pub fn ledger_state(&self) -> Result<LedgerState, LedgerError> {
        let _guard = self.read_lock_ledger();
        let snapshot = self.store.snapshot()?;
        let (balance, output_count) = iteration::compute_balance(&snapshot)?;
        Ok(LedgerState {
            ledger_index: snapshot.read_ledger_index()?,
            balance,
            output_count,
            treasury: snapshot.unspent_treasury_output()?,
        })
    }
}
