// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use super::{
    store::{KvStore, LedgerBatch, LedgerRead},
    LedgerEngine, LedgerError,
};
use crate::model::{Confirmation, MilestoneIndex, Output, OutputId, TreasuryOutput};

impl<S: KvStore> LedgerEngine<S> {
    /// Applies the ledger changes of one milestone under the ledger write lock.
    pub fn apply_confirmation(&self, confirmation: &Confirmation) -> Result<(), LedgerError> {
        let _guard = self.write_lock_ledger();
        self.apply_confirmation_without_locking(confirmation)
    }

    /// Applies the ledger changes of one milestone.
    ///
    /// The milestone must directly follow the ledger index, and every spent output must be unspent or created by the
    /// same milestone. Every precondition is checked before anything is written, and all changes are committed as one
    /// batch, so a rejected confirmation leaves the store untouched.
    ///
    /// The caller must hold the guard returned by [`write_lock_ledger`](Self::write_lock_ledger).
    #[instrument(skip_all, fields(milestone_index = %confirmation.milestone_index, created, consumed), err, level = "debug")]
    pub fn apply_confirmation_without_locking(&self, confirmation: &Confirmation) -> Result<(), LedgerError> {
        let ledger_index = self.store.read_ledger_index()?;
        if ledger_index.next() != Some(confirmation.milestone_index) {
            warn!(
                "Rejecting milestone {} on top of ledger index {}.",
                confirmation.milestone_index, ledger_index
            );
            return Err(LedgerError::OrderingViolation {
                ledger_index,
                milestone_index: confirmation.milestone_index,
            });
        }

        let mut created = HashMap::<OutputId, &Output>::with_capacity(confirmation.new_outputs.len());
        for output in &confirmation.new_outputs {
            if created.insert(output.output_id, output).is_some() || self.store.contains_output(&output.output_id)? {
                return Err(LedgerError::OutputAlreadyExists(output.output_id));
            }
        }

        let mut consumed = HashSet::with_capacity(confirmation.spents.len());
        for spent in &confirmation.spents {
            let output_id = spent.output_id();
            if !consumed.insert(output_id)
                || !(created.contains_key(&output_id) || self.store.is_output_unspent(&output_id)?)
            {
                return Err(LedgerError::OutputNotUnspent(output_id));
            }
        }

        if let Some(update) = &confirmation.treasury_update {
            let current = self.store.unspent_treasury_output()?.map(|t| t.milestone_id);
            if current != Some(update.spent.milestone_id) {
                return Err(LedgerError::TreasuryMismatch {
                    spent: update.spent.milestone_id,
                    current,
                });
            }
        }

        let mut batch = LedgerBatch::default();
        for spent in &confirmation.spents {
            let output_id = spent.output_id();
            if !created.contains_key(&output_id) {
                // The index entries are derived from the stored record, which is what created them.
                batch.delete_unspent(&self.store.read_output(&output_id)?);
            }
            batch.put_spent(spent)?;
        }
        for output in &confirmation.new_outputs {
            if consumed.contains(&output.output_id) {
                batch.put_output(output)?;
            } else {
                batch.put_unspent(output)?;
            }
        }
        if let Some(update) = &confirmation.treasury_update {
            batch.put_treasury_update(update)?;
        }
        if let Some(receipt) = &confirmation.receipt {
            batch.put_receipt(receipt)?;
        }
        batch.set_ledger_index(confirmation.milestone_index);

        debug!("Committing {} ledger writes.", batch.len());
        self.store.write(batch.into_inner())?;

        tracing::Span::current().record("created", confirmation.new_outputs.len());
        tracing::Span::current().record("consumed", confirmation.spents.len());
        Ok(())
    }

    /// Adds an output to the unspent set outside of a confirmation, as done while importing a snapshot.
    pub fn add_unspent_output(&self, output: &Output) -> Result<(), LedgerError> {
        let _guard = self.write_lock_ledger();
        if self.store.contains_output(&output.output_id)? {
            return Err(LedgerError::OutputAlreadyExists(output.output_id));
        }
        let mut batch = LedgerBatch::default();
        batch.put_unspent(output)?;
        Ok(self.store.write(batch.into_inner())?)
    }

    /// Sets the ledger index outside of a confirmation, as done after importing a snapshot.
    pub fn store_ledger_index(&self, index: MilestoneIndex) -> Result<(), LedgerError> {
        let _guard = self.write_lock_ledger();
        let mut batch = LedgerBatch::default();
        batch.set_ledger_index(index);
        Ok(self.store.write(batch.into_inner())?)
    }

    /// Stores the unspent treasury output outside of a confirmation, as done while importing a snapshot.
    pub fn store_unspent_treasury_output(&self, output: &TreasuryOutput) -> Result<(), LedgerError> {
        let _guard = self.write_lock_ledger();
        if let Some(current) = self.store.unspent_treasury_output()? {
            return Err(LedgerError::TreasuryMismatch {
                spent: output.milestone_id,
                current: Some(current.milestone_id),
            });
        }
        let mut batch = LedgerBatch::default();
        batch.put_treasury_output(output)?;
        Ok(self.store.write(batch.into_inner())?)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ledger::store::MemoryStore,
        model::{
            BasicOutput, Ed25519Address, Features, MessageId, MilestoneId, Spent, TransactionId, TreasuryUpdate,
        },
    };

    fn output(tx: u8, amount: u64) -> Output {
        Output::new(
            OutputId::new(TransactionId([tx; 32]), 0),
            MessageId([tx; 32]),
            1.into(),
            BasicOutput {
                amount,
                address: Ed25519Address([tx; 32]).into(),
                features: Features::default(),
            },
        )
    }

    fn spend(output: &Output, milestone_index: u32) -> Spent {
        Spent::new(output.clone(), TransactionId([0xff; 32]), milestone_index)
    }

    #[test]
    fn milestones_apply_in_sequence() {
        let engine = LedgerEngine::new(MemoryStore::new());
        engine
            .apply_confirmation(&Confirmation::new(1).with_outputs([output(1, 10)]))
            .unwrap();
        assert_eq!(engine.ledger_index().unwrap(), MilestoneIndex(1));

        let err = engine.apply_confirmation(&Confirmation::new(3)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OrderingViolation {
                ledger_index: MilestoneIndex(1),
                milestone_index: MilestoneIndex(3)
            }
        ));
        assert!(err.is_fatal());
        let err = engine.apply_confirmation(&Confirmation::new(1)).unwrap_err();
        assert!(matches!(err, LedgerError::OrderingViolation { .. }));
    }

    #[test]
    fn created_and_spent_in_one_milestone() {
        let engine = LedgerEngine::new(MemoryStore::new());
        let out = output(1, 10);
        engine
            .apply_confirmation(&Confirmation::new(1).with_outputs([out.clone()]).with_spents([spend(&out, 1)]))
            .unwrap();
        assert!(engine.contains_output(&out.output_id).unwrap());
        assert!(!engine.is_output_unspent(&out.output_id).unwrap());
        assert_eq!(engine.read_spent(&out.output_id).unwrap(), Some(spend(&out, 1)));
    }

    #[test]
    fn double_spend_is_rejected() {
        let engine = LedgerEngine::new(MemoryStore::new());
        let out = output(1, 10);
        engine
            .apply_confirmation(&Confirmation::new(1).with_outputs([out.clone()]))
            .unwrap();
        let err = engine
            .apply_confirmation(&Confirmation::new(2).with_spents([spend(&out, 2), spend(&out, 2)]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::OutputNotUnspent(id) if id == out.output_id));
        assert!(engine.is_output_unspent(&out.output_id).unwrap());
    }

    #[test]
    fn recreating_an_output_is_rejected() {
        let engine = LedgerEngine::new(MemoryStore::new());
        let out = output(1, 10);
        engine.add_unspent_output(&out).unwrap();
        let err = engine
            .apply_confirmation(&Confirmation::new(1).with_outputs([out.clone()]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::OutputAlreadyExists(_)));
        assert_eq!(engine.ledger_index().unwrap(), MilestoneIndex(0));
    }

    #[test]
    fn treasury_output_is_replaced() {
        let engine = LedgerEngine::new(MemoryStore::new());
        let first = TreasuryOutput::new(MilestoneId([1; 32]), 100);
        let second = TreasuryOutput::new(MilestoneId([2; 32]), 60);
        let update = |spent, created| TreasuryUpdate { spent, created };

        // Nothing to spend yet.
        let err = engine
            .apply_confirmation(&Confirmation::new(1).with_treasury_update(update(first, second)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::TreasuryMismatch { current: None, .. }));

        engine.store_unspent_treasury_output(&first).unwrap();
        assert!(engine.store_unspent_treasury_output(&second).is_err());

        engine
            .apply_confirmation(&Confirmation::new(1).with_treasury_update(update(first, second)))
            .unwrap();
        assert_eq!(engine.unspent_treasury_output().unwrap(), Some(second));
    }
}
