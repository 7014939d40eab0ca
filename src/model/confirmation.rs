// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Confirmation`] type.

use serde::{Deserialize, Serialize};

use super::{MilestoneIndex, Output, Receipt, Spent, TreasuryUpdate};

/// The ledger changes confirmed by a single milestone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// The index of the confirming milestone.
    pub milestone_index: MilestoneIndex,
    /// The outputs created by the milestone.
    pub new_outputs: Vec<Output>,
    /// The outputs consumed by the milestone.
    pub spents: Vec<Spent>,
    /// The treasury change, if the milestone carried one.
    pub treasury_update: Option<TreasuryUpdate>,
    /// The migration receipt, if the milestone carried one.
    pub receipt: Option<Receipt>,
}

impl Confirmation {
    /// Creates an empty confirmation for the given milestone.
    pub fn new(milestone_index: impl Into<MilestoneIndex>) -> Self {
        Self {
            milestone_index: milestone_index.into(),
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        self.new_outputs.extend(outputs);
        self
    }

    #[allow(missing_docs)]
    pub fn with_spents(mut self, spents: impl IntoIterator<Item = Spent>) -> Self {
        self.spents.extend(spents);
        self
    }

    #[allow(missing_docs)]
    pub fn with_treasury_update(mut self, update: TreasuryUpdate) -> Self {
        self.treasury_update = Some(update);
        self
    }

    #[allow(missing_docs)]
    pub fn with_receipt(mut self, receipt: Receipt) -> Self {
        self.receipt = Some(receipt);
        self
    }
}
