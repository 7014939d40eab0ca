// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Spent`] record.

use serde::{Deserialize, Serialize};

use super::{Output, OutputId, TransactionId};
use crate::model::MilestoneIndex;

/// Records that an [`Output`] was consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spent {
    /// The consumed output.
    pub output: Output,
    /// The transaction that consumed the output.
    pub transaction_id: TransactionId,
    /// The milestone that confirmed the spend.
    pub milestone_index: MilestoneIndex,
}

#[allow(missing_docs)]
impl Spent {
    pub fn new(output: Output, transaction_id: TransactionId, milestone_index: impl Into<MilestoneIndex>) -> Self {
        Self {
            output,
            transaction_id,
            milestone_index: milestone_index.into(),
        }
    }

    pub fn output_id(&self) -> OutputId {
        self.output.output_id
    }

    pub fn amount(&self) -> u64 {
        self.output.amount()
    }
}
