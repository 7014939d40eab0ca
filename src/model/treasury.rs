// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the treasury and receipt types.

use serde::{Deserialize, Serialize};

use super::{MilestoneId, MilestoneIndex};

/// The treasury output, holding the funds that are not yet migrated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryOutput {
    /// The milestone which created the treasury output.
    pub milestone_id: MilestoneId,
    /// The amount of funds held by the treasury.
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// Whether the treasury output was consumed by a later milestone.
    pub spent: bool,
}

impl TreasuryOutput {
    #[allow(missing_docs)]
    pub fn new(milestone_id: MilestoneId, amount: u64) -> Self {
        Self {
            milestone_id,
            amount,
            spent: false,
        }
    }
}

/// Replaces the current treasury output with a new one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryUpdate {
    /// The treasury output consumed by the milestone.
    pub spent: TreasuryOutput,
    /// The treasury output created by the milestone.
    pub created: TreasuryOutput,
}

/// A receipt of funds migrated into the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// The legacy milestone at which the funds were migrated.
    pub migrated_at: MilestoneIndex,
    /// The milestone which contained the receipt.
    pub milestone_index: MilestoneIndex,
    /// Whether this is the last receipt for `migrated_at`.
    pub is_final: bool,
    /// The serialized receipt payload.
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}
