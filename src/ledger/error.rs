// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson;
use thiserror::Error;

use super::store::StoreError;
use crate::model::{MilestoneId, MilestoneIndex, OutputId};

/// Failure to encode or decode a stored record.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CodecError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] bson::ser::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialize(#[from] bson::de::Error),
    #[error("malformed {0} record")]
    Malformed(&'static str),
}

/// The errors of the ledger engine.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum LedgerError {
    #[error("output {0} not found")]
    NotFound(OutputId),
    #[error("milestone {milestone_index} cannot be applied on top of ledger index {ledger_index}")]
    OrderingViolation {
        ledger_index: MilestoneIndex,
        milestone_index: MilestoneIndex,
    },
    #[error("output {0} is not unspent")]
    OutputNotUnspent(OutputId),
    #[error("output {0} already exists")]
    OutputAlreadyExists(OutputId),
    #[error("treasury output {spent} does not match the unspent treasury output {current:?}")]
    TreasuryMismatch {
        spent: MilestoneId,
        current: Option<MilestoneId>,
    },
    #[error("the unspent balance exceeds {}", u64::MAX)]
    BalanceOverflow,
    #[error("page cursor {0} does not belong to the queried index")]
    InvalidCursor(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Whether the error signals an upstream defect, after which no further confirmation may be applied.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OrderingViolation { .. }
                | Self::OutputNotUnspent(_)
                | Self::OutputAlreadyExists(_)
                | Self::TreasuryMismatch { .. }
        )
    }
}

impl From<bson::ser::Error> for LedgerError {
    fn from(value: bson::ser::Error) -> Self {
        Self::Codec(value.into())
    }
}

impl From<bson::de::Error> for LedgerError {
    fn from(value: bson::de::Error) -> Self {
        Self::Codec(value.into())
    }
}
