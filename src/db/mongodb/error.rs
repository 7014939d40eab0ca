// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::model::MilestoneIndex;

/// The different errors that can happen with database access.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DbError {
    #[error("mongodb error: {0}")]
    MongoDb(#[from] mongodb::error::Error),
    #[error("bson serialization error: {0}")]
    BsonSerialization(#[from] mongodb::bson::ser::Error),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("indexer is at milestone {indexed}, cannot apply milestone {milestone_index}")]
    Gap {
        indexed: MilestoneIndex,
        milestone_index: MilestoneIndex,
    },
}
