// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::{bson::doc, options::UpdateOptions};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        mongodb::{DbError, MongoDbCollection, MongoDbCollectionExt},
        MongoDb,
    },
    model::MilestoneIndex,
};

/// The singleton document that records how far the indexer has progressed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerStatusDocument {
    #[serde(default)]
    ledger_index: Option<MilestoneIndex>,
}

/// A collection to store the singleton indexer status.
pub struct IndexerStatusCollection {
    collection: mongodb::Collection<IndexerStatusDocument>,
}

impl MongoDbCollection for IndexerStatusCollection {
    const NAME: &'static str = "indexer_status";
    type Document = IndexerStatusDocument;

    fn instantiate(_db: &MongoDb, collection: mongodb::Collection<Self::Document>) -> Self {
        Self { collection }
    }

    fn collection(&self) -> &mongodb::Collection<Self::Document> {
        &self.collection
    }
}

impl IndexerStatusCollection {
    /// Gets the last milestone that was fully indexed.
    pub async fn get_ledger_index(&self) -> Result<Option<MilestoneIndex>, DbError> {
        Ok(self
            .find_one::<IndexerStatusDocument>(doc! {}, None)
            .await?
            .and_then(|doc| doc.ledger_index))
    }

    /// Sets the last milestone that was fully indexed.
    pub async fn set_ledger_index(&self, ledger_index: MilestoneIndex) -> Result<(), DbError> {
        self.update_one(
            doc! {},
            doc! {
                "$set": { "ledger_index": ledger_index }
            },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await?;
        Ok(())
    }
}
