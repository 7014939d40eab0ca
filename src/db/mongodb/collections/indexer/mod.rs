// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A queryable mirror of the unspent outputs, one collection per output kind.

mod alias;
mod basic;
mod foundry;
mod nft;
mod queries;
mod status;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    error::Error,
    options::{FindOneOptions, IndexOptions, InsertManyOptions},
    IndexModel,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

pub use self::{
    alias::{AliasOutputDocument, AliasOutputsQuery},
    basic::{BasicOutputDocument, BasicOutputsQuery},
    foundry::{FoundryOutputDocument, FoundryOutputsQuery},
    nft::{NftOutputDocument, NftOutputsQuery},
    status::{IndexerStatusCollection, IndexerStatusDocument},
};
use crate::{
    db::{
        mongodb::{DbError, InsertIgnoreDuplicatesExt, MongoDbCollection, MongoDbCollectionExt},
        MongoDb,
    },
    model::{Confirmation, IndexedId, MilestoneIndex, Output, OutputId, OutputKind},
};

/// A document of one of the indexer collections.
pub trait IndexerDocument: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// The name of the collection holding this document.
    const COLLECTION: &'static str;
    /// The kind of output mirrored by this document.
    const KIND: OutputKind;
    /// Optional address and tag fields which get their own index.
    const INDEXED_FIELDS: &'static [&'static str];

    /// Creates the document for an output, if the output is of the matching kind.
    fn from_output(output: &Output) -> Option<Self>;
}

/// The collection of indexed outputs of a single kind.
pub struct IndexerCollection<D> {
    collection: mongodb::Collection<D>,
}

/// Indexed basic outputs.
pub type BasicOutputCollection = IndexerCollection<BasicOutputDocument>;
/// Indexed alias outputs.
pub type AliasOutputCollection = IndexerCollection<AliasOutputDocument>;
/// Indexed NFT outputs.
pub type NftOutputCollection = IndexerCollection<NftOutputDocument>;
/// Indexed foundry outputs.
pub type FoundryOutputCollection = IndexerCollection<FoundryOutputDocument>;

#[async_trait]
impl<D: IndexerDocument> MongoDbCollection for IndexerCollection<D> {
    const NAME: &'static str = D::COLLECTION;
    type Document = D;

    fn instantiate(_db: &MongoDb, collection: mongodb::Collection<Self::Document>) -> Self {
        Self { collection }
    }

    fn collection(&self) -> &mongodb::Collection<Self::Document> {
        &self.collection
    }

    async fn create_indexes(&self) -> Result<(), Error> {
        self.create_index(
            IndexModel::builder()
                .keys(doc! { "output_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("output_id_index".to_string())
                        .build(),
                )
                .build(),
            None,
        )
        .await?;

        self.create_index(
            IndexModel::builder()
                .keys(doc! { "milestone_index": 1, "output_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("output_milestone_index".to_string())
                        .build(),
                )
                .build(),
            None,
        )
        .await?;

        for &field in D::INDEXED_FIELDS {
            self.create_index(
                IndexModel::builder()
                    .keys(doc! { field: 1 })
                    .options(
                        IndexOptions::builder()
                            .name(format!("output_{field}_index"))
                            .partial_filter_expression(doc! {
                                field: { "$exists": true },
                            })
                            .build(),
                    )
                    .build(),
                None,
            )
            .await?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct OutputResult {
    pub output_id: OutputId,
    pub milestone_index: MilestoneIndex,
}

/// A page of indexed outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputsResult {
    /// The outputs of this page, ordered by milestone and output id.
    pub outputs: Vec<OutputResult>,
    /// Where the next page starts, if there is one.
    pub cursor: Option<IndexerCursor>,
}

/// Resumes a paginated indexer query at the first output that was not returned yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct IndexerCursor {
    pub milestone_index: MilestoneIndex,
    pub output_id: OutputId,
}

impl IndexerCursor {
    const LENGTH: usize = MilestoneIndex::LENGTH + OutputId::LENGTH;
}

impl From<OutputResult> for IndexerCursor {
    fn from(value: OutputResult) -> Self {
        Self {
            milestone_index: value.milestone_index,
            output_id: value.output_id,
        }
    }
}

impl fmt::Display for IndexerCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.milestone_index.to_be_bytes().to_vec();
        bytes.extend_from_slice(self.output_id.as_ref());
        write!(f, "{}", prefix_hex::encode(bytes))
    }
}

impl FromStr for IndexerCursor {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = prefix_hex::decode::<[u8; Self::LENGTH]>(s).map_err(|e| DbError::InvalidCursor(e.to_string()))?;
        let (milestone_index, output_id) = bytes.split_at(MilestoneIndex::LENGTH);
        let mut index = [0; MilestoneIndex::LENGTH];
        index.copy_from_slice(milestone_index);
        Ok(Self {
            milestone_index: u32::from_be_bytes(index).into(),
            output_id: OutputId::try_from(output_id).map_err(|e| DbError::InvalidCursor(e.to_string()))?,
        })
    }
}

impl From<IndexedId> for Bson {
    fn from(id: IndexedId) -> Self {
        match id {
            IndexedId::Alias(id) => id.into(),
            IndexedId::Nft(id) => id.into(),
            IndexedId::Foundry(id) => id.into(),
        }
    }
}

impl<D: IndexerDocument> IndexerCollection<D> {
    /// Gets the outputs that match the provided query.
    ///
    /// A `page_size` of zero returns every match. Otherwise at most `page_size` outputs are returned, together with
    /// a cursor pointing at the following output.
    pub async fn get_outputs<Q>(
        &self,
        query: Q,
        page_size: usize,
        cursor: Option<IndexerCursor>,
    ) -> Result<OutputsResult, DbError>
    where
        bson::Document: From<Q>,
    {
        let mut queries = vec![bson::Document::from(query)];
        if let Some(IndexerCursor {
            milestone_index,
            output_id,
        }) = cursor
        {
            queries.push(doc! { "$or": [
                doc! { "milestone_index": { "$gt": milestone_index } },
                doc! {
                    "milestone_index": milestone_index,
                    "output_id": { "$gte": output_id }
                },
            ] });
        }

        let mut pipeline = vec![
            doc! { "$match": { "$and": queries } },
            doc! { "$sort": { "milestone_index": 1, "output_id": 1 } },
        ];
        if page_size > 0 {
            // One more than requested tells whether there is a next page.
            pipeline.push(doc! { "$limit": page_size as i64 + 1 });
        }
        pipeline.push(doc! { "$project": {
            "_id": 0,
            "output_id": 1,
            "milestone_index": 1,
        } });

        let mut outputs = self
            .aggregate::<OutputResult>(pipeline, None)
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        let cursor = if page_size > 0 && outputs.len() > page_size {
            outputs.pop().map(IndexerCursor::from)
        } else {
            None
        };

        Ok(OutputsResult { outputs, cursor })
    }

    /// Counts the indexed outputs that match the provided query.
    pub async fn count_outputs<Q>(&self, query: Q) -> Result<usize, DbError>
    where
        bson::Document: From<Q>,
    {
        Ok(self.count(bson::Document::from(query)).await?)
    }

    async fn insert_outputs<'a>(&self, outputs: impl IntoIterator<Item = &'a Output>) -> Result<usize, DbError> {
        let docs = outputs
            .into_iter()
            .filter(|output| output.kind() == D::KIND)
            .filter_map(D::from_output)
            .collect::<Vec<_>>();
        if docs.is_empty() {
            return Ok(0);
        }
        let count = docs.len();
        let result = InsertIgnoreDuplicatesExt::<D>::insert_many_ignore_duplicates(
            self,
            docs,
            InsertManyOptions::builder().ordered(false).build(),
        )
        .await?;
        Ok(count - result.ignored)
    }

    async fn remove_outputs(&self, output_ids: Vec<OutputId>) -> Result<u64, DbError> {
        if output_ids.is_empty() {
            return Ok(0);
        }
        Ok(self
            .delete_many(doc! { "output_id": { "$in": output_ids } }, None)
            .await?
            .deleted_count)
    }
}

/// Mirrors confirmed milestones into the indexer collections.
#[derive(Clone, Debug)]
pub struct Indexer {
    db: MongoDb,
}

impl Indexer {
    /// Creates an indexer on top of the given database.
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// The underlying database.
    pub fn db(&self) -> &MongoDb {
        &self.db
    }

    /// Creates all indexer collections and their indexes.
    pub async fn create_indexes(&self) -> Result<(), DbError> {
        self.db.create_indexes::<BasicOutputCollection>().await?;
        self.db.create_indexes::<AliasOutputCollection>().await?;
        self.db.create_indexes::<NftOutputCollection>().await?;
        self.db.create_indexes::<FoundryOutputCollection>().await?;
        self.db.create_indexes::<IndexerStatusCollection>().await?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn basic_outputs(&self) -> BasicOutputCollection {
        self.db.collection()
    }

    #[allow(missing_docs)]
    pub fn alias_outputs(&self) -> AliasOutputCollection {
        self.db.collection()
    }

    #[allow(missing_docs)]
    pub fn nft_outputs(&self) -> NftOutputCollection {
        self.db.collection()
    }

    #[allow(missing_docs)]
    pub fn foundry_outputs(&self) -> FoundryOutputCollection {
        self.db.collection()
    }

    fn status(&self) -> IndexerStatusCollection {
        self.db.collection()
    }

    /// The last milestone that was fully mirrored, if any.
    pub async fn ledger_index(&self) -> Result<Option<MilestoneIndex>, DbError> {
        self.status().get_ledger_index().await
    }

    /// Gets the current output carrying the given alias, NFT or foundry id.
    ///
    /// A null id does not identify a single output and yields `None`.
    pub async fn get_output_by_indexed_id(&self, id: impl Into<IndexedId>) -> Result<Option<OutputResult>, DbError> {
        let id = id.into();
        if id.is_null() {
            return Ok(None);
        }
        let filter = doc! { "_id": id };
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 0, "output_id": 1, "milestone_index": 1 })
            .build();
        Ok(match id {
            IndexedId::Alias(_) => self.alias_outputs().find_one::<OutputResult>(filter, options).await?,
            IndexedId::Nft(_) => self.nft_outputs().find_one::<OutputResult>(filter, options).await?,
            IndexedId::Foundry(_) => self.foundry_outputs().find_one::<OutputResult>(filter, options).await?,
        })
    }

    /// Inserts outputs into the collection of their kind and returns how many were new. Outputs which are already
    /// indexed are skipped.
    pub async fn insert_outputs(&self, outputs: &[&Output]) -> Result<usize, DbError> {
        let outputs = || outputs.iter().copied();
        Ok(self.basic_outputs().insert_outputs(outputs()).await?
            + self.alias_outputs().insert_outputs(outputs()).await?
            + self.nft_outputs().insert_outputs(outputs()).await?
            + self.foundry_outputs().insert_outputs(outputs()).await?)
    }

    /// Removes the outputs with the given ids from the collection of their kind.
    pub async fn remove_outputs(
        &self,
        outputs: impl IntoIterator<Item = (OutputKind, OutputId)>,
    ) -> Result<u64, DbError> {
        let (mut basic, mut alias, mut nft, mut foundry) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        for (kind, output_id) in outputs {
            match kind {
                OutputKind::Basic => basic.push(output_id),
                OutputKind::Alias => alias.push(output_id),
                OutputKind::Nft => nft.push(output_id),
                OutputKind::Foundry => foundry.push(output_id),
                OutputKind::Treasury => (),
            }
        }
        Ok(self.basic_outputs().remove_outputs(basic).await?
            + self.alias_outputs().remove_outputs(alias).await?
            + self.nft_outputs().remove_outputs(nft).await?
            + self.foundry_outputs().remove_outputs(foundry).await?)
    }

    /// Replaces everything indexed with the given unspent set, recorded as the state at `ledger_index`.
    #[instrument(skip_all, fields(ledger_index = %ledger_index, created), err, level = "debug")]
    pub async fn import_unspent_outputs(&self, outputs: &[&Output], ledger_index: MilestoneIndex) -> Result<(), DbError> {
        self.basic_outputs().delete_many(doc! {}, None).await?;
        self.alias_outputs().delete_many(doc! {}, None).await?;
        self.nft_outputs().delete_many(doc! {}, None).await?;
        self.foundry_outputs().delete_many(doc! {}, None).await?;

        let created = self.insert_outputs(outputs).await?;
        tracing::Span::current().record("created", created);

        self.status().set_ledger_index(ledger_index).await
    }

    /// Mirrors a confirmed milestone.
    ///
    /// Milestones at or below the indexed ledger index are skipped, which makes replaying a feed after a restart
    /// safe. A milestone that does not directly follow the indexed one is rejected.
    #[instrument(
        skip_all,
        fields(milestone_index = %confirmation.milestone_index, created, consumed),
        err,
        level = "debug"
    )]
    pub async fn apply_confirmation(&self, confirmation: &Confirmation) -> Result<(), DbError> {
        let milestone_index = confirmation.milestone_index;
        if let Some(indexed) = self.ledger_index().await? {
            if milestone_index <= indexed {
                debug!("milestone {milestone_index} already indexed");
                return Ok(());
            }
            if indexed.next() != Some(milestone_index) {
                return Err(DbError::Gap {
                    indexed,
                    milestone_index,
                });
            }
        }

        let consumed = self
            .remove_outputs(confirmation.spents.iter().map(|s| (s.output.kind(), s.output_id())))
            .await?;
        tracing::Span::current().record("consumed", consumed);

        let spent_ids = confirmation.spents.iter().map(|s| s.output_id()).collect::<Vec<_>>();
        let created = confirmation
            .new_outputs
            .iter()
            .filter(|o| !spent_ids.contains(&o.output_id))
            .collect::<Vec<_>>();
        let created = self.insert_outputs(&created).await?;
        tracing::Span::current().record("created", created);

        self.status().set_ledger_index(milestone_index).await?;
        Ok(())
    }
}
