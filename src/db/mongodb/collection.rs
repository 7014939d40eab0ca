// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Borrow;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use mongodb::{
    bson::{self, Document},
    error::{Error, ErrorKind},
    options::{AggregateOptions, CreateIndexOptions, DeleteOptions, FindOneOptions, InsertManyOptions, UpdateOptions},
    results::{CreateIndexResult, DeleteResult, InsertManyResult, UpdateResult},
    IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};

use super::MongoDb;

const DUPLICATE_KEY_CODE: i32 = 11000;
const NAMESPACE_EXISTS_CODE: i32 = 48;

/// A MongoDB collection.
#[async_trait]
pub trait MongoDbCollection {
    /// The collection name.
    const NAME: &'static str;
    /// The document schema.
    type Document: Send + Sync;

    /// Creates an instance of this collection type.
    fn instantiate(db: &MongoDb, collection: mongodb::Collection<Self::Document>) -> Self;

    /// Gets the underlying MongoDB collection. This must return a collection of the type
    /// specified by this trait, which will be coerced if necessary.
    fn collection(&self) -> &mongodb::Collection<Self::Document>;

    /// Coerce the underlying collection to the needed type.
    fn with_type<T>(&self) -> mongodb::Collection<T> {
        self.collection().clone_with_type()
    }

    /// Creates the collection. A collection that already exists is left as is.
    async fn create_collection(&self, db: &MongoDb) -> Result<(), Error> {
        match db.db().create_collection(Self::NAME, None).await {
            Err(e) => match &*e.kind {
                ErrorKind::Command(c) if c.code == NAMESPACE_EXISTS_CODE => Ok(()),
                _ => Err(e),
            },
            ok => ok,
        }
    }

    /// Creates the collection indexes.
    async fn create_indexes(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// An extension trait which wraps the basic functionality of a mongodb
/// [`Collection`](mongodb::Collection) that coerces the document type
/// into the provided generic.
#[async_trait]
pub trait MongoDbCollectionExt: MongoDbCollection {
    /// Calls [`mongodb::Collection::create_index()`] and coerces the document type.
    async fn create_index(
        &self,
        index: IndexModel,
        options: impl Into<Option<CreateIndexOptions>> + Send + Sync,
    ) -> Result<CreateIndexResult, Error> {
        self.collection().create_index(index, options).await
    }

    /// Calls [`mongodb::Collection::aggregate()`] and coerces the document type.
    async fn aggregate<T: DeserializeOwned>(
        &self,
        pipeline: impl IntoIterator<Item = Document> + Send + Sync,
        options: impl Into<Option<AggregateOptions>> + Send + Sync,
    ) -> Result<Box<dyn Stream<Item = Result<T, Error>> + Unpin + Send>, Error> {
        Ok(Box::new(
            self.collection()
                .aggregate(pipeline, options)
                .await?
                .map(|doc| Ok(bson::from_document::<T>(doc?)?)),
        ))
    }

    /// Calls [`mongodb::Collection::find_one()`] and coerces the document type.
    async fn find_one<T: DeserializeOwned + Unpin + Send + Sync>(
        &self,
        filter: impl Into<Option<Document>> + Send + Sync,
        options: impl Into<Option<FindOneOptions>> + Send + Sync,
    ) -> Result<Option<T>, Error> {
        self.with_type().find_one(filter, options).await
    }

    /// Calls [`mongodb::Collection::insert_many()`] and coerces the document type.
    async fn insert_many<T: Serialize + Send + Sync>(
        &self,
        docs: impl IntoIterator<Item = impl Borrow<T> + Send + Sync> + Send + Sync,
        options: impl Into<Option<InsertManyOptions>> + Send + Sync,
    ) -> Result<InsertManyResult, Error> {
        self.with_type().insert_many(docs, options).await
    }

    /// Calls [`mongodb::Collection::update_one()`].
    async fn update_one(
        &self,
        doc: Document,
        update: Document,
        options: impl Into<Option<UpdateOptions>> + Send + Sync,
    ) -> Result<UpdateResult, Error> {
        self.collection().update_one(doc, update, options).await
    }

    /// Calls [`mongodb::Collection::delete_many()`].
    async fn delete_many(
        &self,
        query: Document,
        options: impl Into<Option<DeleteOptions>> + Send + Sync,
    ) -> Result<DeleteResult, Error> {
        self.collection().delete_many(query, options).await
    }

    /// Returns the number of documents in the collection that match the filter.
    async fn count(&self, filter: impl Into<Option<Document>> + Send + Sync) -> Result<usize, Error> {
        self.collection()
            .count_documents(filter, None)
            .await
            .map(|count| count as usize)
    }
}
impl<T: MongoDbCollection> MongoDbCollectionExt for T {}

/// The outcome of [`InsertIgnoreDuplicatesExt::insert_many_ignore_duplicates`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InsertResult {
    /// The number of documents that were already present.
    pub ignored: usize,
}

#[allow(missing_docs)]
#[async_trait]
pub trait InsertIgnoreDuplicatesExt<T> {
    /// Inserts many records and ignores duplicate key errors.
    async fn insert_many_ignore_duplicates(
        &self,
        docs: impl IntoIterator<Item = impl Borrow<T> + Send + Sync> + Send + Sync,
        options: impl Into<Option<InsertManyOptions>> + Send + Sync,
    ) -> Result<InsertResult, Error>;
}

#[async_trait]
impl<T: MongoDbCollectionExt + Send + Sync, D: Serialize + Send + Sync> InsertIgnoreDuplicatesExt<D> for T {
    async fn insert_many_ignore_duplicates(
        &self,
        docs: impl IntoIterator<Item = impl Borrow<D> + Send + Sync> + Send + Sync,
        options: impl Into<Option<InsertManyOptions>> + Send + Sync,
    ) -> Result<InsertResult, Error> {
        match self.insert_many(docs, options).await {
            Ok(_) => Ok(InsertResult { ignored: 0 }),
            Err(e) => match &*e.kind {
                ErrorKind::BulkWrite(b) => {
                    if let Some(write_errs) = &b.write_errors {
                        if write_errs.iter().all(|e| e.code == DUPLICATE_KEY_CODE) {
                            return Ok(InsertResult {
                                ignored: write_errs.len(),
                            });
                        }
                    }
                    Err(e)
                }
                _ => Err(e),
            },
        }
    }
}
