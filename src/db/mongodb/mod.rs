// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Holds the `MongoDb` type.

mod collection;
/// Module containing the collections of the secondary indexer.
pub mod collections;
pub mod config;
mod error;

use config::MongoDbConfig;
use mongodb::{bson::Document, error::Error, options::ClientOptions, Client};

pub use self::{
    collection::{InsertIgnoreDuplicatesExt, MongoDbCollection, MongoDbCollectionExt},
    error::DbError,
};

/// A handle to the underlying `MongoDB` database.
#[derive(Clone, Debug)]
pub struct MongoDb {
    pub(crate) database_name: String,
    pub(crate) client: mongodb::Client,
}

impl MongoDb {
    /// Constructs a [`MongoDb`] by connecting to a MongoDB instance.
    pub async fn connect(config: &MongoDbConfig) -> Result<Self, Error> {
        let mut client_options = ClientOptions::parse(&config.conn_str).await?;

        client_options.app_name = Some("UTXO Ledger".to_string());
        client_options.min_pool_size = Some(config.min_pool_size);

        let client = Client::with_options(client_options)?;

        Ok(Self {
            database_name: config.database_name.clone(),
            client,
        })
    }

    /// Returns the current database.
    pub fn db(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    /// Creates a collection if it does not exist, together with its indexes.
    pub async fn create_indexes<T: MongoDbCollection + Send + Sync>(&self) -> Result<(), Error> {
        let collection = self.collection::<T>();
        collection.create_collection(self).await?;
        collection.create_indexes().await?;
        Ok(())
    }

    /// Gets a collection of the provided type.
    pub fn collection<T: MongoDbCollection>(&self) -> T {
        T::instantiate(self, self.db().collection(T::NAME))
    }

    /// Clears all the collections from the database.
    pub async fn clear(&self) -> Result<(), Error> {
        let collections = self.db().list_collection_names(None).await?;

        for c in collections.into_iter().filter(|c| c != "system.views") {
            self.db().collection::<Document>(&c).drop(None).await?;
        }

        Ok(())
    }

    /// Drops the database.
    pub async fn drop(self) -> Result<(), Error> {
        self.db().drop(None).await
    }

    /// Returns the name of the database.
    pub fn name(&self) -> &str {
        &self.database_name
    }
}
