// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the secondary indexer database.

/// Module containing MongoDb types and traits.
pub mod mongodb;

pub use self::mongodb::{config::MongoDbConfig, DbError, MongoDb, MongoDbCollection, MongoDbCollectionExt};
