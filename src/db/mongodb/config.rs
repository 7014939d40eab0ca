// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Holds the `MongoDb` config and its defaults.

use serde::{Deserialize, Serialize};

/// The default connection string of the database.
pub const DEFAULT_CONN_STR: &str = "mongodb://localhost:27017";
/// The default name of the database to connect to.
pub const DEFAULT_DATABASE_NAME: &str = "utxo-ledger";
/// The default minimum amount of connections in the pool.
pub const DEFAULT_MIN_POOL_SIZE: u32 = 2;

/// The [`MongoDb`](super::MongoDb) config.
#[must_use]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MongoDbConfig {
    /// The connection string of the database. Credentials are part of the string.
    pub conn_str: String,
    /// The name of the database to connect to.
    pub database_name: String,
    /// The minimum amount of connections in the pool.
    pub min_pool_size: u32,
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            conn_str: DEFAULT_CONN_STR.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
        }
    }
}
