// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use utxo_ledger::{
    db::DbError,
    ledger::{store::StoreError, LedgerError},
};

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    MongoDb(#[from] DbError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[cfg(not(feature = "redb"))]
    #[error("the `{0}` storage backend is not compiled in")]
    BackendUnavailable(&'static str),
    #[error("the indexer is disabled")]
    IndexerDisabled,
}

impl From<mongodb::error::Error> for Error {
    fn from(value: mongodb::error::Error) -> Self {
        Self::MongoDb(value.into())
    }
}
