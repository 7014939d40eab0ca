// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utxo_ledger::db::MongoDbConfig;

pub const DEFAULT_STORAGE_PATH: &str = "./ledger.redb";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at '{0}': {1}")]
    FileRead(String, std::io::Error),
    #[error("toml deserialization failed: {0}")]
    TomlDeserialization(toml::de::Error),
}

/// The key-value backend holding the ledger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Keeps the ledger in memory only.
    Memory,
    /// Persists the ledger in a redb database file.
    #[default]
    Redb,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Default::default(),
            path: DEFAULT_STORAGE_PATH.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    pub enabled: bool,
}

/// Configuration of the ledger node.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerNodeConfig {
    pub storage: StorageConfig,
    pub mongodb: MongoDbConfig,
    pub indexer: IndexerConfig,
}

impl LedgerNodeConfig {
    /// Reads the config from the file located at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(path.as_ref().display().to_string(), e))
            .and_then(|contents| toml::from_str::<Self>(&contents).map_err(ConfigError::TomlDeserialization))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_file_conformity() -> Result<(), ConfigError> {
        let config = LedgerNodeConfig::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config.template.toml"))?;
        assert_eq!(config, LedgerNodeConfig::default());

        Ok(())
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config = toml::from_str::<LedgerNodeConfig>(
            r#"
            [storage]
            backend = "memory"

            [indexer]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, DEFAULT_STORAGE_PATH);
        assert!(config.indexer.enabled);
        assert_eq!(config.mongodb, MongoDbConfig::default());
    }

    #[test]
    fn unknown_storage_fields_are_rejected() {
        assert!(toml::from_str::<LedgerNodeConfig>("[storage]\nengine = \"rocksdb\"\n").is_err());
    }
}
