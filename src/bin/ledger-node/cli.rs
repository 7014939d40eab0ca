// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use utxo_ledger::{
    db::{mongodb::collections::Indexer, MongoDb},
    ledger::{store::KvStore, LedgerEngine, OutputFilter, PageCursor},
    model::{Address, OutputId, OutputKind},
};

use crate::{
    config::{ConfigError, LedgerNodeConfig, StorageBackend},
    error::Error,
};

/// UTXO ledger node with a key-value backed unspent set and a MongoDB indexer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct ClArgs {
    /// The location of the configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<String>,
    /// The key-value backend holding the ledger.
    #[arg(long = "storage.backend", env = "STORAGE_BACKEND", value_enum)]
    pub storage_backend: Option<StorageBackend>,
    /// The location of the ledger database.
    #[arg(long = "storage.path", env = "STORAGE_PATH")]
    pub storage_path: Option<String>,
    /// The MongoDB connection string.
    #[arg(long = "mongodb.conn-str", env = "MONGODB_CONN_STR")]
    pub mongodb_conn_str: Option<String>,
    /// Toggle the MongoDB indexer.
    #[arg(long = "indexer.enabled", env = "INDEXER_ENABLED")]
    pub enable_indexer: Option<bool>,
    /// Subcommands.
    #[command(subcommand)]
    pub subcommand: Subcommands,
}

impl ClArgs {
    /// Get a config file with CLI args applied.
    pub fn get_config(&self) -> Result<LedgerNodeConfig, ConfigError> {
        let mut config = self
            .config
            .as_ref()
            .map(LedgerNodeConfig::from_file)
            .transpose()?
            .unwrap_or_default();

        if let Some(backend) = self.storage_backend {
            config.storage.backend = backend;
        }
        if let Some(path) = &self.storage_path {
            config.storage.path = path.clone();
        }
        if let Some(conn_str) = &self.mongodb_conn_str {
            config.mongodb.conn_str = conn_str.clone();
        }
        if let Some(enabled) = self.enable_indexer {
            config.indexer.enabled = enabled;
        }

        Ok(config)
    }

    /// Runs the subcommand against the opened ledger.
    pub async fn process_subcommand<S: KvStore>(
        &self,
        config: &LedgerNodeConfig,
        ledger: &LedgerEngine<S>,
    ) -> Result<(), Error> {
        match &self.subcommand {
            Subcommands::Balance => {
                let state = ledger.ledger_state()?;
                println!("Ledger index: {}", state.ledger_index);
                println!("Balance: {}", state.balance);
                println!("Unspent outputs: {}", state.output_count);
                if let Some(treasury) = state.treasury {
                    println!("Treasury: {} (milestone {})", treasury.amount, treasury.milestone_id);
                }
            }
            Subcommands::Output { output_id } => {
                let output = ledger.read_output(output_id)?;
                println!("{output:#?}");
                match ledger.read_spent(output_id)? {
                    Some(spent) => println!(
                        "Spent by {} at milestone {}",
                        spent.transaction_id, spent.milestone_index
                    ),
                    None => println!("Unspent"),
                }
            }
            Subcommands::Outputs {
                address,
                kind,
                page_size,
                cursor,
            } => {
                let mut filter = OutputFilter::all();
                if let Some(address) = address {
                    filter = filter.address(*address);
                }
                if let Some(kind) = kind {
                    filter = filter.kind((*kind).into());
                }
                let page = ledger.load_page(filter, *page_size, cursor.clone())?;
                for output in &page.outputs {
                    println!("{} {} {}", output.output_id, output.kind().as_str(), output.amount());
                }
                if let Some(cursor) = page.cursor {
                    println!("Next cursor: {cursor}");
                }
            }
            Subcommands::ImportIndexer => {
                if !config.indexer.enabled {
                    return Err(Error::IndexerDisabled);
                }
                let indexer = Indexer::new(MongoDb::connect(&config.mongodb).await?);
                indexer.create_indexes().await?;

                let (ledger_index, outputs) = {
                    let _guard = ledger.read_lock_ledger();
                    (ledger.ledger_index()?, ledger.load_unspent_outputs(OutputFilter::all())?)
                };
                indexer
                    .import_unspent_outputs(&outputs.iter().collect::<Vec<_>>(), ledger_index)
                    .await?;
                info!("Imported {} outputs at ledger index {}.", outputs.len(), ledger_index);
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum KindArg {
    Basic,
    Alias,
    Foundry,
    Nft,
}

impl From<KindArg> for OutputKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Basic => Self::Basic,
            KindArg::Alias => Self::Alias,
            KindArg::Foundry => Self::Foundry,
            KindArg::Nft => Self::Nft,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    /// Print the ledger index, balance and treasury.
    Balance,
    /// Print a single output and whether it was spent.
    Output {
        /// The hex encoded output id.
        output_id: OutputId,
    },
    /// List the unspent outputs one page at a time.
    Outputs {
        /// Only outputs unlockable by this hex encoded address.
        #[arg(long)]
        address: Option<Address>,
        /// Only outputs of this kind.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// The number of outputs per page. 0 lists everything.
        #[arg(long, default_value_t = 100)]
        page_size: usize,
        /// The cursor printed with the previous page.
        #[arg(long)]
        cursor: Option<PageCursor>,
    },
    /// Replace the indexer collections with the current unspent set.
    ImportIndexer,
}
