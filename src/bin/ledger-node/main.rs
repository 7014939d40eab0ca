// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Command line access to a UTXO ledger and its MongoDB indexer.

mod cli;
mod config;
mod error;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
#[cfg(feature = "redb")]
use utxo_ledger::ledger::store::RedbStore;
use utxo_ledger::ledger::{store::MemoryStore, LedgerEngine};

use self::{cli::ClArgs, config::StorageBackend, error::Error};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    set_up_logging();

    std::panic::set_hook(Box::new(|p| {
        error!("{}", p);
    }));

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

async fn run() -> Result<(), Error> {
    let cl_args = ClArgs::parse();
    let config = cl_args.get_config()?;
    debug!(storage = ?config.storage, indexer = config.indexer.enabled, "Opening ledger.");

    match config.storage.backend {
        StorageBackend::Memory => {
            let ledger = LedgerEngine::new(MemoryStore::new());
            cl_args.process_subcommand(&config, &ledger).await
        }
        #[cfg(feature = "redb")]
        StorageBackend::Redb => {
            let ledger = LedgerEngine::new(RedbStore::open(&config.storage.path)?);
            cl_args.process_subcommand(&config, &ledger).await
        }
        #[cfg(not(feature = "redb"))]
        StorageBackend::Redb => Err(Error::BackendUnavailable("redb")),
    }
}
