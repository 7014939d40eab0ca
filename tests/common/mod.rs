// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use thiserror::Error;
use utxo_ledger::{
    db::{mongodb::collections::Indexer, MongoDb, MongoDbConfig},
    ledger::{store::KvStore, LedgerEngine},
    model::{
        Address, AliasAddress, AliasId, AliasOutput, BasicOutput, Ed25519Address, Features, FoundryOutput, MessageId,
        MilestoneIndex, NftAddress, NftId, NftOutput, Output, OutputBody, OutputId, Spent, TokenScheme,
        TransactionId,
    },
};

#[derive(Debug, Error)]
pub enum TestDbError {
    #[error("failed to read config at '{0}': {1}")]
    FileRead(String, std::io::Error),
    #[error("toml deserialization failed: {0}")]
    TomlDeserialization(toml::de::Error),
    #[error(transparent)]
    MongoDb(#[from] mongodb::error::Error),
}

#[allow(unused)]
pub async fn connect_to_test_db(database_name: impl ToString) -> Result<MongoDb, TestDbError> {
    let mut config = if let Ok(path) = std::env::var("CONFIG_PATH") {
        let val = std::fs::read_to_string(&path)
            .map_err(|e| TestDbError::FileRead(AsRef::<Path>::as_ref(&path).display().to_string(), e))
            .and_then(|contents| toml::from_str::<toml::Value>(&contents).map_err(TestDbError::TomlDeserialization))?;
        if let Some(mongodb) = val.get("mongodb").cloned() {
            mongodb.try_into().map_err(TestDbError::TomlDeserialization)?
        } else {
            MongoDbConfig::default()
        }
    } else {
        MongoDbConfig::default()
    };
    config.database_name = database_name.to_string();

    Ok(MongoDb::connect(&config).await?)
}

#[allow(unused)]
pub async fn setup_indexer(database_name: impl ToString) -> Indexer {
    let db = connect_to_test_db(database_name).await.unwrap();
    db.clear().await.unwrap();
    let indexer = Indexer::new(db);
    indexer.create_indexes().await.unwrap();
    indexer
}

#[allow(unused)]
pub async fn teardown(indexer: Indexer) {
    indexer.db().clone().drop().await.unwrap();
}

#[allow(unused)]
pub fn rand_output_id() -> OutputId {
    OutputId::new(TransactionId(rand::random()), rand::random())
}

#[allow(unused)]
pub fn rand_ed25519_address() -> Address {
    Ed25519Address(rand::random()).into()
}

#[allow(unused)]
pub fn rand_alias_address() -> AliasAddress {
    AliasAddress(AliasId(rand::random()))
}

#[allow(unused)]
pub fn rand_nft_address() -> Address {
    NftAddress(NftId(rand::random())).into()
}

/// Creates an output with a random id, confirmed at `milestone_index`.
#[allow(unused)]
pub fn output(body: impl Into<OutputBody>, milestone_index: impl Into<MilestoneIndex>) -> Output {
    Output::new(
        rand_output_id(),
        MessageId(rand::random()),
        milestone_index.into(),
        body,
    )
}

#[allow(unused)]
pub fn basic(amount: u64, address: impl Into<Address>) -> BasicOutput {
    BasicOutput {
        amount,
        address: address.into(),
        features: Features::default(),
    }
}

#[allow(unused)]
pub fn alias(amount: u64, alias_id: AliasId, state_controller: impl Into<Address>) -> AliasOutput {
    AliasOutput {
        amount,
        alias_id,
        state_controller: state_controller.into(),
        governor: rand_ed25519_address(),
        features: Features::default(),
    }
}

#[allow(unused)]
pub fn nft(amount: u64, nft_id: NftId, address: impl Into<Address>) -> NftOutput {
    NftOutput {
        amount,
        nft_id,
        address: address.into(),
        features: Features::default(),
    }
}

#[allow(unused)]
pub fn foundry(amount: u64, alias_address: AliasAddress, serial_number: u32) -> FoundryOutput {
    FoundryOutput {
        amount,
        alias_address,
        serial_number,
        token_scheme: TokenScheme::Simple,
        features: Features::default(),
    }
}

/// Replaces the features of the output body.
#[allow(unused)]
pub fn with_features(mut output: Output, features: Features) -> Output {
    match &mut output.body {
        OutputBody::Basic(body) => body.features = features,
        OutputBody::Alias(body) => body.features = features,
        OutputBody::Foundry(body) => body.features = features,
        OutputBody::Nft(body) => body.features = features,
    }
    output
}

/// Spends the output by a random transaction at `milestone_index`.
#[allow(unused)]
pub fn spend(output: &Output, milestone_index: impl Into<MilestoneIndex>) -> Spent {
    Spent::new(output.clone(), TransactionId(rand::random()), milestone_index)
}

/// Imports the outputs as unspent and sets the ledger index, like loading a snapshot.
#[allow(unused)]
pub fn import<S: KvStore>(ledger: &LedgerEngine<S>, outputs: &[Output], ledger_index: impl Into<MilestoneIndex>) {
    for output in outputs {
        ledger.add_unspent_output(output).unwrap();
    }
    ledger.store_ledger_index(ledger_index.into()).unwrap();
}

#[allow(unused)]
pub fn sorted_ids(outputs: impl IntoIterator<Item = impl std::borrow::Borrow<Output>>) -> Vec<OutputId> {
    let mut ids = outputs.into_iter().map(|o| o.borrow().output_id).collect::<Vec<_>>();
    ids.sort();
    ids
}
