// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Module containing the secondary indexer collections.
pub mod indexer;

pub use self::indexer::{
    AliasOutputCollection, AliasOutputsQuery, BasicOutputCollection, BasicOutputsQuery, FoundryOutputCollection,
    FoundryOutputsQuery, Indexer, IndexerCursor, NftOutputCollection, NftOutputsQuery, OutputResult, OutputsResult,
};
