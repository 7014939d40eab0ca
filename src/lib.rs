// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! A UTXO ledger engine. The authoritative unspent set lives in an ordered key-value store, while an optional
//! MongoDB indexer mirrors the same outputs for ad-hoc queries.

pub mod db;
pub mod feed;
pub mod ledger;
pub mod model;
