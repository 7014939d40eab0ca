// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};

use super::{
    queries::{AliasAddressQuery, AppendQuery, CreatedQuery},
    IndexerDocument,
};
use crate::model::{Address, AliasAddress, FoundryId, MilestoneIndex, Output, OutputBody, OutputId, OutputKind};

/// The indexer record of a foundry output, keyed by its foundry id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct FoundryOutputDocument {
    #[serde(rename = "_id")]
    pub foundry_id: FoundryId,
    pub output_id: OutputId,
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The controlling alias.
    pub address: Address,
    pub milestone_index: MilestoneIndex,
}

impl IndexerDocument for FoundryOutputDocument {
    const COLLECTION: &'static str = "indexer_foundry_outputs";
    const KIND: OutputKind = OutputKind::Foundry;
    const INDEXED_FIELDS: &'static [&'static str] = &["address"];

    fn from_output(output: &Output) -> Option<Self> {
        match &output.body {
            OutputBody::Foundry(foundry) => Some(Self {
                foundry_id: foundry.foundry_id(),
                output_id: output.output_id,
                amount: foundry.amount,
                address: foundry.alias_address.into(),
                milestone_index: output.milestone_index,
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct FoundryOutputsQuery {
    pub alias_address: Option<AliasAddress>,
    pub created_before: Option<MilestoneIndex>,
    pub created_after: Option<MilestoneIndex>,
}

impl From<FoundryOutputsQuery> for bson::Document {
    fn from(query: FoundryOutputsQuery) -> Self {
        let mut queries = Vec::new();
        queries.append_query(AliasAddressQuery(query.alias_address));
        queries.append_query(CreatedQuery {
            created_before: query.created_before,
            created_after: query.created_after,
        });
        if queries.is_empty() {
            doc! {}
        } else {
            doc! { "$and": queries }
        }
    }
}
