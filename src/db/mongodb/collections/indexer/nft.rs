// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};

use super::{
    queries::{AddressQuery, AppendQuery, CreatedQuery, IssuerQuery, SenderQuery, TagQuery},
    IndexerDocument,
};
use crate::model::{Address, MilestoneIndex, NftId, Output, OutputBody, OutputId, OutputKind, Tag};

/// The indexer record of an NFT output, keyed by its NFT id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct NftOutputDocument {
    #[serde(rename = "_id")]
    pub nft_id: NftId,
    pub output_id: OutputId,
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    pub address: Address,
    pub milestone_index: MilestoneIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl IndexerDocument for NftOutputDocument {
    const COLLECTION: &'static str = "indexer_nft_outputs";
    const KIND: OutputKind = OutputKind::Nft;
    const INDEXED_FIELDS: &'static [&'static str] = &["address", "issuer", "sender", "tag"];

    fn from_output(output: &Output) -> Option<Self> {
        match &output.body {
            OutputBody::Nft(nft) => Some(Self {
                nft_id: nft.nft_id.or_from_output_id(&output.output_id),
                output_id: output.output_id,
                amount: nft.amount,
                address: nft.address,
                milestone_index: output.milestone_index,
                issuer: nft.features.issuer,
                sender: nft.features.sender,
                tag: nft.features.tag.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NftOutputsQuery {
    pub address: Option<Address>,
    pub issuer: Option<Address>,
    pub sender: Option<Address>,
    pub tag: Option<Tag>,
    pub created_before: Option<MilestoneIndex>,
    pub created_after: Option<MilestoneIndex>,
}

impl From<NftOutputsQuery> for bson::Document {
    fn from(query: NftOutputsQuery) -> Self {
        let mut queries = Vec::new();
        queries.append_query(AddressQuery(query.address));
        queries.append_query(IssuerQuery(query.issuer));
        queries.append_query(SenderQuery(query.sender));
        queries.append_query(TagQuery(query.tag));
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
