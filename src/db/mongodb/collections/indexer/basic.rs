// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};

use super::{
    queries::{AddressQuery, AppendQuery, CreatedQuery, IssuerQuery, SenderQuery, TagQuery},
    IndexerDocument,
};
use crate::model::{Address, MilestoneIndex, Output, OutputBody, OutputId, OutputKind, Tag};

/// The indexer record of a basic output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BasicOutputDocument {
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

impl IndexerDocument for BasicOutputDocument {
    const COLLECTION: &'static str = "indexer_basic_outputs";
    const KIND: OutputKind = OutputKind::Basic;
    const INDEXED_FIELDS: &'static [&'static str] = &["address", "issuer", "sender", "tag"];

    fn from_output(output: &Output) -> Option<Self> {
        match &output.body {
            OutputBody::Basic(basic) => Some(Self {
                output_id: output.output_id,
                amount: basic.amount,
                address: basic.address,
                milestone_index: output.milestone_index,
                issuer: basic.features.issuer,
                sender: basic.features.sender,
                tag: basic.features.tag.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct BasicOutputsQuery {
    pub address: Option<Address>,
    pub issuer: Option<Address>,
    pub sender: Option<Address>,
    pub tag: Option<Tag>,
    pub created_before: Option<MilestoneIndex>,
    pub created_after: Option<MilestoneIndex>,
}

impl From<BasicOutputsQuery> for bson::Document {
    fn from(query: BasicOutputsQuery) -> Self {
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

#[cfg(test)]
mod test {
    use mongodb::bson::{self, doc};
    use pretty_assertions::assert_eq;

    use super::BasicOutputsQuery;
    use crate::model::{Address, Ed25519Address, MilestoneIndex, Tag};

    #[test]
    fn test_basic_query_everything() {
        let address = Address::from(Ed25519Address([1; 32]));
        let sender = Address::from(Ed25519Address([2; 32]));
        let query = BasicOutputsQuery {
            address: Some(address),
            issuer: None,
            sender: Some(sender),
            tag: Some(Tag::new("my_tag").unwrap()),
            created_before: Some(10000.into()),
            created_after: Some(1000.into()),
        };
        let query_doc = doc! {
            "$and": [
                { "address": address },
                { "sender": sender },
                { "tag": Tag::new("my_tag").unwrap() },
                { "milestone_index": { "$lt": MilestoneIndex(10000) } },
                { "milestone_index": { "$gt": MilestoneIndex(1000) } },
            ]
        };
        assert_eq!(query_doc, bson::Document::from(query));
    }

    #[test]
    fn test_basic_query_empty() {
        assert_eq!(doc! {}, bson::Document::from(BasicOutputsQuery::default()));
    }
}
