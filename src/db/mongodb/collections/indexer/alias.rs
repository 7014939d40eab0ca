// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};

use super::{
    queries::{AppendQuery, CreatedQuery, GovernorQuery, IssuerQuery, SenderQuery, StateControllerQuery},
    IndexerDocument,
};
use crate::model::{Address, AliasId, MilestoneIndex, Output, OutputBody, OutputId, OutputKind};

/// The indexer record of an alias output, keyed by its alias id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AliasOutputDocument {
    #[serde(rename = "_id")]
    pub alias_id: AliasId,
    pub output_id: OutputId,
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The state controller, which is the unlock address of the alias.
    pub address: Address,
    pub milestone_index: MilestoneIndex,
    pub state_controller: Address,
    pub governor: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
}

impl IndexerDocument for AliasOutputDocument {
    const COLLECTION: &'static str = "indexer_alias_outputs";
    const KIND: OutputKind = OutputKind::Alias;
    const INDEXED_FIELDS: &'static [&'static str] = &["address", "state_controller", "governor", "issuer", "sender"];

    fn from_output(output: &Output) -> Option<Self> {
        match &output.body {
            OutputBody::Alias(alias) => Some(Self {
                alias_id: alias.alias_id.or_from_output_id(&output.output_id),
                output_id: output.output_id,
                amount: alias.amount,
                address: alias.state_controller,
                milestone_index: output.milestone_index,
                state_controller: alias.state_controller,
                governor: alias.governor,
                issuer: alias.features.issuer,
                sender: alias.features.sender,
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct AliasOutputsQuery {
    pub state_controller: Option<Address>,
    pub governor: Option<Address>,
    pub issuer: Option<Address>,
    pub sender: Option<Address>,
    pub created_before: Option<MilestoneIndex>,
    pub created_after: Option<MilestoneIndex>,
}

impl From<AliasOutputsQuery> for bson::Document {
    fn from(query: AliasOutputsQuery) -> Self {
        let mut queries = Vec::new();
        queries.append_query(StateControllerQuery(query.state_controller));
        queries.append_query(GovernorQuery(query.governor));
        queries.append_query(IssuerQuery(query.issuer));
        queries.append_query(SenderQuery(query.sender));
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

    use super::AliasOutputsQuery;
    use crate::model::{Address, Ed25519Address};

    #[test]
    fn test_alias_query_controllers() {
        let state_controller = Address::from(Ed25519Address([1; 32]));
        let governor = Address::from(Ed25519Address([2; 32]));
        let query = AliasOutputsQuery {
            state_controller: Some(state_controller),
            governor: Some(governor),
            ..Default::default()
        };
        let query_doc = doc! {
            "$and": [
                { "state_controller": state_controller },
                { "governor": governor },
            ]
        };
        assert_eq!(query_doc, bson::Document::from(query));
    }
}
