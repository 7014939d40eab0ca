// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{doc, Document};

use crate::model::{Address, AliasAddress, MilestoneIndex, Tag};

/// Defines how a query is appended to a list of `$and` queries.
pub(super) trait AppendToQuery {
    fn append_to(self, queries: &mut Vec<Document>);
}

pub(super) trait AppendQuery<Q> {
    fn append_query(&mut self, query: Q);
}

impl<Q: AppendToQuery> AppendQuery<Q> for Vec<Document> {
    fn append_query(&mut self, query: Q) {
        query.append_to(self)
    }
}

macro_rules! address_query {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        pub(super) struct $name(pub(super) Option<Address>);

        impl AppendToQuery for $name {
            fn append_to(self, queries: &mut Vec<Document>) {
                if let Some(address) = self.0 {
                    queries.push(doc! { $field: address });
                }
            }
        }
    };
}

address_query!(
    /// Queries for the unlock address.
    AddressQuery,
    "address"
);
address_query!(
    /// Queries for a feature of type `issuer`.
    IssuerQuery,
    "issuer"
);
address_query!(
    /// Queries for a feature of type `sender`.
    SenderQuery,
    "sender"
);
address_query!(
    /// Queries for an unlock condition of type `state_controller`.
    StateControllerQuery,
    "state_controller"
);
address_query!(
    /// Queries for an unlock condition of type `governor`.
    GovernorQuery,
    "governor"
);

/// Queries for a feature of type `tag`.
pub(super) struct TagQuery(pub(super) Option<Tag>);

impl AppendToQuery for TagQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(tag) = self.0 {
            queries.push(doc! { "tag": tag });
        }
    }
}

/// Queries for the alias that controls a foundry.
pub(super) struct AliasAddressQuery(pub(super) Option<AliasAddress>);

impl AppendToQuery for AliasAddressQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        AddressQuery(self.0.map(Address::Alias)).append_to(queries)
    }
}

/// Queries for the milestone that created the output.
pub(super) struct CreatedQuery {
    pub(super) created_before: Option<MilestoneIndex>,
    pub(super) created_after: Option<MilestoneIndex>,
}

impl AppendToQuery for CreatedQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(created_before) = self.created_before {
            queries.push(doc! { "milestone_index": { "$lt": created_before } });
        }
        if let Some(created_after) = self.created_after {
            queries.push(doc! { "milestone_index": { "$gt": created_after } });
        }
    }
}
