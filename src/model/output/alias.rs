// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the alias output.

use serde::{Deserialize, Serialize};

use super::{Features, OutputId};
use crate::model::Address;

impl_id!(
    /// Uniquely identifies an alias. Null in the output that creates the alias.
    AliasId,
    32
);

impl AliasId {
    /// Derives the implicit alias id of the output which created the alias.
    pub fn from_output_id(output_id: &OutputId) -> Self {
        Self(output_id.hash())
    }

    /// Returns the id itself, or the implicit id if it is null.
    pub fn or_from_output_id(self, output_id: &OutputId) -> Self {
        if self.is_null() {
            Self::from_output_id(output_id)
        } else {
            self
        }
    }
}

/// Represents an alias in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasOutput {
    /// The output amount.
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The alias id. Null when the output creates the alias.
    pub alias_id: AliasId,
    /// The state controller address.
    pub state_controller: Address,
    /// The governor address.
    pub governor: Address,
    #[allow(missing_docs)]
    #[serde(default)]
    pub features: Features,
}

impl AliasOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "alias";
}
