// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the nft output.

use serde::{Deserialize, Serialize};

use super::{Features, OutputId};
use crate::model::Address;

impl_id!(
    /// Uniquely identifies an NFT. Null in the output that mints the NFT.
    NftId,
    32
);

impl NftId {
    /// Derives the implicit NFT id of the output which minted the NFT.
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

/// Represents an NFT in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftOutput {
    /// The output amount.
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The associated id of the NFT.
    pub nft_id: NftId,
    /// The address unlock condition.
    pub address: Address,
    #[allow(missing_docs)]
    #[serde(default)]
    pub features: Features,
}

impl NftOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "nft";
}
