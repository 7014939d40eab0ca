// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Address`] types.

use std::fmt;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::output::{AliasId, NftId};

impl_id!(
    /// A regular Ed25519 address (the BLAKE2b-256 hash of a public key).
    Ed25519Address,
    32
);

/// An address that is unlocked by the alias output with the contained [`AliasId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasAddress(pub AliasId);

impl AliasAddress {
    /// The kind byte of alias addresses.
    pub const KIND: u8 = 8;
}

/// An address that is unlocked by the NFT output with the contained [`NftId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NftAddress(pub NftId);

impl NftAddress {
    /// The kind byte of NFT addresses.
    pub const KIND: u8 = 16;
}

/// The unlock address of an output, or the address named by one of its features.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// An Ed25519 address.
    Ed25519(Ed25519Address),
    /// An alias address.
    Alias(AliasAddress),
    /// An NFT address.
    Nft(NftAddress),
}

impl Address {
    /// The length of the packed address: one kind byte followed by 32 bytes.
    pub const LENGTH: usize = 1 + 32;
    /// The kind byte of Ed25519 addresses.
    pub const ED25519_KIND: u8 = 0;

    /// Returns the kind byte of the address.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Ed25519(_) => Self::ED25519_KIND,
            Self::Alias(_) => AliasAddress::KIND,
            Self::Nft(_) => NftAddress::KIND,
        }
    }

    /// Packs the address into its fixed-length binary form, which is embedded in storage keys.
    pub fn pack(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0; Self::LENGTH];
        bytes[0] = self.kind();
        bytes[1..].copy_from_slice(match self {
            Self::Ed25519(a) => a.as_ref(),
            Self::Alias(a) => a.0.as_ref(),
            Self::Nft(a) => a.0.as_ref(),
        });
        bytes
    }

    /// Unpacks an address from its binary form.
    pub fn unpack(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::LENGTH {
            return None;
        }
        let inner: [u8; 32] = bytes[1..].try_into().ok()?;
        Some(match bytes[0] {
            Self::ED25519_KIND => Self::Ed25519(Ed25519Address(inner)),
            AliasAddress::KIND => Self::Alias(AliasAddress(AliasId(inner))),
            NftAddress::KIND => Self::Nft(NftAddress(NftId(inner))),
            _ => return None,
        })
    }

    /// Returns the alias address, if this is one.
    pub fn as_alias(&self) -> Option<&AliasAddress> {
        match self {
            Self::Alias(a) => Some(a),
            _ => None,
        }
    }
}

impl From<Ed25519Address> for Address {
    fn from(value: Ed25519Address) -> Self {
        Self::Ed25519(value)
    }
}

impl From<AliasAddress> for Address {
    fn from(value: AliasAddress) -> Self {
        Self::Alias(value)
    }
}

impl From<NftAddress> for Address {
    fn from(value: NftAddress) -> Self {
        Self::Nft(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", prefix_hex::encode(&self.pack()[..]))
    }
}

#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AddressParseError {
    #[error("invalid address hex: {0}")]
    Hex(#[from] prefix_hex::Error),
    #[error("unknown address kind {0}")]
    UnknownKind(u8),
}

impl std::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = prefix_hex::decode::<[u8; Self::LENGTH]>(s)?;
        Self::unpack(&bytes).ok_or(AddressParseError::UnknownKind(bytes[0]))
    }
}

impl From<Address> for Bson {
    fn from(val: Address) -> Self {
        // Unwrap: Cannot fail as type is well defined
        mongodb::bson::to_bson(&val).unwrap()
    }
}
