// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the ledger value types.

/// Implements the common surface of a fixed-length, hex-rendered identifier.
macro_rules! impl_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "crate::model::util::bytify")] pub [u8; $len]);

        impl $name {
            /// The number of bytes of the identifier.
            pub const LENGTH: usize = $len;

            /// The all-zero identifier.
            pub const fn null() -> Self {
                Self([0; Self::LENGTH])
            }

            /// Whether this is the all-zero identifier.
            pub fn is_null(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Converts the identifier to its `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                prefix_hex::encode(&self.0[..])
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                Ok(Self(value.try_into()?))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = prefix_hex::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(prefix_hex::decode::<[u8; $len]>(s)?))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl From<$name> for mongodb::bson::Bson {
            fn from(val: $name) -> Self {
                mongodb::bson::Binary {
                    subtype: mongodb::bson::spec::BinarySubtype::Generic,
                    bytes: val.0.to_vec(),
                }
                .into()
            }
        }
    };
}

pub mod address;
pub mod block;
pub mod confirmation;
pub mod output;
pub mod spent;
pub mod tangle;
pub mod treasury;
pub mod util;

pub use self::{
    address::{Address, AliasAddress, Ed25519Address, NftAddress},
    block::{MessageId, MilestoneId, TransactionId},
    confirmation::Confirmation,
    output::{
        AliasId, AliasOutput, BasicOutput, Features, FoundryId, FoundryOutput, IndexedId, NftId, NftOutput, Output,
        OutputBody, OutputId, OutputIndex, OutputKind, Tag, TagError, TokenScheme,
    },
    spent::Spent,
    tangle::MilestoneIndex,
    treasury::{Receipt, TreasuryOutput, TreasuryUpdate},
};

