// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the foundry output.

use serde::{Deserialize, Serialize};

use super::Features;
use crate::model::{Address, AliasAddress};

impl_id!(
    /// Uniquely identifies a foundry: the packed controlling alias address, followed by the little-endian serial
    /// number and the token scheme kind.
    FoundryId,
    Address::LENGTH + std::mem::size_of::<u32>() + 1
);

impl FoundryId {
    /// Builds the id of the foundry with the given serial number controlled by `alias_address`.
    pub fn build(alias_address: &AliasAddress, serial_number: u32, token_scheme: TokenScheme) -> Self {
        let mut bytes = [0; Self::LENGTH];
        bytes[..Address::LENGTH].copy_from_slice(&Address::Alias(*alias_address).pack());
        bytes[Address::LENGTH..Self::LENGTH - 1].copy_from_slice(&serial_number.to_le_bytes());
        bytes[Self::LENGTH - 1] = token_scheme.kind();
        Self(bytes)
    }

    /// The alias address that controls the foundry.
    pub fn alias_address(&self) -> Option<AliasAddress> {
        Address::unpack(&self.0[..Address::LENGTH])?.as_alias().copied()
    }

    #[allow(missing_docs)]
    pub fn serial_number(&self) -> u32 {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.0[Address::LENGTH..Self::LENGTH - 1]);
        u32::from_le_bytes(bytes)
    }
}

/// The token scheme of a foundry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScheme {
    /// The simple token scheme.
    Simple,
}

impl TokenScheme {
    /// The kind byte that ends a [`FoundryId`].
    pub fn kind(&self) -> u8 {
        match self {
            Self::Simple => 0,
        }
    }
}

/// Represents a foundry in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundryOutput {
    /// The output amount.
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The immutable alias address unlock condition.
    pub alias_address: AliasAddress,
    /// The serial number of the foundry.
    pub serial_number: u32,
    /// The [`TokenScheme`] of the underlying token.
    pub token_scheme: TokenScheme,
    #[allow(missing_docs)]
    #[serde(default)]
    pub features: Features,
}

impl FoundryOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "foundry";

    /// The id of the foundry.
    pub fn foundry_id(&self) -> FoundryId {
        FoundryId::build(&self.alias_address, self.serial_number, self.token_scheme)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::AliasId;

    #[test]
    fn foundry_id_layout() {
        let alias_address = AliasAddress(AliasId([1; 32]));
        let id = FoundryId::build(&alias_address, 0x0102_0304, TokenScheme::Simple);
        assert_eq!(FoundryId::LENGTH, 38);
        assert_eq!(id.0[0], AliasAddress::KIND);
        assert_eq!(&id.0[1..33], &[1; 32]);
        assert_eq!(&id.0[33..37], &[4, 3, 2, 1]);
        assert_eq!(id.0[37], 0);
        assert_eq!(id.alias_address(), Some(alias_address));
        assert_eq!(id.serial_number(), 0x0102_0304);
    }
}
