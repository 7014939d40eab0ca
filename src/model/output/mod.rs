// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Output`] types.

pub mod alias;
pub mod basic;
pub mod feature;
pub mod foundry;
pub mod nft;

use crypto::hashes::{blake2b::Blake2b256, Digest};
use serde::{Deserialize, Serialize};

pub use self::{
    alias::{AliasId, AliasOutput},
    basic::BasicOutput,
    feature::{Features, Tag, TagError},
    foundry::{FoundryId, FoundryOutput, TokenScheme},
    nft::{NftId, NftOutput},
};
use super::{Address, MessageId, MilestoneIndex, TransactionId};

/// The index of an output within a transaction.
pub type OutputIndex = u16;

impl_id!(
    /// An id which uniquely identifies an output. It is the [`TransactionId`] followed by the little-endian
    /// [`OutputIndex`].
    OutputId,
    TransactionId::LENGTH + std::mem::size_of::<OutputIndex>()
);

impl OutputId {
    /// Creates the id of the output at `index` of the given transaction.
    pub fn new(transaction_id: TransactionId, index: OutputIndex) -> Self {
        let mut bytes = [0; Self::LENGTH];
        bytes[..TransactionId::LENGTH].copy_from_slice(transaction_id.as_ref());
        bytes[TransactionId::LENGTH..].copy_from_slice(&index.to_le_bytes());
        Self(bytes)
    }

    /// The transaction id part of the [`OutputId`].
    pub fn transaction_id(&self) -> TransactionId {
        let mut bytes = [0; TransactionId::LENGTH];
        bytes.copy_from_slice(&self.0[..TransactionId::LENGTH]);
        TransactionId(bytes)
    }

    /// The output index part of the [`OutputId`].
    pub fn index(&self) -> OutputIndex {
        OutputIndex::from_le_bytes([self.0[TransactionId::LENGTH], self.0[TransactionId::LENGTH + 1]])
    }

    /// Hash the [`OutputId`] with BLAKE2b-256.
    #[inline(always)]
    pub fn hash(&self) -> [u8; 32] {
        Blake2b256::digest(self.0).into()
    }
}

impl From<(TransactionId, OutputIndex)> for OutputId {
    fn from((transaction_id, index): (TransactionId, OutputIndex)) -> Self {
        Self::new(transaction_id, index)
    }
}

/// The different kinds of outputs. The discriminant is the byte used inside storage keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OutputKind {
    /// The treasury output, tracked separately from the unspent set.
    Treasury = 2,
    /// The basic (extended) output.
    Basic = 3,
    /// The alias output.
    Alias = 4,
    /// The foundry output.
    Foundry = 5,
    /// The NFT output.
    Nft = 6,
}

impl OutputKind {
    /// The kinds that are part of the unspent set.
    pub const LEDGER_KINDS: [Self; 4] = [Self::Basic, Self::Alias, Self::Foundry, Self::Nft];

    /// A `&str` representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Treasury => "treasury",
            Self::Basic => "basic",
            Self::Alias => "alias",
            Self::Foundry => "foundry",
            Self::Nft => "nft",
        }
    }
}

impl From<OutputKind> for u8 {
    fn from(value: OutputKind) -> Self {
        value as u8
    }
}

/// An identifier that stays with a chain of state-continuing outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, derive_more::From)]
#[allow(missing_docs)]
pub enum IndexedId {
    Alias(AliasId),
    Nft(NftId),
    Foundry(FoundryId),
}

impl IndexedId {
    /// The output kind the identifier belongs to.
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Alias(_) => OutputKind::Alias,
            Self::Nft(_) => OutputKind::Nft,
            Self::Foundry(_) => OutputKind::Foundry,
        }
    }

    /// Whether the identifier is all zeroes, which selects every output of its kind.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Alias(id) => id.is_null(),
            Self::Nft(id) => id.is_null(),
            Self::Foundry(id) => id.is_null(),
        }
    }
}

impl AsRef<[u8]> for IndexedId {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Alias(id) => id.as_ref(),
            Self::Nft(id) => id.as_ref(),
            Self::Foundry(id) => id.as_ref(),
        }
    }
}

/// The type-specific part of an output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutputBody {
    /// The [`BasicOutput`] variant.
    Basic(BasicOutput),
    /// The [`AliasOutput`] variant.
    Alias(AliasOutput),
    /// The [`FoundryOutput`] variant.
    Foundry(FoundryOutput),
    /// The [`NftOutput`] variant.
    Nft(NftOutput),
}

impl OutputBody {
    /// Returns the [`OutputKind`] of the body.
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Basic(_) => OutputKind::Basic,
            Self::Alias(_) => OutputKind::Alias,
            Self::Foundry(_) => OutputKind::Foundry,
            Self::Nft(_) => OutputKind::Nft,
        }
    }

    /// The amount of base tokens held by the output.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Basic(BasicOutput { amount, .. })
            | Self::Alias(AliasOutput { amount, .. })
            | Self::Foundry(FoundryOutput { amount, .. })
            | Self::Nft(NftOutput { amount, .. }) => *amount,
        }
    }

    /// The primary unlock address of the output.
    pub fn address(&self) -> Address {
        match self {
            Self::Basic(BasicOutput { address, .. }) | Self::Nft(NftOutput { address, .. }) => *address,
            Self::Alias(AliasOutput { state_controller, .. }) => *state_controller,
            Self::Foundry(FoundryOutput { alias_address, .. }) => Address::Alias(*alias_address),
        }
    }

    /// The features of the output.
    pub fn features(&self) -> &Features {
        match self {
            Self::Basic(BasicOutput { features, .. })
            | Self::Alias(AliasOutput { features, .. })
            | Self::Foundry(FoundryOutput { features, .. })
            | Self::Nft(NftOutput { features, .. }) => features,
        }
    }
}

impl From<BasicOutput> for OutputBody {
    fn from(value: BasicOutput) -> Self {
        Self::Basic(value)
    }
}

impl From<AliasOutput> for OutputBody {
    fn from(value: AliasOutput) -> Self {
        Self::Alias(value)
    }
}

impl From<FoundryOutput> for OutputBody {
    fn from(value: FoundryOutput) -> Self {
        Self::Foundry(value)
    }
}

impl From<NftOutput> for OutputBody {
    fn from(value: NftOutput) -> Self {
        Self::Nft(value)
    }
}

/// An output as recorded by the ledger. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// The id of the output.
    pub output_id: OutputId,
    /// The message which contained the creating transaction.
    pub message_id: MessageId,
    /// The milestone that confirmed the creating transaction.
    pub milestone_index: MilestoneIndex,
    /// The type-specific part of the output.
    pub body: OutputBody,
    /// The serialized output as delivered by the node.
    #[serde(with = "serde_bytes", default)]
    pub payload: Vec<u8>,
}

impl Output {
    /// Creates a new [`Output`] without a serialized payload.
    pub fn new(
        output_id: OutputId,
        message_id: MessageId,
        milestone_index: MilestoneIndex,
        body: impl Into<OutputBody>,
    ) -> Self {
        Self {
            output_id,
            message_id,
            milestone_index,
            body: body.into(),
            payload: Vec::new(),
        }
    }

    /// Attaches the serialized payload.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    #[allow(missing_docs)]
    pub fn output_id(&self) -> OutputId {
        self.output_id
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> OutputKind {
        self.body.kind()
    }

    #[allow(missing_docs)]
    pub fn amount(&self) -> u64 {
        self.body.amount()
    }

    #[allow(missing_docs)]
    pub fn address(&self) -> Address {
        self.body.address()
    }

    /// The address named by the issuer feature.
    pub fn issuer(&self) -> Option<&Address> {
        self.body.features().issuer.as_ref()
    }

    /// The address named by the sender feature.
    pub fn sender(&self) -> Option<&Address> {
        self.body.features().sender.as_ref()
    }

    /// The indexation tag.
    pub fn tag(&self) -> Option<&Tag> {
        self.body.features().tag.as_ref()
    }

    /// The governing identifier of alias, NFT and foundry outputs.
    ///
    /// Null alias and NFT ids are resolved against the id of this output, since that is the output that created
    /// the chain.
    pub fn indexed_id(&self) -> Option<IndexedId> {
        Some(match &self.body {
            OutputBody::Basic(_) => return None,
            OutputBody::Alias(alias) => alias.alias_id.or_from_output_id(&self.output_id).into(),
            OutputBody::Nft(nft) => nft.nft_id.or_from_output_id(&self.output_id).into(),
            OutputBody::Foundry(foundry) => foundry.foundry_id().into(),
        })
    }
}
