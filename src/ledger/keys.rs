// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Byte keys of the ledger namespace.
//!
//! Every key starts with a one byte prefix naming its table. Fields follow in a fixed order with fixed widths (the
//! tag is length-prefixed), so a prefix of the fields always selects a contiguous key range.

use crate::model::{Address, IndexedId, MilestoneId, MilestoneIndex, Output, OutputId, OutputKind, Tag};

/// Table prefixes.
pub mod prefix {
    #![allow(missing_docs)]

    pub const LEDGER_INDEX: u8 = 0x00;
    pub const OUTPUT: u8 = 0x01;
    pub const SPENT: u8 = 0x02;
    pub const UNSPENT: u8 = 0x03;
    pub const ADDRESS: u8 = 0x04;
    pub const KIND: u8 = 0x05;
    pub const IDENTIFIER: u8 = 0x06;
    pub const ISSUER: u8 = 0x07;
    pub const SENDER: u8 = 0x08;
    pub const SENDER_TAG: u8 = 0x09;
    pub const TREASURY: u8 = 0x0A;
    pub const RECEIPT: u8 = 0x0B;
}

/// Builds a key field by field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyBuilder(Vec<u8>);

impl KeyBuilder {
    /// Starts a key in the table with the given prefix.
    pub fn new(prefix: u8) -> Self {
        let mut bytes = Vec::with_capacity(1 + Address::LENGTH + 1 + Tag::LENGTH_RANGE.end() + 1 + OutputId::LENGTH);
        bytes.push(prefix);
        Self(bytes)
    }

    #[allow(missing_docs)]
    pub fn bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.0.extend_from_slice(bytes.as_ref());
        self
    }

    #[allow(missing_docs)]
    pub fn byte(mut self, byte: u8) -> Self {
        self.0.push(byte);
        self
    }

    #[allow(missing_docs)]
    pub fn address(self, address: &Address) -> Self {
        self.bytes(address.pack())
    }

    #[allow(missing_docs)]
    pub fn kind(self, kind: OutputKind) -> Self {
        self.byte(kind.into())
    }

    #[allow(missing_docs)]
    pub fn output_id(self, output_id: &OutputId) -> Self {
        self.bytes(output_id)
    }

    /// Appends the tag behind its length, so that one tag is never a prefix of another.
    pub fn tag(self, tag: &Tag) -> Self {
        // Tags are at most 64 bytes long.
        self.byte(tag.as_bytes().len() as u8).bytes(tag)
    }

    #[allow(missing_docs)]
    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

/// The key holding the ledger index.
pub fn ledger_index() -> Vec<u8> {
    vec![prefix::LEDGER_INDEX]
}

/// The key of the output record, which is kept after the output is spent.
pub fn output(output_id: &OutputId) -> Vec<u8> {
    KeyBuilder::new(prefix::OUTPUT).output_id(output_id).finish()
}

/// The key of the spent record.
pub fn spent(output_id: &OutputId) -> Vec<u8> {
    KeyBuilder::new(prefix::SPENT).output_id(output_id).finish()
}

/// The key marking the output as unspent.
pub fn unspent(output_id: &OutputId) -> Vec<u8> {
    KeyBuilder::new(prefix::UNSPENT).output_id(output_id).finish()
}

/// The key of a treasury output.
pub fn treasury(spent: bool, milestone_id: &MilestoneId) -> Vec<u8> {
    KeyBuilder::new(prefix::TREASURY)
        .byte(spent as u8)
        .bytes(milestone_id)
        .finish()
}

/// The prefix of all treasury outputs with the given spent flag.
pub fn treasury_prefix(spent: bool) -> Vec<u8> {
    KeyBuilder::new(prefix::TREASURY).byte(spent as u8).finish()
}

/// The key of a receipt.
pub fn receipt(migrated_at: MilestoneIndex, milestone_index: MilestoneIndex) -> Vec<u8> {
    KeyBuilder::new(prefix::RECEIPT)
        .bytes(migrated_at.to_be_bytes())
        .bytes(milestone_index.to_be_bytes())
        .finish()
}

/// The prefix of all receipts, or of the receipts for one legacy milestone.
pub fn receipt_prefix(migrated_at: Option<MilestoneIndex>) -> Vec<u8> {
    let key = KeyBuilder::new(prefix::RECEIPT);
    match migrated_at {
        Some(index) => key.bytes(index.to_be_bytes()),
        None => key,
    }
    .finish()
}

/// The derived index keys of an unspent output.
///
/// The unspent marker and the kind entry always exist. The remaining entries depend on the fields the output
/// carries.
pub fn index_keys(output: &Output) -> Vec<Vec<u8>> {
    let id = &output.output_id;
    let kind = output.kind();
    let mut keys = vec![
        unspent(id),
        KeyBuilder::new(prefix::KIND).kind(kind).output_id(id).finish(),
        KeyBuilder::new(prefix::ADDRESS)
            .address(&output.address())
            .kind(kind)
            .output_id(id)
            .finish(),
    ];
    if let Some(indexed_id) = output.indexed_id() {
        keys.push(
            KeyBuilder::new(prefix::IDENTIFIER)
                .kind(kind)
                .bytes(indexed_id)
                .output_id(id)
                .finish(),
        );
    }
    if let Some(issuer) = output.issuer() {
        keys.push(
            KeyBuilder::new(prefix::ISSUER)
                .address(issuer)
                .kind(kind)
                .output_id(id)
                .finish(),
        );
    }
    if let Some(sender) = output.sender() {
        keys.push(
            KeyBuilder::new(prefix::SENDER)
                .address(sender)
                .kind(kind)
                .output_id(id)
                .finish(),
        );
        if let Some(tag) = output.tag() {
            keys.push(
                KeyBuilder::new(prefix::SENDER_TAG)
                    .address(sender)
                    .tag(tag)
                    .kind(kind)
                    .output_id(id)
                    .finish(),
            );
        }
    }
    keys
}

/// The prefix selecting the entries of one index dimension, as narrow as the given fields allow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexPrefix<'a> {
    /// Every unspent output.
    Unspent,
    /// Unspent outputs of one kind.
    Kind(OutputKind),
    /// Unspent outputs unlocked by an address, optionally of one kind.
    Address(&'a Address, Option<OutputKind>),
    /// Unspent outputs of one kind, optionally with one identifier.
    Identifier(OutputKind, Option<&'a IndexedId>),
    /// Unspent outputs with an issuer, optionally of one kind.
    Issuer(&'a Address, Option<OutputKind>),
    /// Unspent outputs with a sender, optionally of one kind.
    Sender(&'a Address, Option<OutputKind>),
    /// Unspent outputs with a sender and tag, optionally of one kind.
    SenderTag(&'a Address, &'a Tag, Option<OutputKind>),
}

impl IndexPrefix<'_> {
    /// Builds the key prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        fn with_kind(key: KeyBuilder, kind: Option<OutputKind>) -> KeyBuilder {
            match kind {
                Some(kind) => key.kind(kind),
                None => key,
            }
        }
        match self {
            Self::Unspent => KeyBuilder::new(prefix::UNSPENT),
            Self::Kind(kind) => KeyBuilder::new(prefix::KIND).kind(*kind),
            Self::Address(address, kind) => with_kind(KeyBuilder::new(prefix::ADDRESS).address(address), *kind),
            Self::Identifier(kind, id) => {
                let key = KeyBuilder::new(prefix::IDENTIFIER).kind(*kind);
                match id {
                    Some(id) => key.bytes(id),
                    None => key,
                }
            }
            Self::Issuer(address, kind) => with_kind(KeyBuilder::new(prefix::ISSUER).address(address), *kind),
            Self::Sender(address, kind) => with_kind(KeyBuilder::new(prefix::SENDER).address(address), *kind),
            Self::SenderTag(address, tag, kind) => {
                with_kind(KeyBuilder::new(prefix::SENDER_TAG).address(address).tag(tag), *kind)
            }
        }
        .finish()
    }
}

/// Extracts the output id that ends every output, spent and index key.
pub fn output_id_suffix(key: &[u8]) -> Option<OutputId> {
    key.len()
        .checked_sub(OutputId::LENGTH)
        .filter(|start| *start > 0)
        .and_then(|start| OutputId::try_from(&key[start..]).ok())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{BasicOutput, Ed25519Address, Features, MessageId, NftId, NftOutput, TransactionId};

    fn basic(features: Features) -> Output {
        Output::new(
            OutputId::new(TransactionId([1; 32]), 3),
            MessageId::null(),
            1.into(),
            BasicOutput {
                amount: 5,
                address: Ed25519Address([2; 32]).into(),
                features,
            },
        )
    }

    #[test]
    fn index_keys_follow_fields() {
        assert_eq!(index_keys(&basic(Features::default())).len(), 3);

        let sender = Address::from(Ed25519Address([3; 32]));
        let output = basic(
            Features::default()
                .with_sender(sender)
                .with_issuer(Ed25519Address([4; 32]))
                .with_tag(Tag::new("Testing").unwrap()),
        );
        let keys = index_keys(&output);
        assert_eq!(keys.len(), 6);
        for key in &keys {
            assert_eq!(output_id_suffix(key), Some(output.output_id));
        }
        let sender_tag = IndexPrefix::SenderTag(&sender, &Tag::new("Testing").unwrap(), Some(OutputKind::Basic));
        assert!(keys.iter().any(|k| k.starts_with(&sender_tag.to_bytes())));
    }

    #[test]
    fn tag_prefix_does_not_match_longer_tags() {
        let sender = Address::from(Ed25519Address([3; 32]));
        let short = IndexPrefix::SenderTag(&sender, &Tag::new("Testing").unwrap(), None).to_bytes();
        let long = IndexPrefix::SenderTag(&sender, &Tag::new("TestingOther").unwrap(), None).to_bytes();
        assert!(!long.starts_with(&short));
    }

    #[test]
    fn address_prefix_narrows_by_kind() {
        let address = Address::from(Ed25519Address([2; 32]));
        let nft = Output::new(
            OutputId::new(TransactionId([1; 32]), 0),
            MessageId::null(),
            1.into(),
            NftOutput {
                amount: 1,
                nft_id: NftId([5; 32]),
                address,
                features: Features::default(),
            },
        );
        let keys = index_keys(&nft);
        let any_kind = IndexPrefix::Address(&address, None).to_bytes();
        let nft_kind = IndexPrefix::Address(&address, Some(OutputKind::Nft)).to_bytes();
        let basic_kind = IndexPrefix::Address(&address, Some(OutputKind::Basic)).to_bytes();
        assert!(keys.iter().any(|k| k.starts_with(&any_kind)));
        assert!(keys.iter().any(|k| k.starts_with(&nft_kind)));
        assert!(!keys.iter().any(|k| k.starts_with(&basic_kind)));
    }

    #[test]
    fn receipt_keys_sort_by_migration() {
        assert!(receipt(1.into(), 900.into()) < receipt(2.into(), 10.into()));
        assert!(receipt(256.into(), 1.into()) > receipt(255.into(), 1.into()));
    }
}
