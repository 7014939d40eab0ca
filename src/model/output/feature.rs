// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing output [`Features`].

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::Address;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("tag length {0} is outside of {range:?}", range = Tag::LENGTH_RANGE)]
#[allow(missing_docs)]
pub struct TagError(pub usize);

/// An indexation tag attached to an output.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(#[serde(with = "serde_bytes")] Vec<u8>);

impl Tag {
    /// The valid tag lengths.
    pub const LENGTH_RANGE: RangeInclusive<usize> = 1..=64;

    /// Creates a tag, validating its length.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TagError> {
        let bytes = bytes.into();
        if Self::LENGTH_RANGE.contains(&bytes.len()) {
            Ok(Self(bytes))
        } else {
            Err(TagError(bytes.len()))
        }
    }

    #[allow(missing_docs)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
        Self::new(bytes.into_vec()).map_err(serde::de::Error::custom)
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Tag {
    type Error = TagError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "Tag({s:?})"),
            Err(_) => write!(f, "Tag({})", prefix_hex::encode(&self.0[..])),
        }
    }
}

impl From<Tag> for mongodb::bson::Bson {
    fn from(val: Tag) -> Self {
        mongodb::bson::Binary {
            subtype: mongodb::bson::spec::BinarySubtype::Generic,
            bytes: val.0,
        }
        .into()
    }
}

/// The features of an output that take part in indexing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// The sender feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    /// The issuer feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Address>,
    /// The tag feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl Features {
    #[allow(missing_docs)]
    pub fn with_sender(mut self, sender: impl Into<Address>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    #[allow(missing_docs)]
    pub fn with_issuer(mut self, issuer: impl Into<Address>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[allow(missing_docs)]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }
}
