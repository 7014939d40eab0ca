// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the basic output.

use serde::{Deserialize, Serialize};

use super::Features;
use crate::model::Address;

/// Describes a basic output, which holds tokens that are unlocked by a single address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicOutput {
    /// The output amount.
    #[serde(with = "crate::model::util::stringify")]
    pub amount: u64,
    /// The address unlock condition.
    pub address: Address,
    /// The corresponding [`Features`].
    #[serde(default)]
    pub features: Features,
}

impl BasicOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "basic";
}
