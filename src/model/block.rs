// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Identifiers of the containers that create and consume outputs.

impl_id!(
    /// Uniquely identifies a transaction.
    TransactionId,
    32
);

impl_id!(
    /// Uniquely identifies the message that carried a transaction.
    MessageId,
    32
);

impl_id!(
    /// Uniquely identifies a milestone.
    MilestoneId,
    32
);
