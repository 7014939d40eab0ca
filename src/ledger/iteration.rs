// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Filtered iteration over the unspent set.
//!
//! An [`OutputFilter`] picks the narrowest index for its predicates and checks the remaining ones against each
//! output it visits. Iterators are bound to the snapshot taken when they were created and fetch one entry per step,
//! so breaking out of a loop early never scans the rest of the index.

use std::{fmt, str::FromStr};

use tracing::instrument;

use super::{
    error::CodecError,
    keys::{self, prefix, IndexPrefix},
    store::{decode, KvRead, KvStore, LedgerRead, PrefixIter},
    LedgerEngine, LedgerError,
};
use crate::model::{Address, AliasId, FoundryId, IndexedId, NftId, Output, OutputKind, Spent, Tag};

/// The predicates of an unspent output query. Every field that is set narrows the result.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputFilter {
    /// The unlock address.
    pub address: Option<Address>,
    /// The output kind.
    pub kind: Option<OutputKind>,
    /// The governing identifier. A null identifier matches every output of its kind.
    pub identifier: Option<IndexedId>,
    /// The address named by the issuer feature.
    pub issuer: Option<Address>,
    /// The address named by the sender feature.
    pub sender: Option<Address>,
    /// The exact indexation tag. Only used together with a sender.
    pub tag: Option<Tag>,
    /// Stop after this many matches.
    pub max_result_count: Option<usize>,
}

impl OutputFilter {
    /// Matches every unspent output.
    pub fn all() -> Self {
        Self::default()
    }

    /// Unspent basic outputs, optionally unlocked by an address.
    pub fn basic(address: Option<Address>) -> Self {
        let filter = Self::default().kind(OutputKind::Basic);
        match address {
            Some(address) => filter.address(address),
            None => filter,
        }
    }

    /// Unspent alias outputs, optionally with one alias id.
    pub fn alias(alias_id: Option<AliasId>) -> Self {
        Self::default().identifier(alias_id.unwrap_or_else(AliasId::null))
    }

    /// Unspent NFT outputs, optionally with one NFT id.
    pub fn nft(nft_id: Option<NftId>) -> Self {
        Self::default().identifier(nft_id.unwrap_or_else(NftId::null))
    }

    /// Unspent foundry outputs, optionally with one foundry id.
    pub fn foundry(foundry_id: Option<FoundryId>) -> Self {
        Self::default().identifier(foundry_id.unwrap_or_else(FoundryId::null))
    }

    #[allow(missing_docs)]
    pub fn address(mut self, address: impl Into<Address>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[allow(missing_docs)]
    pub fn kind(mut self, kind: OutputKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[allow(missing_docs)]
    pub fn identifier(mut self, identifier: impl Into<IndexedId>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    #[allow(missing_docs)]
    pub fn issuer(mut self, issuer: impl Into<Address>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[allow(missing_docs)]
    pub fn sender(mut self, sender: impl Into<Address>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    #[allow(missing_docs)]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    #[allow(missing_docs)]
    pub fn max_result_count(mut self, count: usize) -> Self {
        self.max_result_count = Some(count);
        self
    }

    /// The kind every match must have, if the filter implies one.
    fn implied_kind(&self) -> Option<OutputKind> {
        self.kind.or_else(|| self.identifier.map(|id| id.kind()))
    }

    /// Chooses the index to scan. Identifiers select at most one output, so they are preferred over the sender, issuer
    /// and address indexes, which are preferred over the kind index.
    fn index_prefix(&self) -> IndexPrefix<'_> {
        let kind = self.implied_kind();
        if let Some(id) = &self.identifier {
            return IndexPrefix::Identifier(id.kind(), (!id.is_null()).then_some(id));
        }
        match (&self.sender, &self.tag, &self.issuer, &self.address, kind) {
            (Some(sender), Some(tag), ..) => IndexPrefix::SenderTag(sender, tag, kind),
            (Some(sender), None, ..) => IndexPrefix::Sender(sender, kind),
            (None, _, Some(issuer), ..) => IndexPrefix::Issuer(issuer, kind),
            (None, _, None, Some(address), _) => IndexPrefix::Address(address, kind),
            (None, _, None, None, Some(kind)) => IndexPrefix::Kind(kind),
            (None, _, None, None, None) => IndexPrefix::Unspent,
        }
    }

    /// Whether the output satisfies every predicate.
    pub fn matches(&self, output: &Output) -> bool {
        self.implied_kind().map_or(true, |kind| output.kind() == kind)
            && self.address.map_or(true, |address| output.address() == address)
            && self.identifier.map_or(true, |id| id.is_null() || output.indexed_id() == Some(id))
            && self.issuer.as_ref().map_or(true, |issuer| output.issuer() == Some(issuer))
            && self.sender.as_ref().map_or(true, |sender| output.sender() == Some(sender))
            && (self.sender.is_none() || self.tag.as_ref().map_or(true, |tag| output.tag() == Some(tag)))
    }
}

/// The lazy result of an [`OutputFilter`] query.
pub struct UnspentOutputs<R> {
    entries: PrefixIter<R>,
    filter: OutputFilter,
    remaining: Option<usize>,
}

impl<R: KvRead> UnspentOutputs<R> {
    fn new(reader: R, filter: OutputFilter, start: Option<Vec<u8>>) -> Self {
        let prefix = filter.index_prefix().to_bytes();
        Self {
            entries: PrefixIter::starting_at(reader, prefix, start),
            remaining: filter.max_result_count,
            filter,
        }
    }

    /// Returns the next match together with the index key it was found at.
    fn next_entry(&mut self) -> Option<Result<(Vec<u8>, Output), LedgerError>> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            let (key, _) = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.remaining = Some(0);
                    return Some(Err(e.into()));
                }
            };
            let output = keys::output_id_suffix(&key)
                .ok_or(CodecError::Malformed("index key").into())
                .and_then(|output_id| self.entries.reader().read_output(&output_id));
            match output {
                Ok(output) if !self.filter.matches(&output) => continue,
                Ok(output) => {
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(Ok((key, output)));
                }
                Err(e) => {
                    self.remaining = Some(0);
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: KvRead> Iterator for UnspentOutputs<R> {
    type Item = Result<Output, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|res| res.map(|(_, output)| output))
    }
}

/// Iterates over spent records in output id order.
pub struct SpentOutputs<R> {
    entries: PrefixIter<R>,
}

impl<R: KvRead> Iterator for SpentOutputs<R> {
    type Item = Result<Spent, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = match self.entries.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };
        Some(
            keys::output_id_suffix(&key)
                .ok_or(CodecError::Malformed("spent key").into())
                .and_then(|output_id| self.entries.reader().read_spent(&output_id))
                .and_then(|spent| spent.ok_or(CodecError::Malformed("spent record").into())),
        )
    }
}

/// Iterates over every output ever created, spent or not, in output id order.
pub struct AllOutputs<R> {
    entries: PrefixIter<R>,
}

impl<R: KvRead> Iterator for AllOutputs<R> {
    type Item = Result<Output, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(match self.entries.next()? {
            Ok((_, bytes)) => decode(&bytes).map_err(Into::into),
            Err(e) => Err(e.into()),
        })
    }
}

/// The position of the next entry of a paged query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageCursor(Vec<u8>);

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", prefix_hex::encode(self.0.as_slice()))
    }
}

impl FromStr for PageCursor {
    type Err = prefix_hex::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(prefix_hex::decode(s)?))
    }
}

/// One page of a paged query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// The matching outputs of this page.
    pub outputs: Vec<Output>,
    /// Where the next page starts, if there is one.
    pub cursor: Option<PageCursor>,
}

/// Sums the amounts of the unspent set of a snapshot.
pub(crate) fn compute_balance<R: KvRead>(reader: &R) -> Result<(u64, usize), LedgerError> {
    let mut balance = 0u64;
    let mut count = 0;
    for entry in PrefixIter::new(reader, vec![prefix::UNSPENT]) {
        let (key, _) = entry?;
        let output_id = keys::output_id_suffix(&key).ok_or(CodecError::Malformed("unspent key"))?;
        balance = balance
            .checked_add(reader.read_output(&output_id)?.amount())
            .ok_or(LedgerError::BalanceOverflow)?;
        count += 1;
    }
    Ok((balance, count))
}

impl<S: KvStore> LedgerEngine<S> {
    /// Iterates over the unspent outputs matching the filter.
    pub fn unspent_outputs(&self, filter: OutputFilter) -> Result<UnspentOutputs<S::Snapshot>, LedgerError> {
        Ok(UnspentOutputs::new(self.store.snapshot()?, filter, None))
    }

    /// Collects the unspent outputs matching the filter, up to its maximum result count.
    pub fn load_unspent_outputs(&self, filter: OutputFilter) -> Result<Vec<Output>, LedgerError> {
        self.unspent_outputs(filter)?.collect()
    }

    /// Collects one page of the unspent outputs matching the filter. A page size of 0 returns every match.
    ///
    /// The returned cursor resumes right where this page ended, so concatenating all pages of a static ledger
    /// yields the same outputs as [`load_unspent_outputs`](Self::load_unspent_outputs). A cursor taken from a query
    /// that scans a different index is rejected.
    #[instrument(skip(self, filter, cursor), err, level = "trace")]
    pub fn load_page(
        &self,
        filter: OutputFilter,
        page_size: usize,
        cursor: Option<PageCursor>,
    ) -> Result<Page, LedgerError> {
        if let Some(cursor) = &cursor {
            if !cursor.0.starts_with(&filter.index_prefix().to_bytes()) {
                return Err(LedgerError::InvalidCursor(cursor.to_string()));
            }
        }
        let mut iter = UnspentOutputs::new(self.store.snapshot()?, filter, cursor.map(|c| c.0));
        let mut outputs = Vec::new();
        while page_size == 0 || outputs.len() < page_size {
            match iter.next_entry() {
                Some(entry) => outputs.push(entry?.1),
                None => return Ok(Page { outputs, cursor: None }),
            }
        }
        let cursor = iter.next_entry().transpose()?.map(|(key, _)| PageCursor(key));
        Ok(Page { outputs, cursor })
    }

    /// Iterates over the spent records.
    pub fn spent_outputs(&self) -> Result<SpentOutputs<S::Snapshot>, LedgerError> {
        Ok(SpentOutputs {
            entries: PrefixIter::new(self.store.snapshot()?, vec![prefix::SPENT]),
        })
    }

    /// Collects the spent records, up to `max_result_count`.
    pub fn load_spent_outputs(&self, max_result_count: Option<usize>) -> Result<Vec<Spent>, LedgerError> {
        self.spent_outputs()?
            .take(max_result_count.unwrap_or(usize::MAX))
            .collect()
    }

    /// Iterates over every output ever created.
    pub fn outputs(&self) -> Result<AllOutputs<S::Snapshot>, LedgerError> {
        Ok(AllOutputs {
            entries: PrefixIter::new(self.store.snapshot()?, vec![prefix::OUTPUT]),
        })
    }

    /// Sums the amounts of all unspent outputs and counts them, returning `(balance, count)`.
    #[instrument(skip_all, err, level = "debug")]
    pub fn compute_ledger_balance(&self) -> Result<(u64, usize), LedgerError> {
        let _guard = self.read_lock_ledger();
        compute_balance(&self.store.snapshot()?)
    }
}
