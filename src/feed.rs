// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The confirmation feed shared by the ledger engine and the secondary indexer.
//!
//! Both consumers receive the same confirmations in milestone order. They do not share a transaction, so the indexer
//! is only eventually consistent with the ledger.

use std::error::Error;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    db::mongodb::collections::Indexer,
    ledger::{store::KvStore, LedgerEngine},
    model::{Confirmation, MilestoneIndex},
};

/// A boxed error of a sink or of the confirmation source.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A consumer of confirmed milestones.
#[async_trait]
pub trait ConfirmationSink: Send + Sync {
    /// A name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Applies one confirmed milestone.
    async fn apply(&self, confirmation: &Confirmation) -> Result<(), BoxError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("`{sink}` failed to apply milestone {milestone_index}: {source}")]
    Sink {
        sink: &'static str,
        milestone_index: MilestoneIndex,
        #[source]
        source: BoxError,
    },
    #[error("confirmation source failed: {0}")]
    Source(#[source] BoxError),
}

#[async_trait]
impl<S: KvStore> ConfirmationSink for LedgerEngine<S> {
    fn name(&self) -> &'static str {
        "ledger"
    }

    /// Milestones that were already applied are skipped, so a feed can be replayed after a restart.
    async fn apply(&self, confirmation: &Confirmation) -> Result<(), BoxError> {
        let _guard = self.write_lock_ledger();
        let ledger_index = self.ledger_index()?;
        if confirmation.milestone_index <= ledger_index {
            debug!("milestone {} already applied", confirmation.milestone_index);
            return Ok(());
        }
        Ok(self.apply_confirmation_without_locking(confirmation)?)
    }
}

#[async_trait]
impl ConfirmationSink for Indexer {
    fn name(&self) -> &'static str {
        "indexer"
    }

    async fn apply(&self, confirmation: &Confirmation) -> Result<(), BoxError> {
        Ok(self.apply_confirmation(confirmation).await?)
    }
}

/// Feeds every confirmation of the stream to each sink in turn.
///
/// The first failure stops the feed; later sinks do not see the failing milestone. Returns the number of
/// milestones that went through every sink.
#[instrument(skip_all, fields(sinks = sinks.len()), err, level = "debug")]
pub async fn dispatch<St, E>(mut stream: St, sinks: &[&dyn ConfirmationSink]) -> Result<usize, FeedError>
where
    St: Stream<Item = Result<Confirmation, E>> + Unpin + Send,
    E: Into<BoxError>,
{
    let mut applied = 0;
    while let Some(confirmation) = stream.try_next().await.map_err(|e| FeedError::Source(e.into()))? {
        for sink in sinks {
            sink.apply(&confirmation).await.map_err(|source| FeedError::Sink {
                sink: sink.name(),
                milestone_index: confirmation.milestone_index,
                source,
            })?;
        }
        applied += 1;
    }
    debug!("dispatched {applied} milestones");
    Ok(applied)
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use futures::stream;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ledger::{store::MemoryStore, LedgerError};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<MilestoneIndex>>,
    }

    #[async_trait]
    impl ConfirmationSink for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn apply(&self, confirmation: &Confirmation) -> Result<(), BoxError> {
            self.seen.lock().push(confirmation.milestone_index);
            Ok(())
        }
    }

    fn confirmations(indexes: impl IntoIterator<Item = u32>) -> impl Stream<Item = Result<Confirmation, Infallible>> {
        stream::iter(indexes.into_iter().map(|index| Ok(Confirmation::new(index))))
    }

    #[tokio::test]
    async fn sinks_see_milestones_in_order() {
        let ledger = LedgerEngine::new(MemoryStore::new());
        let recorder = Recorder::default();

        let applied = dispatch(confirmations(1..=3), &[&ledger, &recorder]).await.unwrap();

        assert_eq!(applied, 3);
        assert_eq!(ledger.ledger_index().unwrap(), MilestoneIndex(3));
        assert_eq!(*recorder.seen.lock(), Vec::<MilestoneIndex>::from([1.into(), 2.into(), 3.into()]));
    }

    #[tokio::test]
    async fn replayed_milestones_are_skipped_by_the_ledger() {
        let ledger = LedgerEngine::new(MemoryStore::new());
        dispatch(confirmations(1..=2), &[&ledger]).await.unwrap();

        let applied = dispatch(confirmations(1..=3), &[&ledger]).await.unwrap();

        assert_eq!(applied, 3);
        assert_eq!(ledger.ledger_index().unwrap(), MilestoneIndex(3));
    }

    #[tokio::test]
    async fn gap_stops_the_feed() {
        let ledger = LedgerEngine::new(MemoryStore::new());
        let recorder = Recorder::default();

        let err = dispatch(confirmations([1, 2, 4, 5]), &[&ledger, &recorder])
            .await
            .unwrap_err();

        match err {
            FeedError::Sink {
                sink,
                milestone_index,
                source,
            } => {
                assert_eq!(sink, "ledger");
                assert_eq!(milestone_index, MilestoneIndex(4));
                let source = source.downcast::<LedgerError>().unwrap();
                assert!(source.is_fatal());
            }
            e => panic!("unexpected error {e}"),
        }
        assert_eq!(*recorder.seen.lock(), Vec::<MilestoneIndex>::from([1.into(), 2.into()]));
        assert_eq!(ledger.ledger_index().unwrap(), MilestoneIndex(2));
    }
}
