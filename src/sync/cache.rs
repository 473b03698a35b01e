//! Per-collection cache slots.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use super::SyncError;
use crate::record::Record;

/// An immutable view of a collection as last fetched.
pub type Snapshot = Arc<Vec<Record>>;

/// A List fetch that any number of callers can await.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<Snapshot, SyncError>>>;

/// Where a collection's cache stands.
///
/// `Empty → Loading → Ready ⇄ Loading`, and `Loading → Failed → Loading` on
/// the next read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub data: Snapshot,
    pub fetched_at: Instant,
}

/// State of one collection.
///
/// `epoch` increases whenever a fetch starts or the slot is invalidated;
/// a fetch may only settle the slot while the epoch it started under is
/// still current.
#[derive(Default)]
pub(crate) struct Slot {
    pub epoch: u64,
    pub entry: Option<CacheEntry>,
    pub pending: Option<SharedFetch>,
    pub failure: Option<SyncError>,
}

impl Slot {
    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::Loading
        } else if self.failure.is_some() {
            Phase::Failed
        } else if self.entry.is_some() {
            Phase::Ready
        } else {
            Phase::Empty
        }
    }

    /// The cached data if it may be served without refetching.
    pub fn fresh(&self, ttl: Duration, now: Instant) -> Option<Snapshot> {
        if self.failure.is_some() {
            return None;
        }
        self.entry
            .as_ref()
            .filter(|entry| now.duration_since(entry.fetched_at) < ttl)
            .map(|entry| entry.data.clone())
    }

    /// Drop everything cached and orphan any fetch in flight.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.entry = None;
        self.pending = None;
        self.failure = None;
    }

    /// Record the outcome of the fetch started under `epoch`. Returns false
    /// when the fetch was superseded and its outcome discarded.
    pub fn settle(&mut self, epoch: u64, outcome: &Result<Snapshot, SyncError>) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.pending = None;
        match outcome {
            Ok(data) => {
                self.entry = Some(CacheEntry {
                    data: data.clone(),
                    fetched_at: Instant::now(),
                });
                self.failure = None;
            }
            Err(err) => {
                self.entry = Some(CacheEntry {
                    data: Arc::new(Vec::new()),
                    fetched_at: Instant::now(),
                });
                self.failure = Some(err.clone());
            }
        }
        true
    }
}
