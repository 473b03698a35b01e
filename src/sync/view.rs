use tokio::sync::watch;

use super::cache::{Phase, Snapshot};
use super::{SyncClient, SyncError};
use crate::bus::Subscription;

/// A mounted consumer of one collection.
///
/// Subscribed to the collection's changes for as long as it lives. Reads go
/// through the shared cache, so any number of views over the same
/// collection cost one fetch per expiry or mutation.
#[derive(Debug)]
pub struct CollectionView {
    client: SyncClient,
    collection: String,
    changes: watch::Receiver<u64>,
    _subscription: Subscription,
}

impl CollectionView {
    pub(crate) fn new(client: SyncClient, collection: &str) -> Self {
        let (notify, changes) = watch::channel(0u64);
        let subscription = client.subscribe(collection, move |_| {
            notify.send_modify(|generation| *generation += 1);
        });

        Self {
            client,
            collection: collection.to_string(),
            changes,
            _subscription: subscription,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Current records, fetched if the cache cannot serve them.
    pub async fn data(&self) -> Result<Snapshot, SyncError> {
        self.client.read(&self.collection).await
    }

    /// Cached records without fetching.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.client.snapshot(&self.collection)
    }

    pub fn phase(&self) -> Phase {
        self.client.phase(&self.collection)
    }

    /// Number of changes published for this collection since mounting.
    pub fn generation(&self) -> u64 {
        *self.changes.borrow()
    }

    /// Wait for the next published change and return the new generation.
    /// `None` once the subscription can no longer deliver.
    pub async fn changed(&mut self) -> Option<u64> {
        self.changes.changed().await.ok()?;
        Some(*self.changes.borrow_and_update())
    }
}
