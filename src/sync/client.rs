use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{Phase, SharedFetch, Slot, Snapshot};
use super::{CollectionView, SyncError, Transport};
use crate::bus::{ChangeBus, Subscription};
use crate::catalog::CatalogModel;
use crate::config::{ConfigError, SyncConfig};
use crate::record::{coercion, Record, ID_FIELD};

/// Client-side data layer over a [`Transport`].
///
/// Holds one cache slot per collection. Reads are served from the slot while
/// it is fresh, and concurrent misses share a single List fetch. Mutations go
/// straight to the transport, then invalidate, refetch and notify the
/// [`ChangeBus`] exactly once.
///
/// Cloning yields another handle to the same cache and bus.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    bus: ChangeBus,
    config: SyncConfig,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Inner {
    // No caller code runs under this lock, so a poisoned map is still
    // consistent.
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(self: Arc<Self>, collection: String, epoch: u64) -> Result<Snapshot, SyncError> {
        let timeout = self.config.fetch_timeout;
        let outcome = match tokio::time::timeout(timeout, self.transport.list(&collection)).await {
            Ok(Ok(records)) => Ok(Arc::new(
                records
                    .into_iter()
                    .map(coercion::decode_record)
                    .collect::<Vec<_>>(),
            )),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(SyncError::Timeout {
                collection: collection.clone(),
                after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        let settled = self
            .slots()
            .get_mut(&collection)
            .is_some_and(|slot| slot.settle(epoch, &outcome));

        match (&outcome, settled) {
            (_, false) => debug!(%collection, epoch, "discarding superseded fetch"),
            (Ok(data), true) => debug!(%collection, records = data.len(), "cached"),
            (Err(err), true) => warn!(%collection, error = %err, "fetch failed"),
        }
        outcome
    }
}

impl SyncClient {
    pub fn new(transport: Arc<dyn Transport>, config: SyncConfig) -> Self {
        Self::with_bus(transport, config, ChangeBus::new())
    }

    /// Build a client configured from `DIVE_CACHE_TTL_MS` and
    /// `DIVE_FETCH_TIMEOUT_MS`.
    pub fn from_env(transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        Ok(Self::new(transport, SyncConfig::from_env()?))
    }

    /// Build a client that publishes on an existing bus.
    pub fn with_bus(transport: Arc<dyn Transport>, config: SyncConfig, bus: ChangeBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                bus,
                config,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.inner.bus
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Start a fetch for `collection`, superseding any in flight.
    fn start_fetch(&self, collection: &str, slot: &mut Slot) -> SharedFetch {
        slot.epoch += 1;
        let epoch = slot.epoch;
        debug!(collection, epoch, "fetching");

        let inner = self.inner.clone();
        let name = collection.to_string();
        let task = tokio::spawn(inner.clone().fetch(name.clone(), epoch));
        let fetch = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // A dead task never settled the slot.
                    let outcome = Err(SyncError::Network(format!("fetch task failed: {e}")));
                    let settled = inner
                        .slots()
                        .get_mut(&name)
                        .is_some_and(|slot| slot.settle(epoch, &outcome));
                    if settled {
                        warn!(collection = %name, error = %e, "fetch task died");
                    }
                    outcome
                }
            }
        }
        .boxed()
        .shared();

        slot.pending = Some(fetch.clone());
        fetch
    }

    /// The collection's records. Served from cache while fresh; otherwise
    /// joins the fetch in flight or starts one.
    pub async fn read(&self, collection: &str) -> Result<Snapshot, SyncError> {
        let fetch = {
            let mut slots = self.inner.slots();
            let slot = slots.entry(collection.to_string()).or_default();

            if let Some(data) = slot.fresh(self.inner.config.ttl, Instant::now()) {
                debug!(collection, "cache hit");
                return Ok(data);
            }
            if let Some(pending) = slot.pending.clone() {
                debug!(collection, "joining fetch in flight");
                pending
            } else {
                self.start_fetch(collection, slot)
            }
        };
        fetch.await
    }

    /// Fetch the collection now, regardless of what is cached.
    pub async fn refresh(&self, collection: &str) -> Result<Snapshot, SyncError> {
        let fetch = {
            let mut slots = self.inner.slots();
            let slot = slots.entry(collection.to_string()).or_default();
            self.start_fetch(collection, slot)
        };
        fetch.await
    }

    /// Forget the cached data. A fetch in flight will not be cached.
    pub fn invalidate(&self, collection: &str) {
        if let Some(slot) = self.inner.slots().get_mut(collection) {
            slot.invalidate();
            debug!(collection, "invalidated");
        }
    }

    /// The cached data as it stands, without fetching. `None` before the
    /// first fetch completes and after invalidation.
    pub fn snapshot(&self, collection: &str) -> Option<Snapshot> {
        self.inner
            .slots()
            .get(collection)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| entry.data.clone())
    }

    pub fn phase(&self, collection: &str) -> Phase {
        self.inner
            .slots()
            .get(collection)
            .map_or(Phase::Empty, Slot::phase)
    }

    /// The error that left the collection `Failed`, if any.
    pub fn last_error(&self, collection: &str) -> Option<SyncError> {
        self.inner
            .slots()
            .get(collection)
            .and_then(|slot| slot.failure.clone())
    }

    /// Register for change notifications on `collection`.
    pub fn subscribe<F>(&self, collection: &str, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(collection, callback)
    }

    /// Mount a consumer of `collection`. The view stays subscribed until
    /// dropped.
    pub fn mount(&self, collection: &str) -> CollectionView {
        CollectionView::new(self.clone(), collection)
    }

    /// Create a record. Array fields may be given structured.
    pub async fn create(&self, collection: &str, fields: Record) -> Result<Record, SyncError> {
        let created = self
            .inner
            .transport
            .create(collection, coercion::encode_record(fields))
            .await?;
        info!(collection, id = created.id().unwrap_or_default(), "created");
        self.after_mutation(collection).await;
        Ok(coercion::decode_record(created))
    }

    /// Update the record `id`. An `id` inside `fields` is dropped.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        mut fields: Record,
    ) -> Result<Record, SyncError> {
        fields.remove(ID_FIELD);
        let updated = self
            .inner
            .transport
            .update(collection, id, coercion::encode_record(fields))
            .await?;
        info!(collection, id, "updated");
        self.after_mutation(collection).await;
        Ok(coercion::decode_record(updated))
    }

    /// Delete the record `id`. Deleting an absent record succeeds.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), SyncError> {
        self.inner.transport.delete(collection, id).await?;
        info!(collection, id, "deleted");
        self.after_mutation(collection).await;
        Ok(())
    }

    /// The mutation itself succeeded; a failed refetch leaves the
    /// collection `Failed` for the next read to retry.
    async fn after_mutation(&self, collection: &str) {
        self.invalidate(collection);
        if let Err(err) = self.refresh(collection).await {
            warn!(collection, error = %err, "refresh after mutation failed");
        }
        self.inner.bus.publish(collection);
    }

    /// Typed read of a catalog collection. Records that do not decode into
    /// `M` are logged and skipped.
    pub async fn read_models<M: CatalogModel>(&self) -> Result<Vec<M>, SyncError> {
        let records = self.read(M::COLLECTION).await?;
        Ok(records
            .iter()
            .filter_map(|record| match M::from_record(record) {
                Ok(model) => Some(model),
                Err(err) => {
                    warn!(
                        collection = M::COLLECTION,
                        id = record.id().unwrap_or_default(),
                        error = %err,
                        "skipping record that does not decode"
                    );
                    None
                }
            })
            .collect())
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("config", &self.inner.config)
            .field("bus", &self.inner.bus)
            .finish()
    }
}
