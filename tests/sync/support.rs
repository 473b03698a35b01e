//! A transport that counts List calls and can be slowed or broken.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dive_catalog::record::Record;
use dive_catalog::resource::ResourceRouter;
use dive_catalog::store::SqliteStore;
use dive_catalog::sync::{LocalTransport, SyncClient, SyncError, Transport};
use dive_catalog::SyncConfig;

pub struct CountingTransport {
    inner: LocalTransport,
    pub router: Arc<ResourceRouter>,
    lists: AtomicUsize,
    list_delay_ms: AtomicU64,
    fail_lists: AtomicBool,
    panic_next_list: AtomicBool,
    fail_mutations: AtomicBool,
}

impl CountingTransport {
    pub fn new() -> Arc<Self> {
        let store = SqliteStore::open_in_memory().unwrap();
        let router = Arc::new(ResourceRouter::new(Arc::new(store)));
        Arc::new(Self {
            inner: LocalTransport::new(router.clone()),
            router,
            lists: AtomicUsize::new(0),
            list_delay_ms: AtomicU64::new(0),
            fail_lists: AtomicBool::new(false),
            panic_next_list: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
        })
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn set_list_delay(&self, delay: Duration) {
        self.list_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Make the next List call panic inside the fetch task.
    pub fn panic_next_list(&self) {
        self.panic_next_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    fn mutation_guard(&self) -> Result<(), SyncError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn list(&self, collection: &str) -> Result<Vec<Record>, SyncError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.panic_next_list.swap(false, Ordering::SeqCst) {
            panic!("transport crashed mid-list");
        }
        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(SyncError::Store("Internal server error".into()));
        }
        self.inner.list(collection).await
    }

    async fn create(&self, collection: &str, fields: Record) -> Result<Record, SyncError> {
        self.mutation_guard()?;
        self.inner.create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Record,
    ) -> Result<Record, SyncError> {
        self.mutation_guard()?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), SyncError> {
        self.mutation_guard()?;
        self.inner.delete(collection, id).await
    }
}

pub fn config() -> SyncConfig {
    SyncConfig {
        ttl: Duration::from_secs(60),
        fetch_timeout: Duration::from_secs(10),
    }
}

pub fn client() -> (SyncClient, Arc<CountingTransport>) {
    let transport = CountingTransport::new();
    (SyncClient::new(transport.clone(), config()), transport)
}

pub fn record(value: serde_json::Value) -> Record {
    Record::try_from(value).unwrap()
}
