use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::Subscription;

/// A subscriber callback. Receives the collection that changed.
pub type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
pub(super) struct Registry {
    next_id: u64,
    topics: HashMap<String, Vec<(u64, Listener)>>,
}

impl Registry {
    pub(super) fn remove(&mut self, collection: &str, id: u64) -> bool {
        let Some(listeners) = self.topics.get_mut(collection) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.topics.remove(collection);
        }
        removed
    }
}

/// Publish/subscribe registry keyed by collection name.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    // Callbacks run outside the lock and panics are caught, so a poisoned
    // registry still holds consistent data.
    pub(super) fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
        registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `callback` for `collection`. The registration lives as long
    /// as the returned [`Subscription`].
    pub fn subscribe<F>(&self, collection: &str, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut registry = Self::lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .topics
            .entry(collection.to_string())
            .or_default()
            .push((id, Arc::new(callback)));
        debug!(collection, id, "subscribed");

        Subscription::new(Arc::downgrade(&self.registry), collection.to_string(), id)
    }

    /// Invoke every callback registered for `collection`, in registration
    /// order. A panicking callback is logged and skipped. Returns the number
    /// of callbacks that completed.
    pub fn publish(&self, collection: &str) -> usize {
        let listeners: Vec<Listener> = {
            let registry = Self::lock(&self.registry);
            match registry.topics.get(collection) {
                Some(listeners) => listeners.iter().map(|(_, l)| l.clone()).collect(),
                None => Vec::new(),
            }
        };

        let mut delivered = 0;
        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(collection))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(collection, "subscriber panicked during publish"),
            }
        }
        debug!(collection, delivered, "published");
        delivered
    }

    /// Number of live subscriptions for `collection`.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        Self::lock(&self.registry)
            .topics
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = Self::lock(&self.registry);
        f.debug_struct("ChangeBus")
            .field("topics", &registry.topics.keys().collect::<Vec<_>>())
            .finish()
    }
}
