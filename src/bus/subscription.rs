use std::sync::{Mutex, Weak};

use tracing::debug;

use super::change_bus::{ChangeBus, Registry};

/// Owned registration on a [`ChangeBus`].
///
/// Dropping the handle unsubscribes. The handle does not keep the bus alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    collection: String,
    id: u64,
}

impl Subscription {
    pub(super) fn new(registry: Weak<Mutex<Registry>>, collection: String, id: u64) -> Self {
        Self {
            registry,
            collection,
            id,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let removed = ChangeBus::lock(&registry).remove(&self.collection, self.id);
            if removed {
                debug!(collection = %self.collection, id = self.id, "unsubscribed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .field("id", &self.id)
            .finish()
    }
}
