//! Shared fixtures: an in-memory store behind a router.

use std::sync::Arc;

use dive_catalog::record::Record;
use dive_catalog::resource::{hash_password, ResourceRouter};
use dive_catalog::store::{seed, AdminCredential, SqliteStore};

pub const ADMIN_PASSWORD: &str = "reef-safe";

/// Empty catalog with an admin login.
pub fn empty_router() -> Arc<ResourceRouter> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .populate(
            &[],
            &AdminCredential {
                username: "admin".into(),
                password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            },
        )
        .unwrap();
    Arc::new(ResourceRouter::new(Arc::new(store)))
}

/// Router over the default seed catalog.
pub fn seeded_router() -> Arc<ResourceRouter> {
    let router = empty_router();
    router
        .store()
        .populate(
            &seed::catalog_seed().unwrap(),
            &AdminCredential {
                username: "admin".into(),
                password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            },
        )
        .unwrap();
    router
}

pub fn record(value: serde_json::Value) -> Record {
    Record::try_from(value).unwrap()
}
