//! Data Sync Client - cached, deduplicated access to collections.
//!
//! ```text
//! CollectionView ─┐
//! CollectionView ─┼─► SyncClient ──► Slot (per collection) ──► Transport ──► ResourceRouter
//! read_models()  ─┘        │           entry / pending / epoch   (local or HTTP)
//!                          └─► ChangeBus::publish after every mutation
//! ```
//!
//! A slot serves its cached records while `now - fetched_at < ttl`. A miss
//! joins the List fetch already in flight or starts one; the fetch runs as
//! its own task, bounded by `fetch_timeout`, and settles the slot only if
//! nothing invalidated it meanwhile. A failed fetch caches an empty result
//! and marks the slot `Failed`; the next read starts over.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use dive_catalog::config::SyncConfig;
//! use dive_catalog::record::Record;
//! use dive_catalog::resource::ResourceRouter;
//! use dive_catalog::store::SqliteStore;
//! use dive_catalog::sync::{LocalTransport, SyncClient};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(SqliteStore::open_in_memory().unwrap());
//! let transport = Arc::new(LocalTransport::new(Arc::new(ResourceRouter::new(store))));
//! let client = SyncClient::new(transport, SyncConfig::default());
//!
//! let mut view = client.mount("team");
//! assert!(view.data().await.unwrap().is_empty());
//!
//! let mut member = Record::new();
//! member.insert("name", "Sara");
//! client.create("team", member).await.unwrap();
//!
//! assert_eq!(view.changed().await, Some(1));
//! assert_eq!(view.snapshot().unwrap().len(), 1);
//! # }
//! ```

mod cache;
mod client;
mod error;
mod transport;
mod view;

pub use cache::{Phase, Snapshot};
pub use client::SyncClient;
pub use error::SyncError;
pub use transport::{LocalTransport, Transport};
pub use view::CollectionView;

#[cfg(feature = "http")]
pub use transport::HttpTransport;
