//! Change Bus - in-process notifications keyed by collection.
//!
//! Mutations publish the name of the collection they touched; mounted
//! consumers subscribe to the collections they display and re-read when
//! notified. Nothing crosses the process boundary.
//!
//! ```text
//! SyncClient::create("courses", ..) ──► publish("courses")
//!                                          │
//!                     ┌────────────────────┼───────────────────┐
//!                     ▼                    ▼                   ▼
//!              CollectionView       CollectionView        callback
//!              (page listing)       (admin table)        (any Fn)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use dive_catalog::bus::ChangeBus;
//!
//! let bus = ChangeBus::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! let subscription = bus.subscribe("courses", move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert_eq!(bus.publish("courses"), 1);
//! assert_eq!(bus.publish("team"), 0);
//! drop(subscription);
//! assert_eq!(bus.publish("courses"), 0);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

mod change_bus;
mod subscription;

pub use change_bus::{ChangeBus, Listener};
pub use subscription::Subscription;
