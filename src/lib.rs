// The CatalogModel derive expands to `dive_catalog::CatalogModel`, which
// must also resolve inside this crate.
extern crate self as dive_catalog;

pub mod bus;
pub mod catalog;
pub mod config;
pub mod enroll;
pub mod forecast;
pub mod record;
pub mod resource;
pub mod store;
pub mod sync;

pub use bus::{ChangeBus, Subscription};
pub use catalog::CatalogModel;
pub use config::{ConfigError, ForecastConfig, ServerConfig, SyncConfig};
pub use enroll::{EnrollmentNotifier, EnrollmentRequest, LogNotifier};
pub use forecast::{Forecast, ForecastCache, ForecastError, ForecastSource};
pub use record::{Record, Value};
pub use resource::{ResourceError, ResourceRouter};
pub use store::{SqliteStore, StoreError};
pub use sync::{CollectionView, LocalTransport, Phase, Snapshot, SyncClient, SyncError, Transport};

#[cfg(feature = "http")]
pub use sync::HttpTransport;
