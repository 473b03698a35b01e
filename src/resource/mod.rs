//! Resource router - generic List/Create/Update/Delete over named collections.
//!
//! One handler family serves every catalog collection. The caller's field
//! set shapes the statement; the store's schema decides which fields are
//! allowed. The `admin` collection is never reachable from here.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use dive_catalog::record::{Record, Value};
//! use dive_catalog::resource::ResourceRouter;
//! use dive_catalog::store::SqliteStore;
//!
//! let router = ResourceRouter::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
//!
//! let mut course = Record::new();
//! course.insert("title", "Advanced");
//! course.insert("includes", vec!["A".to_string(), "B".to_string()]);
//! let created = router.create("courses", course).unwrap();
//! assert!(created.id().is_some());
//!
//! let listed = router.list("courses").unwrap();
//! assert_eq!(
//!     listed[0].get("includes"),
//!     Some(&Value::StringArray(vec!["A".into(), "B".into()]))
//! );
//! ```

mod error;
mod login;

#[cfg(feature = "http")]
mod http;

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::record::{coercion, Record, Value, ID_FIELD};
use crate::store::{RowKey, SqliteStore, StoreError, ADMIN_TABLE};

pub use error::ResourceError;
pub use login::hash_password;

#[cfg(feature = "http")]
pub use http::{router, serve, AppState};

/// The only collection that may be updated without an id.
pub const GALLERY: &str = "gallery";

/// Generic CRUD over the store's collections.
pub struct ResourceRouter {
    store: Arc<SqliteStore>,
}

impl ResourceRouter {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    fn guard(collection: &str) -> Result<(), ResourceError> {
        if collection == ADMIN_TABLE {
            return Err(ResourceError::AccessDenied);
        }
        Ok(())
    }

    /// Every record of `collection`, array fields decoded.
    pub fn list(&self, collection: &str) -> Result<Vec<Record>, ResourceError> {
        Self::guard(collection)?;
        let rows = self
            .store
            .list(collection)
            .map_err(|e| store_failure("list", collection, e))?;
        Ok(rows.into_iter().map(coercion::decode_record).collect())
    }

    /// Insert a record, generating an id when it is absent, null or a blank
    /// string. Any other id is kept. Returns the record as stored, with its id.
    pub fn create(&self, collection: &str, mut fields: Record) -> Result<Record, ResourceError> {
        Self::guard(collection)?;
        if fields.get(ID_FIELD).map_or(true, Value::is_blank) {
            fields.set_id(Uuid::new_v4().to_string());
        }

        let encoded = coercion::encode_record(fields.clone());
        self.store
            .insert(collection, &encoded)
            .map_err(|e| store_failure("create", collection, e))?;

        info!(collection, id = fields.id().unwrap_or_default(), "created");
        Ok(coercion::decode_record(fields))
    }

    /// Assign `fields` on the record identified by `id`. `id` inside
    /// `fields` is ignored.
    ///
    /// A blank `id` is only accepted for the gallery, where rows are then
    /// matched on the `url` and `alt` carried in `fields`.
    pub fn update(
        &self,
        collection: &str,
        id: &str,
        mut fields: Record,
    ) -> Result<Record, ResourceError> {
        Self::guard(collection)?;
        fields.remove(ID_FIELD);

        let key = if !id.trim().is_empty() {
            RowKey::Id(id.to_string())
        } else {
            gallery_key(collection, &fields)?
        };

        if fields.is_empty() {
            return Err(ResourceError::InvalidRequest(
                "No fields to update".to_string(),
            ));
        }

        let encoded = coercion::encode_record(fields.clone());
        let matched = self
            .store
            .update(collection, &key, &encoded)
            .map_err(|e| store_failure("update", collection, e))?;
        if matched == 0 {
            return Err(ResourceError::NotFound);
        }

        info!(collection, ?key, matched, "updated");
        let mut echo = coercion::decode_record(fields);
        if let RowKey::Id(id) = key {
            echo.set_id(id);
        }
        Ok(echo)
    }

    /// Remove the record with `id`. Removing an absent record succeeds.
    pub fn delete(&self, collection: &str, id: &str) -> Result<(), ResourceError> {
        Self::guard(collection)?;
        let removed = self
            .store
            .delete(collection, id)
            .map_err(|e| store_failure("delete", collection, e))?;
        info!(collection, id, removed, "deleted");
        Ok(())
    }

    /// Give every gallery row without an id a fresh one.
    pub fn repair_gallery_ids(&self) -> Result<usize, ResourceError> {
        self.store
            .repair_gallery_ids()
            .map_err(|e| store_failure("repair", GALLERY, e))
    }
}

fn gallery_key(collection: &str, fields: &Record) -> Result<RowKey, ResourceError> {
    let invalid =
        || ResourceError::InvalidRequest("Cannot update item without valid ID or unique fields".to_string());

    if collection != GALLERY {
        return Err(invalid());
    }
    match (fields.text("url"), fields.text("alt")) {
        (Some(url), Some(alt)) if !url.is_empty() && !alt.is_empty() => Ok(RowKey::UrlAlt {
            url: url.to_string(),
            alt: alt.to_string(),
        }),
        _ => Err(invalid()),
    }
}

fn store_failure(operation: &'static str, collection: &str, err: StoreError) -> ResourceError {
    error!(operation, collection, error = %err, "store failure");
    ResourceError::Store(err)
}
