use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying statement failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The collection name does not name a table.
    #[error("no such collection: {0}")]
    UnknownCollection(String),
    /// A supplied field is not a column of the target table.
    #[error("unknown field `{field}` for collection {collection}")]
    UnknownField { collection: String, field: String },
    /// An update carried no assignable fields.
    #[error("nothing to update in collection {0}")]
    NothingToUpdate(String),
    /// The connection mutex was poisoned by a panicking holder.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}
