//! Error taxonomy seen by sync client callers.

use thiserror::Error;

use crate::resource::ResourceError;

/// Error type for client operations.
///
/// `Clone` because one failed fetch is delivered to every caller that was
/// awaiting it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("access denied")]
    AccessDenied,
    #[error("item not found")]
    NotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    /// The server's store failed the operation.
    #[error("store error: {0}")]
    Store(String),
    /// The request did not complete or its response was unusable.
    #[error("network error: {0}")]
    Network(String),
    /// A List fetch exceeded the configured deadline.
    #[error("fetching {collection} timed out after {after_ms}ms")]
    Timeout { collection: String, after_ms: u64 },
}

impl SyncError {
    /// Transport-level failures, as opposed to errors the server reported.
    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Timeout { .. })
    }
}

impl From<ResourceError> for SyncError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::AccessDenied => SyncError::AccessDenied,
            ResourceError::NotFound => SyncError::NotFound,
            ResourceError::InvalidRequest(msg) => SyncError::InvalidRequest(msg),
            ResourceError::Unauthorized => SyncError::Unauthorized,
            ResourceError::Store(_) => SyncError::Store(err.to_string()),
        }
    }
}
