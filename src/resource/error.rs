//! Error types for the resource surface.

use thiserror::Error;

use crate::store::StoreError;

/// Error type for resource operations.
///
/// `Display` is the message sent to clients; store failures never leak
/// detail past this point.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The collection is not exposed through the generic surface.
    #[error("Access denied")]
    AccessDenied,
    /// No row matched the update target.
    #[error("Item not found")]
    NotFound,
    /// The request cannot be executed as given.
    #[error("{0}")]
    InvalidRequest(String),
    /// Login rejected.
    #[error("Invalid credentials")]
    Unauthorized,
    /// The store failed the statement.
    #[error("Internal server error")]
    Store(#[from] StoreError),
}

impl ResourceError {
    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ResourceError::AccessDenied => 403,
            ResourceError::NotFound => 404,
            ResourceError::InvalidRequest(_) => 400,
            ResourceError::Unauthorized => 401,
            ResourceError::Store(_) => 500,
        }
    }
}
