//! Sync client integration tests.

mod support;
mod cache;
mod mutations;

#[cfg(feature = "http")]
mod http;
