//! Resource router integration tests.

mod support;
mod router;
