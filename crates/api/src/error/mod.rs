//! Error handling for the cipher engine and its backends

pub mod types;
pub mod validate;

// Re-export the primary error type and result
pub use types::{BackendError, BackendResult, Error, Result};
