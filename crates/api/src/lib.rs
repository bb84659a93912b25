//! Public API traits and types for the tokencipher engine
//!
//! This crate provides the public API surface shared by the engine and by
//! backend tokens: the error taxonomy, the algorithm/mode/padding types, and
//! the `Token` / `BlockSession` traits a backend implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate level for convenience
pub use error::{BackendError, BackendResult, Error, Result};
pub use types::*;

pub use traits::{BlockSession, SessionId, Token};
