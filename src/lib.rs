//! # tokencipher
//!
//! A streaming symmetric cipher engine for block-oriented cryptographic
//! tokens.
//!
//! Hardware security modules and software token sessions usually accept data
//! only in whole blocks and may or may not implement padding. `tokencipher`
//! puts a conventional `update` / `finish` contract in front of such a
//! session: callers push arbitrarily fragmented input, and the engine takes
//! care of block alignment, PKCS#5 padding and returning the session to its
//! token on every exit path.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use tokencipher::prelude::*;
//!
//! let token = Arc::new(SoftToken::default());
//! let key = SecretKey::new(CipherAlgorithm::Aes, &[0x42; 32]).unwrap();
//!
//! let mut cipher = CipherOperation::from_transformation(token, "AES/CTR/NoPadding").unwrap();
//! cipher.init(Direction::Encrypt, &key, None).unwrap();
//! let ciphertext = cipher.finish_vec(b"seventeen bytes!!").unwrap();
//! assert_eq!(ciphertext.len(), 17);
//! ```
//!
//! ## Features
//!
//! - `soft-token` (default): the in-process [`softtoken`] backend
//! - `serde`: `Serialize` / `Deserialize` for the core types and the soft
//!   token configuration
//! - `full`: all features enabled
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports functionality from several sub-crates:
//!
//! - [`tokencipher-api`]: errors, core types and the backend traits
//! - [`tokencipher-engine`]: the streaming cipher engine
//! - [`tokencipher-softtoken`]: a software token implementing the backend traits
//! - [`tokencipher-params`]: algorithm constants

// Core re-exports (always available)
pub use tokencipher_api as api;
pub use tokencipher_engine as engine;
pub use tokencipher_internal as internal;
pub use tokencipher_params as params;

// Dependencies that appear in the public API
pub use rand;
pub use zeroize;

// Feature-gated re-exports
#[cfg(feature = "soft-token")]
pub use tokencipher_softtoken as softtoken;

/// Common imports for tokencipher users
pub mod prelude {
    // Re-export error types
    pub use crate::api::{BackendError, Error, Result};

    // Re-export core types and backend traits
    pub use crate::api::{
        BlockSession, CipherAlgorithm, Direction, Mechanism, Mode, PaddingMode, SecretKey, Token,
    };

    // Re-export the engine surface
    pub use crate::engine::{CipherOperation, CipherSpec, OutputBuffer, SliceCursor};

    #[cfg(feature = "soft-token")]
    pub use crate::softtoken::{FaultPoint, SoftToken, SoftTokenConfig};
}
