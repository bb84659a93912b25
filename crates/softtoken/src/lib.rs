//! In-process software token for the tokencipher engine
//!
//! [`SoftToken`] implements the [`Token`](tokencipher_api::Token) contract
//! entirely in memory: a bounded session pool, AES (ECB, CBC, CTR), DESede
//! (ECB, CBC) and ARCFOUR mechanisms, optional native PKCS#5 padding and
//! one-shot fault injection for exercising error paths.

pub mod config;
pub mod key;
pub mod session;
pub mod token;

mod modes;
mod primitive;

pub use config::SoftTokenConfig;
pub use key::SoftKey;
pub use session::SoftSession;
pub use token::{FaultPoint, SoftToken};
