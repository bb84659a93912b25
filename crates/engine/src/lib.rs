//! Streaming symmetric cipher engine for token-backed block ciphers
//!
//! The engine drives a [`Token`](tokencipher_api::Token) session through a
//! streaming `update` / `finish` contract, taking care of block alignment,
//! PKCS#5 padding and session lifecycle.

pub mod buffer;
pub mod operation;
pub mod padding;
pub mod spec;

mod holdback;
mod mechanism;

pub use buffer::{OutputBuffer, SliceCursor};
pub use operation::CipherOperation;
pub use padding::{PadBlock, PaddingStrategy, Pkcs5Padding};
pub use spec::CipherSpec;
