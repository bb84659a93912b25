// File: crates/api/src/traits/mod.rs

//! Backend traits the cipher engine drives

pub mod token;

pub use token::{BlockSession, SessionId, Token};
