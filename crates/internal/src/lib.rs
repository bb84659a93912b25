//! Internal helpers shared by the tokencipher crates
//!
//! Not part of the public API; no stability guarantees.

#![cfg_attr(not(test), no_std)]

pub mod constant_time;
