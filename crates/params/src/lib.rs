//! Constant values for tokencipher cryptographic operations
//!
//! This crate provides the algorithm constants shared between the engine and
//! the backends it drives.

#![no_std]

pub mod utils;

pub use utils::symmetric::*;
