//! Validation utilities for cipher parameters

use super::{Error, Result};

/// Validate a parameter condition
#[inline(always)]
pub fn parameter(condition: bool, context: &'static str, reason: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::param(context, reason));
    }
    Ok(())
}

/// Validate an exact length, reporting a parameter error on mismatch
#[inline(always)]
pub fn length(context: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::param(
            context,
            format!("expected {} bytes, got {}", expected, actual),
        ));
    }
    Ok(())
}

/// Validate that `length` is a whole number of blocks
///
/// A block size of zero (stream cipher) accepts every length.
#[inline(always)]
pub fn block_multiple(length: usize, block_size: usize) -> Result<()> {
    if block_size != 0 && length % block_size != 0 {
        return Err(Error::IllegalBlockSize { length, block_size });
    }
    Ok(())
}

/// Validate that an output buffer can hold `required` bytes
#[inline(always)]
pub fn output_capacity(available: usize, required: usize) -> Result<()> {
    if available < required {
        return Err(Error::ShortBuffer {
            required,
            available,
        });
    }
    Ok(())
}
