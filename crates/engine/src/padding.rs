//! PKCS#5 padding applied by the engine when the token cannot pad natively

use tokencipher_api::error::{validate, Error, Result};
use tokencipher_internal::constant_time::ct_pkcs5_pad_len;
use tokencipher_params::MAX_BLOCK_SIZE;

/// Padding bytes for one final block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadBlock {
    bytes: [u8; MAX_BLOCK_SIZE],
    len: usize,
}

impl PadBlock {
    /// The padding bytes to append
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of padding bytes, always in `1..=block_size`
    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true; a pad block always carries at least one byte
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Strategy for adding and stripping block padding
pub trait PaddingStrategy: Send + Sync {
    /// Block size this strategy pads to
    fn block_size(&self) -> usize;

    /// Padding for a message of `residual_len` bytes
    ///
    /// Block-aligned input still receives one full block of padding.
    fn compute_padding(&self, residual_len: usize) -> PadBlock;

    /// Length of the plaintext inside `padded`
    ///
    /// Only the final block is inspected. Every malformed-padding case yields
    /// the same `BadPadding` error.
    fn remove_padding(&self, padded: &[u8]) -> Result<usize>;
}

/// PKCS#5 padding generalised to any block size up to `MAX_BLOCK_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pkcs5Padding {
    block_size: usize,
}

impl Pkcs5Padding {
    /// Create padding for the given block size
    pub fn new(block_size: usize) -> Result<Self> {
        validate::parameter(
            block_size > 0 && block_size <= MAX_BLOCK_SIZE,
            "padding",
            "PKCS5 padding requires a block cipher",
        )?;
        Ok(Self { block_size })
    }
}

impl PaddingStrategy for Pkcs5Padding {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn compute_padding(&self, residual_len: usize) -> PadBlock {
        let len = self.block_size - (residual_len % self.block_size);
        let mut bytes = [0u8; MAX_BLOCK_SIZE];
        bytes[..len].fill(len as u8);
        PadBlock { bytes, len }
    }

    fn remove_padding(&self, padded: &[u8]) -> Result<usize> {
        if padded.is_empty() {
            return Err(Error::BadPadding);
        }
        validate::block_multiple(padded.len(), self.block_size)?;

        let last_block = &padded[padded.len() - self.block_size..];
        let pad_len: Option<usize> = ct_pkcs5_pad_len(last_block).into();
        pad_len
            .map(|pad| padded.len() - pad)
            .ok_or(Error::BadPadding)
    }
}
