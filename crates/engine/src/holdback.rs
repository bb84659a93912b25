//! Partial-block buffer kept by the engine while it strips padding

use tokencipher_params::MAX_BLOCK_SIZE;
use zeroize::{Zeroize, Zeroizing};

/// Up to one block of ciphertext held back from the token
///
/// The contents are wiped whenever they are cleared and on drop.
pub(crate) struct Holdback {
    buf: Zeroizing<[u8; MAX_BLOCK_SIZE]>,
    len: usize,
    capacity: usize,
}

impl Holdback {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity <= MAX_BLOCK_SIZE);
        Self {
            buf: Zeroizing::new([0u8; MAX_BLOCK_SIZE]),
            len: 0,
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Fill the buffer from the front of `input`; returns bytes taken
    pub(crate) fn top_up(&mut self, input: &[u8]) -> usize {
        let take = (self.capacity - self.len).min(input.len());
        self.buf[self.len..self.len + take].copy_from_slice(&input[..take]);
        self.len += take;
        take
    }

    /// Replace the contents with `bytes`
    pub(crate) fn set(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.capacity);
        self.clear();
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
    }

    /// Drop bytes beyond `len`, undoing a `top_up`
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.buf[len..self.len].zeroize();
            self.len = len;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.buf.zeroize();
        self.len = 0;
    }
}
