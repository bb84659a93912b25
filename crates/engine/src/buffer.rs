//! Output buffer adapters
//!
//! The engine itself works on `&mut [u8]`. These adapters let callers hand
//! it a growable `Vec<u8>` or a fixed, externally owned slice with a write
//! position instead.

use tokencipher_api::error::Result;
use tokencipher_api::Token;

use crate::operation::CipherOperation;

/// A destination the engine can append output to
pub trait OutputBuffer {
    /// Writable space for at least `len` bytes where the buffer can grow,
    /// or whatever space is left where it cannot
    fn writable(&mut self, len: usize) -> &mut [u8];

    /// Record that `written` of the `reserved` bytes handed out by the last
    /// `writable` call now hold output
    fn commit(&mut self, reserved: usize, written: usize);
}

impl OutputBuffer for Vec<u8> {
    fn writable(&mut self, len: usize) -> &mut [u8] {
        let start = self.len();
        self.resize(start + len, 0);
        &mut self[start..]
    }

    fn commit(&mut self, reserved: usize, written: usize) {
        let start = self.len() - reserved;
        self.truncate(start + written);
    }
}

/// A fixed slice filled from a moving write position
#[derive(Debug)]
pub struct SliceCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    /// Start writing at the beginning of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start writing at `pos`
    pub fn at(buf: &'a mut [u8], pos: usize) -> Self {
        let pos = pos.min(buf.len());
        Self { buf, pos }
    }

    /// Current write position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the write position
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl OutputBuffer for SliceCursor<'_> {
    fn writable(&mut self, _len: usize) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }

    fn commit(&mut self, _reserved: usize, written: usize) {
        self.pos += written;
    }
}

impl<T: Token> CipherOperation<T> {
    /// `update` into any [`OutputBuffer`]
    pub fn update_into<B: OutputBuffer + ?Sized>(
        &mut self,
        input: &[u8],
        out: &mut B,
    ) -> Result<usize> {
        let needed = self.update_length(input.len());
        let dst = out.writable(needed);
        let reserved = dst.len();
        let result = self.update(input, dst);
        out.commit(reserved, *result.as_ref().unwrap_or(&0));
        result
    }

    /// `finish` into any [`OutputBuffer`]
    pub fn finish_into<B: OutputBuffer + ?Sized>(
        &mut self,
        input: &[u8],
        out: &mut B,
    ) -> Result<usize> {
        let needed = self.finish_length(input.len());
        let dst = out.writable(needed);
        let reserved = dst.len();
        let result = self.finish(input, dst);
        out.commit(reserved, *result.as_ref().unwrap_or(&0));
        result
    }

    /// `update` returning the output as a new vector
    pub fn update_vec(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.update_into(input, &mut out)?;
        Ok(out)
    }

    /// `finish` returning the output as a new vector
    pub fn finish_vec(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.finish_into(input, &mut out)?;
        Ok(out)
    }
}
