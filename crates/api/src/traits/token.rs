// File: crates/api/src/traits/token.rs

//! Trait definitions for cryptographic tokens and their sessions
//!
//! A token hands out sessions; a session carries at most one active
//! symmetric operation at a time. The shape follows the PKCS#11
//! `C_EncryptInit` / `C_EncryptUpdate` / `C_EncryptFinal` family, collapsed
//! into direction-agnostic calls.

use crate::error::BackendResult;
use crate::types::{Direction, Mechanism, SecretKey};

/// Opaque identifier for a token session
pub type SessionId = u64;

/// One backend session capable of running a single cipher operation
///
/// # Contract
/// - `update` and `finalize` return the number of bytes written to `output`.
/// - When `output` is too small the call fails with
///   `BackendError::BufferTooSmall` and leaves the session state untouched.
/// - Any other error terminates the active operation.
/// - `finalize` ends the operation whether or not it succeeds.
pub trait BlockSession: Send {
    /// Token-specific handle for imported key material
    type Key;

    /// Identifier of this session, stable for its lifetime
    fn id(&self) -> SessionId;

    /// Start an operation
    fn init(
        &mut self,
        direction: Direction,
        mechanism: &Mechanism,
        key: &Self::Key,
    ) -> BackendResult<()>;

    /// Process `input`, writing whatever whole blocks are ready to `output`
    fn update(&mut self, input: &[u8], output: &mut [u8]) -> BackendResult<usize>;

    /// Complete the operation, writing any remaining output
    fn finalize(&mut self, output: &mut [u8]) -> BackendResult<usize>;
}

/// A cryptographic token exposing a pool of sessions
///
/// Tokens are shared between threads; every method takes `&self` and the
/// implementation is responsible for its own locking.
pub trait Token: Send + Sync {
    /// Token-specific handle for imported key material
    type Key;

    /// Session type handed out by this token
    type Session: BlockSession<Key = Self::Key>;

    /// Human-readable token label
    fn name(&self) -> &str;

    /// Borrow a session from the pool
    fn acquire_session(&self) -> BackendResult<Self::Session>;

    /// Return a session whose operation has completed or been finalized
    fn release_session(&self, session: Self::Session);

    /// Discard a session that may still have an operation in flight
    ///
    /// Used when the token cannot cancel in-session; the pool must not hand
    /// out this session again.
    fn kill_session(&self, session: Self::Session);

    /// Convert a raw secret key into the token's key form
    fn import_key(&self, key: &SecretKey) -> BackendResult<Self::Key>;

    /// Whether the token applies PKCS#5 padding itself for `mechanism`
    fn supports_native_padding(&self, mechanism: &Mechanism) -> bool;

    /// Whether an active operation can be abandoned by a discarded finalize
    fn can_cancel(&self) -> bool;
}
