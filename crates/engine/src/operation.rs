//! Streaming cipher operations driven through a token session
//!
//! A [`CipherOperation`] turns a token's block-oriented session into the
//! usual `init` / `update*` / `finish` contract. Callers may feed input in
//! chunks of any size; the operation keeps block alignment, applies PKCS#5
//! padding when the token cannot, and makes sure the session goes back to
//! the token on every exit path.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tokencipher_api::{CipherAlgorithm, Direction, SecretKey};
//! use tokencipher_engine::CipherOperation;
//! use tokencipher_softtoken::SoftToken;
//!
//! let token = Arc::new(SoftToken::default());
//! let key = SecretKey::new(CipherAlgorithm::Aes, &[0x11; 16]).unwrap();
//!
//! let mut enc = CipherOperation::from_transformation(token.clone(), "AES/CBC/PKCS5Padding").unwrap();
//! enc.init(Direction::Encrypt, &key, None).unwrap();
//! let mut ciphertext = enc.update_vec(b"attack at").unwrap();
//! ciphertext.extend(enc.finish_vec(b" dawn").unwrap());
//! let iv = enc.iv().unwrap().to_vec();
//!
//! let mut dec = CipherOperation::from_transformation(token, "AES/CBC/PKCS5Padding").unwrap();
//! dec.init(Direction::Decrypt, &key, Some(&iv)).unwrap();
//! assert_eq!(dec.finish_vec(&ciphertext).unwrap(), b"attack at dawn");
//! ```

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use tokencipher_api::error::{validate, Error, Result};
use tokencipher_api::{
    BackendError, BackendResult, BlockSession, Direction, Mode, PaddingMode, SecretKey, Token,
};
use tokencipher_params::MAX_BLOCK_SIZE;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use crate::holdback::Holdback;
use crate::mechanism::{build_mechanism, resolve_iv};
use crate::padding::{PaddingStrategy, Pkcs5Padding};
use crate::spec::CipherSpec;

/// How data flows between caller, engine and token, fixed at `init`
#[derive(Debug, Clone, Copy)]
enum Pipeline {
    /// Token output is returned as-is (no padding, or the token pads)
    Direct,
    /// Engine appends PKCS#5 padding before finalizing
    EnginePad(Pkcs5Padding),
    /// Engine holds back the final block and strips its padding
    EngineUnpad(Pkcs5Padding),
}

/// State that only exists between `init` and the end of the operation
struct Active<S> {
    direction: Direction,
    session: S,
    pipeline: Pipeline,
    native_padding: bool,
    block_size: usize,
    bytes_buffered: usize,
    holdback: Holdback,
    /// Set once the token has finalized; the session then needs no cancel
    finalized: bool,
}

impl<S: BlockSession> Active<S> {
    /// Feed `input` to the token according to the pipeline
    ///
    /// `progressed` is set as soon as one token call has succeeded, after
    /// which a failure can no longer be undone.
    fn push(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        progressed: &mut bool,
    ) -> BackendResult<usize> {
        let written = match self.pipeline {
            Pipeline::EngineUnpad(_) => self.push_held_back(input, output, progressed)?,
            Pipeline::Direct | Pipeline::EnginePad(_) => {
                if input.is_empty() {
                    0
                } else {
                    let n = self.session.update(input, output)?;
                    *progressed = true;
                    n
                }
            }
        };
        self.bytes_buffered = self.bytes_buffered + input.len() - written;
        Ok(written)
    }

    /// Decrypt path that always keeps the last block away from the token
    fn push_held_back(
        &mut self,
        mut input: &[u8],
        output: &mut [u8],
        progressed: &mut bool,
    ) -> BackendResult<usize> {
        let bs = self.block_size;
        let mut written = 0;

        if !self.holdback.is_empty() {
            let previous = self.holdback.len();
            let taken = self.holdback.top_up(input);
            input = &input[taken..];
            if input.is_empty() {
                // a holdback filled by the last input bytes stays for finish
                return Ok(0);
            }
            match self.session.update(self.holdback.as_slice(), output) {
                Ok(n) => written += n,
                Err(e) => {
                    self.holdback.truncate(previous);
                    return Err(e);
                }
            }
            *progressed = true;
            self.holdback.clear();
        }

        if input.is_empty() {
            return Ok(written);
        }

        let keep = match input.len() % bs {
            0 => bs,
            rem => rem,
        };
        let forward = input.len() - keep;
        if forward > 0 {
            written += self
                .session
                .update(&input[..forward], &mut output[written..])?;
            *progressed = true;
        }
        self.holdback.set(&input[forward..]);
        Ok(written)
    }

    /// Output `finish` may produce for `input_len` more bytes
    fn finish_length(&self, input_len: usize) -> usize {
        let total = input_len + self.bytes_buffered;
        let pads = self.direction.is_encrypt()
            && (self.native_padding || matches!(self.pipeline, Pipeline::EnginePad(_)));
        if pads {
            total + (self.block_size - total % self.block_size)
        } else {
            total
        }
    }
}

/// One streaming encryption or decryption over a token session
///
/// The operation is reusable: after `finish`, `cancel` or a terminal error it
/// returns to the uninitialized state and can be `init`ed again.
pub struct CipherOperation<T: Token> {
    token: Arc<T>,
    spec: CipherSpec,
    iv: Option<Vec<u8>>,
    active: Option<Active<T::Session>>,
}

impl<T: Token> CipherOperation<T> {
    /// Create an uninitialized operation for `spec` on `token`
    pub fn new(token: Arc<T>, spec: CipherSpec) -> Self {
        Self {
            token,
            spec,
            iv: None,
            active: None,
        }
    }

    /// Create an operation from a transformation string such as
    /// `"AES/CBC/PKCS5Padding"`
    pub fn from_transformation(token: Arc<T>, transformation: &str) -> Result<Self> {
        Ok(Self::new(token, transformation.parse()?))
    }

    /// Transformation this operation runs
    pub fn spec(&self) -> &CipherSpec {
        &self.spec
    }

    /// Block size in bytes; zero for stream ciphers
    pub fn block_size(&self) -> usize {
        self.spec.block_size()
    }

    /// IV of the most recent successful `init`, including a generated one
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    /// Direction of the running operation
    pub fn direction(&self) -> Option<Direction> {
        self.active.as_ref().map(|a| a.direction)
    }

    /// Whether `init` has succeeded and the operation has not yet ended
    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the token, rather than the engine, applies padding
    pub fn uses_native_padding(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.native_padding)
    }

    fn bytes_buffered(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.bytes_buffered)
    }

    /// Maximum output of `update` for `input_len` more bytes
    pub fn update_length(&self, input_len: usize) -> usize {
        let total = input_len + self.bytes_buffered();
        if self.spec.is_block_aligned() {
            total - total % self.spec.block_size()
        } else {
            total
        }
    }

    /// Maximum output of `finish` for `input_len` more bytes
    pub fn finish_length(&self, input_len: usize) -> usize {
        match &self.active {
            Some(active) => active.finish_length(input_len),
            None => input_len,
        }
    }

    /// Output buffer size that always suffices for `finish(input_len)`
    pub fn output_size(&self, input_len: usize) -> usize {
        self.finish_length(input_len)
    }

    /// Start an operation, drawing a missing encryption IV from the OS
    pub fn init(&mut self, direction: Direction, key: &SecretKey, iv: Option<&[u8]>) -> Result<()> {
        self.init_with_rng(direction, key, iv, &mut OsRng)
    }

    /// Start an operation, drawing a missing encryption IV from `rng`
    ///
    /// Any operation already running is cancelled first. On failure the
    /// operation is left uninitialized.
    pub fn init_with_rng(
        &mut self,
        direction: Direction,
        key: &SecretKey,
        iv: Option<&[u8]>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.cancel();
        self.iv = None;

        self.spec.check_padding()?;
        let iv = resolve_iv(&self.spec, direction, iv, rng)?;

        if key.algorithm() != self.spec.algorithm()
            || !self.spec.algorithm().accepts_key_len(key.len())
        {
            return Err(Error::key(
                "init",
                format!(
                    "{} key of {} bytes cannot drive {}",
                    key.algorithm(),
                    key.len(),
                    self.spec
                ),
            ));
        }
        let token_key = self
            .token
            .import_key(key)
            .map_err(|e| Error::key("import key", e.to_string()))?;

        let padded = self.spec.padding() == PaddingMode::Pkcs5;
        let mechanism = build_mechanism(&self.spec, iv.as_deref(), padded)?;
        let native_padding = padded && self.token.supports_native_padding(&mechanism);
        // the engine pads only chained modes; ECB padding must come from the token
        validate::parameter(
            !(padded && !native_padding && self.spec.mode() == Mode::Ecb),
            "padding",
            "PKCS5Padding in ECB mode needs a token that pads natively",
        )?;
        let mechanism = mechanism.with_native_padding(native_padding);

        let block_size = self.spec.block_size();
        let pipeline = match (padded && !native_padding, direction) {
            (false, _) => Pipeline::Direct,
            (true, Direction::Encrypt) => Pipeline::EnginePad(Pkcs5Padding::new(block_size)?),
            (true, Direction::Decrypt) => Pipeline::EngineUnpad(Pkcs5Padding::new(block_size)?),
        };

        let mut session = self
            .token
            .acquire_session()
            .map_err(|e| Error::provider("acquire session", e))?;
        if let Err(e) = session.init(direction, &mechanism, &token_key) {
            warn!(
                token = self.token.name(),
                session = session.id(),
                error = %e,
                "token rejected {}",
                mechanism
            );
            self.token.release_session(session);
            return Err(Error::key("init", e.to_string()));
        }

        debug!(
            token = self.token.name(),
            session = session.id(),
            ?direction,
            native_padding,
            "initialized {}",
            self.spec
        );

        self.iv = iv;
        self.active = Some(Active {
            direction,
            session,
            pipeline,
            native_padding,
            block_size,
            bytes_buffered: 0,
            holdback: Holdback::new(block_size),
            finalized: false,
        });
        Ok(())
    }

    /// Process `input`, writing completed output to `output`
    ///
    /// All of `input` is consumed. `output` must hold at least
    /// `update_length(input.len())` bytes, otherwise `ShortBuffer` is returned
    /// and nothing changes. Returns the number of bytes written.
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if self.active.is_none() {
            return Err(Error::NotInitialized);
        }
        validate::output_capacity(output.len(), self.update_length(input.len()))?;

        let Some(active) = self.active.as_mut() else {
            return Err(Error::NotInitialized);
        };
        let mut progressed = false;
        match active.push(input, output, &mut progressed) {
            Ok(written) => {
                trace!(
                    input = input.len(),
                    written,
                    buffered = active.bytes_buffered,
                    "update"
                );
                Ok(written)
            }
            Err(BackendError::BufferTooSmall { required }) if !progressed => {
                Err(Error::ShortBuffer {
                    required,
                    available: output.len(),
                })
            }
            Err(e) => {
                warn!(error = %e, "update failed, resetting operation");
                self.reset();
                Err(Error::provider("update", e))
            }
        }
    }

    /// Process the last of the input and complete the operation
    ///
    /// `output` must hold at least `finish_length(input.len())` bytes,
    /// otherwise `ShortBuffer` is returned and nothing changes. Every other
    /// outcome, success or failure, ends the operation.
    pub fn finish(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let Some(active) = self.active.as_ref() else {
            return Err(Error::NotInitialized);
        };
        validate::output_capacity(output.len(), active.finish_length(input.len()))?;

        let Some(mut active) = self.active.take() else {
            return Err(Error::NotInitialized);
        };
        let result = Self::run_finish(&self.spec, &mut active, input, output);
        match &result {
            Ok(written) => debug!(
                token = self.token.name(),
                session = active.session.id(),
                written,
                "finished {}",
                self.spec
            ),
            Err(e) => debug!(
                token = self.token.name(),
                session = active.session.id(),
                error = %e,
                "finish failed for {}",
                self.spec
            ),
        }
        self.dispose(active);
        result
    }

    fn run_finish(
        spec: &CipherSpec,
        active: &mut Active<T::Session>,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        let bs = active.block_size;
        let total = active.bytes_buffered + input.len();
        let mut progressed = false;

        match active.pipeline {
            Pipeline::Direct => {
                let aligned_input_required = spec.is_block_aligned()
                    && (spec.padding() == PaddingMode::None || !active.direction.is_encrypt());
                if aligned_input_required {
                    validate::block_multiple(total, bs)?;
                }
                let mut written = active
                    .push(input, output, &mut progressed)
                    .map_err(|e| finish_error(e, total, bs))?;
                written += Self::finalize(active, &mut output[written..], total)?;
                Ok(written)
            }
            Pipeline::EnginePad(padding) => {
                let mut written = active
                    .push(input, output, &mut progressed)
                    .map_err(|e| finish_error(e, total, bs))?;
                let pad = padding.compute_padding(active.bytes_buffered);
                written += active
                    .push(pad.as_bytes(), &mut output[written..], &mut progressed)
                    .map_err(|e| finish_error(e, total, bs))?;
                written += Self::finalize(active, &mut output[written..], total)?;
                Ok(written)
            }
            Pipeline::EngineUnpad(padding) => {
                validate::block_multiple(total, padding.block_size())?;
                let written = active
                    .push(input, output, &mut progressed)
                    .map_err(|e| finish_error(e, total, bs))?;

                let mut last = Zeroizing::new([0u8; 2 * MAX_BLOCK_SIZE]);
                let mut produced = 0;
                if !active.holdback.is_empty() {
                    produced = active
                        .session
                        .update(active.holdback.as_slice(), &mut last[..])
                        .map_err(|e| finish_error(e, total, bs))?;
                    active.holdback.clear();
                }
                produced += Self::finalize(active, &mut last[produced..], total)?;
                active.bytes_buffered = 0;

                let plain_len = padding.remove_padding(&last[..produced])?;
                output[written..written + plain_len].copy_from_slice(&last[..plain_len]);
                Ok(written + plain_len)
            }
        }
    }

    fn finalize(active: &mut Active<T::Session>, output: &mut [u8], total: usize) -> Result<usize> {
        let result = active.session.finalize(output);
        active.finalized = true;
        result.map_err(|e| finish_error(e, total, active.block_size))
    }

    /// Abandon the running operation, if any
    ///
    /// Never fails; the session is returned to the token or discarded.
    pub fn cancel(&mut self) {
        if self.active.is_some() {
            debug!(token = self.token.name(), "cancelling {}", self.spec);
            self.reset();
        }
    }

    /// End the operation after a failure, releasing the session
    fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            self.dispose(active);
        }
    }

    /// Hand the session back, cancelling a token operation still in flight
    fn dispose(&self, mut active: Active<T::Session>) {
        active.holdback.clear();
        if active.finalized {
            debug!(session = active.session.id(), "releasing session");
            self.token.release_session(active.session);
            return;
        }

        if self.token.can_cancel() {
            let mut sink = Zeroizing::new(vec![0u8; active.finish_length(0)]);
            if let Err(e) = active.session.finalize(&mut sink) {
                warn!(
                    session = active.session.id(),
                    error = %e,
                    "discarded finalize failed during cancel"
                );
            }
            self.token.release_session(active.session);
        } else {
            debug!(session = active.session.id(), "killing session");
            self.token.kill_session(active.session);
        }
    }
}

impl<T: Token> Drop for CipherOperation<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Translate a token error seen while completing an operation
fn finish_error(error: BackendError, total: usize, block_size: usize) -> Error {
    match error {
        BackendError::DataLenRange | BackendError::EncryptedDataLenRange => {
            Error::IllegalBlockSize {
                length: total,
                block_size,
            }
        }
        BackendError::EncryptedDataInvalid => Error::BadPadding,
        other => Error::provider("finish", other),
    }
}
