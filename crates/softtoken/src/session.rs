//! Software token sessions
//!
//! A session buffers partial blocks internally the way a PKCS#11 token does:
//! `update` emits every whole block it can, keeping the remainder for the
//! next call. With native padding on decryption the final whole block is
//! also kept, so that `finalize` can strip its padding.

use std::sync::Arc;

use tokencipher_api::{BackendError, BackendResult, BlockSession, Direction, Mechanism, SessionId};
use tokencipher_internal::constant_time::ct_pkcs5_pad_len;
use tokencipher_params::MAX_BLOCK_SIZE;
use tracing::trace;
use zeroize::Zeroizing;

use crate::key::SoftKey;
use crate::modes::CipherEngine;
use crate::token::{FaultPoint, TokenContext};

struct ActiveOp {
    direction: Direction,
    engine: CipherEngine,
    native_padding: bool,
    pending: Zeroizing<Vec<u8>>,
}

impl ActiveOp {
    /// Bytes `update` releases when `avail` bytes are on hand
    fn releasable(&self, avail: usize) -> usize {
        let bs = self.engine.block_size();
        if bs == 0 {
            return avail;
        }
        let mut release = avail - avail % bs;
        if self.native_padding && self.direction == Direction::Decrypt && release == avail {
            release = release.saturating_sub(bs);
        }
        release
    }
}

/// A session on a [`SoftToken`](crate::SoftToken)
pub struct SoftSession {
    id: SessionId,
    context: Arc<TokenContext>,
    op: Option<ActiveOp>,
}

impl SoftSession {
    pub(crate) fn new(id: SessionId, context: Arc<TokenContext>) -> Self {
        Self {
            id,
            context,
            op: None,
        }
    }

    /// Whether an operation is running on this session
    pub fn is_active(&self) -> bool {
        self.op.is_some()
    }

    /// Drop any running operation and its buffered data
    pub(crate) fn abort(&mut self) {
        self.op = None;
    }

    fn fault(&self, point: FaultPoint) -> BackendResult<()> {
        match self.context.take_fault(point) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn finalize_active(op: &mut ActiveOp, output: &mut [u8]) -> BackendResult<usize> {
        let bs = op.engine.block_size();
        match (op.direction, op.native_padding) {
            (Direction::Encrypt, true) => {
                let pad = bs - op.pending.len() % bs;
                if output.len() < op.pending.len() + pad {
                    return Err(BackendError::BufferTooSmall {
                        required: op.pending.len() + pad,
                    });
                }
                let mut block = Zeroizing::new([0u8; MAX_BLOCK_SIZE]);
                let len = op.pending.len();
                block[..len].copy_from_slice(&op.pending);
                block[len..len + pad].fill(pad as u8);
                op.engine.process(Direction::Encrypt, &mut block[..len + pad]);
                output[..len + pad].copy_from_slice(&block[..len + pad]);
                Ok(len + pad)
            }
            (Direction::Decrypt, true) => {
                if op.pending.len() != bs {
                    return Err(BackendError::EncryptedDataLenRange);
                }
                // work on a copy so a short buffer leaves the operation intact
                let mut engine = op.engine.clone();
                let mut block = Zeroizing::new([0u8; MAX_BLOCK_SIZE]);
                block[..bs].copy_from_slice(&op.pending);
                engine.process(Direction::Decrypt, &mut block[..bs]);
                let pad: Option<usize> = ct_pkcs5_pad_len(&block[..bs]).into();
                let plain = bs - pad.ok_or(BackendError::EncryptedDataInvalid)?;
                if output.len() < plain {
                    return Err(BackendError::BufferTooSmall { required: plain });
                }
                output[..plain].copy_from_slice(&block[..plain]);
                Ok(plain)
            }
            (direction, false) => {
                if op.pending.is_empty() {
                    Ok(0)
                } else if direction == Direction::Encrypt {
                    Err(BackendError::DataLenRange)
                } else {
                    Err(BackendError::EncryptedDataLenRange)
                }
            }
        }
    }
}

impl BlockSession for SoftSession {
    type Key = SoftKey;

    fn id(&self) -> SessionId {
        self.id
    }

    fn init(
        &mut self,
        direction: Direction,
        mechanism: &Mechanism,
        key: &SoftKey,
    ) -> BackendResult<()> {
        if self.op.is_some() {
            return Err(BackendError::OperationActive);
        }
        self.fault(FaultPoint::Init)?;

        let engine = CipherEngine::new(mechanism, key)?;
        if mechanism.native_padding()
            && (!self.context.config().native_padding || engine.block_size() == 0)
        {
            return Err(BackendError::MechanismInvalid);
        }

        trace!(session = self.id, ?direction, "{}", mechanism);
        self.op = Some(ActiveOp {
            direction,
            engine,
            native_padding: mechanism.native_padding(),
            pending: Zeroizing::new(Vec::new()),
        });
        Ok(())
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> BackendResult<usize> {
        if self.op.is_none() {
            return Err(BackendError::OperationNotInitialized);
        }
        if let Err(e) = self.fault(FaultPoint::Update) {
            if !matches!(e, BackendError::BufferTooSmall { .. }) {
                self.op = None;
            }
            return Err(e);
        }
        let Some(op) = self.op.as_mut() else {
            return Err(BackendError::OperationNotInitialized);
        };

        let avail = op.pending.len() + input.len();
        let release = op.releasable(avail);
        if output.len() < release {
            return Err(BackendError::BufferTooSmall { required: release });
        }

        let mut work = Zeroizing::new(Vec::with_capacity(avail));
        work.extend_from_slice(&op.pending);
        work.extend_from_slice(input);
        op.engine.process(op.direction, &mut work[..release]);
        output[..release].copy_from_slice(&work[..release]);

        op.pending.clear();
        op.pending.extend_from_slice(&work[release..]);
        Ok(release)
    }

    fn finalize(&mut self, output: &mut [u8]) -> BackendResult<usize> {
        let Some(mut op) = self.op.take() else {
            return Err(BackendError::OperationNotInitialized);
        };
        self.fault(FaultPoint::Finalize)?;

        match Self::finalize_active(&mut op, output) {
            Err(BackendError::BufferTooSmall { required }) => {
                // the only failure that keeps the operation alive
                self.op = Some(op);
                Err(BackendError::BufferTooSmall { required })
            }
            result => result,
        }
    }
}
