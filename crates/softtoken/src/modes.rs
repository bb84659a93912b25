//! Modes of operation run by software token sessions
//!
//! ECB and CBC follow NIST SP 800-38A and work on whole blocks only; CTR and
//! ARCFOUR are streams and accept any length.

use byteorder::{BigEndian, ByteOrder};
use tokencipher_api::{
    BackendError, BackendResult, CipherAlgorithm, Direction, Mechanism, MechanismParams, Mode,
};
use tokencipher_internal::constant_time::xor_in_place;
use tokencipher_params::{AES_BLOCK_SIZE, MAX_BLOCK_SIZE};
use zeroize::Zeroizing;

use crate::key::SoftKey;
use crate::primitive::{Arcfour, BlockPrimitive};

/// Keyed cipher plus the chaining state of one operation
#[derive(Clone)]
pub(crate) enum CipherEngine {
    Ecb(BlockPrimitive),
    Cbc {
        primitive: BlockPrimitive,
        chain: Zeroizing<[u8; MAX_BLOCK_SIZE]>,
    },
    Ctr {
        primitive: BlockPrimitive,
        counter: Zeroizing<[u8; AES_BLOCK_SIZE]>,
        counter_bits: u32,
        keystream: Zeroizing<[u8; AES_BLOCK_SIZE]>,
        used: usize,
    },
    Arcfour(Arcfour),
}

impl CipherEngine {
    /// Key the engine for `mechanism`
    pub(crate) fn new(mechanism: &Mechanism, key: &SoftKey) -> BackendResult<Self> {
        if key.algorithm() != mechanism.algorithm() {
            return Err(BackendError::KeyTypeInconsistent);
        }
        if !key.algorithm().accepts_key_len(key.material().len()) {
            return Err(BackendError::KeySizeRange);
        }

        if mechanism.algorithm() == CipherAlgorithm::Arcfour {
            return match (mechanism.mode(), mechanism.params()) {
                (Mode::Ecb, MechanismParams::None) => {
                    Ok(Self::Arcfour(Arcfour::new(key.material())?))
                }
                _ => Err(BackendError::MechanismInvalid),
            };
        }

        let primitive = BlockPrimitive::new(key.algorithm(), key.material())?;
        let bs = primitive.block_size();
        match (mechanism.mode(), mechanism.params()) {
            (Mode::Ecb, MechanismParams::None) => Ok(Self::Ecb(primitive)),
            (Mode::Cbc, MechanismParams::Iv(iv)) => {
                if iv.len() != bs {
                    return Err(BackendError::MechanismParamInvalid);
                }
                let mut chain = Zeroizing::new([0u8; MAX_BLOCK_SIZE]);
                chain[..bs].copy_from_slice(iv);
                Ok(Self::Cbc { primitive, chain })
            }
            (Mode::Ctr, MechanismParams::Counter(params)) => {
                if bs != AES_BLOCK_SIZE || params.counter_block().len() != AES_BLOCK_SIZE {
                    return Err(BackendError::MechanismParamInvalid);
                }
                let mut counter = Zeroizing::new([0u8; AES_BLOCK_SIZE]);
                counter.copy_from_slice(params.counter_block());
                Ok(Self::Ctr {
                    primitive,
                    counter,
                    counter_bits: params.counter_bits(),
                    keystream: Zeroizing::new([0u8; AES_BLOCK_SIZE]),
                    used: AES_BLOCK_SIZE,
                })
            }
            (Mode::Ecb | Mode::Cbc | Mode::Ctr, _) => Err(BackendError::MechanismParamInvalid),
        }
    }

    /// Alignment unit for input; zero for stream modes
    pub(crate) fn block_size(&self) -> usize {
        match self {
            Self::Ecb(primitive) | Self::Cbc { primitive, .. } => primitive.block_size(),
            Self::Ctr { .. } | Self::Arcfour(_) => 0,
        }
    }

    /// Transform `data` in place
    ///
    /// Block modes require `data.len()` to be a multiple of `block_size()`.
    pub(crate) fn process(&mut self, direction: Direction, data: &mut [u8]) {
        match self {
            Self::Ecb(primitive) => {
                let bs = primitive.block_size();
                for block in data.chunks_exact_mut(bs) {
                    match direction {
                        Direction::Encrypt => primitive.encrypt_block(block),
                        Direction::Decrypt => primitive.decrypt_block(block),
                    }
                }
            }
            Self::Cbc { primitive, chain } => {
                let bs = primitive.block_size();
                for block in data.chunks_exact_mut(bs) {
                    match direction {
                        Direction::Encrypt => {
                            xor_in_place(block, &chain[..bs]);
                            primitive.encrypt_block(block);
                            chain[..bs].copy_from_slice(block);
                        }
                        Direction::Decrypt => {
                            let mut saved = Zeroizing::new([0u8; MAX_BLOCK_SIZE]);
                            saved[..bs].copy_from_slice(block);
                            primitive.decrypt_block(block);
                            xor_in_place(block, &chain[..bs]);
                            chain[..bs].copy_from_slice(&saved[..bs]);
                        }
                    }
                }
            }
            Self::Ctr {
                primitive,
                counter,
                counter_bits,
                keystream,
                used,
            } => {
                for byte in data.iter_mut() {
                    if *used == AES_BLOCK_SIZE {
                        keystream.copy_from_slice(&counter[..]);
                        primitive.encrypt_block(&mut keystream[..]);
                        increment_counter(&mut counter[..], *counter_bits);
                        *used = 0;
                    }
                    *byte ^= keystream[*used];
                    *used += 1;
                }
            }
            Self::Arcfour(rc4) => rc4.apply(data),
        }
    }
}

/// Add one to the low `bits` bits of a 16-byte big-endian counter block,
/// wrapping within those bits
fn increment_counter(block: &mut [u8], bits: u32) {
    let value = BigEndian::read_u128(block);
    let mask = if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    };
    let next = (value & !mask) | (value.wrapping_add(1) & mask);
    BigEndian::write_u128(block, next);
}
