//! Raw cipher primitives behind the software token's mechanisms

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use des::TdesEde3;
use tokencipher_api::{BackendError, BackendResult, CipherAlgorithm};
use tokencipher_params::{AES128_KEY_SIZE, AES192_KEY_SIZE, AES256_KEY_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A keyed block cipher
#[derive(Clone)]
pub(crate) enum BlockPrimitive {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    TdesEde3(TdesEde3),
}

impl BlockPrimitive {
    pub(crate) fn new(algorithm: CipherAlgorithm, key: &[u8]) -> BackendResult<Self> {
        let invalid = |_| BackendError::KeySizeRange;
        match (algorithm, key.len()) {
            (CipherAlgorithm::Aes, AES128_KEY_SIZE) => {
                Aes128::new_from_slice(key).map(Self::Aes128).map_err(invalid)
            }
            (CipherAlgorithm::Aes, AES192_KEY_SIZE) => {
                Aes192::new_from_slice(key).map(Self::Aes192).map_err(invalid)
            }
            (CipherAlgorithm::Aes, AES256_KEY_SIZE) => {
                Aes256::new_from_slice(key).map(Self::Aes256).map_err(invalid)
            }
            (CipherAlgorithm::Aes, _) => Err(BackendError::KeySizeRange),
            (CipherAlgorithm::DesEde, _) => TdesEde3::new_from_slice(key)
                .map(Self::TdesEde3)
                .map_err(invalid),
            (CipherAlgorithm::Arcfour, _) => Err(BackendError::MechanismInvalid),
        }
    }

    pub(crate) fn block_size(&self) -> usize {
        match self {
            Self::TdesEde3(_) => 8,
            _ => 16,
        }
    }

    /// Encrypt one block in place; `block` must be exactly one block long
    pub(crate) fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::TdesEde3(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
        }
    }

    /// Decrypt one block in place; `block` must be exactly one block long
    pub(crate) fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::TdesEde3(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
        }
    }
}

/// ARCFOUR keystream generator
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Arcfour {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl Arcfour {
    pub(crate) fn new(key: &[u8]) -> BackendResult<Self> {
        if key.is_empty() || key.len() > 256 {
            return Err(BackendError::KeySizeRange);
        }

        let mut state = [0u8; 256];
        for (i, s) in state.iter_mut().enumerate() {
            *s = i as u8;
        }
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Ok(Self { state, i: 0, j: 0 })
    }

    /// XOR the keystream into `data`
    pub(crate) fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.state[self.i as usize]);
            self.state.swap(self.i as usize, self.j as usize);
            let k = self.state[self.state[self.i as usize]
                .wrapping_add(self.state[self.j as usize]) as usize];
            *byte ^= k;
        }
    }
}
