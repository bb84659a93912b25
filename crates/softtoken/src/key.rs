//! Key objects held by the software token

use core::fmt;

use tokencipher_api::{BackendError, BackendResult, CipherAlgorithm, SecretKey};
use zeroize::Zeroizing;

/// A secret key imported into the software token
#[derive(Clone)]
pub struct SoftKey {
    algorithm: CipherAlgorithm,
    material: Zeroizing<Vec<u8>>,
}

impl SoftKey {
    pub(crate) fn import(key: &SecretKey) -> BackendResult<Self> {
        if !key.algorithm().accepts_key_len(key.len()) {
            return Err(BackendError::KeySizeRange);
        }
        Ok(Self {
            algorithm: key.algorithm(),
            material: Zeroizing::new(key.expose_secret().to_vec()),
        })
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub(crate) fn material(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for SoftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
