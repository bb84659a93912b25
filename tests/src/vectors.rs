//! Known-answer vectors run through the full engine

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tokencipher_api::{CipherAlgorithm, Direction, SecretKey};
use tokencipher_engine::CipherOperation;
use tokencipher_softtoken::SoftToken;

/// NIST SP 800-38A vectors bundled with the test suite
pub static SP800_38A: Lazy<Vec<KnownAnswer>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/sp800_38a.json"))
        .expect("bundled SP 800-38A vectors are valid JSON")
});

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("cipher operation failed: {0}")]
    Cipher(#[from] tokencipher_api::Error),

    #[error("{name}: {direction:?} mismatch - expected: {expected}, got: {actual}")]
    Mismatch {
        name: String,
        direction: Direction,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, VectorError>;

/// One encrypt/decrypt known-answer case
#[derive(Debug, Clone, Deserialize)]
pub struct KnownAnswer {
    pub name: String,
    pub transformation: String,
    pub key: String,
    #[serde(default)]
    pub iv: Option<String>,
    pub plaintext: String,
    pub ciphertext: String,
}

impl KnownAnswer {
    /// Check both directions, feeding input `chunk` bytes per update
    pub fn verify(&self, token: &Arc<SoftToken>, chunk: usize) -> Result<()> {
        let iv = self.iv.as_deref().map(hex::decode).transpose()?;
        let plaintext = hex::decode(&self.plaintext)?;
        let ciphertext = hex::decode(&self.ciphertext)?;

        let mut op = CipherOperation::from_transformation(token.clone(), &self.transformation)?;
        let algorithm: CipherAlgorithm = op.spec().algorithm();
        let key = SecretKey::new(algorithm, &hex::decode(&self.key)?)?;

        for (direction, input, expected) in [
            (Direction::Encrypt, &plaintext, &ciphertext),
            (Direction::Decrypt, &ciphertext, &plaintext),
        ] {
            op.init(direction, &key, iv.as_deref())?;
            let actual = crate::run_chunked(&mut op, input, chunk)?;
            if &actual != expected {
                return Err(VectorError::Mismatch {
                    name: self.name.clone(),
                    direction,
                    expected: hex::encode(expected),
                    actual: hex::encode(actual),
                });
            }
        }
        Ok(())
    }
}
