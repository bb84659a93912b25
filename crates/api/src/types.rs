//! Core types shared by the engine and the tokens it drives
//!
//! These types describe *what* a cipher operation is (algorithm, mode,
//! padding, parameters) without saying anything about how a particular token
//! carries it out.

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{validate, Error, Result};
use tokencipher_params::{
    AES128_KEY_SIZE, AES192_KEY_SIZE, AES256_KEY_SIZE, AES_BLOCK_SIZE, ARCFOUR_MAX_KEY_SIZE,
    ARCFOUR_MIN_KEY_SIZE, DESEDE_KEY_SIZE, DES_BLOCK_SIZE, STREAM_BLOCK_SIZE,
};

/// Direction of a cipher operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Plaintext in, ciphertext out
    Encrypt,
    /// Ciphertext in, plaintext out
    Decrypt,
}

impl Direction {
    /// Returns true for `Direction::Encrypt`
    pub fn is_encrypt(self) -> bool {
        matches!(self, Direction::Encrypt)
    }
}

/// Block cipher mode of operation
///
/// Stream ciphers report `Ecb`: they have no chaining and no IV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Electronic codebook
    Ecb,
    /// Cipher block chaining
    Cbc,
    /// Counter mode
    Ctr,
}

impl Mode {
    /// Whether this mode takes an IV / counter block
    pub fn requires_iv(self) -> bool {
        matches!(self, Mode::Cbc | Mode::Ctr)
    }

    /// Canonical transformation name
    pub fn name(self) -> &'static str {
        match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
            Mode::Ctr => "CTR",
        }
    }
}

/// Padding applied to the final block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingMode {
    /// Input must already be block aligned
    None,
    /// PKCS#5 / PKCS#7 padding
    Pkcs5,
}

impl PaddingMode {
    /// Canonical transformation name
    pub fn name(self) -> &'static str {
        match self {
            PaddingMode::None => "NoPadding",
            PaddingMode::Pkcs5 => "PKCS5Padding",
        }
    }
}

/// Symmetric algorithms the engine knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CipherAlgorithm {
    /// AES with 128, 192 or 256-bit keys
    Aes,
    /// Triple DES, EDE with three independent keys
    DesEde,
    /// ARCFOUR stream cipher
    Arcfour,
}

impl CipherAlgorithm {
    /// Block size in bytes; zero for stream ciphers
    pub fn block_size(self) -> usize {
        match self {
            CipherAlgorithm::Aes => AES_BLOCK_SIZE,
            CipherAlgorithm::DesEde => DES_BLOCK_SIZE,
            CipherAlgorithm::Arcfour => STREAM_BLOCK_SIZE,
        }
    }

    /// Whether this is a stream cipher
    pub fn is_stream(self) -> bool {
        self.block_size() == STREAM_BLOCK_SIZE
    }

    /// Whether `len` is an acceptable key length for this algorithm
    pub fn accepts_key_len(self, len: usize) -> bool {
        match self {
            CipherAlgorithm::Aes => {
                matches!(len, AES128_KEY_SIZE | AES192_KEY_SIZE | AES256_KEY_SIZE)
            }
            CipherAlgorithm::DesEde => len == DESEDE_KEY_SIZE,
            CipherAlgorithm::Arcfour => {
                (ARCFOUR_MIN_KEY_SIZE..=ARCFOUR_MAX_KEY_SIZE).contains(&len)
            }
        }
    }

    /// Canonical transformation name
    pub fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes => "AES",
            CipherAlgorithm::DesEde => "DESede",
            CipherAlgorithm::Arcfour => "ARCFOUR",
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw symmetric key material tagged with its algorithm
///
/// The bytes are zeroed when the key is dropped and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    algorithm: CipherAlgorithm,
    material: Vec<u8>,
}

impl SecretKey {
    /// Create a key, checking the length against the algorithm
    pub fn new(algorithm: CipherAlgorithm, material: &[u8]) -> Result<Self> {
        if !algorithm.accepts_key_len(material.len()) {
            return Err(Error::key(
                "SecretKey::new",
                format!("{} does not accept {}-byte keys", algorithm, material.len()),
            ));
        }
        Ok(Self {
            algorithm,
            material: material.to_vec(),
        })
    }

    /// Algorithm this key belongs to
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.material.len()
    }

    /// Returns true if the key holds no bytes
    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    /// Expose the key bytes
    pub fn expose_secret(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.material.len())
            .finish_non_exhaustive()
    }
}

/// Counter block parameters for CTR mechanisms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterParams {
    counter_bits: u32,
    counter_block: Zeroizing<Vec<u8>>,
}

impl CounterParams {
    /// Create counter parameters; the counter occupies the low `counter_bits`
    /// bits of the block and is incremented big-endian
    pub fn new(counter_bits: u32, counter_block: &[u8]) -> Result<Self> {
        validate::parameter(
            counter_bits > 0 && counter_bits as usize <= counter_block.len() * 8,
            "counter bits",
            "Counter width must be between 1 and the counter block size in bits",
        )?;
        Ok(Self {
            counter_bits,
            counter_block: Zeroizing::new(counter_block.to_vec()),
        })
    }

    /// Width of the counter in bits
    pub fn counter_bits(&self) -> u32 {
        self.counter_bits
    }

    /// Initial counter block
    pub fn counter_block(&self) -> &[u8] {
        &self.counter_block
    }
}

/// Mode-specific mechanism parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanismParams {
    /// ECB and stream mechanisms
    None,
    /// CBC initialization vector
    Iv(Vec<u8>),
    /// CTR counter parameters
    Counter(CounterParams),
}

/// A token's description of one cipher operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanism {
    algorithm: CipherAlgorithm,
    mode: Mode,
    native_padding: bool,
    params: MechanismParams,
}

impl Mechanism {
    /// Assemble a mechanism
    pub fn new(
        algorithm: CipherAlgorithm,
        mode: Mode,
        native_padding: bool,
        params: MechanismParams,
    ) -> Self {
        Self {
            algorithm,
            mode,
            native_padding,
            params,
        }
    }

    /// Algorithm driven by this mechanism
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Mode of operation
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the token is asked to apply PKCS#5 padding itself
    pub fn native_padding(&self) -> bool {
        self.native_padding
    }

    /// Mode parameters
    pub fn params(&self) -> &MechanismParams {
        &self.params
    }

    /// Copy of this mechanism with the padding request changed
    pub fn with_native_padding(&self, native_padding: bool) -> Self {
        Self {
            native_padding,
            ..self.clone()
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.algorithm, self.mode.name())?;
        if self.native_padding {
            f.write_str("_PAD")?;
        }
        Ok(())
    }
}
