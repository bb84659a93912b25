//! Error type definitions for streaming cipher operations

use thiserror::Error as ThisError;

/// Primary error type for cipher operations
///
/// Every variant carries a single recovery policy: `ShortBuffer` and
/// `NotInitialized` leave the operation untouched, every other variant is
/// reported only after the operation has been reset.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Key conversion failure, key/algorithm mismatch or backend init failure
    #[error("Invalid key: {context}: {message}")]
    InvalidKey {
        context: &'static str,
        message: String,
    },

    /// Bad IV length or presence, or an incompatible mode/padding combination
    #[error("{context}: {message}")]
    InvalidParameter {
        context: &'static str,
        message: String,
    },

    /// Caller-supplied output buffer is smaller than the required size
    #[error("Output buffer too short: need {required} bytes, have {available}")]
    ShortBuffer {
        required: usize,
        available: usize,
    },

    /// Input length is not a multiple of the block size where one is required
    #[error("Input length {length} is not a multiple of the {block_size}-byte block size")]
    IllegalBlockSize {
        length: usize,
        block_size: usize,
    },

    /// Padding validation failure; deliberately carries no detail
    #[error("Given final block not properly padded")]
    BadPadding,

    /// Unexpected backend failure
    #[error("Provider failure in {context}: {source}")]
    ProviderFailure {
        context: &'static str,
        #[source]
        source: BackendError,
    },

    /// `update` or `finish` called on an operation that is not initialized
    #[error("Cipher operation not initialized")]
    NotInitialized,
}

/// Result type for cipher operations
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Shorthand to create an `InvalidParameter` error
    pub fn param(context: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            context,
            message: message.into(),
        }
    }

    /// Shorthand to create an `InvalidKey` error
    pub fn key(context: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            context,
            message: message.into(),
        }
    }

    /// Wrap a backend failure observed in `context`
    pub fn provider(context: &'static str, source: BackendError) -> Self {
        Self::ProviderFailure { context, source }
    }

    /// Whether the operation survives this error without a fresh `init`
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ShortBuffer { .. } | Self::NotInitialized)
    }
}

/// Return codes a backend token may report
///
/// Modelled on the PKCS#11 `CKR_*` codes a hardware token returns; the engine
/// only ever inspects `BufferTooSmall` and treats everything else as opaque.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BackendError {
    /// Output buffer too small for the produced data
    #[error("output buffer too small, {required} bytes required")]
    BufferTooSmall { required: usize },

    /// Plaintext length not acceptable to the mechanism
    #[error("data length out of range")]
    DataLenRange,

    /// Ciphertext length not acceptable to the mechanism
    #[error("encrypted data length out of range")]
    EncryptedDataLenRange,

    /// Decrypted data failed the mechanism's own padding check
    #[error("encrypted data invalid")]
    EncryptedDataInvalid,

    /// Key length not supported by the algorithm
    #[error("key size out of range")]
    KeySizeRange,

    /// Key does not belong to the mechanism's algorithm
    #[error("key type inconsistent with mechanism")]
    KeyTypeInconsistent,

    /// Mechanism not supported by the token
    #[error("mechanism invalid")]
    MechanismInvalid,

    /// Mechanism parameters (IV, counter block) rejected
    #[error("mechanism parameter invalid")]
    MechanismParamInvalid,

    /// An operation is already active on the session
    #[error("operation already active")]
    OperationActive,

    /// No operation is active on the session
    #[error("operation not initialized")]
    OperationNotInitialized,

    /// Session limit reached
    #[error("session count exceeded")]
    SessionCount,

    /// Token-level failure
    #[error("device error: {0}")]
    DeviceError(String),
}

/// Result type for backend primitives
pub type BackendResult<T> = core::result::Result<T, BackendError>;
