//! Constants for symmetric encryption algorithms

/// AES-128 key size in bytes
pub const AES128_KEY_SIZE: usize = 16;

/// AES-192 key size in bytes
pub const AES192_KEY_SIZE: usize = 24;

/// AES-256 key size in bytes
pub const AES256_KEY_SIZE: usize = 32;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Width of the AES-CTR counter in bits (the whole counter block)
pub const AES_CTR_COUNTER_BITS: u32 = 128;

/// Triple-DES (EDE, three independent keys) key size in bytes
pub const DESEDE_KEY_SIZE: usize = 24;

/// DES / Triple-DES block size in bytes
pub const DES_BLOCK_SIZE: usize = 8;

/// Smallest accepted ARCFOUR key in bytes (40 bits)
pub const ARCFOUR_MIN_KEY_SIZE: usize = 5;

/// Largest accepted ARCFOUR key in bytes (1024 bits)
pub const ARCFOUR_MAX_KEY_SIZE: usize = 128;

/// Block size reported by stream ciphers
pub const STREAM_BLOCK_SIZE: usize = 0;

/// Largest block size any supported mechanism uses
pub const MAX_BLOCK_SIZE: usize = AES_BLOCK_SIZE;
