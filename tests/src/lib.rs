//! Testing utilities and benchmarks for the tokencipher workspace

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tokencipher_api::{CipherAlgorithm, Result, SecretKey, Token};
use tokencipher_engine::CipherOperation;
use tokencipher_softtoken::{SoftToken, SoftTokenConfig};
use tracing_subscriber::EnvFilter;

pub mod vectors;

/// Install a test-friendly tracing subscriber; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A soft token with the given native padding capability
pub fn soft_token(native_padding: bool) -> Arc<SoftToken> {
    Arc::new(SoftToken::new(
        SoftTokenConfig::default()
            .with_label(if native_padding { "soft-pad" } else { "soft" })
            .with_native_padding(native_padding),
    ))
}

/// Deterministic key of the usual size for `algorithm`
pub fn test_key(algorithm: CipherAlgorithm) -> SecretKey {
    let len = match algorithm {
        CipherAlgorithm::Aes => 16,
        CipherAlgorithm::DesEde => 24,
        CipherAlgorithm::Arcfour => 16,
    };
    let material: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37) ^ 0x5A).collect();
    SecretKey::new(algorithm, &material).expect("test key sizes are valid")
}

/// Deterministic RNG for IV generation
pub fn test_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Push `input` through `op` in pieces of `chunk` bytes, then finish
///
/// A `chunk` of zero sends everything to `finish` in one call.
pub fn run_chunked<T: Token>(
    op: &mut CipherOperation<T>,
    input: &[u8],
    chunk: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if chunk == 0 {
        op.finish_into(input, &mut out)?;
        return Ok(out);
    }
    for piece in input.chunks(chunk) {
        op.update_into(piece, &mut out)?;
    }
    op.finish_into(&[], &mut out)?;
    Ok(out)
}

/// Push `input` through `op` split at the given cut points, then finish
pub fn run_split<T: Token>(
    op: &mut CipherOperation<T>,
    input: &[u8],
    cuts: &[usize],
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, input.len());
        op.update_into(&input[start..cut], &mut out)?;
        start = cut;
    }
    op.finish_into(&input[start..], &mut out)?;
    Ok(out)
}
