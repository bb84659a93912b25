//! IV resolution and mechanism construction

use rand::RngCore;
use tokencipher_api::error::{validate, Error, Result};
use tokencipher_api::{
    BackendError, CounterParams, Direction, Mechanism, MechanismParams, Mode,
};
use tokencipher_params::AES_CTR_COUNTER_BITS;

use crate::spec::CipherSpec;

/// Work out the IV an operation runs with
///
/// Encryption without a caller IV draws a fresh one from `rng`.
pub(crate) fn resolve_iv(
    spec: &CipherSpec,
    direction: Direction,
    iv: Option<&[u8]>,
    rng: &mut dyn RngCore,
) -> Result<Option<Vec<u8>>> {
    if !spec.requires_iv() {
        validate::parameter(
            iv.is_none(),
            "iv",
            "IV not used in ECB mode or with stream ciphers",
        )?;
        return Ok(None);
    }

    match (iv, direction) {
        (Some(iv), _) => {
            validate::length("iv", iv.len(), spec.block_size())?;
            Ok(Some(iv.to_vec()))
        }
        (None, Direction::Decrypt) => Err(Error::param(
            "iv",
            "IV must be specified for decryption",
        )),
        (None, Direction::Encrypt) => {
            let mut fresh = vec![0u8; spec.block_size()];
            rng.try_fill_bytes(&mut fresh).map_err(|e| {
                Error::provider("iv generation", BackendError::DeviceError(e.to_string()))
            })?;
            Ok(Some(fresh))
        }
    }
}

/// Mechanism handed to the token for `spec`
pub(crate) fn build_mechanism(
    spec: &CipherSpec,
    iv: Option<&[u8]>,
    native_padding: bool,
) -> Result<Mechanism> {
    let params = match (spec.mode(), iv) {
        (Mode::Ctr, Some(iv)) => {
            MechanismParams::Counter(CounterParams::new(AES_CTR_COUNTER_BITS, iv)?)
        }
        (Mode::Cbc, Some(iv)) => MechanismParams::Iv(iv.to_vec()),
        (Mode::Ecb, None) => MechanismParams::None,
        _ => {
            return Err(Error::param(
                "mechanism",
                "IV presence does not match the mode",
            ))
        }
    };
    Ok(Mechanism::new(
        spec.algorithm(),
        spec.mode(),
        native_padding,
        params,
    ))
}
