//! Cipher transformations such as `"AES/CBC/PKCS5Padding"`

use core::fmt;
use core::str::FromStr;

use tokencipher_api::error::{validate, Error, Result};
use tokencipher_api::{CipherAlgorithm, Mode, PaddingMode};

/// Algorithm, mode and padding selected for a cipher operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSpec {
    algorithm: CipherAlgorithm,
    mode: Mode,
    padding: PaddingMode,
}

impl CipherSpec {
    /// Build a transformation
    ///
    /// Stream ciphers only run in ECB and CTR needs a 16-byte block cipher.
    /// Padding compatibility is checked later, by `check_padding`, so that an
    /// unsupported padding surfaces when the operation is initialized.
    pub fn new(algorithm: CipherAlgorithm, mode: Mode, padding: PaddingMode) -> Result<Self> {
        validate::parameter(
            !algorithm.is_stream() || mode == Mode::Ecb,
            "mode",
            "Stream ciphers only support ECB mode",
        )?;
        validate::parameter(
            mode != Mode::Ctr || algorithm == CipherAlgorithm::Aes,
            "mode",
            "CTR mode is only supported for AES",
        )?;
        Ok(Self {
            algorithm,
            mode,
            padding,
        })
    }

    /// Cipher algorithm
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Mode of operation
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Padding mode
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// Block size in bytes; zero for stream ciphers
    pub fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    /// Whether the operation consumes an IV
    pub fn requires_iv(&self) -> bool {
        !self.algorithm.is_stream() && self.mode.requires_iv()
    }

    /// Whether outputs are emitted in whole blocks only
    pub(crate) fn is_block_aligned(&self) -> bool {
        self.block_size() != 0 && self.mode != Mode::Ctr
    }

    /// Reject padding that cannot be combined with the mode
    pub fn check_padding(&self) -> Result<()> {
        if self.padding == PaddingMode::Pkcs5 {
            validate::parameter(
                self.mode != Mode::Ctr,
                "padding",
                "PKCS5Padding cannot be used with CTR mode",
            )?;
            validate::parameter(
                !self.algorithm.is_stream(),
                "padding",
                "PKCS5Padding cannot be used with a stream cipher",
            )?;
        }
        Ok(())
    }
}

fn parse_algorithm(name: &str) -> Result<CipherAlgorithm> {
    const ALGORITHMS: [(&str, CipherAlgorithm); 5] = [
        ("AES", CipherAlgorithm::Aes),
        ("DESede", CipherAlgorithm::DesEde),
        ("TripleDES", CipherAlgorithm::DesEde),
        ("ARCFOUR", CipherAlgorithm::Arcfour),
        ("RC4", CipherAlgorithm::Arcfour),
    ];
    ALGORITHMS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, alg)| *alg)
        .ok_or_else(|| Error::param("algorithm", format!("Unsupported algorithm {}", name)))
}

fn parse_mode(name: &str) -> Result<Mode> {
    [Mode::Ecb, Mode::Cbc, Mode::Ctr]
        .into_iter()
        .find(|m| m.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::param("mode", format!("Unsupported mode {}", name)))
}

fn parse_padding(name: &str) -> Result<PaddingMode> {
    if name.eq_ignore_ascii_case("NoPadding") {
        Ok(PaddingMode::None)
    } else if name.eq_ignore_ascii_case("PKCS5Padding") || name.eq_ignore_ascii_case("PKCS7Padding")
    {
        Ok(PaddingMode::Pkcs5)
    } else {
        Err(Error::param(
            "padding",
            format!("Unsupported padding {}", name),
        ))
    }
}

impl FromStr for CipherSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [alg] => {
                let algorithm = parse_algorithm(alg)?;
                validate::parameter(
                    algorithm.is_stream(),
                    "transformation",
                    "Block ciphers need ALG/MODE/PADDING",
                )?;
                Self::new(algorithm, Mode::Ecb, PaddingMode::None)
            }
            [alg, mode, padding] => Self::new(
                parse_algorithm(alg)?,
                parse_mode(mode)?,
                parse_padding(padding)?,
            ),
            _ => Err(Error::param(
                "transformation",
                format!("Invalid transformation {}", s),
            )),
        }
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.algorithm.is_stream() {
            return f.write_str(self.algorithm.name());
        }
        write!(
            f,
            "{}/{}/{}",
            self.algorithm.name(),
            self.mode.name(),
            self.padding.name()
        )
    }
}
