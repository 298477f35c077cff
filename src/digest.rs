//! String digests.
//!
//! Hashes the UTF-8 bytes of a string and renders the result as lowercase
//! hex, two digits per byte.

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use thiserror::Error;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Canonical algorithm name (e.g. `SHA-256`).
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Length of the hex encoding this algorithm produces.
    pub fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 40,
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha384 => 96,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported digest algorithm '{0}'")]
pub struct DigestError(pub String);

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA-1" | "SHA1" => Ok(DigestAlgorithm::Sha1),
            "SHA-256" | "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA-384" | "SHA384" => Ok(DigestAlgorithm::Sha384),
            "SHA-512" | "SHA512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(DigestError(s.to_string())),
        }
    }
}

/// Digest `input` with `algorithm`, returning lowercase hex.
pub fn generate_digest(algorithm: DigestAlgorithm, input: &str) -> String {
    let bytes = input.as_bytes();
    match algorithm {
        DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        DigestAlgorithm::Sha384 => hex::encode(Sha384::digest(bytes)),
        DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
    }
}

/// SHA-256 hex digest of `input`.
pub fn sha256_hex(input: &str) -> String {
    generate_digest(DigestAlgorithm::Sha256, input)
}
