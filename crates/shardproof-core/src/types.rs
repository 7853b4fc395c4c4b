use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::to_canonical_json;
use crate::error::CoreError;

/// Hardware description attached to attestations.
///
/// Detection is left to the embedding application; the worker takes these
/// values from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// Logical CPU cores.
    pub cpu_cores: u32,
    /// Physical CPU cores.
    pub cpu_physical_cores: u32,
    /// Total memory in GiB, rounded to two places.
    pub memory_gb: f64,
    /// Platform string (OS and architecture).
    pub platform: String,
    /// Processor model, or "unknown".
    pub processor: String,
}

impl HardwareInfo {
    /// Fallback record used when nothing better is known about the host.
    pub fn unknown() -> Self {
        Self {
            cpu_cores: 1,
            cpu_physical_cores: 1,
            memory_gb: 0.0,
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            processor: "unknown".into(),
        }
    }

    /// Canonical JSON form embedded in the signed message.
    pub fn canonical(&self) -> Result<String, CoreError> {
        to_canonical_json(self)
    }
}

/// Signature scheme an identity signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SignatureScheme {
    /// Ed25519 (RFC 8032).
    #[default]
    #[serde(rename = "ed25519")]
    Ed25519,
    /// SHA-256(secret || message). Development only: provides no third-party
    /// verifiability and must never be used for attestations that matter.
    #[serde(rename = "insecure-dev-sha256")]
    InsecureDevSha256,
}

impl SignatureScheme {
    /// Whether signatures under this scheme can be checked with only the public key.
    pub fn is_verifiable(&self) -> bool {
        matches!(self, Self::Ed25519)
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
            Self::InsecureDevSha256 => write!(f, "insecure-dev-sha256"),
        }
    }
}

/// How a configured secret string is turned into key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyDecoding {
    /// The first decoding that parses wins, truncated or zero-padded to
    /// 32 bytes, with the raw UTF-8 value as the last resort.
    #[default]
    Lenient,
    /// A decoding must yield exactly 32 bytes; otherwise the next one is
    /// tried and loading fails when none does.
    Strict,
}
