//! Turning a configured secret string into 32 bytes of key material.
//!
//! Decodings are tried in a fixed order (base64, hex, raw UTF-8) and the
//! first one that succeeds wins. Under [`KeyDecoding::Strict`] a decoding
//! only succeeds if it yields exactly [`SECRET_KEY_LENGTH`] bytes. Under
//! [`KeyDecoding::Lenient`] any decoding that parses succeeds and its bytes
//! are truncated or zero-padded to the key size.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use shardproof_core::KeyDecoding;

use crate::error::CryptoError;

/// Ed25519 secret key size in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Where an identity's key material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Base64,
    Hex,
    Raw,
    /// Freshly generated from OS entropy (no secret configured).
    Generated,
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::Hex => write!(f, "hex"),
            Self::Raw => write!(f, "raw"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// One step of the decode chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Base64,
    Hex,
    Raw,
}

impl DecodeStrategy {
    /// The chain, in priority order.
    pub const CHAIN: [DecodeStrategy; 3] = [Self::Base64, Self::Hex, Self::Raw];

    /// Attempt this decoding. `None` means the value is not in this encoding.
    pub fn decode(self, value: &str) -> Option<Zeroizing<Vec<u8>>> {
        let decoded = match self {
            Self::Base64 => STANDARD.decode(value.trim()).ok()?,
            Self::Hex => hex::decode(value.trim()).ok()?,
            Self::Raw => value.as_bytes().to_vec(),
        };
        if decoded.is_empty() {
            return None;
        }
        Some(Zeroizing::new(decoded))
    }

    pub fn origin(self) -> KeyOrigin {
        match self {
            Self::Base64 => KeyOrigin::Base64,
            Self::Hex => KeyOrigin::Hex,
            Self::Raw => KeyOrigin::Raw,
        }
    }
}

/// Resolve a configured secret into key bytes and the strategy that produced them.
pub fn resolve_secret(
    value: &str,
    decoding: KeyDecoding,
) -> Result<(Zeroizing<[u8; SECRET_KEY_LENGTH]>, KeyOrigin), CryptoError> {
    if value.trim().is_empty() {
        return Err(CryptoError::KeyMaterial("secret is empty".into()));
    }

    for strategy in DecodeStrategy::CHAIN {
        let Some(decoded) = strategy.decode(value) else {
            continue;
        };

        match decoding {
            KeyDecoding::Strict if decoded.len() != SECRET_KEY_LENGTH => {
                tracing::debug!(
                    strategy = %strategy.origin(),
                    length = decoded.len(),
                    "secret decoded to the wrong length, trying next encoding"
                );
                continue;
            }
            KeyDecoding::Lenient if decoded.len() != SECRET_KEY_LENGTH => {
                tracing::warn!(
                    strategy = %strategy.origin(),
                    length = decoded.len(),
                    "secret truncated or padded to {} bytes",
                    SECRET_KEY_LENGTH
                );
            }
            _ => {}
        }

        return Ok((fit_to_key(&decoded), strategy.origin()));
    }

    Err(CryptoError::KeyMaterial(format!(
        "secret is not {} bytes of base64, hex, or raw text",
        SECRET_KEY_LENGTH
    )))
}

/// Environment variables consulted for a node's secret, in order:
/// `WORKER_<NODE>_PRIVATE_KEY` then `<NODE>_PRIVATE_KEY`, where `<NODE>` is
/// the node id upper-cased with `-` replaced by `_`.
pub fn secret_env_vars(node_id: &str) -> [String; 2] {
    let node = node_id.to_uppercase().replace('-', "_");
    [
        format!("WORKER_{}_PRIVATE_KEY", node),
        format!("{}_PRIVATE_KEY", node),
    ]
}

/// Copy up to 32 bytes into a zero-initialised key buffer.
fn fit_to_key(bytes: &[u8]) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    let len = bytes.len().min(SECRET_KEY_LENGTH);
    key[..len].copy_from_slice(&bytes[..len]);
    key
}
