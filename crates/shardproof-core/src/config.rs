use serde::{Deserialize, Serialize};

use crate::types::{KeyDecoding, SignatureScheme};

/// How a worker identity is loaded and what it signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdentityOptions {
    /// Signature scheme (ed25519 unless explicitly set to the dev scheme).
    #[serde(default)]
    pub signature_scheme: SignatureScheme,
    /// Secret decoding policy.
    #[serde(default)]
    pub key_decoding: KeyDecoding,
}

/// Per-round attestation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationPolicy {
    /// Abort the round when revealed plaintext does not match its commitment.
    /// When false the mismatch is reported as `verified = false` and the
    /// round continues.
    #[serde(default)]
    pub abort_on_commit_mismatch: bool,
    /// Attach hardware information to the signed message.
    #[serde(default = "default_true")]
    pub include_hardware: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AttestationPolicy {
    fn default() -> Self {
        Self {
            abort_on_commit_mismatch: false,
            include_hardware: true,
        }
    }
}
