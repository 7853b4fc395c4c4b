//! Encoding of outgoing worker payloads.
//!
//! Without a session key the payload travels as plain canonical JSON. With
//! one, the configured [`PayloadSealer`] turns the JSON into an opaque
//! string. [`PlaceholderSealer`] only base64-encodes and gives no
//! confidentiality; [`ChaChaSealer`] is authenticated encryption.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use shardproof_core::to_canonical_json;
use shardproof_crypto::{open, seal, SealedBox};

use crate::error::AttestationError;

/// Turns canonical payload text into the `data` field of an encoded payload.
pub trait PayloadSealer: Send + Sync {
    /// Value written to the payload's `encryption` field.
    fn label(&self) -> &'static str;

    /// Whether the output hides the payload from anyone without the key.
    fn is_confidential(&self) -> bool;

    fn seal(&self, plaintext: &str, session_key: &str) -> Result<String, AttestationError>;
}

/// Base64 of the payload. Labeled so no consumer mistakes it for encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSealer;

impl PayloadSealer for PlaceholderSealer {
    fn label(&self) -> &'static str {
        "base64-placeholder"
    }

    fn is_confidential(&self) -> bool {
        false
    }

    fn seal(&self, plaintext: &str, _session_key: &str) -> Result<String, AttestationError> {
        Ok(STANDARD.encode(plaintext))
    }
}

/// ChaCha20-Poly1305 under a key derived from the session key.
/// Output is `base64(nonce || ciphertext)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaSealer;

impl ChaChaSealer {
    /// Reverse [`PayloadSealer::seal`] on the receiving side.
    pub fn open(&self, data: &str, session_key: &str) -> Result<String, AttestationError> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| AttestationError::Transport(format!("invalid base64: {}", e)))?;
        let sealed = SealedBox::from_bytes(&bytes)?;
        let plaintext = open(&sealed, session_key)?;
        String::from_utf8(plaintext)
            .map_err(|_| AttestationError::Transport("payload is not valid UTF-8".into()))
    }
}

impl PayloadSealer for ChaChaSealer {
    fn label(&self) -> &'static str {
        "chacha20poly1305"
    }

    fn is_confidential(&self) -> bool {
        true
    }

    fn seal(&self, plaintext: &str, session_key: &str) -> Result<String, AttestationError> {
        let sealed = seal(plaintext.as_bytes(), session_key)?;
        Ok(STANDARD.encode(sealed.to_bytes()))
    }
}

/// A payload ready for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    pub encrypted: bool,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
}

/// Encodes payloads with a replaceable sealer.
pub struct TransportEncoder {
    sealer: Box<dyn PayloadSealer>,
}

impl Default for TransportEncoder {
    fn default() -> Self {
        Self::new(Box::new(PlaceholderSealer))
    }
}

impl TransportEncoder {
    pub fn new(sealer: Box<dyn PayloadSealer>) -> Self {
        Self { sealer }
    }

    /// The active sealer.
    pub fn sealer(&self) -> &dyn PayloadSealer {
        self.sealer.as_ref()
    }

    /// Serialize `payload` as canonical JSON and seal it when a non-empty
    /// session key is given.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        session_key: Option<&str>,
    ) -> Result<EncodedPayload, AttestationError> {
        let json = to_canonical_json(payload)?;

        match session_key.filter(|k| !k.is_empty()) {
            None => Ok(EncodedPayload {
                encrypted: false,
                data: json,
                encryption: None,
            }),
            Some(key) => {
                let data = self.sealer.seal(&json, key)?;
                tracing::debug!(
                    encryption = self.sealer.label(),
                    confidential = self.sealer.is_confidential(),
                    bytes = json.len(),
                    "payload sealed"
                );
                Ok(EncodedPayload {
                    encrypted: true,
                    data,
                    encryption: Some(self.sealer.label().to_string()),
                })
            }
        }
    }
}
