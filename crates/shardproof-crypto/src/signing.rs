use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::Signer;
use ed25519_dalek::Verifier;

use shardproof_core::SignatureScheme;

use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};

/// A signature produced by an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// Ed25519 signature (64 bytes).
    Ed25519(ed25519_dalek::Signature),
    /// Development-only digest SHA-256(secret || message) (32 bytes).
    DevDigest([u8; 32]),
}

impl Signature {
    /// The scheme this signature was made under.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            Self::Ed25519(_) => SignatureScheme::Ed25519,
            Self::DevDigest(_) => SignatureScheme::InsecureDevSha256,
        }
    }

    /// Get the raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(sig) => sig.to_bytes().to_vec(),
            Self::DevDigest(digest) => digest.to_vec(),
        }
    }

    /// Create from raw bytes under the given scheme.
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, CryptoError> {
        match scheme {
            SignatureScheme::Ed25519 => {
                let bytes_arr: [u8; 64] = bytes.try_into().map_err(|_| {
                    CryptoError::InvalidInput(format!(
                        "signature must be 64 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Self::Ed25519(ed25519_dalek::Signature::from_bytes(&bytes_arr)))
            }
            SignatureScheme::InsecureDevSha256 => {
                let digest: [u8; 32] = bytes.try_into().map_err(|_| {
                    CryptoError::InvalidInput(format!(
                        "dev digest must be 32 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Self::DevDigest(digest))
            }
        }
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode from standard base64 under the given scheme.
    pub fn from_base64(scheme: SignatureScheme, b64: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(b64)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base64: {}", e)))?;
        Self::from_bytes(scheme, &bytes)
    }
}

/// Sign a message using Ed25519.
pub fn sign(message: &[u8], keypair: &KeyPair) -> Signature {
    Signature::Ed25519(keypair.signing_key().sign(message))
}

/// Verify a signature over `message`.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), CryptoError> {
    match signature {
        Signature::Ed25519(sig) => pubkey
            .verifying_key()
            .verify(message, sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed),
        Signature::DevDigest(_) => Err(CryptoError::UnverifiableScheme(signature.scheme())),
    }
}

/// Verify against raw public key bytes, as published in an attestation.
pub fn verify_with_key_bytes(
    message: &[u8],
    signature: &Signature,
    pubkey_bytes: &[u8],
) -> Result<(), CryptoError> {
    if !signature.scheme().is_verifiable() {
        return Err(CryptoError::UnverifiableScheme(signature.scheme()));
    }
    let pubkey = PublicKey::from_bytes(pubkey_bytes)?;
    verify(message, signature, &pubkey)
}
