use shardproof_core::SignatureScheme;

/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key material error: {0}")]
    KeyMaterial(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("signatures under {0} cannot be verified with a public key")]
    UnverifiableScheme(SignatureScheme),

    #[error("encryption failed: {0}")]
    EncryptionError(String),

    #[error("decryption failed: {0}")]
    DecryptionError(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
