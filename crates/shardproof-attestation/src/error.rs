/// Attestation errors.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("transport encoding failed: {0}")]
    Transport(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] shardproof_crypto::CryptoError),

    #[error("core error: {0}")]
    Core(#[from] shardproof_core::CoreError),
}
