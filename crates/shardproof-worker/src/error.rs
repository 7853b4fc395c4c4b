use crate::decrypt::DecryptError;

/// Why a round could not produce an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Decrypt,
    CommitMismatch,
    Training,
    Attestation,
    Transport,
}

/// Worker errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Decryption failed: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("commit mismatch: shard hashes to {computed}, commitment is {expected}")]
    CommitMismatch { computed: String, expected: String },

    #[error("training failed: {0}")]
    Training(String),

    #[error("attestation failed: {0}")]
    Attestation(#[from] shardproof_attestation::AttestationError),

    #[error("encoding update failed: {0}")]
    Transport(String),
}

impl WorkerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Decrypt(_) => FailureKind::Decrypt,
            Self::CommitMismatch { .. } => FailureKind::CommitMismatch,
            Self::Training(_) => FailureKind::Training,
            Self::Attestation(_) => FailureKind::Attestation,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}
