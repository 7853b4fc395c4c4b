//! Shardproof Attestation — Replay proofs, commit-reveal verification, signed
//! round attestations, and transport encoding of worker updates.

pub mod attestation;
pub mod claims;
pub mod commitment;
pub mod error;
pub mod message;
pub mod replay;
pub mod transport;
pub mod update;
pub mod verifier;

pub use attestation::{Attestation, AttestationBuilder};
pub use claims::TrainingClaims;
pub use commitment::{create_commitment, verify_commitment, CommitVerification};
pub use error::AttestationError;
pub use message::canonical_message;
pub use replay::{
    gradient_norm_hash, loss_hash, ChallengeSource, FixedChallenge, OsChallengeSource,
    ReplayCheck, ReplayProof, CHALLENGE_SEED_MAX, CHALLENGE_SEED_MIN,
};
pub use transport::{ChaChaSealer, EncodedPayload, PayloadSealer, PlaceholderSealer, TransportEncoder};
pub use update::{delta_weights_hash, AuditEvent, WorkerUpdate};
pub use verifier::{AttestationVerifier, VerificationCheck, VerificationResult};
