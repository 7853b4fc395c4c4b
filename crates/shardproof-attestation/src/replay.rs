//! Per-epoch replay proofs.
//!
//! Every epoch's loss (and a gradient-norm proxy derived from it) is hashed
//! together with the epoch index, the round's training seed, and a challenge
//! drawn fresh for the round. The challenge ties the hash chain to one run:
//! a proof produced for one round does not validate against another round's
//! challenge even when the losses are identical.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use shardproof_core::{format_decimal, round_to};
use shardproof_crypto::sha256_hex;

/// Smallest challenge seed a source may draw.
pub const CHALLENGE_SEED_MIN: u64 = 1_000_000;
/// Largest challenge seed a source may draw.
pub const CHALLENGE_SEED_MAX: u64 = 9_999_999;

/// Decimal places the loss is rounded to before hashing.
const LOSS_DIGITS: usize = 4;

/// Source of per-round challenge seeds.
pub trait ChallengeSource: Send + Sync {
    /// Draw a challenge in `[CHALLENGE_SEED_MIN, CHALLENGE_SEED_MAX]`.
    fn draw(&self) -> u64;
}

/// Draws challenges uniformly from OS entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsChallengeSource;

impl ChallengeSource for OsChallengeSource {
    fn draw(&self) -> u64 {
        OsRng.gen_range(CHALLENGE_SEED_MIN..=CHALLENGE_SEED_MAX)
    }
}

/// Always returns the same challenge. For tests and offline recomputation.
#[derive(Debug, Clone, Copy)]
pub struct FixedChallenge(pub u64);

impl ChallengeSource for FixedChallenge {
    fn draw(&self) -> u64 {
        self.0
    }
}

/// Gradient-norm stand-in derived from the loss: `1 / (loss + 0.01)`.
pub fn gradient_norm_proxy(loss: f64) -> f64 {
    1.0 / (loss + 0.01)
}

/// `H("epoch:{i}:loss:{round(loss, 4)}:seed:{seed}:challenge:{challenge}")`.
pub fn loss_hash(epoch: usize, loss: f64, seed: i64, challenge_seed: u64) -> String {
    sha256_hex(format!(
        "epoch:{}:loss:{}:seed:{}:challenge:{}",
        epoch,
        format_decimal(round_to(loss, LOSS_DIGITS)),
        seed,
        challenge_seed
    ))
}

/// `H("epoch:{i}:grad_norm:{1/(loss+0.01)}:seed:{seed}:challenge:{challenge}")`.
pub fn gradient_norm_hash(epoch: usize, loss: f64, seed: i64, challenge_seed: u64) -> String {
    sha256_hex(format!(
        "epoch:{}:grad_norm:{}:seed:{}:challenge:{}",
        epoch,
        format_decimal(gradient_norm_proxy(loss)),
        seed,
        challenge_seed
    ))
}

/// Hash chain over a round's per-epoch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayProof {
    pub epoch_loss_hashes: Vec<String>,
    pub epoch_gradient_norm_hashes: Vec<String>,
    #[serde(rename = "randomChallengeSeed")]
    pub challenge_seed: u64,
}

/// Result of recomputing a replay proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayCheck {
    Valid,
    /// The proof covers a different number of epochs than the loss history.
    LengthMismatch { expected: usize, actual: usize },
    LossMismatch { epoch: usize },
    GradientNormMismatch { epoch: usize },
}

impl ReplayCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for ReplayCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::LengthMismatch { expected, actual } => write!(
                f,
                "proof covers {} epochs, loss history has {}",
                actual, expected
            ),
            Self::LossMismatch { epoch } => write!(f, "loss hash mismatch at epoch {}", epoch),
            Self::GradientNormMismatch { epoch } => {
                write!(f, "gradient norm hash mismatch at epoch {}", epoch)
            }
        }
    }
}

impl ReplayProof {
    /// Hash every epoch of `losses` under `seed` and `challenge_seed`.
    pub fn generate(losses: &[f64], seed: i64, challenge_seed: u64) -> Self {
        let epoch_loss_hashes = losses
            .iter()
            .enumerate()
            .map(|(epoch, loss)| loss_hash(epoch, *loss, seed, challenge_seed))
            .collect();
        let epoch_gradient_norm_hashes = losses
            .iter()
            .enumerate()
            .map(|(epoch, loss)| gradient_norm_hash(epoch, *loss, seed, challenge_seed))
            .collect();

        Self {
            epoch_loss_hashes,
            epoch_gradient_norm_hashes,
            challenge_seed,
        }
    }

    /// Draw a fresh challenge from `source` and generate the proof.
    pub fn generate_with(losses: &[f64], seed: i64, source: &dyn ChallengeSource) -> Self {
        let challenge_seed = source.draw();
        tracing::debug!(epochs = losses.len(), challenge_seed, "generating replay proof");
        Self::generate(losses, seed, challenge_seed)
    }

    /// Number of epochs the proof covers.
    pub fn epoch_count(&self) -> usize {
        self.epoch_loss_hashes.len()
    }

    /// Recompute from the published loss history and report the first mismatch.
    pub fn verify(&self, losses: &[f64], seed: i64) -> ReplayCheck {
        for actual in [
            self.epoch_loss_hashes.len(),
            self.epoch_gradient_norm_hashes.len(),
        ] {
            if actual != losses.len() {
                return ReplayCheck::LengthMismatch {
                    expected: losses.len(),
                    actual,
                };
            }
        }

        for (epoch, loss) in losses.iter().enumerate() {
            if self.epoch_loss_hashes[epoch] != loss_hash(epoch, *loss, seed, self.challenge_seed) {
                return ReplayCheck::LossMismatch { epoch };
            }
            if self.epoch_gradient_norm_hashes[epoch]
                != gradient_norm_hash(epoch, *loss, seed, self.challenge_seed)
            {
                return ReplayCheck::GradientNormMismatch { epoch };
            }
        }

        ReplayCheck::Valid
    }
}
