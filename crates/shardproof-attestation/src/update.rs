use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attestation::Attestation;
use crate::claims::TrainingClaims;
use crate::error::AttestationError;
use crate::replay::ReplayProof;
use crate::verifier::{AttestationVerifier, VerificationCheck, VerificationResult};

/// Short form of a weights hash: `sha256:` plus its first 32 hex characters.
pub fn delta_weights_hash(weights_hash: &str) -> String {
    let prefix: String = weights_hash.chars().take(32).collect();
    format!("sha256:{}", prefix)
}

/// One entry of a round's audit trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event: String,
    pub timestamp: String,
    pub round_id: String,
    /// Event-specific fields, flattened into the event object.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl AuditEvent {
    pub fn new(
        event: impl Into<String>,
        round_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            timestamp: timestamp.into(),
            round_id: round_id.into(),
            details: Map::new(),
        }
    }

    /// Attach a detail field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Everything a worker reports for a completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerUpdate {
    pub node_id: String,
    #[serde(alias = "suiAddress")]
    pub address: String,
    pub num_samples: u64,
    pub delta_weights_hash: String,
    pub weights_hash: String,
    pub loss_history: Vec<f64>,
    pub started_at: String,
    pub finished_at: String,
    pub global_model_hash: String,
    pub epoch_count: u32,
    pub random_seed: i64,
    #[serde(flatten)]
    pub replay_proof: ReplayProof,
    pub attestation: Attestation,
    pub audit_trace: Vec<AuditEvent>,
}

impl WorkerUpdate {
    /// The claims the attestation is supposed to cover.
    pub fn claims(&self) -> TrainingClaims {
        TrainingClaims {
            node_id: self.node_id.clone(),
            weights_hash: self.weights_hash.clone(),
            loss_history: self.loss_history.clone(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            global_model_hash: self.global_model_hash.clone(),
            num_samples: self.num_samples,
            epoch_count: self.epoch_count,
            random_seed: self.random_seed,
        }
    }

    /// Verify the attestation, the replay proof, and the derived fields.
    pub fn verify(
        &self,
        verifier: &AttestationVerifier,
    ) -> Result<VerificationResult, AttestationError> {
        let mut checks = verifier.verify(&self.attestation, &self.claims())?.checks;

        let replay = self.replay_proof.verify(&self.loss_history, self.random_seed);
        checks.push(VerificationCheck::new(
            "replay_proof",
            replay.is_valid(),
            || replay.to_string(),
        ));

        let expected_delta = delta_weights_hash(&self.weights_hash);
        checks.push(VerificationCheck::new(
            "delta_weights_hash",
            self.delta_weights_hash == expected_delta,
            || format!("expected {}", expected_delta),
        ));

        checks.push(VerificationCheck::new(
            "address_consistent",
            self.address == self.attestation.address,
            || "update and attestation name different addresses".into(),
        ));

        Ok(VerificationResult::from_checks(checks))
    }
}
