//! One training round, from request to signed update.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use shardproof_attestation::{
    delta_weights_hash, verify_commitment, AttestationBuilder, AuditEvent, ChallengeSource,
    CommitVerification, EncodedPayload, OsChallengeSource, ReplayProof, TrainingClaims,
    TransportEncoder, WorkerUpdate,
};
use shardproof_core::{join_decimals, AttestationPolicy, HardwareInfo};
use shardproof_crypto::{sha256_hex, IdentityStore};

use crate::decrypt::{DecryptCollaborator, DecryptRequest};
use crate::error::{FailureKind, WorkerError};

/// Characters of signature and public key kept in the audit trace.
const AUDIT_TRUNCATE: usize = 32;

/// Per-round input from the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRequest {
    #[serde(default)]
    pub data_shard: String,
    pub global_model_hash: String,
    pub epoch_count: u32,
    pub node_id: String,
    pub random_seed: i64,
    #[serde(default)]
    pub encrypted_data: Option<String>,
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub tx_bytes: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
    #[serde(default)]
    pub commit_hash: Option<String>,
    /// Results of the external trainer, when it ran before the worker.
    #[serde(default)]
    pub training: Option<TrainingReport>,
}

impl RoundRequest {
    fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref().filter(|k| !k.is_empty())
    }

    fn decrypt_request(&self) -> Option<DecryptRequest> {
        let encrypted = self.encrypted_data.as_deref().filter(|d| !d.is_empty())?;
        Some(DecryptRequest {
            encrypted_data: encrypted.to_string(),
            session_key: self.session_key()?.to_string(),
            tx_bytes: self.tx_bytes.clone(),
            user_address: self.user_address.clone(),
        })
    }
}

/// What the trainer reports for a shard. Loss values are opaque inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub loss_history: Vec<f64>,
    pub num_samples: u64,
}

/// Produces per-epoch losses for a plaintext shard.
pub trait Trainer: Send + Sync {
    fn train(&self, shard: &str, epoch_count: u32, seed: i64) -> Result<TrainingReport, WorkerError>;
}

/// Trainer that replays a report produced elsewhere.
pub struct ReportedTraining(pub Option<TrainingReport>);

impl Trainer for ReportedTraining {
    fn train(&self, _shard: &str, _epoch_count: u32, _seed: i64) -> Result<TrainingReport, WorkerError> {
        self.0
            .clone()
            .ok_or_else(|| WorkerError::Training("round request carries no training report".into()))
    }
}

/// Round output when the request carried a session key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedRound {
    pub encrypted: bool,
    pub encrypted_update: EncodedPayload,
}

/// A round that stopped before producing an update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundFailure {
    pub error: String,
    pub node_id: String,
    pub audit_events: Vec<AuditEvent>,
    #[serde(skip)]
    pub kind: FailureKind,
}

/// Result of processing a round.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RoundOutcome {
    Update(Box<WorkerUpdate>),
    Encrypted(EncryptedRound),
    Failed(RoundFailure),
}

/// Audit trace for one round.
struct AuditTrail {
    round_id: String,
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    fn new() -> Self {
        Self {
            round_id: uuid::Uuid::now_v7().to_string(),
            events: Vec::new(),
        }
    }

    fn record(&mut self, event: &str, timestamp: String, details: serde_json::Value) {
        let mut entry = AuditEvent::new(event, self.round_id.clone(), timestamp);
        if let serde_json::Value::Object(map) = details {
            entry.details = map;
        }
        tracing::debug!(round_id = %self.round_id, event, "audit");
        self.events.push(entry);
    }
}

/// Naive UTC timestamp with microseconds, e.g. `2025-01-01T00:00:00.000000`.
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// `SHA-256("{node}:{globalModel}:[{losses}]:{numSamples}:{challenge}")`.
pub fn weights_hash(
    node_id: &str,
    global_model_hash: &str,
    losses: &[f64],
    num_samples: u64,
    challenge_seed: u64,
) -> String {
    sha256_hex(format!(
        "{}:{}:[{}]:{}:{}",
        node_id,
        global_model_hash,
        join_decimals(losses, ", "),
        num_samples,
        challenge_seed
    ))
}

fn truncate(value: &str) -> String {
    let head: String = value.chars().take(AUDIT_TRUNCATE).collect();
    format!("{}...", head)
}

/// Runs rounds for one worker identity.
pub struct RoundProcessor {
    builder: AttestationBuilder,
    decryptor: Arc<dyn DecryptCollaborator>,
    encoder: TransportEncoder,
    challenges: Box<dyn ChallengeSource>,
    policy: AttestationPolicy,
    hardware: Option<HardwareInfo>,
}

impl RoundProcessor {
    pub fn new(
        identity: Arc<IdentityStore>,
        decryptor: Arc<dyn DecryptCollaborator>,
        encoder: TransportEncoder,
        policy: AttestationPolicy,
        hardware: Option<HardwareInfo>,
    ) -> Self {
        Self {
            builder: AttestationBuilder::new(identity),
            decryptor,
            encoder,
            challenges: Box::new(OsChallengeSource),
            policy,
            hardware,
        }
    }

    /// Replace the challenge source.
    pub fn with_challenge_source(mut self, challenges: Box<dyn ChallengeSource>) -> Self {
        self.challenges = challenges;
        self
    }

    /// Process one round. Never panics on bad input; failures come back as
    /// [`RoundOutcome::Failed`] carrying the audit trace so far.
    pub async fn process(&self, request: &RoundRequest, trainer: &dyn Trainer) -> RoundOutcome {
        let mut audit = AuditTrail::new();
        let started_at = timestamp();

        tracing::info!(
            round_id = %audit.round_id,
            node_id = %request.node_id,
            epochs = request.epoch_count,
            encrypted = request.encrypted_data.is_some(),
            "round started"
        );

        match self.run(request, trainer, &mut audit, started_at).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    round_id = %audit.round_id,
                    node_id = %request.node_id,
                    error = %err,
                    "round failed"
                );
                RoundOutcome::Failed(RoundFailure {
                    error: err.to_string(),
                    node_id: request.node_id.clone(),
                    kind: err.kind(),
                    audit_events: audit.events,
                })
            }
        }
    }

    async fn run(
        &self,
        request: &RoundRequest,
        trainer: &dyn Trainer,
        audit: &mut AuditTrail,
        started_at: String,
    ) -> Result<RoundOutcome, WorkerError> {
        audit.record(
            "training_start",
            started_at.clone(),
            json!({"nodeId": request.node_id, "globalModelHash": request.global_model_hash}),
        );

        let (shard, commit) = self.reveal_shard(request, audit).await?;

        if let Some(commit) = commit.as_ref().filter(|c| !c.matches) {
            tracing::warn!(
                round_id = %audit.round_id,
                commit_hash = %commit.commit_hash,
                computed_hash = %commit.computed_hash,
                "revealed shard does not match its commitment"
            );
            if self.policy.abort_on_commit_mismatch {
                return Err(WorkerError::CommitMismatch {
                    computed: commit.computed_hash.clone(),
                    expected: commit.commit_hash.clone(),
                });
            }
        }

        let report = trainer.train(&shard, request.epoch_count, request.random_seed)?;
        if report.loss_history.len() != request.epoch_count as usize {
            tracing::warn!(
                reported = report.loss_history.len(),
                requested = request.epoch_count,
                "loss history length differs from requested epoch count"
            );
        }

        let replay_proof = ReplayProof::generate_with(
            &report.loss_history,
            request.random_seed,
            self.challenges.as_ref(),
        );
        let finished_at = timestamp();

        let weights_hash = weights_hash(
            &request.node_id,
            &request.global_model_hash,
            &report.loss_history,
            report.num_samples,
            replay_proof.challenge_seed,
        );

        let claims = TrainingClaims {
            node_id: request.node_id.clone(),
            weights_hash: weights_hash.clone(),
            loss_history: report.loss_history.clone(),
            started_at: started_at.clone(),
            finished_at: finished_at.clone(),
            global_model_hash: request.global_model_hash.clone(),
            num_samples: report.num_samples,
            epoch_count: request.epoch_count,
            random_seed: request.random_seed,
        };
        let attestation = self
            .builder
            .build(&claims, self.hardware.clone(), commit)?;

        audit.record(
            "training_complete",
            finished_at.clone(),
            json!({"numSamples": report.num_samples, "epochs": request.epoch_count}),
        );
        audit.record(
            "worker_identity",
            timestamp(),
            json!({"address": attestation.address, "hardwareInfo": self.hardware}),
        );
        audit.record(
            "update_hash",
            timestamp(),
            json!({"weightsHash": weights_hash, "lossHistoryHash": attestation.loss_history_hash}),
        );
        audit.record(
            "signature_generated",
            timestamp(),
            json!({
                "signature": truncate(&attestation.signature),
                "publicKey": truncate(&attestation.public_key),
            }),
        );

        let update = WorkerUpdate {
            node_id: request.node_id.clone(),
            address: attestation.address.clone(),
            num_samples: report.num_samples,
            delta_weights_hash: delta_weights_hash(&weights_hash),
            weights_hash,
            loss_history: report.loss_history,
            started_at,
            finished_at,
            global_model_hash: request.global_model_hash.clone(),
            epoch_count: request.epoch_count,
            random_seed: request.random_seed,
            replay_proof,
            attestation,
            audit_trace: std::mem::take(&mut audit.events),
        };

        tracing::info!(
            round_id = %audit.round_id,
            node_id = %update.node_id,
            weights_hash = %update.weights_hash,
            challenge_seed = update.replay_proof.challenge_seed,
            "round complete"
        );

        match request.session_key() {
            Some(key) => {
                let encoded = self
                    .encoder
                    .encode(&update, Some(key))
                    .map_err(|e| WorkerError::Transport(e.to_string()))?;
                Ok(RoundOutcome::Encrypted(EncryptedRound {
                    encrypted: true,
                    encrypted_update: encoded,
                }))
            }
            None => Ok(RoundOutcome::Update(Box::new(update))),
        }
    }

    /// Decrypt the shard if needed and check it against any commitment.
    async fn reveal_shard(
        &self,
        request: &RoundRequest,
        audit: &mut AuditTrail,
    ) -> Result<(String, Option<CommitVerification>), WorkerError> {
        let decrypting = request.decrypt_request();
        let shard = match &decrypting {
            Some(decrypt) => {
                audit.record(
                    "decrypt_permission_request",
                    timestamp(),
                    json!({"hasTxBytes": request.tx_bytes.is_some()}),
                );
                match self.decryptor.decrypt(decrypt).await {
                    Ok(plaintext) => plaintext,
                    Err(e) => {
                        audit.record("decrypt_failed", timestamp(), json!({"error": e.to_string()}));
                        return Err(e.into());
                    }
                }
            }
            None => request.data_shard.clone(),
        };

        let commit = request.commit_hash.as_deref().map(|hash| {
            let result = verify_commitment(&shard, hash);
            audit.record(
                "commit_verification",
                timestamp(),
                json!({"match": result.matches, "commitHash": hash}),
            );
            result
        });

        if decrypting.is_some() {
            audit.record("decrypt_permission_granted", timestamp(), json!({}));
        }

        Ok((shard, commit))
    }
}
