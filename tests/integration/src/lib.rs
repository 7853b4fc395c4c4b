//! Fixtures shared by the cross-crate integration tests.

use std::sync::Arc;

use shardproof_attestation::TrainingClaims;
use shardproof_core::HardwareInfo;
use shardproof_crypto::IdentityStore;

/// Deterministic identity for `node_id`.
pub fn identity(node_id: &str, seed_byte: u8) -> Arc<IdentityStore> {
    Arc::new(IdentityStore::from_seed(node_id, &[seed_byte; 32]))
}

/// The worker-1 round: three epochs, seed 1337.
pub fn worker_one_claims() -> TrainingClaims {
    let started = chrono::DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default();
    let finished = started + chrono::Duration::seconds(42);
    let fmt = "%Y-%m-%dT%H:%M:%S%.6f";
    TrainingClaims {
        node_id: "worker-1".into(),
        weights_hash: "9f".repeat(32),
        loss_history: vec![0.82, 0.71, 0.65],
        started_at: started.format(fmt).to_string(),
        finished_at: finished.format(fmt).to_string(),
        global_model_hash: "global-model-v3".into(),
        num_samples: 2,
        epoch_count: 3,
        random_seed: 1337,
    }
}

pub fn sample_hardware() -> HardwareInfo {
    HardwareInfo {
        cpu_cores: 8,
        cpu_physical_cores: 4,
        memory_gb: 31.25,
        platform: "Linux-6.1-x86_64".into(),
        processor: "x86_64".into(),
    }
}

/// Shard revealed in the commit-reveal scenario.
pub const SHARD_CSV: &str = "id,amount\n1,10\n2,20\n";
