use shardproof_core::HardwareInfo;

use crate::claims::TrainingClaims;
use crate::commitment::CommitVerification;
use crate::error::AttestationError;

/// Build the exact text an attestation signs.
///
/// One `key:value` line per attested field, joined with `\n`, in fixed
/// order. The `hardware` line and the `commitVerified`/`commitHash` pair
/// appear only when the corresponding value is present, so their presence
/// is itself signed.
pub fn canonical_message(
    claims: &TrainingClaims,
    hardware: Option<&HardwareInfo>,
    commit: Option<&CommitVerification>,
) -> Result<String, AttestationError> {
    claims.validate()?;

    let mut lines = vec![
        format!("nodeId:{}", claims.node_id),
        format!("weightsHash:{}", claims.weights_hash),
        format!("lossHistoryHash:{}", claims.loss_history_hash()),
        format!("startedAt:{}", claims.started_at),
        format!("finishedAt:{}", claims.finished_at),
        format!("globalModelHash:{}", claims.global_model_hash),
        format!("numSamples:{}", claims.num_samples),
        format!("epochCount:{}", claims.epoch_count),
        format!("randomSeed:{}", claims.random_seed),
    ];

    if let Some(hardware) = hardware {
        lines.push(format!("hardware:{}", hardware.canonical()?));
    }

    if let Some(commit) = commit {
        let flag = if commit.matches { "True" } else { "False" };
        lines.push(format!("commitVerified:{}", flag));
        lines.push(format!("commitHash:{}", commit.commit_hash));
    }

    Ok(lines.join("\n"))
}
