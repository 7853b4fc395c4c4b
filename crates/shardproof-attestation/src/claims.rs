use serde::{Deserialize, Serialize};

use shardproof_core::join_decimals;
use shardproof_crypto::sha256_hex;

use crate::error::AttestationError;

/// The training results a worker attests to for one round.
///
/// Everything here is bound into the signed message. A verifier holding the
/// published claims can rebuild that message byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingClaims {
    pub node_id: String,
    pub weights_hash: String,
    /// Per-epoch loss values, in epoch order.
    pub loss_history: Vec<f64>,
    pub started_at: String,
    pub finished_at: String,
    pub global_model_hash: String,
    pub num_samples: u64,
    pub epoch_count: u32,
    pub random_seed: i64,
}

impl TrainingClaims {
    /// SHA-256 over the comma-joined decimal loss history.
    pub fn loss_history_hash(&self) -> String {
        sha256_hex(join_decimals(&self.loss_history, ","))
    }

    /// Reject values that would make the line-oriented message ambiguous.
    pub fn validate(&self) -> Result<(), AttestationError> {
        if self.node_id.is_empty() {
            return Err(AttestationError::InvalidField {
                field: "nodeId",
                reason: "must not be empty".into(),
            });
        }

        let text_fields: [(&'static str, &str); 5] = [
            ("nodeId", &self.node_id),
            ("weightsHash", &self.weights_hash),
            ("startedAt", &self.started_at),
            ("finishedAt", &self.finished_at),
            ("globalModelHash", &self.global_model_hash),
        ];
        for (field, value) in text_fields {
            if value.contains('\n') || value.contains('\r') {
                return Err(AttestationError::InvalidField {
                    field,
                    reason: "must not contain line breaks".into(),
                });
            }
        }
        Ok(())
    }
}
