use serde::{Deserialize, Serialize};
use std::sync::Arc;

use shardproof_core::{HardwareInfo, SignatureScheme};
use shardproof_crypto::IdentityStore;

use crate::claims::TrainingClaims;
use crate::commitment::CommitVerification;
use crate::error::AttestationError;
use crate::message::canonical_message;

/// A signed receipt for one training round.
///
/// `message` is the exact text that was signed. `hardware_info` and
/// `commit_verified` are present exactly when they were part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ReceivedAttestation")]
pub struct Attestation {
    pub message: String,
    /// Base64 signature over `message`.
    pub signature: String,
    /// Base64 public key of the signer.
    pub public_key: String,
    /// Same bytes as `public_key`, kept for consumers that read this name.
    pub signer_pub_key: String,
    pub weights_hash: String,
    pub loss_history_hash: String,
    pub address: String,
    pub hardware_info: Option<HardwareInfo>,
    pub commit_verified: Option<CommitVerification>,
    pub signature_scheme: SignatureScheme,
}

/// Attestation as received: either key field may stand in for the other.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedAttestation {
    message: String,
    signature: String,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(default)]
    signer_pub_key: Option<String>,
    weights_hash: String,
    loss_history_hash: String,
    #[serde(alias = "suiAddress")]
    address: String,
    #[serde(default)]
    hardware_info: Option<HardwareInfo>,
    #[serde(default)]
    commit_verified: Option<CommitVerification>,
    #[serde(default)]
    signature_scheme: SignatureScheme,
}

impl TryFrom<ReceivedAttestation> for Attestation {
    type Error = String;

    fn try_from(received: ReceivedAttestation) -> Result<Self, Self::Error> {
        let (public_key, signer_pub_key) = match (received.public_key, received.signer_pub_key) {
            (Some(key), Some(alias)) => (key, alias),
            (Some(key), None) => (key.clone(), key),
            (None, Some(alias)) => (alias.clone(), alias),
            (None, None) => return Err("missing field `publicKey` or `signerPubKey`".into()),
        };
        Ok(Self {
            message: received.message,
            signature: received.signature,
            public_key,
            signer_pub_key,
            weights_hash: received.weights_hash,
            loss_history_hash: received.loss_history_hash,
            address: received.address,
            hardware_info: received.hardware_info,
            commit_verified: received.commit_verified,
            signature_scheme: received.signature_scheme,
        })
    }
}

/// Signs training claims with a worker identity.
pub struct AttestationBuilder {
    identity: Arc<IdentityStore>,
}

impl AttestationBuilder {
    /// Create a builder signing with `identity`.
    pub fn new(identity: Arc<IdentityStore>) -> Self {
        Self { identity }
    }

    /// The identity attestations are signed with.
    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    /// Build and sign the attestation for `claims`.
    pub fn build(
        &self,
        claims: &TrainingClaims,
        hardware: Option<HardwareInfo>,
        commit: Option<CommitVerification>,
    ) -> Result<Attestation, AttestationError> {
        if claims.node_id != self.identity.node_id() {
            tracing::warn!(
                claimed = %claims.node_id,
                identity = %self.identity.node_id(),
                "attesting claims for a node id other than the signing identity"
            );
        }

        let message = canonical_message(claims, hardware.as_ref(), commit.as_ref())?;
        let signature = self.identity.sign(message.as_bytes());
        let public_key = self.identity.public_key_base64();

        let attestation = Attestation {
            signature: signature.to_base64(),
            signer_pub_key: public_key.clone(),
            public_key,
            weights_hash: claims.weights_hash.clone(),
            loss_history_hash: claims.loss_history_hash(),
            address: self.identity.address(),
            hardware_info: hardware,
            commit_verified: commit,
            signature_scheme: self.identity.signature_scheme(),
            message,
        };

        tracing::info!(
            node_id = %claims.node_id,
            address = %attestation.address,
            scheme = %attestation.signature_scheme,
            commit_checked = attestation.commit_verified.is_some(),
            "attestation signed"
        );

        Ok(attestation)
    }
}
