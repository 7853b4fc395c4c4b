use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use shardproof_crypto::{derive_address, verify_with_key_bytes, CryptoError, Signature};

use crate::attestation::Attestation;
use crate::claims::TrainingClaims;
use crate::error::AttestationError;
use crate::message::canonical_message;

/// Result of attestation verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// Individual check results, in the order they ran.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    /// Look up a check by name.
    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Names of the checks that failed.
    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub(crate) fn from_checks(checks: Vec<VerificationCheck>) -> Self {
        let valid = checks.iter().all(|c| c.passed);
        Self { valid, checks }
    }
}

/// An individual verification check.
#[derive(Debug, Clone)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Why the check failed, if it did.
    pub detail: Option<String>,
}

impl VerificationCheck {
    pub(crate) fn new(name: &str, passed: bool, failure: impl FnOnce() -> String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: if passed { None } else { Some(failure()) },
        }
    }
}

/// Checks attestations against the claims they are said to cover.
///
/// Verification rebuilds the canonical message from the claims with the same
/// optional-field rule the builder uses, and checks the signature over that
/// rebuilt text rather than over the attestation's own `message`.
#[derive(Debug, Default)]
pub struct AttestationVerifier {
    /// Node id -> base64 public key the node is expected to sign with.
    pinned_keys: HashMap<String, String>,
}

impl AttestationVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require attestations for `node_id` to carry `public_key_base64`.
    pub fn pin_key(&mut self, node_id: impl Into<String>, public_key_base64: impl Into<String>) {
        self.pinned_keys
            .insert(node_id.into(), public_key_base64.into());
    }

    /// Verify `attestation` as a receipt for `claims`.
    pub fn verify(
        &self,
        attestation: &Attestation,
        claims: &TrainingClaims,
    ) -> Result<VerificationResult, AttestationError> {
        let mut checks = Vec::new();

        let rebuilt = canonical_message(
            claims,
            attestation.hardware_info.as_ref(),
            attestation.commit_verified.as_ref(),
        )?;
        checks.push(VerificationCheck::new(
            "message_reconstructed",
            rebuilt == attestation.message,
            || "signed message does not match the claims".into(),
        ));

        checks.push(VerificationCheck::new(
            "weights_hash",
            attestation.weights_hash == claims.weights_hash,
            || {
                format!(
                    "attestation carries {}, claims carry {}",
                    attestation.weights_hash, claims.weights_hash
                )
            },
        ));

        let expected_loss_hash = claims.loss_history_hash();
        checks.push(VerificationCheck::new(
            "loss_history_hash",
            attestation.loss_history_hash == expected_loss_hash,
            || format!("expected {}", expected_loss_hash),
        ));

        checks.push(VerificationCheck::new(
            "signer_key_alias",
            attestation.public_key == attestation.signer_pub_key,
            || "publicKey and signerPubKey differ".into(),
        ));

        let key_bytes = STANDARD.decode(&attestation.public_key).ok();
        let address_ok = key_bytes
            .as_deref()
            .and_then(|bytes| <&[u8; 32]>::try_from(bytes).ok())
            .map(|bytes| derive_address(bytes) == attestation.address)
            .unwrap_or(false);
        checks.push(VerificationCheck::new(
            "address_matches_key",
            address_ok,
            || format!("address {} is not derived from the public key", attestation.address),
        ));

        if let Some(pinned) = self.pinned_keys.get(&claims.node_id) {
            checks.push(VerificationCheck::new(
                "signer_pinned",
                *pinned == attestation.public_key,
                || format!("{} is pinned to a different key", claims.node_id),
            ));
        }

        let signature_check = match key_bytes {
            Some(bytes) => Self::check_signature(attestation, rebuilt.as_bytes(), &bytes),
            None => Err("public key is not valid base64".to_string()),
        };
        checks.push(VerificationCheck::new(
            "signature_valid",
            signature_check.is_ok(),
            || signature_check.err().unwrap_or_default(),
        ));

        let result = VerificationResult::from_checks(checks);
        if !result.valid {
            tracing::warn!(
                node_id = %claims.node_id,
                failed = ?result.failures(),
                "attestation verification failed"
            );
        }
        Ok(result)
    }

    fn check_signature(
        attestation: &Attestation,
        message: &[u8],
        key_bytes: &[u8],
    ) -> Result<(), String> {
        let signature = Signature::from_base64(attestation.signature_scheme, &attestation.signature)
            .map_err(|e| e.to_string())?;
        match verify_with_key_bytes(message, &signature, key_bytes) {
            Ok(()) => Ok(()),
            Err(CryptoError::UnverifiableScheme(scheme)) => {
                Err(format!("{} signatures cannot be verified", scheme))
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::AttestationBuilder;
    use crate::commitment::verify_commitment;
    use crate::test_support::{sample_claims, sample_hardware};
    use shardproof_core::{IdentityOptions, SignatureScheme};
    use shardproof_crypto::IdentityStore;
    use std::sync::Arc;

    fn setup() -> (AttestationBuilder, TrainingClaims) {
        let identity = Arc::new(IdentityStore::from_seed("worker-1", &[7u8; 32]));
        (AttestationBuilder::new(identity), sample_claims())
    }

    #[test]
    fn test_verify_valid_attestation() {
        let (builder, claims) = setup();
        let att = builder.build(&claims, Some(sample_hardware()), None).unwrap();
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert!(result.valid, "failed: {:?}", result.failures());
        assert!(result.checks.iter().all(|c| c.detail.is_none()));
    }

    #[test]
    fn test_mutated_claim_fails() {
        let (builder, claims) = setup();
        let att = builder.build(&claims, None, None).unwrap();

        let mut tampered = claims.clone();
        tampered.num_samples += 1;
        let result = AttestationVerifier::new().verify(&att, &tampered).unwrap();
        assert!(!result.valid);
        assert!(!result.check("message_reconstructed").unwrap().passed);
        assert!(!result.check("signature_valid").unwrap().passed);
    }

    #[test]
    fn test_mutated_loss_history_fails() {
        let (builder, claims) = setup();
        let att = builder.build(&claims, None, None).unwrap();

        let mut tampered = claims.clone();
        tampered.loss_history[0] = 0.81;
        let result = AttestationVerifier::new().verify(&att, &tampered).unwrap();
        assert!(!result.check("loss_history_hash").unwrap().passed);
        assert!(!result.valid);
    }

    #[test]
    fn test_stripped_hardware_fails() {
        let (builder, claims) = setup();
        let mut att = builder.build(&claims, Some(sample_hardware()), None).unwrap();
        att.hardware_info = None;
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert!(!result.valid);
        assert!(!result.check("signature_valid").unwrap().passed);
    }

    #[test]
    fn test_flipped_commit_result_fails() {
        let (builder, claims) = setup();
        let commit = verify_commitment("plaintext", "0000");
        let mut att = builder.build(&claims, None, Some(commit)).unwrap();
        if let Some(c) = att.commit_verified.as_mut() {
            c.matches = true;
            c.verified = true;
        }
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert!(!result.valid);
    }

    #[test]
    fn test_swapped_address_fails() {
        let (builder, claims) = setup();
        let mut att = builder.build(&claims, None, None).unwrap();
        att.address = format!("0x{}", "00".repeat(32));
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert_eq!(result.failures(), vec!["address_matches_key"]);
    }

    #[test]
    fn test_alias_mismatch_fails() {
        let (builder, claims) = setup();
        let mut att = builder.build(&claims, None, None).unwrap();
        att.signer_pub_key = "AAAA".into();
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert_eq!(result.failures(), vec!["signer_key_alias"]);
    }

    #[test]
    fn test_pinned_key() {
        let (builder, claims) = setup();
        let att = builder.build(&claims, None, None).unwrap();

        let mut verifier = AttestationVerifier::new();
        verifier.pin_key("worker-1", att.public_key.clone());
        assert!(verifier.verify(&att, &claims).unwrap().valid);

        let other = IdentityStore::from_seed("worker-1", &[8u8; 32]);
        let mut verifier = AttestationVerifier::new();
        verifier.pin_key("worker-1", other.public_key_base64());
        let result = verifier.verify(&att, &claims).unwrap();
        assert_eq!(result.failures(), vec!["signer_pinned"]);
    }

    #[test]
    fn test_dev_scheme_never_valid() {
        let options = IdentityOptions {
            signature_scheme: SignatureScheme::InsecureDevSha256,
            ..Default::default()
        };
        let identity = IdentityStore::initialize("worker-1", None, &options).unwrap();
        let claims = sample_claims();
        let att = AttestationBuilder::new(Arc::new(identity))
            .build(&claims, None, None)
            .unwrap();
        let result = AttestationVerifier::new().verify(&att, &claims).unwrap();
        assert!(!result.valid);
        let check = result.check("signature_valid").unwrap();
        assert!(check.detail.as_deref().unwrap().contains("insecure-dev-sha256"));
    }
}
