//! Integration test: commit-reveal over a revealed CSV shard, and how the
//! commitment outcome is carried into the signed attestation.

use shardproof_attestation::{
    canonical_message, create_commitment, verify_commitment, AttestationBuilder,
    AttestationVerifier,
};
use shardproof_crypto::sha256_hex;
use shardproof_integration_tests::{identity, worker_one_claims, SHARD_CSV};

#[test]
fn test_matching_plaintext_verifies() {
    let commit_hash = sha256_hex(SHARD_CSV);
    assert_eq!(create_commitment(SHARD_CSV), commit_hash);

    let result = verify_commitment(SHARD_CSV, &commit_hash);
    assert!(result.matches);
    assert!(result.verified);
    assert_eq!(result.computed_hash, commit_hash);
    assert_eq!(result.commit_hash, commit_hash);
}

#[test]
fn test_single_character_change_is_detected() {
    let commit_hash = create_commitment(SHARD_CSV);
    let altered = SHARD_CSV.replace("20", "21");

    let result = verify_commitment(&altered, &commit_hash);
    assert!(!result.matches);
    assert!(!result.verified);
    assert_ne!(result.computed_hash, result.commit_hash);
}

#[test]
fn test_appended_byte_is_detected() {
    let commit_hash = create_commitment(format!("{}x", SHARD_CSV));
    assert!(!verify_commitment(SHARD_CSV, &commit_hash).matches);
}

#[test]
fn test_commit_hash_comparison_is_case_sensitive() {
    let upper = create_commitment(SHARD_CSV).to_uppercase();
    assert!(!verify_commitment(SHARD_CSV, &upper).matches);
}

#[test]
fn test_output_field_names() {
    let result = verify_commitment(SHARD_CSV, &create_commitment(SHARD_CSV));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["match"], true);
    assert_eq!(json["verified"], true);
    assert!(json["computedHash"].is_string());
    assert!(json["commitHash"].is_string());
}

#[test]
fn test_commit_outcome_is_signed_into_attestation() {
    let claims = worker_one_claims();
    let builder = AttestationBuilder::new(identity("worker-1", 21));
    let commit = verify_commitment(SHARD_CSV, &create_commitment(SHARD_CSV));

    let attestation = builder.build(&claims, None, Some(commit.clone())).unwrap();
    assert!(attestation.message.ends_with(&format!(
        "commitVerified:True\ncommitHash:{}",
        commit.commit_hash
    )));
    assert_eq!(
        attestation.message,
        canonical_message(&claims, None, Some(&commit)).unwrap()
    );

    let verifier = AttestationVerifier::new();
    assert!(verifier.verify(&attestation, &claims).unwrap().valid);

    // Flipping the recorded outcome after signing is detected.
    let mut flipped = attestation.clone();
    if let Some(c) = flipped.commit_verified.as_mut() {
        c.matches = false;
        c.verified = false;
    }
    assert!(!verifier.verify(&flipped, &claims).unwrap().valid);
}

#[test]
fn test_mismatch_is_still_attested() {
    let claims = worker_one_claims();
    let builder = AttestationBuilder::new(identity("worker-1", 21));
    let commit = verify_commitment("id,amount\n1,10\n2,99\n", &create_commitment(SHARD_CSV));

    let attestation = builder.build(&claims, None, Some(commit)).unwrap();
    assert!(attestation.message.contains("commitVerified:False"));
    assert!(AttestationVerifier::new().verify(&attestation, &claims).unwrap().valid);
}
