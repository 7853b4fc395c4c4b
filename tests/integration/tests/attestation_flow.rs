//! Integration test: identity, attestation building, and verification
//! across shardproof-crypto and shardproof-attestation.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use shardproof_attestation::{
    delta_weights_hash, AttestationBuilder, AttestationVerifier, AuditEvent, ChaChaSealer,
    ReplayProof, TrainingClaims, TransportEncoder, WorkerUpdate,
};
use shardproof_core::{IdentityOptions, KeyDecoding, SignatureScheme};
use shardproof_crypto::{sha256_hex, IdentityStore, KeyOrigin};
use shardproof_integration_tests::{identity, sample_hardware, worker_one_claims};

// =========================================================================
// Worker-1 round
// =========================================================================

#[test]
fn test_worker_one_attestation_verifies() {
    let claims = worker_one_claims();
    let builder = AttestationBuilder::new(identity("worker-1", 11));

    let attestation = builder
        .build(&claims, Some(sample_hardware()), None)
        .unwrap();

    assert_eq!(attestation.loss_history_hash, sha256_hex("0.82,0.71,0.65"));
    assert_eq!(attestation.address, builder.identity().address());

    let result = AttestationVerifier::new().verify(&attestation, &claims).unwrap();
    assert!(result.valid, "failed checks: {:?}", result.failures());
}

#[test]
fn test_mutating_any_attested_field_fails() {
    let claims = worker_one_claims();
    let attestation = AttestationBuilder::new(identity("worker-1", 11))
        .build(&claims, Some(sample_hardware()), None)
        .unwrap();
    let verifier = AttestationVerifier::new();

    let mutations: Vec<(&str, Box<dyn Fn(&mut TrainingClaims)>)> = vec![
        ("nodeId", Box::new(|c: &mut TrainingClaims| c.node_id = "worker-2".into())),
        ("weightsHash", Box::new(|c: &mut TrainingClaims| c.weights_hash = "00".repeat(32))),
        ("lossHistory", Box::new(|c: &mut TrainingClaims| c.loss_history[1] = 0.7)),
        ("startedAt", Box::new(|c: &mut TrainingClaims| c.started_at.push('1'))),
        ("finishedAt", Box::new(|c: &mut TrainingClaims| c.finished_at.push('1'))),
        ("globalModelHash", Box::new(|c: &mut TrainingClaims| c.global_model_hash = "global-model-v4".into())),
        ("numSamples", Box::new(|c: &mut TrainingClaims| c.num_samples += 1)),
        ("epochCount", Box::new(|c: &mut TrainingClaims| c.epoch_count += 1)),
        ("randomSeed", Box::new(|c: &mut TrainingClaims| c.random_seed = 1338)),
    ];

    for (field, mutate) in mutations {
        let mut tampered = claims.clone();
        mutate(&mut tampered);
        let result = verifier.verify(&attestation, &tampered).unwrap();
        assert!(!result.valid, "mutating {} should fail verification", field);
        assert!(
            result.failures().contains(&"signature_valid"),
            "mutating {} should break the signature",
            field
        );
    }
}

#[test]
fn test_mutating_hardware_fails() {
    let claims = worker_one_claims();
    let mut attestation = AttestationBuilder::new(identity("worker-1", 11))
        .build(&claims, Some(sample_hardware()), None)
        .unwrap();

    if let Some(hw) = attestation.hardware_info.as_mut() {
        hw.memory_gb = 64.0;
    }
    let result = AttestationVerifier::new().verify(&attestation, &claims).unwrap();
    assert!(!result.valid);
    assert!(result.failures().contains(&"message_reconstructed"));
}

#[test]
fn test_hardware_omission_changes_message_and_signature() {
    let claims = worker_one_claims();
    let builder = AttestationBuilder::new(identity("worker-1", 11));

    let with_hw = builder.build(&claims, Some(sample_hardware()), None).unwrap();
    let without_hw = builder.build(&claims, None, None).unwrap();

    assert_ne!(with_hw.message, without_hw.message);
    assert_ne!(with_hw.signature, without_hw.signature);
    assert!(without_hw.hardware_info.is_none());

    let verifier = AttestationVerifier::new();
    assert!(verifier.verify(&with_hw, &claims).unwrap().valid);
    assert!(verifier.verify(&without_hw, &claims).unwrap().valid);

    // Stripping the hardware record after signing is detected.
    let mut stripped = with_hw.clone();
    stripped.hardware_info = None;
    assert!(!verifier.verify(&stripped, &claims).unwrap().valid);
}

#[test]
fn test_attestation_json_roundtrip_still_verifies() {
    let claims = worker_one_claims();
    let attestation = AttestationBuilder::new(identity("worker-1", 11))
        .build(&claims, Some(sample_hardware()), None)
        .unwrap();

    let json = serde_json::to_string(&attestation).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["publicKey"], value["signerPubKey"]);
    assert!(value["address"].as_str().unwrap().starts_with("0x"));

    let decoded = serde_json::from_str(&json).unwrap();
    assert!(AttestationVerifier::new().verify(&decoded, &claims).unwrap().valid);
}

// =========================================================================
// Identity
// =========================================================================

#[test]
fn test_ambiguous_secret_decoding_priority() {
    // 64 hex characters are valid base64 too; the decodings differ.
    let seed = [0x5au8; 32];
    let value = hex::encode(seed);

    let defaults = IdentityOptions::default();
    let store = IdentityStore::initialize("worker-1", Some(&value), &defaults).unwrap();
    assert_eq!(store.key_origin(), KeyOrigin::Base64);
    assert_eq!(
        store.public_key_bytes(),
        IdentityStore::from_seed("worker-1", &fit(&STANDARD.decode(&value).unwrap()))
            .public_key_bytes()
    );

    let strict = IdentityOptions {
        signature_scheme: SignatureScheme::Ed25519,
        key_decoding: KeyDecoding::Strict,
    };
    let store = IdentityStore::initialize("worker-1", Some(&value), &strict).unwrap();
    assert_eq!(store.key_origin(), KeyOrigin::Hex);
    assert_eq!(
        store.public_key_bytes(),
        IdentityStore::from_seed("worker-1", &seed).public_key_bytes()
    );

    let b64 = STANDARD.encode(seed);
    let store = IdentityStore::initialize("worker-1", Some(&b64), &defaults).unwrap();
    assert_eq!(store.key_origin(), KeyOrigin::Base64);
}

fn fit(bytes: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    let len = bytes.len().min(32);
    key[..len].copy_from_slice(&bytes[..len]);
    key
}

#[test]
fn test_address_determinism() {
    let a1 = identity("worker-1", 1);
    let a2 = identity("worker-1", 1);
    let b = identity("worker-1", 2);
    assert_eq!(a1.address(), a2.address());
    assert_ne!(a1.address(), b.address());
    assert_eq!(a1.address(), format!("0x{}", a1.public_key_hex()));
}

#[test]
fn test_pinned_key_rejects_other_signer() {
    let claims = worker_one_claims();
    let honest = identity("worker-1", 11);
    let impostor = identity("worker-1", 12);

    let mut verifier = AttestationVerifier::new();
    verifier.pin_key("worker-1", honest.public_key_base64());

    let good = AttestationBuilder::new(honest).build(&claims, None, None).unwrap();
    let forged = AttestationBuilder::new(impostor).build(&claims, None, None).unwrap();

    assert!(verifier.verify(&good, &claims).unwrap().valid);
    let result = verifier.verify(&forged, &claims).unwrap();
    assert_eq!(result.failures(), vec!["signer_pinned"]);
}

#[test]
fn test_insecure_dev_signatures_never_verify() {
    let options = IdentityOptions {
        signature_scheme: SignatureScheme::InsecureDevSha256,
        key_decoding: KeyDecoding::Strict,
    };
    let store = Arc::new(IdentityStore::initialize("worker-1", None, &options).unwrap());
    let claims = worker_one_claims();
    let attestation = AttestationBuilder::new(store).build(&claims, None, None).unwrap();

    assert_eq!(attestation.signature_scheme, SignatureScheme::InsecureDevSha256);
    let result = AttestationVerifier::new().verify(&attestation, &claims).unwrap();
    assert!(!result.valid);
    assert_eq!(result.failures(), vec!["signature_valid"]);
}

// =========================================================================
// Full worker update
// =========================================================================

#[test]
fn test_sealed_worker_update_opens_and_verifies() {
    let claims = worker_one_claims();
    let attestation = AttestationBuilder::new(identity("worker-1", 11))
        .build(&claims, Some(sample_hardware()), None)
        .unwrap();
    let update = WorkerUpdate {
        node_id: claims.node_id.clone(),
        address: attestation.address.clone(),
        num_samples: claims.num_samples,
        delta_weights_hash: delta_weights_hash(&claims.weights_hash),
        weights_hash: claims.weights_hash.clone(),
        loss_history: claims.loss_history.clone(),
        started_at: claims.started_at.clone(),
        finished_at: claims.finished_at.clone(),
        global_model_hash: claims.global_model_hash.clone(),
        epoch_count: claims.epoch_count,
        random_seed: claims.random_seed,
        replay_proof: ReplayProof::generate(&claims.loss_history, claims.random_seed, 5_000_000),
        attestation,
        audit_trace: vec![AuditEvent::new("training_complete", "round-1", &claims.finished_at)],
    };

    let encoder = TransportEncoder::new(Box::new(ChaChaSealer));
    let sealed = encoder.encode(&update, Some("round-session-key")).unwrap();
    assert!(sealed.encrypted);
    assert_eq!(sealed.encryption.as_deref(), Some("chacha20poly1305"));

    let opened = ChaChaSealer.open(&sealed.data, "round-session-key").unwrap();
    let received: WorkerUpdate = serde_json::from_str(&opened).unwrap();
    assert_eq!(received, update);

    let result = received.verify(&AttestationVerifier::new()).unwrap();
    assert!(result.valid, "failed checks: {:?}", result.failures());
    assert!(ChaChaSealer.open(&sealed.data, "wrong-key").is_err());
}
