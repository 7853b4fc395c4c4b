//! Integration test: replay proofs generated for one round and checked by an
//! independent party from the published loss history.

use shardproof_attestation::{
    gradient_norm_hash, loss_hash, ChallengeSource, FixedChallenge, OsChallengeSource,
    ReplayCheck, ReplayProof, CHALLENGE_SEED_MAX, CHALLENGE_SEED_MIN,
};
use shardproof_integration_tests::worker_one_claims;

const CHALLENGE: u64 = 4_242_424;

#[test]
fn test_known_epoch_hashes() {
    // Hash inputs: "epoch:0:loss:0.82:seed:1337:challenge:4242424" and
    // "epoch:0:grad_norm:1.2048192771084338:seed:1337:challenge:4242424".
    assert_eq!(
        loss_hash(0, 0.82, 1337, CHALLENGE),
        "6678f464aba4d1841f36f3bbd6a69785bf404eb67f0d7cde834cda16a107080c"
    );
    assert_eq!(
        gradient_norm_hash(0, 0.82, 1337, CHALLENGE),
        "3bf332d6da33f093532f4892aa10ba0656d4d4fb37ef26abde79d99dcb68a07c"
    );
}

#[test]
fn test_proof_is_deterministic() {
    let claims = worker_one_claims();
    let a = ReplayProof::generate(&claims.loss_history, claims.random_seed, CHALLENGE);
    let b = ReplayProof::generate_with(
        &claims.loss_history,
        claims.random_seed,
        &FixedChallenge(CHALLENGE),
    );
    assert_eq!(a, b);
    assert_eq!(a.epoch_count(), 3);
    assert!(a
        .epoch_loss_hashes
        .iter()
        .chain(&a.epoch_gradient_norm_hashes)
        .all(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit())));
}

#[test]
fn test_independent_party_recomputes_from_published_json() {
    let claims = worker_one_claims();
    let proof = ReplayProof::generate_with(
        &claims.loss_history,
        claims.random_seed,
        &OsChallengeSource,
    );

    let published = serde_json::to_string(&proof).unwrap();
    let received: ReplayProof = serde_json::from_str(&published).unwrap();

    assert_eq!(
        received.verify(&claims.loss_history, claims.random_seed),
        ReplayCheck::Valid
    );
}

#[test]
fn test_proof_bound_to_its_challenge() {
    let claims = worker_one_claims();
    let first = ReplayProof::generate(&claims.loss_history, claims.random_seed, CHALLENGE);
    let second = ReplayProof::generate(&claims.loss_history, claims.random_seed, CHALLENGE + 1);

    // Same results, different rounds: no hash is shared.
    for (a, b) in first.epoch_loss_hashes.iter().zip(&second.epoch_loss_hashes) {
        assert_ne!(a, b);
    }

    // Presenting one round's hashes under another round's challenge fails.
    let mut reused = first.clone();
    reused.challenge_seed = second.challenge_seed;
    assert_eq!(
        reused.verify(&claims.loss_history, claims.random_seed),
        ReplayCheck::LossMismatch { epoch: 0 }
    );
}

#[test]
fn test_changed_loss_or_seed_detected() {
    let claims = worker_one_claims();
    let proof = ReplayProof::generate(&claims.loss_history, claims.random_seed, CHALLENGE);

    let mut losses = claims.loss_history.clone();
    losses[2] = 0.64;
    assert_eq!(
        proof.verify(&losses, claims.random_seed),
        ReplayCheck::LossMismatch { epoch: 2 }
    );

    assert!(!proof.verify(&claims.loss_history, 1338).is_valid());

    assert_eq!(
        proof.verify(&claims.loss_history[..2], claims.random_seed),
        ReplayCheck::LengthMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_loss_rounding_hides_sub_precision_noise() {
    // Losses are rounded to 4 places before hashing; the gradient proxy is not.
    let a = ReplayProof::generate(&[0.123_456], 7, CHALLENGE);
    let b = ReplayProof::generate(&[0.123_501], 7, CHALLENGE);
    assert_eq!(a.epoch_loss_hashes, b.epoch_loss_hashes);
    assert_ne!(a.epoch_gradient_norm_hashes, b.epoch_gradient_norm_hashes);
    assert_eq!(
        b.verify(&[0.123_456], 7),
        ReplayCheck::GradientNormMismatch { epoch: 0 }
    );
}

#[test]
fn test_empty_history() {
    let proof = ReplayProof::generate(&[], 1, CHALLENGE);
    assert_eq!(proof.epoch_count(), 0);
    assert!(proof.verify(&[], 1).is_valid());
}

#[test]
fn test_challenge_range() {
    for _ in 0..256 {
        let c = OsChallengeSource.draw();
        assert!((CHALLENGE_SEED_MIN..=CHALLENGE_SEED_MAX).contains(&c));
    }
}
