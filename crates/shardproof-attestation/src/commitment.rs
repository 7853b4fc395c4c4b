//! Commit-reveal checks on training shards.
//!
//! The coordinator publishes `SHA-256(plaintext)` before the shard is
//! revealed; after decryption the worker rehashes what it received and
//! compares. The commitment is unsalted, so it offers no hiding for
//! low-entropy plaintext: anyone can confirm a guessed shard against it.

use serde::{Deserialize, Serialize};

use shardproof_crypto::sha256_hex;

/// Outcome of checking revealed plaintext against a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitVerification {
    #[serde(rename = "match")]
    pub matches: bool,
    pub computed_hash: String,
    pub commit_hash: String,
    /// Always equal to `matches`.
    pub verified: bool,
}

/// Commitment over a plaintext shard.
pub fn create_commitment(plaintext: impl AsRef<[u8]>) -> String {
    sha256_hex(plaintext)
}

/// Hash `plaintext` and compare with `commit_hash` (exact, case-sensitive).
pub fn verify_commitment(plaintext: impl AsRef<[u8]>, commit_hash: &str) -> CommitVerification {
    let computed_hash = sha256_hex(plaintext);
    let matches = computed_hash == commit_hash;
    CommitVerification {
        matches,
        computed_hash,
        commit_hash: commit_hash.to_string(),
        verified: matches,
    }
}
