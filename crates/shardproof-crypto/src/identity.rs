//! Process-wide worker identity.
//!
//! An [`IdentityStore`] is built once at startup and shared (usually behind
//! an `Arc`) with everything that signs. It owns the private key outright:
//! nothing in its API returns private key bytes, and it is immutable after
//! construction, so concurrent readers need no locking.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use shardproof_core::{IdentityOptions, SignatureScheme};

use crate::error::CryptoError;
use crate::keys::{derive_address, KeyPair, PublicKey};
use crate::secret::{resolve_secret, KeyOrigin, SECRET_KEY_LENGTH};
use crate::signing::{self, Signature};

enum SigningBackend {
    Ed25519(KeyPair),
    /// SHA-256(secret || message). Only reachable through an explicit
    /// `insecure-dev-sha256` configuration.
    InsecureDevDigest(Zeroizing<[u8; SECRET_KEY_LENGTH]>),
}

/// A worker's signing identity: node id, keypair, and derived projections.
pub struct IdentityStore {
    node_id: String,
    backend: SigningBackend,
    public_key: [u8; 32],
    origin: KeyOrigin,
}

impl IdentityStore {
    /// Initialize the identity for `node_id`.
    ///
    /// With a secret, key material is resolved through the base64, hex, raw
    /// decode chain according to `options.key_decoding`. Without one, a fresh
    /// key is generated from OS entropy and lives only as long as the process.
    pub fn initialize(
        node_id: impl Into<String>,
        secret: Option<&str>,
        options: &IdentityOptions,
    ) -> Result<Self, CryptoError> {
        let node_id = node_id.into();

        let (seed, origin) = match secret {
            Some(value) => resolve_secret(value, options.key_decoding)?,
            None => {
                let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
                OsRng.fill_bytes(&mut seed[..]);
                (seed, KeyOrigin::Generated)
            }
        };

        let store = Self::from_parts(node_id, &seed, origin, options.signature_scheme);

        match store.signature_scheme() {
            SignatureScheme::Ed25519 => tracing::info!(
                node_id = %store.node_id,
                address = %store.address(),
                key_origin = %origin,
                "identity initialized"
            ),
            SignatureScheme::InsecureDevSha256 => tracing::warn!(
                node_id = %store.node_id,
                address = %store.address(),
                key_origin = %origin,
                "identity initialized with INSECURE development signatures; attestations are not verifiable"
            ),
        }

        Ok(store)
    }

    /// Build an Ed25519 identity directly from a 32-byte seed.
    pub fn from_seed(node_id: impl Into<String>, seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_parts(node_id.into(), seed, KeyOrigin::Raw, SignatureScheme::Ed25519)
    }

    fn from_parts(
        node_id: String,
        seed: &[u8; SECRET_KEY_LENGTH],
        origin: KeyOrigin,
        scheme: SignatureScheme,
    ) -> Self {
        let (backend, public_key) = match scheme {
            SignatureScheme::Ed25519 => {
                let keypair = KeyPair::from_seed(seed);
                let public_key = *keypair.public_key().as_bytes();
                (SigningBackend::Ed25519(keypair), public_key)
            }
            SignatureScheme::InsecureDevSha256 => {
                let public_key: [u8; 32] = Sha256::digest(seed).into();
                (
                    SigningBackend::InsecureDevDigest(Zeroizing::new(*seed)),
                    public_key,
                )
            }
        };

        Self {
            node_id,
            backend,
            public_key,
            origin,
        }
    }

    /// The node id this identity was initialized for.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Which decoding (or generation) produced the key material.
    pub fn key_origin(&self) -> KeyOrigin {
        self.origin
    }

    pub fn signature_scheme(&self) -> SignatureScheme {
        match self.backend {
            SigningBackend::Ed25519(_) => SignatureScheme::Ed25519,
            SigningBackend::InsecureDevDigest(_) => SignatureScheme::InsecureDevSha256,
        }
    }

    /// Sign exactly `message`. Deterministic: the same bytes always produce
    /// the same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        match &self.backend {
            SigningBackend::Ed25519(keypair) => signing::sign(message, keypair),
            SigningBackend::InsecureDevDigest(secret) => {
                let mut hasher = Sha256::new();
                hasher.update(&secret[..]);
                hasher.update(message);
                Signature::DevDigest(hasher.finalize().into())
            }
        }
    }

    /// Raw public key bytes.
    pub fn public_key_bytes(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Ed25519 verifying key, or `None` under the dev scheme.
    pub fn public_key(&self) -> Option<PublicKey> {
        match &self.backend {
            SigningBackend::Ed25519(keypair) => Some(keypair.public_key()),
            SigningBackend::InsecureDevDigest(_) => None,
        }
    }

    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.public_key)
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Placeholder address, see [`derive_address`].
    pub fn address(&self) -> String {
        derive_address(&self.public_key)
    }
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStore")
            .field("node_id", &self.node_id)
            .field("scheme", &self.signature_scheme())
            .field("public_key", &self.public_key_hex())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
