pub mod encryption;
pub mod error;
pub mod hashing;
pub mod identity;
pub mod keys;
pub mod secret;
pub mod signing;

pub use encryption::{open, seal, SealedBox};
pub use error::CryptoError;
pub use hashing::{sha256, sha256_hex, Hash};
pub use identity::IdentityStore;
pub use keys::{derive_address, KeyPair, PublicKey};
pub use secret::{resolve_secret, secret_env_vars, DecodeStrategy, KeyOrigin, SECRET_KEY_LENGTH};
pub use signing::{sign, verify, verify_with_key_bytes, Signature};
