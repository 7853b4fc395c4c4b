//! Shardproof Core — Fundamental types, canonical encodings, and errors for
//! training-round attestation.

pub mod canonical;
pub mod config;
pub mod error;
pub mod numeric;
pub mod types;

pub use canonical::to_canonical_json;
pub use config::{AttestationPolicy, IdentityOptions};
pub use error::CoreError;
pub use numeric::{format_decimal, join_decimals, round_to};
pub use types::{HardwareInfo, KeyDecoding, SignatureScheme};
