//! Worker configuration loading and management.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use shardproof_attestation::{ChaChaSealer, PlaceholderSealer, TransportEncoder};
use shardproof_core::{AttestationPolicy, HardwareInfo, IdentityOptions, KeyDecoding, SignatureScheme};
use shardproof_crypto::secret_env_vars;

/// Full configuration for a worker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkerConfig {
    /// Identity and key material.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Coordinator endpoint for decrypt requests.
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    /// Attestation policy.
    #[serde(default)]
    pub attestation: AttestationPolicy,

    /// Outgoing payload encoding.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Static hardware description. Falls back to [`HardwareInfo::unknown`].
    #[serde(default)]
    pub hardware: Option<HardwareInfo>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Node id this worker signs as.
    #[serde(default = "default_node_id")]
    pub node_id: String,
    /// Secret key material (base64, hex, or raw). When unset the
    /// environment is consulted, then a fresh key is generated.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub key_decoding: KeyDecoding,
    #[serde(default)]
    pub signature_scheme: SignatureScheme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Base URL of the coordinator.
    #[serde(default = "default_coordinator_url")]
    pub url: String,
    /// Upper bound on a decrypt request, in seconds.
    #[serde(default = "default_decrypt_timeout_secs")]
    pub decrypt_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SealerKind {
    #[default]
    #[serde(rename = "placeholder")]
    Placeholder,
    #[serde(rename = "chacha20poly1305")]
    ChaCha20Poly1305,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub sealer: SealerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_node_id() -> String {
    "worker-1".into()
}
fn default_coordinator_url() -> String {
    "http://localhost:3002".into()
}
fn default_decrypt_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            secret: None,
            key_decoding: KeyDecoding::default(),
            signature_scheme: SignatureScheme::default(),
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("node_id", &self.node_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("key_decoding", &self.key_decoding)
            .field("signature_scheme", &self.signature_scheme)
            .finish()
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            url: default_coordinator_url(),
            decrypt_timeout_secs: default_decrypt_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl IdentityConfig {
    pub fn options(&self) -> IdentityOptions {
        IdentityOptions {
            signature_scheme: self.signature_scheme,
            key_decoding: self.key_decoding,
        }
    }

    /// The configured secret, else the first non-empty environment variable.
    pub fn resolve_secret(&self) -> Option<String> {
        self.resolve_secret_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_secret_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(secret) = self.secret.as_ref().filter(|s| !s.is_empty()) {
            return Some(secret.clone());
        }
        secret_env_vars(&self.node_id)
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
    }
}

impl CoordinatorConfig {
    pub fn decrypt_timeout(&self) -> Duration {
        Duration::from_secs(self.decrypt_timeout_secs)
    }
}

impl SealerKind {
    pub fn encoder(&self) -> TransportEncoder {
        match self {
            Self::Placeholder => TransportEncoder::new(Box::new(PlaceholderSealer)),
            Self::ChaCha20Poly1305 => TransportEncoder::new(Box::new(ChaChaSealer)),
        }
    }
}

impl WorkerConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: WorkerConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Hardware record attached to attestations, if the policy includes one.
    pub fn attested_hardware(&self) -> Option<HardwareInfo> {
        if !self.attestation.include_hardware {
            return None;
        }
        Some(self.hardware.clone().unwrap_or_else(HardwareInfo::unknown))
    }
}
