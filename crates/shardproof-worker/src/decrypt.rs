//! Client for the coordinator's decrypt endpoint.
//!
//! Error values never carry the session key, the encrypted payload, or the
//! decrypted plaintext. Response bodies are not echoed into errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Failure talking to the decrypt collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("decrypt request timed out after {0:?}")]
    Timeout(Duration),

    #[error("decrypt request failed: {0}")]
    Transport(String),

    #[error("coordinator rejected decrypt request with HTTP {0}")]
    Status(u16),

    #[error("malformed decrypt response: {0}")]
    MalformedBody(String),
}

/// Body of `POST /api/decrypt`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    pub encrypted_data: String,
    pub session_key: String,
    pub tx_bytes: Option<String>,
    pub user_address: Option<String>,
}

impl fmt::Debug for DecryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptRequest")
            .field("encrypted_data_len", &self.encrypted_data.len())
            .field("session_key", &"<redacted>")
            .field("has_tx_bytes", &self.tx_bytes.is_some())
            .field("user_address", &self.user_address)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptResponse {
    decrypted_data: String,
}

/// Something that can turn an encrypted shard into plaintext.
#[async_trait]
pub trait DecryptCollaborator: Send + Sync {
    async fn decrypt(&self, request: &DecryptRequest) -> Result<String, DecryptError>;
}

/// Decrypts through the coordinator's HTTP API.
pub struct HttpDecryptClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDecryptClient {
    /// Create a client for the coordinator at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DecryptError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DecryptError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: format!("{}/api/decrypt", base_url.trim_end_matches('/')),
            client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_reqwest(&self, e: reqwest::Error) -> DecryptError {
        if e.is_timeout() {
            DecryptError::Timeout(self.timeout)
        } else {
            DecryptError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl DecryptCollaborator for HttpDecryptClient {
    async fn decrypt(&self, request: &DecryptRequest) -> Result<String, DecryptError> {
        tracing::debug!(endpoint = %self.endpoint, ?request, "requesting shard decryption");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DecryptError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(|e| self.map_reqwest(e))?;
        let parsed: DecryptResponse = serde_json::from_slice(&body).map_err(|e| {
            DecryptError::MalformedBody(format!(
                "{:?} error at line {} column {}",
                e.classify(),
                e.line(),
                e.column()
            ))
        })?;

        Ok(parsed.decrypted_data)
    }
}
