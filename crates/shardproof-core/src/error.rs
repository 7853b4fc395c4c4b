/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("canonical encoding produced invalid UTF-8")]
    InvalidUtf8,
}
