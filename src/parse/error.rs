use thiserror::Error;

/// Errors produced when reading serialized rule metadata.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed rule metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid operator token '{token}'")]
    Operator { token: String },
}
