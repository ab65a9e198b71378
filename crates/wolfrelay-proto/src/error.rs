//! Error types for decoding and encoding wire messages.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtoError`].
pub type Result<T, E = ProtoError> = std::result::Result<T, E>;

/// Errors raised while decoding inbound frames or encoding outbound ones.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtoError {
    /// The frame is not valid JSON, or a known message kind is missing a
    /// required field.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object carries neither a `type` nor a `command` field.
    #[error("frame has no `type` field")]
    MissingType,

    /// The `type` field is present but is not a string.
    #[error("`type` field is not a string")]
    InvalidType,
}

impl ProtoError {
    /// Static label used in structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::NotAnObject => "not_an_object",
            Self::MissingType => "missing_type",
            Self::InvalidType => "invalid_type",
        }
    }
}
