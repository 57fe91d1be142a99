//! Codec error types.

use rustfeign_model::{EncodeError, FeignError};

/// Failures raised by the codecs in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON (de)serialisation failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded document does not have the declared shape.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// The declared return type.
        expected: String,
        /// What the document held.
        found: String,
    },

    /// An `http` request or response could not be built.
    #[error("http error: {0}")]
    Http(#[from] http::Error),
}

impl From<CodecError> for EncodeError {
    fn from(err: CodecError) -> Self {
        EncodeError::wrap(err)
    }
}

impl From<CodecError> for FeignError {
    fn from(err: CodecError) -> Self {
        FeignError::Decode(Box::new(err))
    }
}
