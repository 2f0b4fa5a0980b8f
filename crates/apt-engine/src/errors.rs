//! Matching engine error types.

use apt_core::PersonalityError;
use apt_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors from matching engine operations.
///
/// Degenerate (zero) vectors are not errors; they score `0.0` against
/// everything.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The code is not one of the 16 personality types.
    #[error("invalid personality type: {0:?}")]
    InvalidType(String),

    /// Two vectors that must share a dimension do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the operation.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },

    /// An action references content with no known vector.
    #[error("no content vector for {content_id:?}")]
    MissingContentVector {
        /// The content id that could not be resolved.
        content_id: String,
    },

    /// The embedding gateway failed.
    #[error("embedding service error: {0}")]
    EmbeddingService(#[from] EmbeddingError),
}

impl From<PersonalityError> for EngineError {
    fn from(err: PersonalityError) -> Self {
        match err {
            PersonalityError::InvalidType(code) => Self::InvalidType(code),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fail with [`EngineError::DimensionMismatch`] unless `actual == expected`.
pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::DimensionMismatch { expected, actual })
    }
}
