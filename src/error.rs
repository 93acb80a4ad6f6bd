//! Error types for the MSM calldata builder

use thiserror::Error;

/// Errors surfaced by [`crate::build`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MsmError {
    #[error("Shape mismatch: {points} points for {scalars} scalars")]
    ShapeMismatch { points: usize, scalars: usize },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Unsupported curve id: {0}")]
    UnsupportedCurve(usize),

    #[error("Curve registry not initialized, call init() first")]
    NotInitialized,

    #[error("Initialization failed: {0}")]
    InitializationError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

pub type Result<T> = std::result::Result<T, MsmError>;

impl From<serde_json::Error> for MsmError {
    fn from(e: serde_json::Error) -> Self {
        MsmError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for MsmError {
    fn from(e: bincode::Error) -> Self {
        MsmError::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for MsmError {
    fn from(e: base64::DecodeError) -> Self {
        MsmError::Serialization(e.to_string())
    }
}
