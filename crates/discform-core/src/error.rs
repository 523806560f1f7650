//! Error types for the throw analysis system.
//!
//! Missing or low-confidence keypoints are not errors: they are absorbed by
//! the individual calculations. These variants cover caller contract
//! violations only.

use thiserror::Error;

use crate::types::SessionId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Keypoint count mismatch: expected {expected}, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    #[error("Frame out of order: timestamp {current}s is not after {previous}s")]
    OutOfOrder { previous: f64, current: f64 },

    #[error("Frame timestamp is not a finite number")]
    NonFiniteTimestamp,

    #[error("Frame limit reached: session holds at most {max} frames")]
    FrameLimit { max: usize },

    #[error("Invalid sequence duration: {0}s")]
    InvalidDuration(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown session: {0:?}")]
    UnknownSession(SessionId),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
