use std::time::Duration;
use thiserror::Error;

/// Error type for the check plugin core and its collaborators
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("invalid threshold range '{spec}': {reason}")]
    InvalidRangeFormat { spec: String, reason: String },

    #[error("invalid measurement '{0}': not a number")]
    InvalidMeasurement(String),

    #[error("{0}")]
    CollectionFailure(String),

    #[error("Client timeout reached: {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for the check plugin
pub type Result<T> = std::result::Result<T, CheckError>;

impl CheckError {
    /// Create an invalid range error for the given threshold text
    pub fn invalid_range<S: Into<String>, R: Into<String>>(spec: S, reason: R) -> Self {
        CheckError::InvalidRangeFormat {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid measurement error
    pub fn invalid_measurement<S: Into<String>>(raw: S) -> Self {
        CheckError::InvalidMeasurement(raw.into())
    }

    /// Create a collection failure error
    pub fn collection<S: Into<String>>(msg: S) -> Self {
        CheckError::CollectionFailure(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CheckError::Config(msg.into())
    }

    pub fn timeout(after: Duration) -> Self {
        CheckError::Timeout(after)
    }
}
