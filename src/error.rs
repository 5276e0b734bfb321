//! Error types for the tracking pipeline

use thiserror::Error;

/// Errors surfaced by the sensor model, filters, and tracking engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A configuration field is missing or out of range, or the requested
    /// target count exceeds the available trajectories.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// `step` was called before any successful `reset`.
    #[error("tracking engine has not been initialized; call reset first")]
    NotInitialized,

    /// All pre-simulated frames have already been consumed.
    #[error("frame sequence exhausted after {frames} frames")]
    SequenceExhausted {
        /// Number of frames in the run
        frames: usize,
    },

    /// A matrix that must be invertible was singular.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

impl TrackerError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TrackerError::Configuration(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = ::core::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TrackerError::SequenceExhausted { frames: 100 };
        assert_eq!(err.to_string(), "frame sequence exhausted after 100 frames");

        let err = TrackerError::config("num_objects must be positive");
        assert!(err.to_string().contains("num_objects"));
    }
}
