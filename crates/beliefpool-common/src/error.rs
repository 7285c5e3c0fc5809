//! Error types for BeliefPool
//!
//! Provides a unified error type and the shape/model error variants raised
//! while turning observations into belief samples.

use thiserror::Error;

/// Result type alias using BeliefPoolError
pub type Result<T> = std::result::Result<T, BeliefPoolError>;

/// Unified error type for BeliefPool operations
#[derive(Debug, Error)]
pub enum BeliefPoolError {
    // Vector dimensionality errors
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    // Inference model errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // Buffer read out of range
    #[error("Index {index} out of range for buffer of size {len}")]
    Index { index: usize, len: usize },

    // Base source persistence errors
    #[error("I/O error: {0}")]
    Io(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Operation not offered by this dataset
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // Ingestion worker is no longer accepting work
    #[error("Ingestion worker has stopped")]
    WorkerStopped,

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Vector length mismatches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Distribution params must have length {expected} (2 x state size), got {actual}")]
    ParamLength { expected: usize, actual: usize },

    #[error("Action at step {step} has length {actual}, expected {expected}")]
    ActionLength {
        step: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Non-terminal step {step} has no next observation")]
    MissingNextObservation { step: usize },

    #[error("Dimensions must be non-empty and non-zero: {0:?}")]
    EmptyDims(Vec<usize>),
}

/// Inference model port errors
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Model output shape: {0}")]
    Shape(#[from] ShapeError),

    #[error("Forward pass failed: {0}")]
    Failed(String),
}

/// Coarse classification used when reporting background faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FaultKind {
    Shape,
    ModelUnavailable,
    Model,
    Other,
}

impl BeliefPoolError {
    /// Classify this error for fault reporting
    pub fn kind(&self) -> FaultKind {
        match self {
            BeliefPoolError::Shape(_) | BeliefPoolError::Model(ModelError::Shape(_)) => {
                FaultKind::Shape
            }
            BeliefPoolError::Model(ModelError::Unavailable(_)) => FaultKind::ModelUnavailable,
            BeliefPoolError::Model(_) => FaultKind::Model,
            _ => FaultKind::Other,
        }
    }
}

impl From<serde_json::Error> for BeliefPoolError {
    fn from(err: serde_json::Error) -> Self {
        BeliefPoolError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BeliefPoolError {
    fn from(err: std::io::Error) -> Self {
        BeliefPoolError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BeliefPoolError {
    fn from(err: anyhow::Error) -> Self {
        BeliefPoolError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BeliefPoolError::Index { index: 7, len: 3 };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_param_length_display() {
        let err = ShapeError::ParamLength {
            expected: 8,
            actual: 7,
        };
        assert!(err.to_string().contains("got 7"));
    }

    #[test]
    fn test_fault_kind() {
        let shape: BeliefPoolError = ShapeError::ParamLength {
            expected: 8,
            actual: 7,
        }
        .into();
        assert_eq!(shape.kind(), FaultKind::Shape);

        let nested: BeliefPoolError = ModelError::Shape(ShapeError::LengthMismatch {
            expected: 2,
            actual: 3,
        })
        .into();
        assert_eq!(nested.kind(), FaultKind::Shape);

        let down: BeliefPoolError = ModelError::Unavailable("posterior".into()).into();
        assert_eq!(down.kind(), FaultKind::ModelUnavailable);

        let io: BeliefPoolError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(io.kind(), FaultKind::Other);
    }
}
