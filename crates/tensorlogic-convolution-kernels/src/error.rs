//! Error types for tensorlogic-convolution-kernels.

use thiserror::Error;

/// Errors that can occur in kernel operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Invalid kernel parameter
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// A node id does not fit in a bounded delta cache
    #[error("Node id {id} exceeds delta cache capacity {capacity}")]
    CapacityExceeded { id: usize, capacity: usize },

    /// The example carries no representation under the requested identifier
    #[error("Representation '{identifier}' not found on example")]
    MissingRepresentation { identifier: String },

    /// The representation exists but is of the wrong kind for the kernel
    #[error("Representation '{identifier}' is a {found} representation, expected {expected}")]
    RepresentationMismatch {
        identifier: String,
        expected: String,
        found: String,
    },

    /// Textual tree or sequence input could not be parsed
    #[error("Malformed input at byte {offset}: {reason}")]
    MalformedInput { offset: usize, reason: String },

    /// Kernel computation failed
    #[error("Kernel computation error: {0}")]
    ComputationError(String),

    /// Kernel specification could not be decoded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for KernelError {
    fn from(err: toml::de::Error) -> Self {
        KernelError::Config(err.to_string())
    }
}

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;
