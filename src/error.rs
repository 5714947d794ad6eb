//! Error type shared by the coordinate index, the router and the statistics harness.

use crate::coordinates::NodeId;
use thiserror::Error;

/// Errors raised by landmark addressing and random-walk routing
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Landmark index already initialized")]
    AlreadyInitialized,

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Unknown landmark: {0}")]
    UnknownLandmark(NodeId),

    /// Every candidate weight collapsed to zero (or the weights were unusable).
    #[error("Degenerate walk weights")]
    DegenerateWeights,

    #[error("No path from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("Need at least {required} nodes, topology has {available}")]
    InsufficientNodes { required: usize, available: usize },

    /// The walker reached a node without neighbours.
    #[error("Node {0} has no neighbours")]
    IsolatedNode(NodeId),

    #[error("Walk exceeded {max_hops} hops")]
    HopLimitExceeded { max_hops: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LandmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LandmarkError::UnknownNode(NodeId::new("3,1"));
        assert_eq!(err.to_string(), "Unknown node: 3,1");

        let err = LandmarkError::InsufficientNodes {
            required: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Need at least 2 nodes, topology has 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LandmarkError = io.into();
        assert!(matches!(err, LandmarkError::Io(_)));
    }
}
