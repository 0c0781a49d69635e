//! Error types for the core library.

use thiserror::Error;

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Argument outside its documented range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Node id is not part of the topology
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    /// Node id appears in more than one slot of the topology
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),
    /// Topology error
    #[error("Topology error: {0}")]
    Topology(String),
}

impl Error {
    /// True for errors caused by caller input rather than topology state.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::UnknownNode(_))
    }
}
