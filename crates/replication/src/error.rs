//! Replication error types.

use thiserror::Error;

/// Errors returned by replica selection.
///
/// A cluster with too few live nodes is not an error: selection returns a
/// shorter list and [`crate::Placement::is_under_replicated`] reports it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// Replica count, placement group or configuration out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Address translation or topology error from the core library.
    #[error(transparent)]
    Core(#[from] corelib::Error),
}

/// Result type alias for replication.
pub type Result<T> = std::result::Result<T, ReplicationError>;
