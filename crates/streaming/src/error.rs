//! Serialization error types.

use thiserror::Error;

/// Malformed, truncated or inconsistent bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamingError {
    #[error("truncated input: needed {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported format version {0}")]
    UnsupportedFormat(u16),

    #[error("checksum mismatch: stored {stored:016x}, computed {computed:016x}")]
    ChecksumMismatch { stored: u64, computed: u64 },

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// Well-formed bytes describing an invalid topology.
    #[error("inconsistent topology: {0}")]
    Inconsistent(#[from] corelib::Error),

    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A count does not fit its `u32` length prefix.
    #[error("{field} count {len} exceeds the u32 wire limit")]
    TooLarge { field: &'static str, len: usize },
}

/// Result type alias for codecs.
pub type Result<T> = std::result::Result<T, StreamingError>;
