//! Error types for gamepack codecs

use std::io;
use thiserror::Error;

/// Main error type for compression and decompression calls
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Magic bytes or stream structure do not match the requested format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Source ran out before the declared output was produced
    #[error("Truncated stream: needed {needed} more byte(s) at offset {offset:#X}")]
    TruncatedStream { offset: usize, needed: usize },

    /// A code would produce more bytes than the header declares
    #[error("Oversized output: declared {declared} bytes, stream produces at least {attempted}")]
    OversizedOutput { declared: usize, attempted: usize },

    /// Source length cannot be represented in the format header
    #[error("Source too large: {size} bytes exceeds the format limit of {limit} bytes")]
    SourceTooLarge { size: usize, limit: usize },

    /// Reading the input into memory failed
    #[error("Unreadable source: {0}")]
    UnreadableSource(#[from] io::Error),

    /// Format name not recognised
    #[error("Unknown compression format: {0:?}")]
    UnknownFormat(String),
}

/// Result type alias for gamepack operations
pub type Result<T> = std::result::Result<T, CompressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompressionError::UnknownFormat("lz99".to_string());
        assert_eq!(err.to_string(), "Unknown compression format: \"lz99\"");
    }

    #[test]
    fn test_truncated_display() {
        let err = CompressionError::TruncatedStream {
            offset: 0x20,
            needed: 2,
        };
        assert!(err.to_string().contains("0x20"));
        assert!(err.to_string().contains("2 more"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "pipe closed");
        let err: CompressionError = io_err.into();
        assert!(matches!(err, CompressionError::UnreadableSource(_)));
    }
}
