//! Error types for GAS encoding, decoding and chunk construction.

use std::io;

use thiserror::Error;

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    Truncated { context: &'static str },

    #[error("{field} length {len} exceeds maximum {max}")]
    SizeLimitExceeded {
        field: &'static str,
        len: u128,
        max: usize,
    },

    #[error("chunk nesting depth {depth} exceeds maximum {max}")]
    DepthLimitExceeded { depth: usize, max: usize },

    #[error("varint has more leading zero bytes than any supported value")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u128)")]
    VarintOverflow,

    #[error("unable to allocate {len} bytes for {field}")]
    OutOfMemory { field: &'static str, len: usize },

    #[error("duplicate attribute key {key:?}")]
    DuplicateAttribute { key: Vec<u8> },

    #[error("chunk size {size} is smaller than the {consumed} bytes already read")]
    InconsistentSize { size: usize, consumed: usize },

    #[error("{count} trailing bytes after chunk")]
    TrailingBytes { count: usize },

    #[error("read failed: {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl DecodeError {
    /// Maps an I/O error from a read of `context`, treating EOF as truncation.
    pub(crate) fn from_io(err: io::Error, context: &'static str) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::Truncated { context },
            kind => DecodeError::Io {
                kind,
                message: err.to_string(),
            },
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Error while constructing a chunk in memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("invalid constructor argument: {reason}")]
    InvalidConstructorArgument { reason: String },
}
