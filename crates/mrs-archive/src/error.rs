//! Error types for the archive engine.

use thiserror::Error;

use crate::variant::Variant;

/// Errors that can occur when working with MRS archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] mrs_common::Error),

    /// The first bytes match no known variant.
    #[error("unrecognized archive signature: {0:#010x}")]
    UnknownVariant(u32),

    /// A record signature does not match the variant's accepted set.
    #[error("invalid signature: expected {expected:#010x}, got {actual:#010x}")]
    BadSignature { expected: u32, actual: u32 },

    /// The archive ends before a record or payload it promises.
    #[error("truncated archive: {0}")]
    TruncatedArchive(&'static str),

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Malformed DEFLATE stream.
    #[error("inflate error: {0}")]
    Inflate(String),

    /// Decompressed payload does not match its recorded checksum.
    #[error("CRC-32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Packed DOS date/time with out-of-range fields.
    #[error("invalid DOS date/time: {0:#010x}")]
    InvalidDate(u32),

    /// An entry path would extract outside the destination root.
    #[error("extraction path escapes destination: {0}")]
    PathTraversal(String),

    /// No such entry in the archive.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// The writer cannot produce this variant.
    #[error("cannot write {0} archives")]
    UnwritableVariant(Variant),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
