//! MRS record structures.
//!
//! MRS archives reuse the PKZIP record layouts: a 30-byte local header
//! before each payload, a 46-byte central header per entry, and a
//! 22-byte end record at the tail. Each record starts with a 4-byte
//! signature that is read and written separately from the packed body;
//! which signature values are valid depends on the archive variant.

mod central;
mod end;
mod local;

pub use central::CentralHeader;
pub use end::EndRecord;
pub use local::LocalHeader;

/// Compression methods used in MRS archives.
///
/// Headers carry the PKZIP method field, but the stored-vs-deflate
/// decision on read goes by size equality; MRS writers stamp 8 even on
/// stored payloads. The field is still validated so foreign methods
/// fail loudly instead of inflating garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression.
    Deflate = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            other => Err(other),
        }
    }
}
