//! Local header structure.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::CentralHeader;

/// Local header body (without signature).
///
/// Precedes each entry's name, extra field and payload. The 4-byte
/// signature is handled separately because its valid values are
/// variant-specific.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalHeader {
    /// Version made by
    pub version: u16,
    /// General purpose bit flag
    pub flags: u16,
    /// Compression method
    pub compression: u16,
    /// Last modification time and date (DOS format)
    pub last_modified: u32,
    /// CRC-32 of uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub name_len: u16,
    /// Extra field length
    pub extra_len: u16,
}

impl LocalHeader {
    /// Signature written for every local header, regardless of variant.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// On-disk record size including the signature.
    pub const SIZE: usize = 30;

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.name_len as usize + self.extra_len as usize
    }

    /// Derive a local header from the matching central header fields.
    pub fn from_central(central: &CentralHeader) -> Self {
        Self {
            version: central.version,
            flags: central.flags,
            compression: central.compression,
            last_modified: central.last_modified,
            crc32: central.crc32,
            compressed_size: central.compressed_size,
            uncompressed_size: central.uncompressed_size,
            name_len: central.name_len,
            extra_len: central.extra_len,
        }
    }
}
