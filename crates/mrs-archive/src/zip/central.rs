//! Central header structure.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Central header body (without signature).
///
/// One record per entry in the central directory, each followed on disk
/// by the entry name, extra field and comment.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralHeader {
    /// Version made by
    pub version: u16,
    /// Version needed to extract
    pub min_version: u16,
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
    /// Comment length
    pub comment_len: u16,
    /// Disk number where the entry starts
    pub disk_start: u16,
    /// Internal file attributes
    pub internal_attrs: u16,
    /// External file attributes
    pub external_attrs: u32,
    /// Offset of the entry's local header
    pub local_header_offset: u32,
}

impl CentralHeader {
    /// On-disk record size including the signature.
    pub const SIZE: usize = 46;

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.name_len as usize + self.extra_len as usize + self.comment_len as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_disk_size() {
        assert_eq!(std::mem::size_of::<CentralHeader>() + 4, CentralHeader::SIZE);
    }
}
