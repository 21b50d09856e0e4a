//! Entry metadata.

use crate::dostime::DosTime;
use crate::zip::{CentralHeader, LocalHeader};

/// Metadata for one file entry, as recorded in the central directory
/// (or synthesized by a local-header walk or the recovery scanner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Uncompressed payload size in bytes.
    pub uncompressed_size: u32,
    /// Compressed payload size in bytes.
    pub compressed_size: u32,
    /// Offset of the entry's local header. For recovered entries this
    /// points straight at the payload bytes instead.
    pub local_header_offset: u32,
    /// CRC-32 of the uncompressed payload.
    pub crc32: u32,
    /// Last modification time.
    pub last_modified: DosTime,
    /// Inflate probe distance for entries synthesized by recovery;
    /// `None` for entries read from a directory.
    pub probe_offset: Option<u32>,
}

impl EntryInfo {
    /// Equal sizes mark a stored (uncompressed) payload.
    #[inline]
    pub fn is_stored(&self) -> bool {
        self.compressed_size == self.uncompressed_size
    }

    pub(crate) fn from_central(header: &CentralHeader) -> Self {
        Self {
            uncompressed_size: header.uncompressed_size,
            compressed_size: header.compressed_size,
            local_header_offset: header.local_header_offset,
            crc32: header.crc32,
            last_modified: DosTime::from_raw(header.last_modified),
            probe_offset: None,
        }
    }

    pub(crate) fn from_local(header: &LocalHeader, offset: u32) -> Self {
        Self {
            uncompressed_size: header.uncompressed_size,
            compressed_size: header.compressed_size,
            local_header_offset: offset,
            crc32: header.crc32,
            last_modified: DosTime::from_raw(header.last_modified),
            probe_offset: None,
        }
    }
}
