//! End-of-directory record structure.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// End record body (without signature).
///
/// Located in the last 22 bytes of the archive; points at the central
/// directory. Multi-disk fields are always zero in MRS archives.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EndRecord {
    /// Number of this disk
    pub disk: u16,
    /// Disk where the central directory starts
    pub disk_start: u16,
    /// Number of directory records on this disk
    pub entries_on_disk: u16,
    /// Total number of directory records
    pub entries_total: u16,
    /// Size of the central directory in bytes
    pub dir_size: u32,
    /// Offset of the central directory
    pub dir_offset: u32,
    /// Comment length
    pub comment_len: u16,
}

impl EndRecord {
    /// On-disk record size including the signature.
    pub const SIZE: usize = 22;
}
