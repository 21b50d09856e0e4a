//! CRC-32 hashing utilities.
//!
//! MRS archives checksum entry payloads with the zlib CRC-32
//! (polynomial 0x04C11DB7, reflected), the same digest PKZIP uses.

/// Compute the CRC-32 of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Continue a previous CRC-32 computation.
#[inline]
pub fn hash_bytes_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(data);
    hasher.finalize()
}
