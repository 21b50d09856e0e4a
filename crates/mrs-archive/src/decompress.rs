//! DEFLATE helpers.
//!
//! MRS payloads use raw DEFLATE framing (no zlib header). Stored
//! payloads are signalled by equal compressed and uncompressed sizes,
//! not by the compression method field.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::{Error, Result};

/// Inflate a raw DEFLATE stream with a known output size.
pub fn inflate_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);
    DeflateDecoder::new(data)
        .read_to_end(&mut output)
        .map_err(|e| Error::Inflate(e.to_string()))?;
    Ok(output)
}

/// Compress to a raw DEFLATE stream at the default level.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
