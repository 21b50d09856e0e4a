//! Forensic recovery scanner for damaged archives.
//!
//! When the end record or central directory is unusable, most archives
//! still hold intact DEFLATE streams between their local-header magics.
//! The scanner collects every occurrence of the leading signature,
//! probes each between-signature segment with raw inflate at every
//! starting offset, and synthesizes entries for the streams that
//! decompress cleanly.

use flate2::{Decompress, FlushDecompress, Status};
use mrs_common::memchr::memmem;
use mrs_common::{crc, BinaryReader};

use crate::dostime::DosTime;
use crate::entry::EntryInfo;
use crate::trie::MrsTree;
use crate::zip::{EndRecord, LocalHeader};
use crate::{Error, Result};

/// Scratch buffer size for each segment probe.
const SCRATCH_SIZE: usize = 16 * 1024 * 1024;

/// Known payload magics, matched against the first 8 little-endian
/// bytes of an inflated stream to pick an extension for the synthetic
/// entry name.
const FILE_MAGICS: &[(u64, &str)] = &[
    (0x20000, ".tga"),
    (0x107f060, ".elu"),
    (0x2_3584_9298, ".rs.bsp"),
    (0x5050_178f, ".rs.col"),
    (0x3_3067_1804, ".rs.lm"),
    (0xe11a_b1a1_e011_cfd0, "_thumbs.db"),
    (0x464a_1000_e0ff_d8ff, ".jpg"),
    (0x0a1a_0a0d_474e_5089, ".png"),
    (0x7c_2053_4444, ".dds"),
];

/// Best-effort reconstruction over a mapped damaged archive.
pub struct RecoveryScanner<'a> {
    data: &'a [u8],
    mtime: DosTime,
}

struct ProbeHit {
    offset: usize,
    total_in: u64,
    total_out: u64,
    crc: u32,
    magic: Option<u64>,
}

impl<'a> RecoveryScanner<'a> {
    /// Borrow the mapped file. `mtime` stamps synthesized entries,
    /// since no directory survives to provide real timestamps.
    pub fn new(data: &'a [u8], mtime: DosTime) -> Self {
        Self { data, mtime }
    }

    /// Scan and synthesize a tree of recovered entries.
    ///
    /// Individual segments that yield nothing are silently dropped;
    /// the scan only fails when no signature occurrence exists at all.
    pub fn scan(&self) -> Result<MrsTree> {
        if self.data.len() < EndRecord::SIZE + 4 {
            return Err(Error::TruncatedArchive("too short to scan"));
        }

        // Whatever starts the file is taken as the recurring
        // local-header marker; recovery does not assume a variant.
        let reference: [u8; 4] = [self.data[0], self.data[1], self.data[2], self.data[3]];
        let scan_limit = self.data.len() - EndRecord::SIZE;
        let positions: Vec<usize> =
            memmem::find_iter(&self.data[..scan_limit], &reference).collect();
        if positions.is_empty() {
            return Err(Error::TruncatedArchive("no local header signatures found"));
        }

        let mut tree = MrsTree::new();
        for (index, &pos) in positions.iter().enumerate() {
            let segment_end = positions.get(index + 1).copied().unwrap_or(scan_limit);
            let segment_len = segment_end - pos;
            let start = pos + LocalHeader::SIZE;
            if start >= self.data.len() {
                continue;
            }
            let end = (start + segment_len).min(self.data.len());
            let segment = &self.data[start..end];
            if segment.len() < 2 {
                continue;
            }

            let Some(hit) = probe_segment(segment) else {
                continue;
            };

            let mut name = format!("file_{index}");
            if let Some(ext) = hit.magic.and_then(extension_for) {
                name.push_str(ext);
            }
            let entry = EntryInfo {
                uncompressed_size: hit.total_out as u32,
                compressed_size: hit.total_in as u32,
                local_header_offset: (start + hit.offset) as u32,
                crc32: hit.crc,
                last_modified: self.mtime,
                probe_offset: Some(hit.offset as u32),
            };
            tree.insert(&name, Some(entry));
        }

        Ok(tree)
    }
}

/// Try raw inflate at every starting offset of a segment.
///
/// A hit needs a clean stream end, output at least as long as the
/// input, and a nonzero CRC; all-zero output is a classic false
/// positive of garbage input.
fn probe_segment(segment: &[u8]) -> Option<ProbeHit> {
    let mut scratch = vec![0u8; SCRATCH_SIZE];
    for offset in 0..segment.len() - 1 {
        let mut inflater = Decompress::new(false);
        let status = match inflater.decompress(
            &segment[offset..],
            &mut scratch,
            FlushDecompress::Finish,
        ) {
            Ok(status) => status,
            Err(_) => continue,
        };
        if status != Status::StreamEnd {
            continue;
        }

        let (total_in, total_out) = (inflater.total_in(), inflater.total_out());
        if total_in > total_out {
            continue;
        }
        let inflated = &scratch[..total_out as usize];
        let crc = crc::hash_bytes(inflated);
        if crc == 0 {
            continue;
        }

        return Some(ProbeHit {
            offset,
            total_in,
            total_out,
            crc,
            magic: BinaryReader::new(inflated).read_u64().ok(),
        });
    }
    None
}

fn extension_for(magic: u64) -> Option<&'static str> {
    FILE_MAGICS
        .iter()
        .find(|(value, _)| *value == magic)
        .map(|(_, ext)| *ext)
}
