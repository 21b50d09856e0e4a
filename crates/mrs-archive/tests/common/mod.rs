//! Shared helpers that build MRS archives byte by byte, independently
//! of the crate's own writer.
#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use flate2::write::DeflateEncoder;
use flate2::Compression;
use mrs_archive::Variant;

/// 2004-06-28 17:46:24 as a packed DOS date/time.
pub const TEST_MTIME: u32 = 0x30dc_8dcc;

pub struct TestEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub stored: bool,
}

/// An entry whose payload is deflated.
pub fn file<'a>(name: &'a str, data: &'a [u8]) -> TestEntry<'a> {
    TestEntry {
        name,
        data,
        stored: false,
    }
}

/// An entry whose payload is written raw, with equal sizes.
pub fn stored<'a>(name: &'a str, data: &'a [u8]) -> TestEntry<'a> {
    TestEntry {
        name,
        data,
        stored: true,
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Local header signature a genuine archive of this variant starts
/// with, so the probing ladder recognizes the built file.
fn local_signature(variant: Variant) -> u32 {
    match variant {
        Variant::Mrs1 => 0x8584_0000,
        Variant::Mrs3 => 0x0201_4b50,
        _ => 0x0403_4b50,
    }
}

fn central_signature(variant: Variant) -> u32 {
    match variant {
        Variant::Mrs1 => 0x0502_4b80,
        _ => 0x0201_4b50,
    }
}

fn end_signature(variant: Variant) -> u32 {
    match variant {
        Variant::Mrs1 => 0xdd59_fc12,
        _ => 0x0503_0208,
    }
}

/// Build a complete archive image for the variant.
pub fn build_archive(variant: Variant, entries: &[TestEntry<'_>]) -> Vec<u8> {
    let obf = variant.obfuscation();
    let mut out = Vec::new();
    let mut centrals: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();

    for entry in entries {
        let payload = if entry.stored {
            entry.data.to_vec()
        } else {
            deflate(entry.data)
        };
        let crc = crc32fast::hash(entry.data);
        let offset = out.len() as u32;

        let mut record = Vec::new();
        record.extend_from_slice(&local_signature(variant).to_le_bytes());
        record.extend_from_slice(&20u16.to_le_bytes()); // version
        record.extend_from_slice(&0u16.to_le_bytes()); // flags
        record.extend_from_slice(&8u16.to_le_bytes()); // compression
        record.extend_from_slice(&TEST_MTIME.to_le_bytes());
        record.extend_from_slice(&crc.to_le_bytes());
        record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        record.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
        record.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        record.extend_from_slice(&0u16.to_le_bytes()); // extra
        obf.obfuscate(&mut record);
        out.extend_from_slice(&record);

        let mut name_bytes = entry.name.as_bytes().to_vec();
        obf.obfuscate(&mut name_bytes);
        out.extend_from_slice(&name_bytes);

        out.extend_from_slice(&payload);

        let mut central = Vec::new();
        central.extend_from_slice(&central_signature(variant).to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes()); // version
        central.extend_from_slice(&20u16.to_le_bytes()); // min version
        central.extend_from_slice(&0u16.to_le_bytes()); // flags
        central.extend_from_slice(&8u16.to_le_bytes()); // compression
        central.extend_from_slice(&TEST_MTIME.to_le_bytes());
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        central.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes()); // extra
        central.extend_from_slice(&0u16.to_le_bytes()); // comment
        central.extend_from_slice(&0u16.to_le_bytes()); // disk start
        central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        central.extend_from_slice(&offset.to_le_bytes());
        centrals.push((central, entry.name.as_bytes().to_vec()));
    }

    let dir_offset = out.len() as u32;
    for (central, name) in centrals {
        // Records and names scramble as separate spans, matching how
        // the reader recovers them.
        let mut record = central;
        obf.obfuscate(&mut record);
        out.extend_from_slice(&record);

        let mut name_bytes = name;
        obf.obfuscate(&mut name_bytes);
        out.extend_from_slice(&name_bytes);
    }
    let dir_size = out.len() as u32 - dir_offset;

    let mut end = Vec::new();
    end.extend_from_slice(&end_signature(variant).to_le_bytes());
    end.extend_from_slice(&0u16.to_le_bytes()); // disk
    end.extend_from_slice(&0u16.to_le_bytes()); // disk start
    end.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    end.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    end.extend_from_slice(&dir_size.to_le_bytes());
    end.extend_from_slice(&dir_offset.to_le_bytes());
    end.extend_from_slice(&0u16.to_le_bytes()); // comment
    obf.obfuscate(&mut end);
    out.extend_from_slice(&end);

    out
}

/// Write an archive image into the temp dir and return its path.
pub fn write_archive_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
