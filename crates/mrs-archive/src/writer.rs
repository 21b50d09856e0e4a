//! Archive emission.
//!
//! The writer streams local records and payloads first, accumulating
//! central headers in memory, then flushes the directory and the end
//! record. Every record and name passes through the target variant's
//! obfuscation; payload bytes never do.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use zerocopy::IntoBytes;

use crate::archive::MrsArchive;
use crate::crypto::Obfuscation;
use crate::decompress;
use crate::entry::EntryInfo;
use crate::variant::Variant;
use crate::zip::{CentralHeader, CompressionMethod, EndRecord, LocalHeader};
use crate::{Error, Result};

/// Version fields stamped on written headers.
const VERSION_MADE_BY: u16 = 25;
const VERSION_NEEDED: u16 = 20;

pub(crate) fn write_archive(source: &MrsArchive, path: &Path, variant: Variant) -> Result<()> {
    if !variant.is_writable() {
        return Err(Error::UnwritableVariant(variant));
    }
    let obf = variant.obfuscation();
    let mut out = BufWriter::new(File::create(path)?);

    let mut files: Vec<(String, EntryInfo)> = Vec::new();
    source.tree().traverse("", |entry_path, node| {
        if let Some(entry) = node.entry() {
            files.push((entry_path.to_string(), *entry));
        }
    });

    let mut centrals: Vec<(CentralHeader, String)> = Vec::with_capacity(files.len());
    let mut offset: u32 = 0;
    for (name, entry) in files {
        let data = source.read_entry(&entry)?;
        let uncompressed_size = data.len() as u32;
        let deflated = decompress::deflate(&data)?;
        // Equal sizes are the stored marker, so a non-shrinking deflate
        // falls back to the raw bytes.
        let payload = if deflated.len() < data.len() {
            deflated
        } else {
            data
        };

        let central = CentralHeader {
            version: VERSION_MADE_BY,
            min_version: VERSION_NEEDED,
            flags: 0,
            compression: CompressionMethod::Deflate as u16,
            last_modified: entry.last_modified.raw(),
            crc32: entry.crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size,
            name_len: name.len() as u16,
            extra_len: 0,
            comment_len: 0,
            disk_start: 0,
            internal_attrs: 0,
            external_attrs: 0,
            local_header_offset: offset,
        };

        let local = LocalHeader::from_central(&central);
        write_record(&mut out, obf, LocalHeader::SIGNATURE, local.as_bytes())?;
        write_name(&mut out, obf, &name)?;
        out.write_all(&payload)?;

        offset += (LocalHeader::SIZE + name.len() + payload.len()) as u32;
        centrals.push((central, name));
    }

    let dir_offset = offset;
    let mut dir_size: u32 = 0;
    for (central, name) in &centrals {
        write_record(&mut out, obf, variant.write_central_signature(), central.as_bytes())?;
        write_name(&mut out, obf, name)?;
        dir_size += (CentralHeader::SIZE + name.len()) as u32;
    }

    write_end(&mut out, variant, centrals.len() as u16, dir_size, dir_offset)?;
    out.flush()?;
    Ok(())
}

pub(crate) fn write_empty(path: &Path, variant: Variant) -> Result<()> {
    if !variant.is_writable() {
        return Err(Error::UnwritableVariant(variant));
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_end(&mut out, variant, 0, 0, 0)?;
    out.flush()?;
    Ok(())
}

fn write_record<W: Write>(
    out: &mut W,
    obf: Obfuscation,
    signature: u32,
    body: &[u8],
) -> Result<()> {
    let mut record = Vec::with_capacity(4 + body.len());
    record.extend_from_slice(&signature.to_le_bytes());
    record.extend_from_slice(body);
    obf.obfuscate(&mut record);
    out.write_all(&record)?;
    Ok(())
}

fn write_name<W: Write>(out: &mut W, obf: Obfuscation, name: &str) -> Result<()> {
    let mut bytes = name.as_bytes().to_vec();
    obf.obfuscate(&mut bytes);
    out.write_all(&bytes)?;
    Ok(())
}

fn write_end<W: Write>(
    out: &mut W,
    variant: Variant,
    entries: u16,
    dir_size: u32,
    dir_offset: u32,
) -> Result<()> {
    let end = EndRecord {
        disk: 0,
        disk_start: 0,
        entries_on_disk: entries,
        entries_total: entries,
        dir_size,
        dir_offset,
        comment_len: 0,
    };
    write_record(
        out,
        variant.obfuscation(),
        variant.write_end_signature(),
        end.as_bytes(),
    )
}
