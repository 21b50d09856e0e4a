//! MRS archive facade.
//!
//! [`MrsArchive`] memory-maps the file once and serves every read from
//! the shared map, so parallel extraction never contends on a file
//! descriptor. Record bytes are copied out of the map, deobfuscated in
//! the copy and then decoded; the map itself stays untouched.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use mrs_common::{crc, BinaryReader};

use crate::crypto::Obfuscation;
use crate::decompress;
use crate::dostime::DosTime;
use crate::entry::EntryInfo;
use crate::recovery::RecoveryScanner;
use crate::trie::{MrsNode, MrsTree};
use crate::variant::{Variant, MG2_MARKER};
use crate::writer;
use crate::zip::{CentralHeader, CompressionMethod, EndRecord, LocalHeader};
use crate::{Error, Result};

/// An opened MRS archive.
///
/// Constructed by [`MrsArchive::open`] (strict) or
/// [`MrsArchive::open_forced`] (recovery scan); the path tree is fully
/// populated before the constructor returns.
pub struct MrsArchive {
    /// Memory-mapped file data.
    mmap: Mmap,
    /// Path the archive was opened from.
    path: PathBuf,
    /// Detected (or forced) format variant.
    variant: Variant,
    /// Path tree over all entries.
    tree: MrsTree,
}

/// Result of a batch extraction.
///
/// Individual failures never abort the batch; they are collected here
/// for the caller to report.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    /// Files written to disk.
    pub written: usize,
    /// Files skipped because the destination already existed.
    pub skipped: usize,
    /// Entries that failed, with the error for each.
    pub failed: Vec<(String, Error)>,
}

impl ExtractSummary {
    /// Total number of entries the batch covered.
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed.len()
    }

    fn record(&mut self, name: String, result: Result<bool>) {
        match result {
            Ok(true) => self.written += 1,
            Ok(false) => self.skipped += 1,
            Err(err) => self.failed.push((name, err)),
        }
    }
}

impl MrsArchive {
    /// Open an archive, detecting the variant from its signatures.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (path, mmap) = Self::map(path.as_ref())?;
        let variant = detect_variant(&mmap)?;
        Self::with_variant(path, mmap, variant)
    }

    /// Open an archive as a specific variant, skipping detection.
    ///
    /// Useful for archives whose leading bytes were damaged, or for
    /// re-opening freshly written variants the probing ladder cannot
    /// distinguish (an empty MG2 archive, for instance).
    pub fn open_as<P: AsRef<Path>>(path: P, variant: Variant) -> Result<Self> {
        let (path, mmap) = Self::map(path.as_ref())?;
        Self::with_variant(path, mmap, variant)
    }

    /// Reconstruct a damaged archive by pattern scanning.
    ///
    /// Entries get synthetic `file_<n>` names (plus an extension when
    /// the payload magic is recognized). Fails when not a single
    /// local-header signature is found.
    pub fn open_forced<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_as(path, Variant::ForcedRecovery)
    }

    fn map(path: &Path) -> Result<(PathBuf, Mmap)> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.len() < EndRecord::SIZE {
            return Err(Error::TruncatedArchive("shorter than an end record"));
        }
        Ok((path.to_path_buf(), mmap))
    }

    fn with_variant(path: PathBuf, mmap: Mmap, variant: Variant) -> Result<Self> {
        let tree = match variant {
            Variant::ForcedRecovery => {
                let mtime = fs::metadata(&path)?
                    .modified()
                    .map(DosTime::from_system_time)
                    .unwrap_or_default();
                RecoveryScanner::new(&mmap, mtime).scan()?
            }
            _ => {
                let end = read_end_record(&mmap, variant)?;
                if variant.uses_central_directory() {
                    walk_central_directory(&mmap, variant, &end)?
                } else {
                    walk_local_headers(&mmap, variant, &end)?
                }
            }
        };

        Ok(Self {
            mmap,
            path,
            variant,
            tree,
        })
    }

    /// Path the archive was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The detected (or forced) variant.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The path tree over all entries.
    #[inline]
    pub fn tree(&self) -> &MrsTree {
        &self.tree
    }

    /// The root node of the path tree.
    #[inline]
    pub fn root(&self) -> &MrsNode {
        self.tree.root()
    }

    /// Number of file entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.tree.file_count()
    }

    /// Read and decompress one entry, verifying its CRC-32.
    pub fn get(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .tree
            .lookup(name)
            .and_then(|node| node.entry().copied())
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        self.read_entry(&entry)
    }

    /// Extract one entry to `dest`.
    ///
    /// An existing directory destination is extended with the entry's
    /// base name. An existing file destination is left alone and
    /// reported as skipped (`Ok(false)`); extraction is idempotent.
    pub fn extract_file<P: AsRef<Path>>(&self, name: &str, dest: P) -> Result<bool> {
        match self.tree.lookup(name) {
            Some(node) if node.is_file() => {}
            _ => return Err(Error::NotFound(name.to_string())),
        }

        let mut dest = dest.as_ref().to_path_buf();
        if dest.is_dir() {
            dest.push(base_name(name));
        }
        self.extract_entry(name, &dest)
    }

    /// Extract a list of entries into `dest`, flattened to base names.
    ///
    /// Missing entries are reported in the summary, not raised.
    pub fn extract_files<S: AsRef<str>, P: AsRef<Path>>(
        &self,
        names: &[S],
        dest: P,
    ) -> ExtractSummary {
        let dest = dest.as_ref();
        let mut pre_failed = Vec::new();
        let mut tasks = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.tree.lookup(name) {
                Some(node) if node.is_file() => {
                    tasks.push((name.to_string(), dest.join(base_name(name))));
                }
                _ => pre_failed.push((name.to_string(), Error::NotFound(name.to_string()))),
            }
        }

        let mut summary = self.run_extract_tasks(tasks, |_| {});
        summary.failed.extend(pre_failed);
        summary
    }

    /// Extract the subtree at `dir` under `dest`, keeping full archive
    /// paths. The empty string extracts the whole archive.
    pub fn extract_dir<P: AsRef<Path>>(&self, dir: &str, dest: P) -> Result<ExtractSummary> {
        self.extract_dir_with(dir, dest, |_| {})
    }

    /// [`MrsArchive::extract_dir`] with a per-entry progress callback.
    pub fn extract_dir_with<P, F>(&self, dir: &str, dest: P, on_file: F) -> Result<ExtractSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&str) + Send,
    {
        let dest = dest.as_ref();
        match self.tree.lookup(dir) {
            Some(node) if !node.is_file() => {}
            _ => return Err(Error::NotFound(dir.to_string())),
        }
        fs::create_dir_all(dest)?;

        let mut tasks = Vec::new();
        let mut dirs = Vec::new();
        let mut pre_failed = Vec::new();
        self.tree.traverse(dir, |path, node| {
            match safe_join(dest, path) {
                Ok(target) if node.is_file() => tasks.push((path.to_string(), target)),
                Ok(target) => dirs.push(target),
                // Hostile directory paths surface through their files.
                Err(err) if node.is_file() => pre_failed.push((path.to_string(), err)),
                Err(_) => {}
            }
        });

        for target in dirs {
            if let Err(err) = fs::create_dir_all(&target) {
                pre_failed.push((target.display().to_string(), Error::Io(err)));
            }
        }

        let mut summary = self.run_extract_tasks(tasks, on_file);
        summary.failed.extend(pre_failed);
        Ok(summary)
    }

    /// Extract everything next to the archive, into `<parent>/<stem>`.
    pub fn extract_archive(&self) -> Result<ExtractSummary> {
        self.extract_dir("", self.default_extract_dir())
    }

    /// The destination [`MrsArchive::extract_archive`] would use.
    pub fn default_extract_dir(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "archive".into());
        match self.path.parent() {
            Some(parent) => parent.join(stem),
            None => PathBuf::from(stem),
        }
    }

    /// Write the archive's entries out as a new archive of `variant`.
    ///
    /// Payloads are read from this archive and recompressed.
    pub fn create<P: AsRef<Path>>(&self, path: P, variant: Variant) -> Result<()> {
        writer::write_archive(self, path.as_ref(), variant)
    }

    /// Write an archive with no entries.
    pub fn create_empty<P: AsRef<Path>>(path: P, variant: Variant) -> Result<()> {
        writer::write_empty(path.as_ref(), variant)
    }

    // Internal methods

    /// Read one entry's payload by its metadata.
    pub(crate) fn read_entry(&self, entry: &EntryInfo) -> Result<Vec<u8>> {
        let data = &self.mmap[..];
        let mut offset = entry.local_header_offset as usize;

        // Recovered entries point straight at payload bytes; everything
        // else carries a local header to verify and skip.
        if self.variant != Variant::ForcedRecovery {
            let raw = read_raw::<{ LocalHeader::SIZE }>(
                data,
                offset,
                self.variant.obfuscation(),
                "local header past end of file",
            )?;
            let mut reader = BinaryReader::new(&raw);
            let signature = reader.read_u32()?;
            if !self.variant.local_signatures().contains(&signature) {
                return Err(Error::BadSignature {
                    expected: LocalHeader::SIGNATURE,
                    actual: signature,
                });
            }
            let header: LocalHeader = reader.read_struct()?;
            CompressionMethod::try_from(header.compression)
                .map_err(|m| Error::UnsupportedCompression(m))?;
            offset += LocalHeader::SIZE + header.variable_data_size();
        }

        let end = offset
            .checked_add(entry.compressed_size as usize)
            .filter(|&end| end <= data.len())
            .ok_or(Error::TruncatedArchive("entry payload past end of file"))?;
        let payload = &data[offset..end];

        let output = if entry.is_stored() {
            payload.to_vec()
        } else {
            decompress::inflate_sized(payload, entry.uncompressed_size as usize)?
        };

        let actual = crc::hash_bytes(&output);
        if actual != entry.crc32 {
            return Err(Error::CrcMismatch {
                expected: entry.crc32,
                actual,
            });
        }
        Ok(output)
    }

    fn extract_entry(&self, name: &str, dest: &Path) -> Result<bool> {
        if dest.exists() {
            return Ok(false);
        }
        let data = self.get(name)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, data)?;
        Ok(true)
    }

    #[cfg(feature = "parallel")]
    fn run_extract_tasks<F>(&self, tasks: Vec<(String, PathBuf)>, mut on_file: F) -> ExtractSummary
    where
        F: FnMut(&str) + Send,
    {
        use rayon::prelude::*;
        use std::sync::Mutex;

        let on_file = Mutex::new(&mut on_file);
        let results: Vec<(String, Result<bool>)> = tasks
            .into_par_iter()
            .map(|(name, dest)| {
                let result = self.extract_entry(&name, &dest);
                on_file.lock().unwrap()(&name);
                (name, result)
            })
            .collect();

        let mut summary = ExtractSummary::default();
        for (name, result) in results {
            summary.record(name, result);
        }
        summary
    }

    #[cfg(not(feature = "parallel"))]
    fn run_extract_tasks<F>(&self, tasks: Vec<(String, PathBuf)>, mut on_file: F) -> ExtractSummary
    where
        F: FnMut(&str) + Send,
    {
        let mut summary = ExtractSummary::default();
        for (name, dest) in tasks {
            let result = self.extract_entry(&name, &dest);
            on_file(&name);
            summary.record(name, result);
        }
        summary
    }
}

impl std::fmt::Debug for MrsArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MrsArchive")
            .field("path", &self.path)
            .field("variant", &self.variant)
            .field("entries", &self.tree.file_count())
            .finish()
    }
}

/// Copy a fixed-size record out of the map and deobfuscate the copy.
fn read_raw<const N: usize>(
    data: &[u8],
    offset: usize,
    obf: Obfuscation,
    what: &'static str,
) -> Result<[u8; N]> {
    let end = offset
        .checked_add(N)
        .filter(|&end| end <= data.len())
        .ok_or(Error::TruncatedArchive(what))?;
    let mut raw = [0u8; N];
    raw.copy_from_slice(&data[offset..end]);
    obf.recover(&mut raw);
    Ok(raw)
}

/// Probe the leading 4 bytes against each variant's scrambling.
///
/// Real archives start with a local header; empty ones start with the
/// end record, so both signature sets are accepted. MG2 is recognized
/// by its marker value, which surfaces either raw or under the Mrs2
/// probe depending on which client wrote the file.
fn detect_variant(data: &[u8]) -> Result<Variant> {
    let mut head = [0u8; 4];
    head.copy_from_slice(&data[..4]);
    let raw = u32::from_le_bytes(head);

    let accepts = |variant: Variant, value: u32| {
        variant.local_signatures().contains(&value) || variant.end_signatures().contains(&value)
    };

    if accepts(Variant::Mrs1, raw) {
        return Ok(Variant::Mrs1);
    }

    let mut probe = head;
    Obfuscation::ByteRotXor.recover(&mut probe);
    let rotated = u32::from_le_bytes(probe);
    if accepts(Variant::Mrs2, rotated) {
        return Ok(Variant::Mrs2);
    }

    if raw == MG2_MARKER || rotated == MG2_MARKER {
        return Ok(Variant::Mg2);
    }

    let mut probe = head;
    Variant::Mrs3.obfuscation().recover(&mut probe);
    if accepts(Variant::Mrs3, u32::from_le_bytes(probe)) {
        return Ok(Variant::Mrs3);
    }

    Err(Error::UnknownVariant(raw))
}

fn read_end_record(data: &[u8], variant: Variant) -> Result<EndRecord> {
    let offset = data.len() - EndRecord::SIZE;
    let raw = read_raw::<{ EndRecord::SIZE }>(
        data,
        offset,
        variant.obfuscation(),
        "end record out of bounds",
    )?;
    let mut reader = BinaryReader::new(&raw);
    let signature = reader.read_u32()?;
    if !variant.end_signatures().contains(&signature) {
        return Err(Error::BadSignature {
            expected: variant.write_end_signature(),
            actual: signature,
        });
    }
    Ok(reader.read_struct()?)
}

/// Build the tree from the central directory (Mrs1, Mrs2).
///
/// Records whose signature fails the variant set are skipped without
/// aborting; the walk still consumes their variable-length fields so it
/// stays record-aligned.
fn walk_central_directory(data: &[u8], variant: Variant, end: &EndRecord) -> Result<MrsTree> {
    let dir_offset = end.dir_offset as usize;
    let dir_size = end.dir_size as usize;
    if dir_offset.saturating_add(dir_size) > data.len() {
        return Err(Error::TruncatedArchive("central directory past end of file"));
    }

    let obf = variant.obfuscation();
    let mut tree = MrsTree::new();
    let mut pos = dir_offset;
    for _ in 0..end.entries_on_disk {
        let raw = read_raw::<{ CentralHeader::SIZE }>(
            data,
            pos,
            obf,
            "central directory past end of file",
        )?;
        let mut reader = BinaryReader::new(&raw);
        let signature = reader.read_u32()?;
        let header: CentralHeader = reader.read_struct()?;
        pos += CentralHeader::SIZE;

        let name_len = header.name_len as usize;
        if pos + name_len > data.len() {
            return Err(Error::TruncatedArchive("entry name past end of file"));
        }
        let mut name_raw = data[pos..pos + name_len].to_vec();
        obf.recover(&mut name_raw);
        pos += name_len + header.extra_len as usize + header.comment_len as usize;

        if !variant.central_signatures().contains(&signature) {
            continue;
        }
        CompressionMethod::try_from(header.compression)
            .map_err(|m| Error::UnsupportedCompression(m))?;

        insert_entry(&mut tree, &name_raw, EntryInfo::from_central(&header), data.len());
    }
    Ok(tree)
}

/// Build the tree by walking local headers from offset 0 (Mrs3, MG2).
///
/// The recorded directory offset is not trusted for these variants;
/// each header's sizes locate the next one.
fn walk_local_headers(data: &[u8], variant: Variant, end: &EndRecord) -> Result<MrsTree> {
    let obf = variant.obfuscation();
    let mut tree = MrsTree::new();
    let mut pos: usize = 0;
    for _ in 0..end.entries_on_disk {
        let header_offset = pos as u32;
        let raw = read_raw::<{ LocalHeader::SIZE }>(
            data,
            pos,
            obf,
            "local header past end of file",
        )?;
        let mut reader = BinaryReader::new(&raw);
        let _signature = reader.read_u32()?;
        let header: LocalHeader = reader.read_struct()?;
        CompressionMethod::try_from(header.compression)
            .map_err(|m| Error::UnsupportedCompression(m))?;
        pos += LocalHeader::SIZE;

        let name_len = header.name_len as usize;
        if pos + name_len > data.len() {
            return Err(Error::TruncatedArchive("entry name past end of file"));
        }
        let mut name_raw = data[pos..pos + name_len].to_vec();
        obf.recover(&mut name_raw);
        pos += name_len + header.extra_len as usize + header.compressed_size as usize;

        insert_entry(
            &mut tree,
            &name_raw,
            EntryInfo::from_local(&header, header_offset),
            data.len(),
        );
    }
    Ok(tree)
}

fn insert_entry(tree: &mut MrsTree, name_raw: &[u8], entry: EntryInfo, file_size: usize) {
    let name = String::from_utf8_lossy(name_raw).replace('\\', "/");
    if name.ends_with('/') {
        tree.insert(name.trim_end_matches('/'), None);
        return;
    }
    if !entry_in_bounds(&entry, name_raw.len(), file_size) {
        return;
    }
    tree.insert(&name, Some(entry));
}

fn entry_in_bounds(entry: &EntryInfo, name_len: usize, file_size: usize) -> bool {
    let file_size = file_size as u64;
    entry.compressed_size as u64 <= file_size
        && entry.local_header_offset as u64 + LocalHeader::SIZE as u64 + name_len as u64
            <= file_size
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn safe_join(root: &Path, rel: &str) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    for seg in rel.split('/').filter(|seg| !seg.is_empty() && *seg != ".") {
        if seg == ".." {
            return Err(Error::PathTraversal(rel.to_string()));
        }
        out.push(seg);
    }
    Ok(out)
}
