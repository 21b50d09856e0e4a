//! Reader, writer and recovery scanner for MRS game archives.
//!
//! MRS is a family of obfuscated ZIP-derived container formats used by
//! a set of game clients. The variants share the PKZIP record layouts
//! but differ in signature constants and in the byte transform applied
//! to each fixed-size header:
//!
//! - **Mrs1** - plain records, nonstandard signatures
//! - **Mrs2** - per-byte rotate-and-invert scrambling
//! - **Mrs3** - xorshift32 keystream scrambling
//! - **MG2** - repeating fixed-key XOR
//!
//! Payloads are raw DEFLATE streams and are never obfuscated. Damaged
//! archives can still be salvaged with [`MrsArchive::open_forced`],
//! which pattern-scans for local-header magics and probes the bytes in
//! between for intact streams.
//!
//! # Example
//!
//! ```no_run
//! use mrs_archive::MrsArchive;
//!
//! let archive = MrsArchive::open("system/zitems.mrs")?;
//! println!("{} entries ({})", archive.entry_count(), archive.variant());
//!
//! let data = archive.get("zitem.xml")?;
//! # let _ = data;
//! # Ok::<(), mrs_archive::Error>(())
//! ```

mod archive;
mod crypto;
mod decompress;
mod dostime;
mod entry;
mod error;
mod recovery;
mod trie;
mod variant;
mod writer;
pub mod zip;

pub use archive::{ExtractSummary, MrsArchive};
pub use crypto::Obfuscation;
pub use dostime::DosTime;
pub use entry::EntryInfo;
pub use error::{Error, Result};
pub use recovery::RecoveryScanner;
pub use trie::{MrsNode, MrsTree};
pub use variant::Variant;
