//! Common utilities for the MRS toolset.
//!
//! This crate provides the foundational pieces shared by the MRS crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`crc`] - CRC-32 hashing utilities (zlib polynomial)
//! - Shared error types

mod error;
mod reader;

pub mod crc;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
