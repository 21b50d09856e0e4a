//! Archive format variants and their signature tables.

use std::fmt;

use crate::crypto::{self, Obfuscation};

/// Signature constants per variant, all little-endian on disk.
///
/// The sets list every value a deobfuscated record signature may take;
/// the first element of each set is what the writer emits.
mod sig {
    pub mod mrs1 {
        pub const LOCAL: &[u32] = &[0x8584_0000, 0x0403_4b50];
        pub const CENTRAL: &[u32] = &[0x0502_4b80];
        pub const END: &[u32] = &[0xdd59_fc12, 0x0503_0207];
    }
    pub mod mrs2 {
        pub const LOCAL: &[u32] = &[0x0403_4b50];
        pub const CENTRAL: &[u32] = &[0x0201_4b50];
        pub const END: &[u32] = &[0x0503_0208, 0x0605_4b50];
    }
    pub mod mrs3 {
        pub const LOCAL: &[u32] = &[0x0201_4b50, 0x0403_4b50, 0xe96f_cf7e];
        pub const CENTRAL: &[u32] = &[0x0201_4b50];
        pub const END: &[u32] = &[0x0503_0208];
    }
    pub mod mg2 {
        pub const LOCAL: &[u32] = &[0x0403_4b50, 0x1fda_6314];
        pub const CENTRAL: &[u32] = &[0x0201_4b50, 0x8428_cef0];
        pub const END: &[u32] = &[0x0503_0208];
    }
}

/// Marker value identifying MG2 archives during variant probing.
pub(crate) const MG2_MARKER: u32 = 0x1fda_6314;

/// Archive format variant, assigned by signature probing at open time.
///
/// The variant selects both the obfuscation transform and the
/// signature values accepted for each record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Unobfuscated, oldest layout.
    Mrs1,
    /// Rotate-and-invert obfuscation.
    Mrs2,
    /// Keystream obfuscation; the central directory is ignored and the
    /// tree is rebuilt from local headers.
    Mrs3,
    /// Fixed-key obfuscation; local-header walk like Mrs3.
    Mg2,
    /// Pseudo-variant for archives reconstructed by the recovery
    /// scanner. Entries point straight at payload bytes.
    ForcedRecovery,
}

impl Variant {
    /// Valid deobfuscated local header signatures.
    pub fn local_signatures(self) -> &'static [u32] {
        match self {
            Self::Mrs1 => sig::mrs1::LOCAL,
            Self::Mrs2 => sig::mrs2::LOCAL,
            Self::Mrs3 => sig::mrs3::LOCAL,
            Self::Mg2 => sig::mg2::LOCAL,
            Self::ForcedRecovery => &[],
        }
    }

    /// Valid deobfuscated central header signatures.
    pub fn central_signatures(self) -> &'static [u32] {
        match self {
            Self::Mrs1 => sig::mrs1::CENTRAL,
            Self::Mrs2 => sig::mrs2::CENTRAL,
            Self::Mrs3 => sig::mrs3::CENTRAL,
            Self::Mg2 => sig::mg2::CENTRAL,
            Self::ForcedRecovery => &[],
        }
    }

    /// Valid deobfuscated end record signatures.
    pub fn end_signatures(self) -> &'static [u32] {
        match self {
            Self::Mrs1 => sig::mrs1::END,
            Self::Mrs2 => sig::mrs2::END,
            Self::Mrs3 => sig::mrs3::END,
            Self::Mg2 => sig::mg2::END,
            Self::ForcedRecovery => &[],
        }
    }

    /// The obfuscation transform for this variant's records.
    pub fn obfuscation(self) -> Obfuscation {
        match self {
            Self::Mrs1 | Self::ForcedRecovery => Obfuscation::Plain,
            Self::Mrs2 => Obfuscation::ByteRotXor,
            Self::Mrs3 => Obfuscation::XorShift32 {
                seed: crypto::derive_seed(crypto::MRS3_SEED),
            },
            Self::Mg2 => Obfuscation::FixedKey,
        }
    }

    /// Whether `open` reads the central directory for this variant.
    ///
    /// Mrs3 and MG2 directories are unreliable in the wild; their trees
    /// are synthesized from a local-header walk instead.
    pub(crate) fn uses_central_directory(self) -> bool {
        matches!(self, Self::Mrs1 | Self::Mrs2)
    }

    /// Central header signature emitted by the writer.
    pub(crate) fn write_central_signature(self) -> u32 {
        self.central_signatures().first().copied().unwrap_or(0)
    }

    /// End record signature emitted by the writer.
    pub(crate) fn write_end_signature(self) -> u32 {
        self.end_signatures().first().copied().unwrap_or(0)
    }

    /// Whether the writer can produce this variant.
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::ForcedRecovery)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mrs1 => "Mrs1",
            Self::Mrs2 => "Mrs2",
            Self::Mrs3 => "Mrs3",
            Self::Mg2 => "MG2",
            Self::ForcedRecovery => "recovery",
        };
        f.write_str(name)
    }
}
