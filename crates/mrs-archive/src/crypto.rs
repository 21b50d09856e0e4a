//! Header obfuscation transforms.
//!
//! Every MRS variant scrambles its fixed-size records (and, for some
//! variants, entry names) with a reversible byte transform. The
//! transforms are hardcoded in the game clients and are not secrets.
//! Payload DEFLATE streams are never obfuscated.

/// The published recovery seed for Mrs3 archives.
///
/// Only this seed is known to be in use; the on-disk keystream state is
/// derived from it with [`derive_seed`].
pub const MRS3_SEED: u32 = 0x7693_d7fb;

/// The repeating XOR key used by MG2 archives.
const MG2_KEY: [u8; 18] = [
    15, 175, 42, 3, 133, 66, 147, 103, 210, 220, 162, 64, 141, 113, 153, 247, 191, 153,
];

/// Derive the initial keystream state from an Mrs3 seed.
#[inline]
pub fn derive_seed(seed: u32) -> u32 {
    (seed ^ 0xdead_1234).wrapping_add(0x0033_7799)
}

/// A reversible byte transform applied to header regions.
///
/// Each call operates on one complete span; the keystream variant
/// restarts from its seed on every span, so records and names are
/// scrambled independently of their position in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obfuscation {
    /// Identity (Mrs1 and recovered archives).
    Plain,
    /// Per-byte rotate-and-invert (Mrs2).
    ByteRotXor,
    /// xorshift32 keystream XOR (Mrs3). Self-inverse.
    XorShift32 {
        /// Derived keystream state, not the raw seed.
        seed: u32,
    },
    /// Repeating fixed-key XOR (MG2). Self-inverse.
    FixedKey,
}

impl Obfuscation {
    /// Undo the on-disk scrambling in place.
    pub fn recover(self, data: &mut [u8]) {
        match self {
            Self::Plain => {}
            Self::ByteRotXor => {
                for byte in data.iter_mut() {
                    *byte = byte.rotate_right(3) ^ 0xff;
                }
            }
            Self::XorShift32 { seed } => xor_keystream(data, seed),
            Self::FixedKey => xor_fixed_key(data),
        }
    }

    /// Apply the on-disk scrambling in place.
    pub fn obfuscate(self, data: &mut [u8]) {
        match self {
            Self::Plain => {}
            Self::ByteRotXor => {
                for byte in data.iter_mut() {
                    *byte = (*byte ^ 0xff).rotate_left(3);
                }
            }
            Self::XorShift32 { seed } => xor_keystream(data, seed),
            Self::FixedKey => xor_fixed_key(data),
        }
    }
}

/// XOR a span with the xorshift32 keystream.
///
/// The state advances once per four bytes; each advanced state is
/// consumed little-endian byte by byte.
fn xor_keystream(data: &mut [u8], seed: u32) {
    let mut state = seed;
    for (i, byte) in data.iter_mut().enumerate() {
        if i & 3 == 0 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
        }
        *byte ^= (state >> ((i & 3) * 8)) as u8;
    }
}

fn xor_fixed_key(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= MG2_KEY[i % MG2_KEY.len()];
    }
}
