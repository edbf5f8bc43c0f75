//! Hash-based addressing: turning an item id into a primary bucket
//! index and, at increasing depths, shard indices.

use sha2::{Digest, Sha256};

use crate::error::PackerError;

/// `bitsNeeded(n) = ceil(log2(n))`, with `bitsNeeded(1) = 0` since a single
/// bucket needs no bits to select.
pub fn bits_needed(n: u32) -> u32 {
    assert!(n >= 1, "bitsNeeded requires n >= 1");
    if n <= 1 {
        0
    } else {
        32 - (n - 1).leading_zeros()
    }
}

/// A 256-bit cryptographic digest primitive, consumed (not owned) by the
/// packer as an external hashing collaborator.
pub trait Digest256 {
    /// Hash `id` to a 32-byte digest.
    fn digest256(&self, id: &str) -> Result<[u8; 32], PackerError>;
}

/// The default [`Digest256`] implementation, backed by SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digest;

impl Digest256 for Sha256Digest {
    fn digest256(&self, id: &str) -> Result<[u8; 32], PackerError> {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        Ok(hasher.finalize().into())
    }
}

/// Derives primary and shard indices from an item id's digest, for a given
/// `(bucket_count, shard_count)` pair.
#[derive(Clone, Copy, Debug)]
pub struct HashIndex {
    bucket_bits: u32,
    shard_bits: u32,
}

impl HashIndex {
    /// Build an indexer for the given bucket/shard fan-out.
    pub fn new(bucket_count: u32, shard_count: u32) -> Self {
        Self {
            bucket_bits: bits_needed(bucket_count),
            shard_bits: bits_needed(shard_count),
        }
    }

    /// Number of bits consumed by the primary index.
    pub fn bucket_bits(&self) -> u32 {
        self.bucket_bits
    }

    /// Number of bits consumed by each shard index.
    pub fn shard_bits(&self) -> u32 {
        self.shard_bits
    }

    /// The primary bucket index's numeric value (before hex rendering).
    /// Used by the lock table to select a stripe.
    pub fn primary_index_numeric(&self, digest: &[u8; 32]) -> u64 {
        extract_bits(digest, 0, self.bucket_bits)
    }

    /// The primary index: a lowercase hex string, left-padded to a fixed
    /// width so every possible value occupies the same length.
    pub fn primary_index(&self, digest: &[u8; 32]) -> String {
        render_hex(self.primary_index_numeric(digest), self.bucket_bits)
    }

    /// The shard index at `depth`: a lowercase hex string, same rendering
    /// rules as [`HashIndex::primary_index`].
    pub fn shard_index(&self, digest: &[u8; 32], depth: u32) -> String {
        let skip = self.bucket_bits + depth * self.shard_bits;
        let value = extract_bits(digest, skip, self.shard_bits);
        render_hex(value, self.shard_bits)
    }
}

/// Read `width` bits from `digest`, starting `skip` bits from the front
/// (most-significant-bit-first across the 32-byte digest), as a `u64`.
/// Bits beyond the digest's 256 bits read as zero rather than panicking.
/// Deep recursion with a narrow digest degrades to an all-zero index
/// instead of failing, which is an acceptable and documented corner case
/// since shard indices are opaque map keys.
fn extract_bits(digest: &[u8; 32], skip: u32, width: u32) -> u64 {
    if width == 0 {
        return 0;
    }
    debug_assert!(width <= 64, "shard/bucket index must fit in 64 bits");

    let mut value: u64 = 0;
    for i in 0..width {
        let bit_pos = skip + i;
        let byte_index = (bit_pos / 8) as usize;
        let bit = if byte_index < digest.len() {
            let bit_in_byte = 7 - (bit_pos % 8);
            (digest[byte_index] >> bit_in_byte) & 1
        } else {
            0
        };
        value = (value << 1) | bit as u64;
    }
    value
}

/// Render `value` as lowercase hex, left-padded so every value representable
/// in `bit_width` bits occupies the same number of hex digits.
fn render_hex(value: u64, bit_width: u32) -> String {
    let hex_digits = (bit_width as usize).div_ceil(4).max(1);
    format!("{:0width$x}", value, width = hex_digits)
}
