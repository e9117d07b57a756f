//! Stable index: reproducible pseudo-random selection derived from text.
//!
//! The digest is SHA-256 over the raw seed bytes. The 32-byte digest is read
//! as one unsigned big-endian integer and reduced modulo `modulo`. Any port
//! that follows those two rules picks the same index for the same seed.

use sha2::{Digest, Sha256};

/// Separator used when a seed is assembled from several text fields.
pub const SEED_SEPARATOR: &str = "|";

/// Returns `int_be(sha256(seed)) % modulo`.
///
/// The reduction is folded byte by byte so the 256-bit integer never has to
/// be materialised. A `modulo` of zero yields 0.
pub fn stable_choice(seed: &[u8], modulo: usize) -> usize {
    if modulo == 0 {
        return 0;
    }
    let modulo = modulo as u128;
    let digest = Sha256::digest(seed);
    digest
        .iter()
        .fold(0u128, |acc, byte| (acc * 256 + u128::from(*byte)) % modulo) as usize
}

/// Joins `parts` with [`SEED_SEPARATOR`] and applies [`stable_choice`].
pub fn stable_index(parts: &[&str], modulo: usize) -> usize {
    stable_choice(parts.join(SEED_SEPARATOR).as_bytes(), modulo)
}

/// Rotates `items` left by `offset` (wrapping), returning a new vector.
pub fn rotated<T: Clone>(items: &[T], offset: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let offset = offset % items.len();
    items[offset..]
        .iter()
        .chain(items[..offset].iter())
        .cloned()
        .collect()
}
