//! Bucket hashing for string keys.

/// Multiplier of the polynomial string hash.
pub const HASH_MULTIPLIER: usize = 65599;

/// Map `key` to a bucket index in `[0, bucket_count)`.
///
/// Accumulates `hash = hash * 65599 + byte` over every byte of the key
/// with wrapping arithmetic, then reduces modulo `bucket_count`. Every
/// byte participates, including embedded NULs.
///
/// # Panics
///
/// Panics if `bucket_count` is zero.
#[inline]
pub fn bucket_index(key: &str, bucket_count: usize) -> usize {
    assert!(bucket_count > 0, "bucket_index: bucket count must be non-zero");
    let hash = key.bytes().fold(0usize, |h, b| {
        h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(b as usize)
    });
    hash % bucket_count
}
