//! Growth tiers: the ascending sequence of bucket counts a table moves
//! through as it fills.

use std::borrow::Cow;
use std::collections::TryReserveError;
use thiserror::Error;

/// Default bucket counts. Tables start at 509 buckets and stop growing at
/// 65521; past that, chains just get longer.
pub const DEFAULT_TIERS: [usize; 8] = [509, 1021, 2039, 4093, 8191, 16381, 32749, 65521];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TierError {
    #[error("tier sequence is empty")]
    Empty,
    #[error("tier {index} has zero buckets")]
    ZeroCapacity { index: usize },
    #[error("tier {index} is not larger than the tier before it")]
    NotAscending { index: usize },
    #[error("could not allocate {capacity} buckets: {source}")]
    Alloc {
        capacity: usize,
        source: TryReserveError,
    },
}

/// A validated, strictly ascending sequence of non-zero bucket counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tiers {
    sizes: Cow<'static, [usize]>,
}

impl Tiers {
    pub fn new(sizes: Vec<usize>) -> Result<Self, TierError> {
        Self::validate(&sizes)?;
        Ok(Self {
            sizes: Cow::Owned(sizes),
        })
    }

    fn validate(sizes: &[usize]) -> Result<(), TierError> {
        if sizes.is_empty() {
            return Err(TierError::Empty);
        }
        if let Some(index) = sizes.iter().position(|&n| n == 0) {
            return Err(TierError::ZeroCapacity { index });
        }
        if let Some(index) = sizes.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TierError::NotAscending { index: index + 1 });
        }
        Ok(())
    }

    /// Bucket count at `tier`.
    #[inline]
    pub fn capacity(&self, tier: usize) -> usize {
        self.sizes[tier]
    }

    /// The tier after `tier`, or `None` at the top of the sequence.
    #[inline]
    pub fn next(&self, tier: usize) -> Option<usize> {
        let next = tier + 1;
        (next < self.sizes.len()).then_some(next)
    }

    #[inline]
    pub fn is_max(&self, tier: usize) -> bool {
        tier + 1 >= self.sizes.len()
    }

    /// Whether a table holding `count` entries at `tier` must grow before
    /// accepting another one.
    #[inline]
    pub fn should_grow(&self, count: usize, tier: usize) -> bool {
        count >= self.capacity(tier) && !self.is_max(tier)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }
}

impl Default for Tiers {
    fn default() -> Self {
        Self {
            sizes: Cow::Borrowed(&DEFAULT_TIERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_prime_sequence() {
        let t = Tiers::default();
        assert_eq!(t.as_slice(), &DEFAULT_TIERS);
        assert_eq!(t.len(), 8);
        assert_eq!(t.capacity(0), 509);
        assert_eq!(t.capacity(7), 65521);
    }

    #[test]
    fn default_tiers_are_valid() {
        assert_eq!(Tiers::new(DEFAULT_TIERS.to_vec()), Ok(Tiers::default()));
    }

    #[test]
    fn rejects_bad_sequences() {
        assert_eq!(Tiers::new(vec![]), Err(TierError::Empty));
        assert_eq!(
            Tiers::new(vec![3, 0, 7]),
            Err(TierError::ZeroCapacity { index: 1 })
        );
        assert_eq!(
            Tiers::new(vec![3, 7, 7]),
            Err(TierError::NotAscending { index: 2 })
        );
        assert_eq!(
            Tiers::new(vec![7, 3]),
            Err(TierError::NotAscending { index: 1 })
        );
    }

    #[test]
    fn next_stops_at_the_top() {
        let t = Tiers::new(vec![2, 5, 11]).unwrap();
        assert_eq!(t.next(0), Some(1));
        assert_eq!(t.next(1), Some(2));
        assert_eq!(t.next(2), None);
        assert!(!t.is_max(1));
        assert!(t.is_max(2));
    }

    #[test]
    fn grows_only_when_full_and_not_at_max() {
        let t = Tiers::new(vec![2, 5]).unwrap();
        assert!(!t.should_grow(0, 0));
        assert!(!t.should_grow(1, 0));
        assert!(t.should_grow(2, 0));
        assert!(t.should_grow(3, 0));
        assert!(!t.should_grow(5, 1));
        assert!(!t.should_grow(500, 1));
    }

    #[test]
    fn single_tier_never_grows() {
        let t = Tiers::new(vec![1]).unwrap();
        assert!(t.is_max(0));
        assert!(!t.should_grow(10, 0));
    }
}
