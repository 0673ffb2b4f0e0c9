//! Circular byte-buffer arithmetic
//!
//! Every audio cursor is an offset into a ring of fixed size. These helpers
//! keep all of that arithmetic unsigned and in range. Callers pass offsets
//! `< size`; this is not re-checked in release builds.

/// Arithmetic over a ring of `size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundRing {
    size: u32,
}

impl SoundRing {
    /// Create a ring of `size` bytes. `size` must be non-zero.
    pub fn new(size: u32) -> Self {
        debug_assert!(size > 0, "ring size must be non-zero");
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Bytes travelled going forward from `start` to `end`.
    pub fn diff(&self, start: u32, end: u32) -> u32 {
        debug_assert!(start < self.size && end < self.size);
        if end >= start {
            end - start
        } else {
            self.size - start + end
        }
    }

    /// `size - value`
    pub fn complement(&self, value: u32) -> u32 {
        debug_assert!(value <= self.size);
        self.size - value
    }

    /// `(index + offset) mod size`. `offset` may be any value, including `size`.
    pub fn add(&self, index: u32, offset: u32) -> u32 {
        ((index as u64 + offset as u64) % self.size as u64) as u32
    }

    /// `(index - offset) mod size`, without ever going negative.
    pub fn sub(&self, index: u32, offset: u32) -> u32 {
        let offset = offset % self.size;
        if offset <= index {
            index - offset
        } else {
            self.size - (offset - index)
        }
    }

    /// True if `test` lies on the forward arc from `start` to `end`, both inclusive.
    pub fn between(&self, start: u32, end: u32, test: u32) -> bool {
        if end >= start {
            start <= test && test <= end
        } else {
            test >= start || test <= end
        }
    }

    /// Split `len` bytes starting at `offset` into the part before the end of
    /// the ring and the part that wraps to the front.
    ///
    /// Returns `((offset, first_len), (0, second_len))`.
    pub fn split_region(&self, offset: u32, len: u32) -> ((u32, u32), (u32, u32)) {
        debug_assert!(len <= self.size);
        let first = len.min(self.size - offset);
        ((offset, first), (0, len - first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_diff_forward_and_wrapped() {
        let ring = SoundRing::new(100);
        assert_eq!(ring.diff(10, 30), 20);
        assert_eq!(ring.diff(90, 10), 20);
        assert_eq!(ring.diff(0, 99), 99);
        assert_eq!(ring.diff(42, 42), 0);
    }

    #[test]
    fn test_add_sub_wrap() {
        let ring = SoundRing::new(100);
        assert_eq!(ring.add(95, 10), 5);
        assert_eq!(ring.add(0, 100), 0);
        assert_eq!(ring.add(99, u32::MAX), ((99u64 + u32::MAX as u64) % 100) as u32);
        assert_eq!(ring.sub(5, 10), 95);
        assert_eq!(ring.sub(50, 0), 50);
        assert_eq!(ring.sub(50, 250), 0);
    }

    #[test]
    fn test_between_handles_wrap() {
        let ring = SoundRing::new(100);
        assert!(ring.between(10, 20, 15));
        assert!(!ring.between(10, 20, 25));
        assert!(ring.between(90, 10, 95));
        assert!(ring.between(90, 10, 5));
        assert!(!ring.between(90, 10, 50));
        // a degenerate arc only contains its endpoint
        assert!(ring.between(7, 7, 7));
        assert!(!ring.between(7, 7, 8));
    }

    #[test]
    fn test_diff_boundary_same_point() {
        let ring = SoundRing::new(64);
        for a in 0..64 {
            assert_eq!(ring.diff(a, a) + ring.diff(a, a), 0);
        }
    }

    #[test]
    fn test_split_region() {
        let ring = SoundRing::new(100);
        assert_eq!(ring.split_region(10, 20), ((10, 20), (0, 0)));
        assert_eq!(ring.split_region(90, 20), ((90, 10), (0, 10)));
        assert_eq!(ring.split_region(0, 100), ((0, 100), (0, 0)));
    }

    fn ring_and_two_offsets() -> impl Strategy<Value = (u32, u32, u32)> {
        (1u32..=200_000).prop_flat_map(|n| (Just(n), 0..n, 0..n))
    }

    proptest! {
        #[test]
        fn prop_add_complement_is_zero((n, a, _b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            prop_assert_eq!(ring.add(a, ring.complement(a)), 0);
        }

        #[test]
        fn prop_diff_self_is_zero((n, a, _b) in ring_and_two_offsets()) {
            prop_assert_eq!(SoundRing::new(n).diff(a, a), 0);
        }

        #[test]
        fn prop_diff_both_ways_spans_ring((n, a, b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            let sum = ring.diff(a, b) as u64 + ring.diff(b, a) as u64;
            if a == b {
                prop_assert_eq!(sum, 0);
            } else {
                prop_assert_eq!(sum, n as u64);
            }
        }

        #[test]
        fn prop_between_contains_endpoints((n, a, b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            prop_assert!(ring.between(a, b, a));
            prop_assert!(ring.between(a, b, b));
        }

        #[test]
        fn prop_sub_undoes_add((n, a, b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            prop_assert_eq!(ring.sub(ring.add(a, b), b), a);
        }

        #[test]
        fn prop_add_diff_lands_on_end((n, a, b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            prop_assert_eq!(ring.add(a, ring.diff(a, b)), b);
        }

        #[test]
        fn prop_results_stay_in_range((n, a, b) in ring_and_two_offsets()) {
            let ring = SoundRing::new(n);
            prop_assert!(ring.add(a, b) < n);
            prop_assert!(ring.sub(a, b) < n);
            prop_assert!(ring.diff(a, b) < n);
        }
    }
}
