//! Fixed-width bit vectors over vertex ids `0..n`.
//!
//! A [`BitSet`] stores `n.div_ceil(64)` words. All set operations touch each word once, so
//! intersection, difference and cardinality are `O(n / 64)`; they sit in the innermost loop of
//! both colouring and branching. Bits at positions `>= n` are kept at zero.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

#[inline(always)]
const fn bit(v: usize) -> u64 {
    1u64 << (v % WORD_BITS)
}

#[inline(always)]
const fn word_index(v: usize) -> usize {
    v / WORD_BITS
}

/// Number of `u64` words needed to hold `n` bits.
#[inline(always)]
pub const fn words_for(n: usize) -> usize {
    n.div_ceil(WORD_BITS)
}

// ============================================================================
// BitSet
// ============================================================================

/// A set of vertices in `0..capacity`, one bit per vertex.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSet {
    capacity: usize,
    words: Vec<u64>,
}

impl BitSet {
    /// Creates an empty set able to hold vertices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            words: vec![0u64; words_for(capacity)],
        }
    }

    /// Creates the full set `{0, .., capacity - 1}`.
    pub fn full(capacity: usize) -> Self {
        let mut set = Self {
            capacity,
            words: vec![u64::MAX; words_for(capacity)],
        };
        set.clear_tail();
        set
    }

    /// Creates a set from the given vertices.
    ///
    /// # Panics
    /// Panics if a vertex is `>= capacity`.
    pub fn from_vertices(capacity: usize, vertices: &[usize]) -> Self {
        let mut set = Self::new(capacity);
        for &v in vertices {
            set.insert(v);
        }
        set
    }

    /// Zeroes the bits beyond `capacity` in the last word.
    #[inline]
    fn clear_tail(&mut self) {
        let rem = self.capacity % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Returns true if the word count matches the capacity and no bit beyond it is set.
    ///
    /// Always true for sets built through this API; used to vet sets decoded from bytes.
    pub fn is_well_formed(&self) -> bool {
        if self.words.len() != words_for(self.capacity) {
            return false;
        }
        let rem = self.capacity % WORD_BITS;
        rem == 0 || self.words.last().map_or(true, |&w| w >> rem == 0)
    }

    /// Maximum number of vertices this set can hold.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw word storage, lowest vertices first.
    #[inline(always)]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Adds `v` to the set.
    #[inline]
    pub fn insert(&mut self, v: usize) {
        assert!(v < self.capacity, "vertex {v} out of range 0..{}", self.capacity);
        self.words[word_index(v)] |= bit(v);
    }

    /// Removes `v` from the set.
    #[inline]
    pub fn remove(&mut self, v: usize) {
        debug_assert!(v < self.capacity);
        self.words[word_index(v)] &= !bit(v);
    }

    /// Returns whether `v` is in the set.
    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        v < self.capacity && (self.words[word_index(v)] & bit(v)) != 0
    }

    /// Number of vertices in the set.
    #[inline]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Removes every vertex.
    #[inline]
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// `self &= other`.
    #[inline]
    pub fn intersect_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.capacity, other.capacity);
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    /// `self &= !other`.
    #[inline]
    pub fn difference_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.capacity, other.capacity);
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// `self |= other`.
    #[inline]
    pub fn union_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.capacity, other.capacity);
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// Returns `self & other` as a new set.
    #[inline]
    pub fn intersection(&self, other: &BitSet) -> BitSet {
        let mut out = self.clone();
        out.intersect_with(other);
        out
    }

    /// Returns `self & !other` as a new set.
    #[inline]
    pub fn difference(&self, other: &BitSet) -> BitSet {
        let mut out = self.clone();
        out.difference_with(other);
        out
    }

    /// Returns true if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| a & !b == 0)
    }

    /// Lowest member, if any.
    #[inline]
    pub fn first(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, &w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// Highest member, if any.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &w)| w != 0)
            .map(|(i, &w)| i * WORD_BITS + (WORD_BITS - 1 - w.leading_zeros() as usize))
    }

    /// Iterates members in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Iterates members in descending order.
    #[inline]
    pub fn iter_rev(&self) -> IterRev<'_> {
        let index = self.words.len();
        IterRev {
            words: &self.words,
            index,
            current: 0,
        }
    }

    /// Collects the members into a vector, ascending.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Ascending iterator over set bits.
pub struct Iter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.index += 1;
            if self.index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.index];
        }
        let v = self.index * WORD_BITS + self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(v)
    }
}

/// Descending iterator over set bits.
pub struct IterRev<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for IterRev<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            if self.index == 0 {
                return None;
            }
            self.index -= 1;
            self.current = self.words[self.index];
        }
        let top = WORD_BITS - 1 - self.current.leading_zeros() as usize;
        self.current &= !(1u64 << top);
        Some(self.index * WORD_BITS + top)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_masks_tail_bits() {
        let s = BitSet::full(70);
        assert_eq!(s.count(), 70);
        assert_eq!(s.words().len(), 2);
        assert_eq!(s.words()[1], (1u64 << 6) - 1);
        assert_eq!(s.last(), Some(69));
    }

    #[test]
    fn full_set_on_word_boundary() {
        let s = BitSet::full(128);
        assert_eq!(s.count(), 128);
        assert!(s.words().iter().all(|&w| w == u64::MAX));
    }

    #[test]
    fn empty_capacity_is_empty() {
        let s = BitSet::full(0);
        assert!(s.is_empty());
        assert_eq!(s.first(), None);
        assert_eq!(s.last(), None);
        assert_eq!(s.iter().count(), 0);
        assert_eq!(s.iter_rev().count(), 0);
    }

    #[test]
    fn insert_remove_contains() {
        let mut s = BitSet::new(200);
        for v in [0, 63, 64, 127, 199] {
            s.insert(v);
        }
        assert_eq!(s.count(), 5);
        assert!(s.contains(64));
        s.remove(64);
        assert!(!s.contains(64));
        assert!(!s.contains(500));
        assert_eq!(s.first(), Some(0));
        assert_eq!(s.last(), Some(199));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn insert_out_of_range_panics() {
        let mut s = BitSet::new(10);
        s.insert(10);
    }

    #[test]
    fn iteration_is_ascending_and_descending() {
        let verts = [3, 5, 64, 65, 130, 191];
        let s = BitSet::from_vertices(192, &verts);
        assert_eq!(s.to_vec(), verts.to_vec());
        let rev: Vec<_> = s.iter_rev().collect();
        let mut expected = verts.to_vec();
        expected.reverse();
        assert_eq!(rev, expected);
    }

    #[test]
    fn iteration_skips_empty_leading_words() {
        let s = BitSet::from_vertices(300, &[256, 299]);
        assert_eq!(s.to_vec(), vec![256, 299]);
        assert_eq!(s.first(), Some(256));
    }

    #[test]
    fn set_algebra() {
        let a = BitSet::from_vertices(100, &[1, 2, 3, 70, 80]);
        let b = BitSet::from_vertices(100, &[2, 3, 4, 80, 90]);

        assert_eq!(a.intersection(&b).to_vec(), vec![2, 3, 80]);
        assert_eq!(a.difference(&b).to_vec(), vec![1, 70]);

        let mut u = a.clone();
        u.union_with(&b);
        assert_eq!(u.to_vec(), vec![1, 2, 3, 4, 70, 80, 90]);

        assert!(a.intersection(&b).is_subset(&a));
        assert!(!a.is_subset(&b));
    }

    #[test]
    fn well_formed_sets() {
        assert!(BitSet::full(70).is_well_formed());
        assert!(BitSet::new(0).is_well_formed());
        let bad_len = BitSet {
            capacity: 70,
            words: vec![0],
        };
        assert!(!bad_len.is_well_formed());
        let bad_tail = BitSet {
            capacity: 3,
            words: vec![0b1000],
        };
        assert!(!bad_tail.is_well_formed());
    }

    #[test]
    fn clear_empties_set() {
        let mut s = BitSet::full(65);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 65);
    }
}
