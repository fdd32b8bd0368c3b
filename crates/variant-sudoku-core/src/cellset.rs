//! Fixed-width cell sets.
//!
//! [`CellSet`] generalizes the fixed 9x9 `BitSet81` (a single `u128`) to the largest
//! grid this engine supports: up to [`MAX_CELLS`](crate::MAX_CELLS) = 256 cells, backed
//! by four `u64` words. Every cell-exclusion-graph neighbor set, propagation
//! accumulator, and handler cell-list membership test goes through this type, so it is
//! kept `Copy` and cheap to clone the same way the teacher's `BitSet81` is.

use std::{
    fmt,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use crate::CellId;

const WORDS: usize = 4;
const BITS_PER_WORD: u32 = 64;

/// A set of [`CellId`]s, represented as a 256-bit bitset.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CellSet {
    words: [u64; WORDS],
}

impl CellSet {
    /// The empty set.
    pub const EMPTY: Self = Self { words: [0; WORDS] };

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set containing only `cell`.
    #[must_use]
    pub fn single(cell: CellId) -> Self {
        let mut s = Self::new();
        s.insert(cell);
        s
    }

    /// Creates the set of every cell index below `num_cells`.
    ///
    /// # Panics
    /// Panics if `num_cells` exceeds [`crate::MAX_CELLS`].
    #[must_use]
    pub fn full(num_cells: usize) -> Self {
        assert!(num_cells <= crate::MAX_CELLS);
        let mut s = Self::new();
        for i in 0..num_cells {
            s.insert(CellId::new(i as u16));
        }
        s
    }

    fn word_bit(cell: CellId) -> (usize, u64) {
        let idx = u32::from(cell.index());
        let word = (idx / BITS_PER_WORD) as usize;
        let bit = 1u64 << (idx % BITS_PER_WORD);
        (word, bit)
    }

    /// Inserts `cell`, returning whether it was newly inserted.
    pub fn insert(&mut self, cell: CellId) -> bool {
        let (word, bit) = Self::word_bit(cell);
        let was_present = self.words[word] & bit != 0;
        self.words[word] |= bit;
        !was_present
    }

    /// Removes `cell`, returning whether it was present.
    pub fn remove(&mut self, cell: CellId) -> bool {
        let (word, bit) = Self::word_bit(cell);
        let was_present = self.words[word] & bit != 0;
        self.words[word] &= !bit;
        was_present
    }

    /// Returns whether `cell` is a member.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        let (word, bit) = Self::word_bit(cell);
        self.words[word] & bit != 0
    }

    /// Returns whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns whether `self` and `other` share no members.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }

    /// Returns whether every member of `self` is a member of `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Returns the complement of this set within `universe` (cells `0..universe` not in
    /// `self`).
    ///
    /// # Panics
    /// Panics if `universe` exceeds [`crate::MAX_CELLS`].
    #[must_use]
    pub fn complement_within(&self, universe: usize) -> Self {
        *self ^ Self::full(universe)
    }

    fn bitxor_impl(self, rhs: Self) -> Self {
        let mut words = [0u64; WORDS];
        for i in 0..WORDS {
            words[i] = self.words[i] ^ rhs.words[i];
        }
        Self { words }
    }

    /// Iterates over the members in ascending index order.
    #[must_use]
    pub fn iter(&self) -> CellSetIter {
        CellSetIter { words: self.words, word_idx: 0 }
    }
}

impl std::ops::BitXor for CellSet {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        self.bitxor_impl(rhs)
    }
}

impl fmt::Debug for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl IntoIterator for CellSet {
    type Item = CellId;
    type IntoIter = CellSetIter;

    fn into_iter(self) -> Self::IntoIter {
        CellSetIter { words: self.words, word_idx: 0 }
    }
}

impl FromIterator<CellId> for CellSet {
    fn from_iter<T: IntoIterator<Item = CellId>>(iter: T) -> Self {
        let mut s = Self::new();
        for c in iter {
            s.insert(c);
        }
        s
    }
}

/// Iterator over the members of a [`CellSet`], ascending.
#[derive(Debug, Clone)]
pub struct CellSetIter {
    words: [u64; WORDS],
    word_idx: usize,
}

impl Iterator for CellSetIter {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.word_idx < WORDS {
            let w = self.words[self.word_idx];
            if w == 0 {
                self.word_idx += 1;
                continue;
            }
            let bit = w.trailing_zeros();
            self.words[self.word_idx] &= w - 1;
            #[allow(clippy::cast_possible_truncation)]
            let index = (self.word_idx as u32 * BITS_PER_WORD + bit) as u16;
            return Some(CellId::new(index));
        }
        None
    }
}

impl BitOr for CellSet {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        let mut words = [0u64; WORDS];
        for i in 0..WORDS {
            words[i] = self.words[i] | rhs.words[i];
        }
        Self { words }
    }
}

impl BitOrAssign for CellSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl BitAnd for CellSet {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        let mut words = [0u64; WORDS];
        for i in 0..WORDS {
            words[i] = self.words[i] & rhs.words[i];
        }
        Self { words }
    }
}

impl BitAndAssign for CellSet {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl Not for CellSet {
    type Output = Self;
    fn not(self) -> Self {
        let mut words = [0u64; WORDS];
        for i in 0..WORDS {
            words[i] = !self.words[i];
        }
        Self { words }
    }
}
