//! Fixed-width bit set over variable indices.

use bitvec::prelude::{BitVec, Lsb0};

/// A set of variable indices in `0..capacity`.
///
/// Used for "available parent" pools; iteration is always in ascending
/// index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarMask {
    bits: BitVec<u64, Lsb0>,
}

impl VarMask {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, capacity),
        }
    }

    #[must_use]
    pub fn from_indices(capacity: usize, indices: &[usize]) -> Self {
        let mut mask = Self::new(capacity);
        for &i in indices {
            mask.insert(i);
        }
        mask
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert `i`; returns `true` if it was absent.
    ///
    /// # Panics
    /// If `i >= capacity`.
    pub fn insert(&mut self, i: usize) -> bool {
        !self.bits.replace(i, true)
    }

    /// Remove `i`; returns `true` if it was present.
    ///
    /// # Panics
    /// If `i >= capacity`.
    pub fn remove(&mut self, i: usize) -> bool {
        self.bits.replace(i, false)
    }

    #[must_use]
    pub fn contains(&self, i: usize) -> bool {
        self.bits.get(i).is_some_and(|bit| *bit)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}
