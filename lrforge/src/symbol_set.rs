//! Fixed-capacity sets of grammar symbols.

use crate::SymbolId;
use crate::symbol::MAX_SYMBOLS;
use std::fmt::{self, Debug, Formatter};

type BitBlock = u64;

const _: () = assert!(MAX_SYMBOLS <= BitBlock::BITS as usize);

#[inline]
fn bit(sym: SymbolId) -> BitBlock {
    (1 as BitBlock) << sym.index()
}

/// A set of [`SymbolId`]s backed by a single bit block.
///
/// Capacity equals the symbol registry's ceiling, so every registered symbol
/// fits. Used for FIRST sets and item follow sets during grammar
/// configuration.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SymbolSet {
    bits: BitBlock,
}

impl SymbolSet {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn single(sym: SymbolId) -> Self {
        let mut s = Self::new();
        s.insert(sym);
        s
    }

    /// Returns whether the symbol was newly inserted.
    pub fn insert(&mut self, sym: SymbolId) -> bool {
        let old = self.bits;
        self.bits |= bit(sym);
        old != self.bits
    }

    pub fn remove(&mut self, sym: SymbolId) {
        self.bits &= !bit(sym);
    }

    /// Union with `other`. Returns whether the set has changed.
    pub fn merge(&mut self, other: &SymbolSet) -> bool {
        let old = self.bits;
        self.bits |= other.bits;
        old != self.bits
    }

    #[inline]
    pub fn contains(&self, sym: SymbolId) -> bool {
        self.bits & bit(sym) != 0
    }

    pub fn intersection(&self, other: &SymbolSet) -> SymbolSet {
        SymbolSet {
            bits: self.bits & other.bits,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in ascending index order.
    pub fn iter(&self) -> Iter {
        Iter { bits: self.bits }
    }
}

impl FromIterator<SymbolId> for SymbolSet {
    fn from_iter<T: IntoIterator<Item = SymbolId>>(iter: T) -> Self {
        let mut s = SymbolSet::new();
        for sym in iter {
            s.insert(sym);
        }
        s
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = SymbolId;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

pub struct Iter {
    bits: BitBlock,
}

impl Iterator for Iter {
    type Item = SymbolId;

    fn next(&mut self) -> Option<SymbolId> {
        if self.bits == 0 {
            return None;
        }
        let bit = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(SymbolId::new(bit))
    }
}

impl Debug for SymbolSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.index())).finish()
    }
}
