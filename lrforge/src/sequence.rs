//! Right-hand sides of rules.

use crate::{Productions, SymbolId, SymbolSet, SymbolTable};
use std::ops::Deref;

/// An ordered list of symbol references forming a rule's right-hand side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    symbols: Vec<SymbolId>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sym: SymbolId) {
        self.symbols.push(sym);
    }

    pub fn as_slice(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// The suffix starting at `pos` (empty once `pos` reaches the end).
    pub fn subsequence(&self, pos: usize) -> Sequence {
        Sequence {
            symbols: self.symbols.get(pos..).unwrap_or_default().to_vec(),
        }
    }

    /// True iff every symbol can derive the empty string. An empty sequence
    /// is nullable; one containing a terminal never is.
    pub fn is_nullable(&self, prods: &Productions) -> bool {
        self.symbols.iter().all(|&sym| prods.is_nullable(sym))
    }

    /// Terminals that can begin a derivation of this sequence: the union of
    /// FIRST sets of its symbols up to and including the first one that is
    /// not nullable.
    pub fn first_set(&self, prods: &Productions) -> SymbolSet {
        let mut set = SymbolSet::new();
        for &sym in &self.symbols {
            set.merge(prods.first(sym));
            if !prods.is_nullable(sym) {
                break;
            }
        }
        set
    }

    /// The rightmost terminal anywhere in the sequence.
    pub fn last_terminal(&self, symbols: &SymbolTable) -> Option<SymbolId> {
        self.symbols
            .iter()
            .rev()
            .copied()
            .find(|&sym| symbols.is_terminal(sym))
    }

    /// Display names joined by spaces.
    pub fn display(&self, symbols: &SymbolTable) -> std::string::String {
        self.symbols
            .iter()
            .map(|&sym| symbols.name(sym))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Deref for Sequence {
    type Target = [SymbolId];

    fn deref(&self) -> &[SymbolId] {
        &self.symbols
    }
}

impl From<Vec<SymbolId>> for Sequence {
    fn from(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }
}

impl From<&[SymbolId]> for Sequence {
    fn from(symbols: &[SymbolId]) -> Self {
        Self {
            symbols: symbols.to_vec(),
        }
    }
}

impl<const N: usize> From<[SymbolId; N]> for Sequence {
    fn from(symbols: [SymbolId; N]) -> Self {
        Self {
            symbols: symbols.to_vec(),
        }
    }
}

impl FromIterator<SymbolId> for Sequence {
    fn from_iter<T: IntoIterator<Item = SymbolId>>(iter: T) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}
