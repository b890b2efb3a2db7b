//! Finished automaton states.

use crate::{ConfiguratingSet, SymbolId, SymbolTable};
use std::collections::BTreeMap;

/// One automaton state as the parser sees it: shift transitions keyed by
/// symbol (terminals shift, nonterminals goto) and reduce actions keyed by
/// lookahead terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    shifts: BTreeMap<SymbolId, usize>,
    reduces: BTreeMap<SymbolId, usize>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successor state on `sym`.
    #[inline]
    pub fn shift(&self, sym: SymbolId) -> Option<usize> {
        self.shifts.get(&sym).copied()
    }

    /// Rule index to reduce by when `sym` is the lookahead.
    #[inline]
    pub fn reduce(&self, sym: SymbolId) -> Option<usize> {
        self.reduces.get(&sym).copied()
    }

    pub fn shifts(&self) -> &BTreeMap<SymbolId, usize> {
        &self.shifts
    }

    pub fn reduces(&self) -> &BTreeMap<SymbolId, usize> {
        &self.reduces
    }

    pub(crate) fn insert_shift(&mut self, sym: SymbolId, next: usize) {
        self.shifts.insert(sym, next);
    }

    pub(crate) fn insert_reduce(&mut self, sym: SymbolId, rule: usize) {
        self.reduces.insert(sym, rule);
    }

    /// Terminals with any action in this state, ascending.
    pub fn expected(&self, symbols: &SymbolTable) -> Vec<SymbolId> {
        let mut expected: Vec<SymbolId> = self
            .shifts
            .keys()
            .chain(self.reduces.keys())
            .copied()
            .filter(|&sym| symbols.is_terminal(sym))
            .collect();
        expected.sort_unstable();
        expected.dedup();
        expected
    }
}

impl From<&ConfiguratingSet> for State {
    fn from(set: &ConfiguratingSet) -> Self {
        Self {
            shifts: set.shifts.clone(),
            reduces: set.reduces.clone(),
        }
    }
}
