//! Grammar productions.

use crate::{Productions, Sequence, SymbolId, SymbolTable};
use std::ops::Shr;

/// A production `lhs -> rhs`.
///
/// Built with `Rule::new(id, lhs) >> rhs`; the grammar assigns the rule's
/// [`index`](Rule::index) when the rule is added. `id` is the client's own
/// number, handed back at reduction time so the tree builder can dispatch on
/// it.
///
/// ```rust
/// # use lrforge::{Rule, SymbolTable};
/// let mut tab = SymbolTable::new();
/// let minus = tab.terminal('-' as u32).unwrap();
/// let expr = tab.nonterminal("Expr").unwrap();
/// let neg = (Rule::new(7, expr) >> [minus, expr]).with_prec(25);
/// assert_eq!(neg.len(), 2);
/// assert_eq!(neg.prec(), Some(25));
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    id: u32,
    lhs: SymbolId,
    rhs: Sequence,
    index: usize,
    prec: Option<i32>,
}

impl Rule {
    pub fn new(id: u32, lhs: SymbolId) -> Self {
        Self {
            id,
            lhs,
            rhs: Sequence::new(),
            index: 0,
            prec: None,
        }
    }

    /// Overrides the precedence that would otherwise come from the rule's
    /// rightmost terminal.
    #[must_use]
    pub fn with_prec(mut self, prec: i32) -> Self {
        self.prec = Some(prec);
        self
    }

    pub fn set_prec(&mut self, prec: i32) {
        self.prec = Some(prec);
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    #[inline]
    pub fn rhs(&self) -> &Sequence {
        &self.rhs
    }

    /// Position in the grammar's rule table; 0 is the synthetic start rule.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_rhs(&mut self, rhs: Sequence) {
        self.rhs = rhs;
    }

    /// The explicit precedence override, if any.
    #[inline]
    pub fn prec(&self) -> Option<i32> {
        self.prec
    }

    /// Length of the right-hand side.
    #[inline]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn is_nullable(&self, prods: &Productions) -> bool {
        self.rhs.is_nullable(prods)
    }

    /// `Lhs -> a b c` using registry display names.
    pub fn display(&self, symbols: &SymbolTable) -> String {
        let rhs = self.rhs.display(symbols);
        if rhs.is_empty() {
            format!("{} ->", symbols.name(self.lhs))
        } else {
            format!("{} -> {}", symbols.name(self.lhs), rhs)
        }
    }
}

impl<S: Into<Sequence>> Shr<S> for Rule {
    type Output = Rule;

    /// Appends `rhs` to the rule's right-hand side.
    fn shr(mut self, rhs: S) -> Rule {
        let rhs: Sequence = rhs.into();
        for &sym in rhs.iter() {
            self.rhs.push(sym);
        }
        self
    }
}

/// Rules are equal when they rewrite the same symbol to the same sequence;
/// id, index and precedence do not take part.
impl PartialEq for Rule {
    fn eq(&self, other: &Rule) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl Eq for Rule {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_rhs() {
        let mut tab = SymbolTable::new();
        let plus = tab.terminal('+' as u32).unwrap();
        let e = tab.nonterminal("E").unwrap();
        let r = Rule::new(3, e) >> [e, plus] >> vec![e];
        assert_eq!(r.rhs().as_slice(), &[e, plus, e]);
        assert_eq!(r.id(), 3);
        assert_eq!(r.lhs(), e);
        assert_eq!(r.prec(), None);
        assert_eq!(r.display(&tab), "E -> E + E");
    }

    #[test]
    fn equality_ignores_id_and_precedence() {
        let mut tab = SymbolTable::new();
        let x = tab.terminal('x' as u32).unwrap();
        let e = tab.nonterminal("E").unwrap();
        let f = tab.nonterminal("F").unwrap();
        let a = Rule::new(1, e) >> [x];
        let b = (Rule::new(2, e) >> [x]).with_prec(9);
        let c = Rule::new(1, f) >> [x];
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_rule_displays_arrow_only() {
        let mut tab = SymbolTable::new();
        let e = tab.nonterminal("E").unwrap();
        let r = Rule::new(1, e);
        assert!(r.is_empty());
        assert_eq!(r.display(&tab), "E ->");
    }
}
