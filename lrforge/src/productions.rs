//! Nullability and FIRST sets over a rule table.

use crate::{Rule, SymbolId, SymbolSet, SymbolTable};

/// A read-only view of a grammar's rules with per-symbol nullability and
/// FIRST sets precomputed.
///
/// Both are the least fixed point of the usual equations, iterated until
/// nothing changes, so left recursion and longer nullable cycles
/// (`A -> B`, `B -> A`, `A ->`) terminate with the right answer.
pub struct Productions<'a> {
    pub symbols: &'a SymbolTable,
    pub rules: &'a [Rule],
    nullable: SymbolSet,
    first: Vec<SymbolSet>,
}

impl<'a> Productions<'a> {
    pub fn new(symbols: &'a SymbolTable, rules: &'a [Rule]) -> Self {
        let (first, nullable) = first_sets(symbols, rules);
        Self {
            symbols,
            rules,
            nullable,
            first,
        }
    }

    /// Whether `sym` can derive the empty string. Terminals never can.
    #[inline]
    pub fn is_nullable(&self, sym: SymbolId) -> bool {
        self.nullable.contains(sym)
    }

    /// FIRST set of a single symbol; a terminal's is itself.
    #[inline]
    pub fn first(&self, sym: SymbolId) -> &SymbolSet {
        &self.first[sym.index()]
    }

    #[inline]
    pub fn is_terminal(&self, sym: SymbolId) -> bool {
        self.symbols.is_terminal(sym)
    }

    /// Rules with `lhs` on the left, in rule-table order.
    pub fn rules_for(&self, lhs: SymbolId) -> impl Iterator<Item = &'a Rule> + '_ {
        self.rules.iter().filter(move |r| r.lhs() == lhs)
    }
}

fn first_sets(symbols: &SymbolTable, rules: &[Rule]) -> (Vec<SymbolSet>, SymbolSet) {
    let mut first = vec![SymbolSet::new(); symbols.len()];
    let mut nullable = SymbolSet::new();
    for (id, sym) in symbols.iter() {
        if sym.is_terminal() {
            first[id.index()].insert(id);
        }
    }
    let mut changed = true;
    while changed {
        changed = false;
        for rule in rules {
            let lhs = rule.lhs();
            let mut all_nullable = true;
            for &sym in rule.rhs().iter() {
                let first_sym = first[sym.index()];
                changed |= first[lhs.index()].merge(&first_sym);
                if !nullable.contains(sym) {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable {
                changed |= nullable.insert(lhs);
            }
        }
    }
    (first, nullable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grammar, Sequence};

    #[test]
    fn indirect_nullable_cycle_terminates() {
        // A -> B ; B -> A ; B -> x ; C -> A y
        let mut tab = SymbolTable::new();
        let x = tab.terminal('x' as u32).unwrap();
        let y = tab.terminal('y' as u32).unwrap();
        let a = tab.nonterminal("A").unwrap();
        let b = tab.nonterminal("B").unwrap();
        let c = tab.nonterminal("C").unwrap();
        let mut g = Grammar::new(&tab);
        g.add_rule(Rule::new(1, a) >> [b]);
        g.add_rule(Rule::new(2, b) >> [a]);
        g.add_rule(Rule::new(3, b) >> [x]);
        g.add_rule(Rule::new(4, c) >> [a, y]);
        let prods = Productions::new(&tab, g.rules());
        assert!(!prods.is_nullable(a));
        assert!(!prods.is_nullable(b));
        assert_eq!(*prods.first(a), SymbolSet::single(x));
        assert_eq!(*prods.first(c), SymbolSet::single(x));

        g.add_rule(Rule::new(5, a) >> Sequence::new());
        let prods = Productions::new(&tab, g.rules());
        assert!(prods.is_nullable(a));
        assert!(prods.is_nullable(b));
        assert_eq!(*prods.first(c), [x, y].into_iter().collect::<SymbolSet>());
    }

    #[test]
    fn left_recursion_keeps_first_set_finite() {
        // E -> E + n | n
        let mut tab = SymbolTable::new();
        let plus = tab.terminal('+' as u32).unwrap();
        let n = tab.terminal('n' as u32).unwrap();
        let e = tab.nonterminal("E").unwrap();
        let mut g = Grammar::new(&tab);
        g.add_rule(Rule::new(1, e) >> [e, plus, n]);
        g.add_rule(Rule::new(2, e) >> [n]);
        let prods = Productions::new(&tab, g.rules());
        assert_eq!(*prods.first(e), SymbolSet::single(n));
        assert_eq!(*prods.first(plus), SymbolSet::single(plus));
        assert_eq!(prods.rules_for(e).count(), 2);
    }
}
