//! LR(1) items and the item sets that become automaton states.

use crate::{Productions, SymbolId, SymbolSet, SymbolTable};
use std::collections::BTreeMap;
use std::fmt::Write;

/// An LR(1) item: a rule, a dot position within its right-hand side, and the
/// set of terminals that may follow once the rule is reduced.
///
/// For `E -> E + T` with the dot after the first symbol, `rule` is the index
/// of that production and `dot` is 1: `E -> E . + T`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ConfiguratingItem {
    /// Index of the rule in the grammar's rule table.
    pub rule: usize,
    /// Number of right-hand-side symbols already matched.
    pub dot: usize,
    pub follow: SymbolSet,
}

impl ConfiguratingItem {
    pub fn new(rule: usize, dot: usize, follow: SymbolSet) -> Self {
        Self { rule, dot, follow }
    }

    /// Whether the dot sits at the end of the rule.
    pub fn can_reduce(&self, prods: &Productions) -> bool {
        self.dot >= prods.rules[self.rule].len()
    }

    /// The symbol right after the dot, `None` when the item can reduce.
    pub fn next_symbol(&self, prods: &Productions) -> Option<SymbolId> {
        prods.rules[self.rule].rhs().get(self.dot).copied()
    }

    /// The items predicted by this one.
    ///
    /// If the symbol after the dot is a nonterminal `X`, every rule
    /// `X -> ...` contributes an item with the dot at 0 and follow set
    /// FIRST(rest), plus this item's own follow set when the rest is
    /// nullable. Otherwise nothing is predicted.
    pub fn create_closure(&self, prods: &Productions) -> Vec<ConfiguratingItem> {
        let s = prods.rules[self.rule].rhs().subsequence(self.dot);
        let Some(&x) = s.first() else {
            return Vec::new();
        };
        if prods.is_terminal(x) {
            return Vec::new();
        }
        let remaining = s.subsequence(1);
        let mut follow = remaining.first_set(prods);
        if remaining.is_nullable(prods) {
            follow.merge(&self.follow);
        }
        prods
            .rules_for(x)
            .map(|r| ConfiguratingItem::new(r.index(), 0, follow))
            .collect()
    }

    /// `E -> E . + T, {end, +}`
    pub fn display(&self, prods: &Productions) -> String {
        let symbols = prods.symbols;
        let rule = &prods.rules[self.rule];
        let mut out = format!("{} ->", symbols.name(rule.lhs()));
        for (i, &sym) in rule.rhs().iter().enumerate() {
            if i == self.dot {
                out.push_str(" .");
            }
            let _ = write!(out, " {}", symbols.name(sym));
        }
        if self.dot >= rule.len() {
            out.push_str(" .");
        }
        let _ = write!(out, ", {{{}}}", names(symbols, &self.follow));
        out
    }
}

fn names(symbols: &SymbolTable, set: &SymbolSet) -> String {
    set.iter()
        .map(|s| symbols.name(s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A collection of items under construction as one automaton state.
///
/// Items with the same rule and dot are always merged into one item whose
/// follow set is the union, so a set never holds two items that differ
/// only in lookahead. Once the grammar has processed the set it also
/// carries the shift map (symbol → successor set), the reduce map
/// (terminal → rule index) and a conflict flag.
#[derive(Clone, Debug, Default)]
pub struct ConfiguratingSet {
    items: Vec<ConfiguratingItem>,
    pub(crate) shifts: BTreeMap<SymbolId, usize>,
    pub(crate) reduces: BTreeMap<SymbolId, usize>,
    pub(crate) conflicted: bool,
}

impl ConfiguratingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ConfiguratingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shifts(&self) -> &BTreeMap<SymbolId, usize> {
        &self.shifts
    }

    pub fn reduces(&self) -> &BTreeMap<SymbolId, usize> {
        &self.reduces
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflicted
    }

    /// Adds `item`, merging its follow set into an existing item with the
    /// same rule and dot. Returns whether the set changed.
    pub fn add_item(&mut self, item: ConfiguratingItem) -> bool {
        match self
            .items
            .iter_mut()
            .find(|it| it.rule == item.rule && it.dot == item.dot)
        {
            Some(existing) => existing.follow.merge(&item.follow),
            None => {
                self.items.push(item);
                true
            }
        }
    }

    /// Expands the set with predicted items until nothing changes.
    pub fn close(&mut self, prods: &Productions) {
        let mut changed = true;
        while changed {
            changed = false;
            let mut i = 0;
            while i < self.items.len() {
                for item in self.items[i].create_closure(prods) {
                    changed |= self.add_item(item);
                }
                i += 1;
            }
        }
    }

    /// Symbols right after the dot of items that cannot reduce.
    pub fn shift_symbols(&self, prods: &Productions) -> SymbolSet {
        self.items
            .iter()
            .filter_map(|it| it.next_symbol(prods))
            .collect()
    }

    /// Items advanced over `sym`, not yet closed.
    pub fn shift_set(&self, sym: SymbolId, prods: &Productions) -> ConfiguratingSet {
        let mut set = ConfiguratingSet::new();
        for it in &self.items {
            if it.next_symbol(prods) == Some(sym) {
                set.add_item(ConfiguratingItem::new(it.rule, it.dot + 1, it.follow));
            }
        }
        set
    }

    /// Union of the follow sets of reducible items.
    pub fn reduce_symbols(&self, prods: &Productions) -> SymbolSet {
        let mut set = SymbolSet::new();
        for it in self.items.iter().filter(|it| it.can_reduce(prods)) {
            set.merge(&it.follow);
        }
        set
    }

    /// Rules of reducible items whose follow set contains `sym`, in item
    /// order.
    pub fn reduce_rules(&self, sym: SymbolId, prods: &Productions) -> Vec<usize> {
        self.items
            .iter()
            .filter(|it| it.can_reduce(prods) && it.follow.contains(sym))
            .map(|it| it.rule)
            .collect()
    }

    /// Sorted (rule, dot) pairs, ignoring follow sets. Equal sets have equal
    /// cores, so the core narrows the search for an existing state before
    /// the full comparison.
    pub fn core(&self) -> Vec<(usize, usize)> {
        let mut core: Vec<_> = self.items.iter().map(|it| (it.rule, it.dot)).collect();
        core.sort_unstable();
        core
    }
}

/// Item sets are equal when they hold the same items in any order.
impl PartialEq for ConfiguratingSet {
    fn eq(&self, other: &ConfiguratingSet) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().all(|it| other.items.contains(it))
    }
}

impl Eq for ConfiguratingSet {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grammar, Rule};

    // E -> E + T | T ; T -> n | ( E )
    struct Fixture {
        tab: SymbolTable,
        plus: SymbolId,
        n: SymbolId,
        lp: SymbolId,
        rp: SymbolId,
        e: SymbolId,
        t: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut tab = SymbolTable::new();
        let plus = tab.terminal('+' as u32).unwrap();
        let n = tab.terminal('n' as u32).unwrap();
        let lp = tab.terminal('(' as u32).unwrap();
        let rp = tab.terminal(')' as u32).unwrap();
        let e = tab.nonterminal("E").unwrap();
        let t = tab.nonterminal("T").unwrap();
        Fixture {
            tab,
            plus,
            n,
            lp,
            rp,
            e,
            t,
        }
    }

    fn grammar(f: &Fixture) -> Grammar<'_> {
        let mut g = Grammar::new(&f.tab);
        g.add_rule(Rule::new(1, f.e) >> [f.e, f.plus, f.t]);
        g.add_rule(Rule::new(2, f.e) >> [f.t]);
        g.add_rule(Rule::new(3, f.t) >> [f.n]);
        g.add_rule(Rule::new(4, f.t) >> [f.lp, f.e, f.rp]);
        g.set_start(f.e);
        g
    }

    fn start_set(prods: &Productions) -> ConfiguratingSet {
        let mut set = ConfiguratingSet::new();
        set.add_item(ConfiguratingItem::new(0, 0, SymbolSet::single(SymbolId::END)));
        set.close(prods);
        set
    }

    #[test]
    fn closure_predicts_all_rules() {
        let f = fixture();
        let g = grammar(&f);
        let prods = Productions::new(&f.tab, g.rules());
        let set = start_set(&prods);
        // $start -> . E, E -> . E + T, E -> . T, T -> . n, T -> . ( E )
        assert_eq!(set.len(), 5);
        let e_plus_t = set.items().iter().find(|it| it.rule == 1).unwrap();
        assert_eq!(
            e_plus_t.follow,
            [SymbolId::END, f.plus].into_iter().collect::<SymbolSet>()
        );
        assert_eq!(
            set.shift_symbols(&prods),
            [f.n, f.lp, f.e, f.t].into_iter().collect::<SymbolSet>()
        );
        assert!(set.reduce_symbols(&prods).is_empty());
    }

    #[test]
    fn closure_is_idempotent() {
        let f = fixture();
        let g = grammar(&f);
        let prods = Productions::new(&f.tab, g.rules());
        let once = start_set(&prods);
        let mut twice = once.clone();
        twice.close(&prods);
        assert_eq!(once, twice);
        assert_eq!(once.items(), twice.items());
    }

    #[test]
    fn add_item_merges_follow_sets() {
        let mut set = ConfiguratingSet::new();
        let a = SymbolId::new(2);
        let b = SymbolId::new(3);
        assert!(set.add_item(ConfiguratingItem::new(1, 0, SymbolSet::single(a))));
        assert!(set.add_item(ConfiguratingItem::new(1, 0, SymbolSet::single(b))));
        assert!(!set.add_item(ConfiguratingItem::new(1, 0, SymbolSet::single(a))));
        assert_eq!(set.len(), 1);
        assert_eq!(set.items()[0].follow, [a, b].into_iter().collect::<SymbolSet>());
    }

    #[test]
    fn equality_is_order_insensitive() {
        let x = ConfiguratingItem::new(1, 0, SymbolSet::single(SymbolId::END));
        let y = ConfiguratingItem::new(2, 1, SymbolSet::single(SymbolId::new(5)));
        let mut s1 = ConfiguratingSet::new();
        s1.add_item(x.clone());
        s1.add_item(y.clone());
        let mut s2 = ConfiguratingSet::new();
        s2.add_item(y.clone());
        s2.add_item(x.clone());
        assert_eq!(s1, s1);
        assert_eq!(s1, s2);
        assert_eq!(s2, s1);
        assert_eq!(s1.core(), s2.core());

        let mut s3 = ConfiguratingSet::new();
        s3.add_item(x);
        s3.add_item(ConfiguratingItem::new(2, 1, SymbolSet::single(SymbolId::END)));
        assert_ne!(s1, s3);
        assert_eq!(s1.core(), s3.core());
    }

    #[test]
    fn shift_set_advances_the_dot() {
        let f = fixture();
        let g = grammar(&f);
        let prods = Productions::new(&f.tab, g.rules());
        let start = start_set(&prods);
        let mut on_e = start.shift_set(f.e, &prods);
        assert_eq!(on_e.len(), 2);
        on_e.close(&prods);
        assert_eq!(on_e.len(), 2);
        assert_eq!(on_e.reduce_rules(SymbolId::END, &prods), vec![0]);
        assert!(on_e.reduce_rules(f.plus, &prods).is_empty());
        assert_eq!(on_e.shift_symbols(&prods), SymbolSet::single(f.plus));

        let mut on_n = start.shift_set(f.n, &prods);
        on_n.close(&prods);
        assert_eq!(on_n.reduce_rules(f.plus, &prods), vec![3]);
        assert_eq!(
            on_n.reduce_symbols(&prods),
            [SymbolId::END, f.plus].into_iter().collect::<SymbolSet>()
        );
        assert!(on_n.items()[0].can_reduce(&prods));

        let mut on_lp = start.shift_set(f.lp, &prods);
        on_lp.close(&prods);
        let inner = on_lp.items().iter().find(|it| it.rule == 1).unwrap();
        assert_eq!(
            inner.follow,
            [f.plus, f.rp].into_iter().collect::<SymbolSet>()
        );
    }

    #[test]
    fn item_display_marks_the_dot() {
        let f = fixture();
        let g = grammar(&f);
        let prods = Productions::new(&f.tab, g.rules());
        let item = ConfiguratingItem::new(1, 1, SymbolSet::single(SymbolId::END));
        assert_eq!(item.display(&prods), "E -> E . + T, {end}");
        let done = ConfiguratingItem::new(3, 1, SymbolSet::single(f.plus));
        assert_eq!(done.display(&prods), "T -> n ., {+}");
    }
}
