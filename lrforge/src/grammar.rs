//! Grammar definition and LR(1) automaton construction.

use crate::{
    Conflict, ConfigError, ConfiguratingItem, ConfiguratingSet, Productions, Rule, Sequence,
    State, SymbolId, SymbolSet, SymbolTable,
};
use std::collections::{BTreeMap, HashMap};

/// Operator associativity, consulted when a shift/reduce conflict involves
/// operators of equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Reduce: `a - b - c` groups as `(a - b) - c`.
    Left,
    /// Shift: `a ^ b ^ c` groups as `a ^ (b ^ c)`.
    Right,
    /// Neither: `a < b < c` is a syntax error.
    NonAssoc,
}

/// A set of rules over a borrowed [`SymbolTable`], plus the automaton built
/// from them.
///
/// Rule 0 is always the synthetic `$start -> S` rule; its right-hand side is
/// filled in by [`set_start`](Grammar::set_start). Client rules follow in
/// the order they were added.
///
/// After a successful [`configure`](Grammar::configure) (or
/// [`load_table`](Grammar::load_table)) the grammar holds one [`State`] per
/// automaton state and can drive a [`Parser`](crate::Parser). The states are
/// read-only from then on, so a configured grammar may be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct Grammar<'s> {
    symbols: &'s SymbolTable,
    rules: Vec<Rule>,
    start: Option<SymbolId>,
    precedence: BTreeMap<SymbolId, i32>,
    assoc: BTreeMap<SymbolId, Assoc>,
    sets: Vec<ConfiguratingSet>,
    states: Vec<State>,
    conflicts: Vec<Conflict>,
}

impl<'s> Grammar<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Self {
        Self {
            symbols,
            rules: vec![Rule::new(0, SymbolId::START)],
            start: None,
            precedence: BTreeMap::new(),
            assoc: BTreeMap::new(),
            sets: Vec::new(),
            states: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &'s SymbolTable {
        self.symbols
    }

    /// Appends a rule and returns its index. Any previously built automaton
    /// is discarded.
    pub fn add_rule(&mut self, mut rule: Rule) -> usize {
        let index = self.rules.len();
        rule.set_index(index);
        self.rules.push(rule);
        self.reset();
        index
    }

    /// Sets the start symbol, rewriting rule 0 to `$start -> start`.
    pub fn set_start(&mut self, start: SymbolId) {
        self.start = Some(start);
        self.rules[0].set_rhs(Sequence::from([start]));
        self.reset();
    }

    pub fn start(&self) -> Option<SymbolId> {
        self.start
    }

    /// Binding strength of a terminal; higher binds tighter.
    pub fn set_precedence(&mut self, sym: SymbolId, prec: i32) {
        self.precedence.insert(sym, prec);
    }

    pub fn set_assoc(&mut self, sym: SymbolId, assoc: Assoc) {
        self.assoc.insert(sym, assoc);
    }

    /// Declares `syms` left-associative at precedence `prec`.
    pub fn left(&mut self, prec: i32, syms: &[SymbolId]) {
        self.declare(prec, Assoc::Left, syms);
    }

    /// Declares `syms` right-associative at precedence `prec`.
    pub fn right(&mut self, prec: i32, syms: &[SymbolId]) {
        self.declare(prec, Assoc::Right, syms);
    }

    /// Declares `syms` non-associative at precedence `prec`.
    pub fn nonassoc(&mut self, prec: i32, syms: &[SymbolId]) {
        self.declare(prec, Assoc::NonAssoc, syms);
    }

    fn declare(&mut self, prec: i32, assoc: Assoc, syms: &[SymbolId]) {
        for &sym in syms {
            self.set_precedence(sym, prec);
            self.set_assoc(sym, assoc);
        }
    }

    pub fn precedence(&self, sym: SymbolId) -> Option<i32> {
        self.precedence.get(&sym).copied()
    }

    pub fn assoc(&self, sym: SymbolId) -> Option<Assoc> {
        self.assoc.get(&sym).copied()
    }

    /// The rule's own precedence, else that of its rightmost terminal.
    pub fn rule_precedence(&self, rule: &Rule) -> Option<i32> {
        rule.prec().or_else(|| {
            rule.rhs()
                .last_terminal(self.symbols)
                .and_then(|sym| self.precedence(sym))
        })
    }

    /// All rules, the synthetic start rule first.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Item sets from the last configuration pass, including conflicted
    /// ones from a failed pass.
    pub fn sets(&self) -> &[ConfiguratingSet] {
        &self.sets
    }

    /// Installed automaton states; empty until configured.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Conflicts left unresolved by the last configuration pass.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_configured(&self) -> bool {
        !self.states.is_empty()
    }

    pub(crate) fn install_states(&mut self, states: Vec<State>) {
        self.sets.clear();
        self.conflicts.clear();
        self.states = states;
    }

    fn reset(&mut self) {
        self.sets.clear();
        self.states.clear();
        self.conflicts.clear();
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let start = self.start.ok_or(ConfigError::NoStartSymbol)?;
        if self.symbols.is_terminal(start) {
            return Err(ConfigError::StartNotNonTerminal {
                name: self.symbols.name(start).into(),
            });
        }
        for rule in &self.rules[1..] {
            if self.symbols.is_terminal(rule.lhs()) {
                return Err(ConfigError::TerminalLhs {
                    id: rule.id(),
                    name: self.symbols.name(rule.lhs()).into(),
                });
            }
        }
        Ok(())
    }

    /// Builds the LR(1) automaton.
    ///
    /// Item sets are discovered breadth-first from the closure of
    /// `$start -> . S, {end}`. Shift/reduce conflicts are settled by
    /// precedence and associativity where declared. Every conflict that
    /// remains is logged and returned in [`ConfigError::Conflicts`]; in that
    /// case no states are installed, and the conflicted item sets are left
    /// in [`sets`](Grammar::sets) for inspection.
    pub fn configure(&mut self) -> Result<(), ConfigError> {
        self.reset();
        self.validate()?;

        let prods = Productions::new(self.symbols, &self.rules);
        let mut sets = Vec::new();
        let mut by_core: HashMap<Vec<(usize, usize)>, Vec<usize>> = HashMap::new();
        let mut conflicts = Vec::new();

        let mut seed = ConfiguratingSet::new();
        seed.add_item(ConfiguratingItem::new(0, 0, SymbolSet::single(SymbolId::END)));
        seed.close(&prods);
        by_core.entry(seed.core()).or_default().push(0);
        sets.push(seed);

        let mut j = 0;
        while j < sets.len() {
            let shift_symbols = sets[j].shift_symbols(&prods);
            for sym in shift_symbols.iter() {
                let mut cs = sets[j].shift_set(sym, &prods);
                cs.close(&prods);
                let candidates = by_core.entry(cs.core()).or_default();
                let k = match candidates.iter().copied().find(|&k| sets[k] == cs) {
                    Some(k) => k,
                    None => {
                        let k = sets.len();
                        candidates.push(k);
                        sets.push(cs);
                        k
                    }
                };
                sets[j].shifts.insert(sym, k);
            }

            let reduce_symbols = sets[j].reduce_symbols(&prods);
            for sym in reduce_symbols.iter() {
                let rules = sets[j].reduce_rules(sym, &prods);
                if rules.len() > 1 {
                    sets[j].conflicted = true;
                    conflicts.push(Conflict::ReduceReduce {
                        state: j,
                        symbol: self.symbols.name(sym).into(),
                        rules: rules.clone(),
                    });
                }
                for rule in rules {
                    sets[j].reduces.insert(sym, rule);
                }
            }

            for sym in shift_symbols.intersection(&reduce_symbols).iter() {
                if let Some(conflict) = self.resolve(j, sym, &mut sets[j]) {
                    conflicts.push(conflict);
                }
            }
            j += 1;
        }

        log::debug!(
            "configured {} rules into {} item sets",
            self.rules.len(),
            sets.len()
        );
        self.sets = sets;
        if conflicts.is_empty() {
            self.states = self.sets.iter().map(State::from).collect();
            Ok(())
        } else {
            for conflict in &conflicts {
                log::error!("{}", conflict);
            }
            self.conflicts = conflicts.clone();
            Err(ConfigError::Conflicts(conflicts))
        }
    }

    /// Settles a shift/reduce conflict on `sym` in set `state`, returning it
    /// when neither precedence nor associativity decides.
    fn resolve(&self, state: usize, sym: SymbolId, set: &mut ConfiguratingSet) -> Option<Conflict> {
        let rule_index = *set.reduces.get(&sym)?;
        let rule = &self.rules[rule_index];
        let shift_prec = self.precedence(sym);
        let reduce_prec = self.rule_precedence(rule);
        let same_symbol = rule.rhs().last_terminal(self.symbols) == Some(sym);

        match (shift_prec, reduce_prec) {
            (Some(sp), Some(rp)) if sp > rp => {
                set.reduces.remove(&sym);
                return None;
            }
            (Some(sp), Some(rp)) if sp < rp => {
                set.shifts.remove(&sym);
                return None;
            }
            _ => {}
        }

        let equal = matches!((shift_prec, reduce_prec), (Some(sp), Some(rp)) if sp == rp);
        match self.assoc(sym) {
            Some(assoc) if same_symbol || equal => {
                match assoc {
                    Assoc::Left => {
                        set.shifts.remove(&sym);
                    }
                    Assoc::Right => {
                        set.reduces.remove(&sym);
                    }
                    Assoc::NonAssoc => {
                        set.shifts.remove(&sym);
                        set.reduces.remove(&sym);
                    }
                }
                None
            }
            _ => {
                set.conflicted = true;
                Some(Conflict::ShiftReduce {
                    state,
                    symbol: self.symbols.name(sym).into(),
                    rule: rule_index,
                    rule_text: rule.display(self.symbols),
                })
            }
        }
    }
}
