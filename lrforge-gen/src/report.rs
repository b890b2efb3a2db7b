//! Human-readable dumps of a grammar and its automaton.

use lrforge::{Grammar, Productions};
use std::io::{self, Write};

/// Writes the rule table.
///
/// ```text
/// PS,<number of rules>
///
/// P,<index>,<id>,<Lhs> -> <rhs>
/// ```
pub fn write_rules<W: Write + ?Sized>(out: &mut W, grammar: &Grammar) -> io::Result<()> {
    writeln!(out, "PS,{}\n", grammar.rules().len())?;
    for (i, rule) in grammar.rules().iter().enumerate() {
        write!(out, "P,{},{},{}", i, rule.id(), rule.display(grammar.symbols()))?;
        if let Some(prec) = grammar.rule_precedence(rule) {
            write!(out, " [prec {}]", prec)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes FIRST sets, marking nullable nonterminals with `` `empty' ``.
pub fn write_first<W: Write + ?Sized>(out: &mut W, grammar: &Grammar) -> io::Result<()> {
    let symbols = grammar.symbols();
    let prods = Productions::new(symbols, grammar.rules());
    for (id, sym) in symbols.iter().filter(|(_, s)| !s.is_terminal()) {
        write!(out, "FIRST,{},{{", sym.name())?;
        if prods.is_nullable(id) {
            write!(out, "`empty', ")?;
        }
        for t in prods.first(id) {
            write!(out, "{}, ", symbols.name(t))?;
        }
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Writes every item set with its items and actions. Conflicted sets are
/// flagged.
pub fn write_sets<W: Write + ?Sized>(out: &mut W, grammar: &Grammar) -> io::Result<()> {
    let symbols = grammar.symbols();
    let prods = Productions::new(symbols, grammar.rules());
    writeln!(out, "CS,{}\n", grammar.sets().len())?;
    for (i, set) in grammar.sets().iter().enumerate() {
        if set.is_conflicted() {
            writeln!(out, "-- state {} has conflicts", i)?;
        }
        for item in set.items() {
            writeln!(out, "C,{},{}", i, item.display(&prods))?;
        }
        for (&sym, &next) in set.shifts() {
            writeln!(out, "A,{},{},shift {}", i, symbols.name(sym), next)?;
        }
        for (&sym, &rule) in set.reduces() {
            writeln!(out, "A,{},{},reduce {}", i, symbols.name(sym), rule)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_conflicts<W: Write + ?Sized>(out: &mut W, grammar: &Grammar) -> io::Result<()> {
    for conflict in grammar.conflicts() {
        writeln!(out, "CONFLICT,{}", conflict)?;
    }
    Ok(())
}

/// All of the above, separated by blank lines.
pub fn write_report<W: Write + ?Sized>(out: &mut W, grammar: &Grammar) -> io::Result<()> {
    write_rules(out, grammar)?;
    writeln!(out)?;
    write_first(out, grammar)?;
    writeln!(out)?;
    write_sets(out, grammar)?;
    write_conflicts(out, grammar)?;
    Ok(())
}
