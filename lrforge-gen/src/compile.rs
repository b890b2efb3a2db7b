//! Grammar file → parse table.

use crate::{report, GrammarFile};
use anyhow::{Context, Result};
use lrforge::write_table;
use std::io::Write;
use std::path::Path;

/// Sizes of a compiled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub rules: usize,
    pub symbols: usize,
    pub states: usize,
}

/// Compiles grammar text, writing the table to `table` and, if given, a
/// report to `report`.
///
/// The report is written even when configuration fails, so that the
/// conflicting sets can be inspected. The table is written only on success.
/// A conflict failure is returned as [`lrforge::ConfigError::Conflicts`].
pub fn compile_source<W: Write>(
    source: &str,
    table: W,
    report: Option<&mut dyn Write>,
) -> Result<Summary> {
    let file = GrammarFile::parse(source)?;
    let tab = file.symbols()?;
    let mut grammar = file.grammar(&tab)?;
    let configured = grammar.configure();

    if let Some(out) = report {
        report::write_report(out, &grammar)?;
    }
    configured?;

    write_table(&grammar, table)?;
    let summary = Summary {
        rules: grammar.rules().len(),
        symbols: tab.len(),
        states: grammar.states().len(),
    };
    log::info!(
        "compiled {} rules over {} symbols into {} states",
        summary.rules,
        summary.symbols,
        summary.states
    );
    Ok(summary)
}

/// Compiles the grammar file at `grammar` into a table file at `output`.
/// An existing output file is left untouched if compilation fails.
pub fn compile<P: AsRef<Path>>(grammar: P, output: P, report: Option<P>) -> Result<Summary> {
    let grammar = grammar.as_ref();
    let source = std::fs::read_to_string(grammar)
        .with_context(|| format!("reading {}", grammar.display()))?;

    let mut report_file = match &report {
        Some(path) => {
            let path = path.as_ref();
            Some(
                std::fs::File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?,
            )
        }
        None => None,
    };

    let mut table = Vec::new();
    let summary = compile_source(
        &source,
        &mut table,
        report_file.as_mut().map(|f| f as &mut dyn Write),
    )
    .with_context(|| format!("compiling {}", grammar.display()))?;

    let output = output.as_ref();
    std::fs::write(output, table).with_context(|| format!("writing {}", output.display()))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrforge::{ConfigError, SymbolTable, TokenKind, Grammar};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const EXPR: &str = "\
%left 10 + -
%left 20 * /
E -> E + E
E -> E - E
E -> E * E
E -> E / E
E -> ( E )
E -> int
";

    #[test]
    fn compiles_and_reloads() {
        init_logger();
        let mut table = Vec::new();
        let summary = compile_source(EXPR, &mut table, None).unwrap();
        assert_eq!(summary.rules, 7);
        assert!(summary.states > 0);

        let file = GrammarFile::parse(EXPR).unwrap();
        let tab = file.symbols().unwrap();
        let mut g = file.grammar(&tab).unwrap();
        g.load_table(&table[..]).unwrap();
        assert_eq!(g.states().len(), summary.states);
    }

    #[test]
    fn conflicts_produce_report_but_no_table() {
        init_logger();
        let mut table = Vec::new();
        let mut report = Vec::new();
        let err = compile_source(
            "E -> E + E\nE -> int\n",
            &mut table,
            Some(&mut report as &mut dyn Write),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Conflicts(c)) if !c.is_empty()
        ));
        assert!(table.is_empty());
        assert!(String::from_utf8(report).unwrap().contains("CONFLICT"));
    }

    #[test]
    fn bad_grammar_is_an_error() {
        let mut table = Vec::new();
        assert!(compile_source("E -> Missing\n", &mut table, None).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn table_matches_hand_built_grammar() {
        let mut table = Vec::new();
        compile_source("S -> ( S )\nS -> int\n", &mut table, None).unwrap();

        let mut tab = SymbolTable::new();
        let s = tab.nonterminal("S").unwrap();
        let lp = tab.terminal('(' as u32).unwrap();
        let rp = tab.terminal(')' as u32).unwrap();
        let int = tab.terminal(TokenKind::Int.type_id()).unwrap();
        let mut g = Grammar::new(&tab);
        g.add_rule(lrforge::Rule::new(1, s) >> [lp, s, rp]);
        g.add_rule(lrforge::Rule::new(2, s) >> [int]);
        g.set_start(s);
        g.configure().unwrap();

        let mut expected = Vec::new();
        write_table(&g, &mut expected).unwrap();
        assert_eq!(String::from_utf8(table).unwrap(), String::from_utf8(expected).unwrap());
    }
}
