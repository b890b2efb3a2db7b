//! Persisted parse tables.
//!
//! A configured grammar's states can be written as a small line-oriented
//! text table and loaded back into a grammar built from the same rules,
//! skipping closure and conflict analysis:
//!
//! ```text
//! -- lrforge parse table
//! RULES,4
//! STATES,7
//! S,0
//! SH,110,1
//! SH,E,2
//! S,1
//! RD,261,3
//! ```
//!
//! A symbol is written as its terminal type id (a character code below 256,
//! a token kind from 256 up) or, for nonterminals, as its name. Lines
//! starting with `--` and blank lines are ignored.

use crate::{Grammar, State, SymbolId, SymbolTable, TableError};
use std::io::{BufRead, Write};

const HEADER: &str = "-- lrforge parse table";

/// Writes the states of a configured grammar.
pub fn write_table<W: Write>(grammar: &Grammar, mut out: W) -> Result<(), TableError> {
    if !grammar.is_configured() {
        return Err(TableError::NotConfigured);
    }
    let symbols = grammar.symbols();
    writeln!(out, "{}", HEADER)?;
    writeln!(out, "RULES,{}", grammar.rules().len())?;
    writeln!(out, "STATES,{}", grammar.states().len())?;
    for (i, state) in grammar.states().iter().enumerate() {
        writeln!(out, "S,{}", i)?;
        for (&sym, &next) in state.shifts() {
            writeln!(out, "SH,{},{}", symbol_field(symbols, sym)?, next)?;
        }
        for (&sym, &rule) in state.reduces() {
            writeln!(out, "RD,{},{}", symbol_field(symbols, sym)?, rule)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn symbol_field(symbols: &SymbolTable, sym: SymbolId) -> Result<String, TableError> {
    let s = symbols.get(sym);
    match s.terminal_type() {
        Some(ttype) => Ok(ttype.to_string()),
        None => {
            let name = s.name();
            if name.is_empty()
                || name.parse::<u32>().is_ok()
                || name.contains(|c: char| c == ',' || c.is_whitespace())
            {
                Err(TableError::UnwritableName { name: name.into() })
            } else {
                Ok(name.to_owned())
            }
        }
    }
}

impl<'s> Grammar<'s> {
    /// Installs states read from a table written by [`write_table`].
    ///
    /// The table must come from a grammar with the same rules; rule count,
    /// symbols and every state and rule index are checked before anything
    /// is installed.
    pub fn load_table<R: BufRead>(&mut self, reader: R) -> Result<(), TableError> {
        let states = TableReader::new(self).read(reader)?;
        log::debug!("loaded {} states from table", states.len());
        self.install_states(states);
        Ok(())
    }
}

struct TableReader<'g, 's> {
    grammar: &'g Grammar<'s>,
    line: usize,
}

impl<'g, 's> TableReader<'g, 's> {
    fn new(grammar: &'g Grammar<'s>) -> Self {
        Self { grammar, line: 0 }
    }

    fn malformed(&self, message: impl Into<String>) -> TableError {
        TableError::Malformed {
            line: self.line,
            message: message.into(),
        }
    }

    fn number(&self, field: Option<&str>, what: &str) -> Result<usize, TableError> {
        let field = field.ok_or_else(|| self.malformed(format!("missing {}", what)))?;
        field
            .trim()
            .parse()
            .map_err(|_| self.malformed(format!("bad {} {:?}", what, field)))
    }

    fn symbol(&self, field: Option<&str>) -> Result<SymbolId, TableError> {
        let symbols = self.grammar.symbols();
        let field = field
            .map(str::trim)
            .ok_or_else(|| self.malformed("missing symbol"))?;
        let found = match field.parse::<u32>() {
            Ok(ttype) => symbols.by_type(ttype),
            Err(_) => symbols
                .by_name(field)
                .filter(|&sym| !symbols.is_terminal(sym)),
        };
        found.ok_or_else(|| TableError::UnknownSymbol {
            line: self.line,
            name: field.to_owned(),
        })
    }

    fn read<R: BufRead>(mut self, reader: R) -> Result<Vec<State>, TableError> {
        let n_rules = self.grammar.rules().len();
        let mut declared_rules = None;
        let mut declared_states = None;
        let mut states: Vec<State> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            self.line += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with("--") {
                continue;
            }
            let mut fields = line.split(',');
            let tag = fields.next().unwrap_or_default();
            match tag {
                "RULES" => {
                    let found = self.number(fields.next(), "rule count")?;
                    if found != n_rules {
                        return Err(TableError::RuleCountMismatch {
                            expected: n_rules,
                            found,
                        });
                    }
                    declared_rules = Some(found);
                }
                "STATES" => {
                    declared_states = Some(self.number(fields.next(), "state count")?);
                }
                "S" => {
                    let index = self.number(fields.next(), "state index")?;
                    if index != states.len() {
                        return Err(self.malformed(format!(
                            "state {} out of order, expected {}",
                            index,
                            states.len()
                        )));
                    }
                    states.push(State::new());
                }
                "SH" | "RD" => {
                    let sym = self.symbol(fields.next())?;
                    let target = self.number(fields.next(), "target")?;
                    let state = states
                        .last_mut()
                        .ok_or_else(|| self.malformed(format!("{} before any state", tag)))?;
                    if tag == "SH" {
                        state.insert_shift(sym, target);
                    } else if target < n_rules {
                        state.insert_reduce(sym, target);
                    } else {
                        return Err(self.malformed(format!("rule {} out of range", target)));
                    }
                }
                other => return Err(self.malformed(format!("unknown record {:?}", other))),
            }
            if fields.next().is_some() {
                return Err(self.malformed("trailing fields"));
            }
        }

        declared_rules.ok_or_else(|| self.malformed("missing RULES record"))?;
        let declared = declared_states.ok_or_else(|| self.malformed("missing STATES record"))?;
        if declared != states.len() || states.is_empty() {
            return Err(self.malformed(format!(
                "{} states declared, {} found",
                declared,
                states.len()
            )));
        }
        for (i, state) in states.iter().enumerate() {
            if let Some(&next) = state.shifts().values().find(|&&next| next >= states.len()) {
                return Err(self.malformed(format!(
                    "state {} shifts to missing state {}",
                    i, next
                )));
            }
        }
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rule, TokenKind};
    use std::io::Cursor;

    // E -> E + E | E * E | ( E ) | int
    fn fixture() -> SymbolTable {
        let mut tab = SymbolTable::new();
        for ch in ['+', '*', '(', ')'] {
            tab.terminal(ch as u32).unwrap();
        }
        tab.terminal(TokenKind::Int.type_id()).unwrap();
        tab.nonterminal("E").unwrap();
        tab
    }

    fn grammar(tab: &SymbolTable) -> Grammar<'_> {
        let t = |ch: char| tab.by_type(ch as u32).unwrap();
        let int = tab.by_type(TokenKind::Int.type_id()).unwrap();
        let e = tab.by_name("E").unwrap();
        let mut g = Grammar::new(tab);
        g.add_rule(Rule::new(1, e) >> [e, t('+'), e]);
        g.add_rule(Rule::new(2, e) >> [e, t('*'), e]);
        g.add_rule(Rule::new(3, e) >> [t('('), e, t(')')]);
        g.add_rule(Rule::new(4, e) >> [int]);
        g.set_start(e);
        g.left(10, &[t('+')]);
        g.left(20, &[t('*')]);
        g
    }

    fn written(g: &Grammar) -> String {
        let mut buf = Vec::new();
        write_table(g, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn round_trip_installs_identical_states() {
        let tab = fixture();
        let mut g = grammar(&tab);
        g.configure().unwrap();
        let text = written(&g);
        assert!(text.starts_with(HEADER));
        assert!(text.contains("SH,E,"));
        assert!(text.contains("RD,261,"));

        let mut h = grammar(&tab);
        assert!(!h.is_configured());
        h.load_table(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(g.states(), h.states());
        assert!(h.sets().is_empty());
        assert_eq!(written(&h), text);
    }

    #[test]
    fn unconfigured_grammar_is_not_written() {
        let tab = fixture();
        let g = grammar(&tab);
        assert!(matches!(
            write_table(&g, Vec::new()),
            Err(TableError::NotConfigured)
        ));
    }

    #[test]
    fn rule_count_must_match() {
        let tab = fixture();
        let mut g = grammar(&tab);
        let err = g
            .load_table(Cursor::new("RULES,3\nSTATES,1\nS,0\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::RuleCountMismatch {
                expected: 5,
                found: 3
            }
        ));
        assert!(!g.is_configured());
    }

    #[test]
    fn rule_count_is_required() {
        let tab = fixture();
        let mut g = grammar(&tab);
        let err = g.load_table(Cursor::new("STATES,1\nS,0\n")).unwrap_err();
        assert!(
            matches!(err, TableError::Malformed { ref message, .. } if message.contains("RULES")),
            "{:?}",
            err
        );
        assert!(!g.is_configured());
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let tab = fixture();
        let mut g = grammar(&tab);
        let err = g
            .load_table(Cursor::new("RULES,5\nSTATES,1\nS,0\nSH,Foo,0\n"))
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownSymbol { line: 4, ref name } if name == "Foo"));

        let err = g
            .load_table(Cursor::new("RULES,5\nSTATES,1\nS,0\nRD,999,1\n"))
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownSymbol { line: 4, .. }));
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let tab = fixture();
        let mut g = grammar(&tab);
        let cases = [
            "RULES,5\nSTATES,1\nSH,43,0\n",
            "RULES,5\nSTATES,1\nS,1\n",
            "RULES,5\nSTATES,2\nS,0\n",
            "RULES,5\nSTATES,1\nS,0\nSH,43,4\n",
            "RULES,5\nSTATES,1\nS,0\nRD,43,9\n",
            "RULES,5\nSTATES,1\nS,0\nXX,1\n",
            "RULES,5\nS,0\n",
            "RULES,5\nSTATES,x\n",
        ];
        for case in cases {
            let err = g.load_table(Cursor::new(case)).unwrap_err();
            assert!(
                matches!(err, TableError::Malformed { .. }),
                "{:?}: {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let tab = fixture();
        let mut g = grammar(&tab);
        g.load_table(Cursor::new("-- hello\n\nRULES,5\n-- x\nSTATES,1\nS,0\n"))
            .unwrap();
        assert_eq!(g.states().len(), 1);
    }
}
