//! Grammar compiler for `lrforge`.
//!
//! Reads a textual grammar file ([`GrammarFile`]), configures the LR(1)
//! automaton, and writes the parse table in the format
//! [`lrforge::Grammar::load_table`] reads back. An optional report lists the
//! rules, FIRST sets, item sets and any conflicts.

mod compile;
mod grammar_file;
pub mod report;

pub use compile::{compile, compile_source, Summary};
pub use grammar_file::{GrammarFile, GrammarSymbol, PrecedenceDecl, Production, Terminal};
