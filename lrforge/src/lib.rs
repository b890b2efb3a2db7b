//! LR(1) grammar compiler and table-driven parsing runtime.
//!
//! A client registers symbols in a [`SymbolTable`], adds [`Rule`]s and
//! operator precedences to a [`Grammar`], and calls
//! [`Grammar::configure`] to build the automaton (or
//! [`Grammar::load_table`] to reload one written by [`write_table`]). A
//! [`Parser`] then drives tokens from a [`TokenSource`], usually the
//! built-in [`Scanner`], through the automaton and hands every reduction to
//! a [`TreeBuilder`].

mod error;
mod grammar;
mod item;
mod parser;
mod pos;
mod productions;
mod rule;
mod scanner;
mod sequence;
mod state;
mod symbol;
mod symbol_set;
mod table;
mod token;

pub use crate::error::{ConfigError, Conflict, ParseError, TableError};
pub use crate::grammar::{Assoc, Grammar};
pub use crate::item::{ConfiguratingItem, ConfiguratingSet};
pub use crate::parser::{Child, Parser, ParserStats, TreeBuilder};
pub use crate::pos::Pos;
pub use crate::productions::Productions;
pub use crate::rule::Rule;
pub use crate::scanner::{CharClass, Mode, Scanner, ScannerStats, TokenSource};
pub use crate::sequence::Sequence;
pub use crate::state::State;
pub use crate::symbol::{Symbol, SymbolId, SymbolKind, SymbolTable, MAX_SYMBOLS};
pub use crate::symbol_set::SymbolSet;
pub use crate::table::write_table;
pub use crate::token::{Token, TokenKind, TokenValue, FIRST_KIND_TYPE};
