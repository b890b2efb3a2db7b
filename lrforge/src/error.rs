//! Error types for grammar construction, table persistence and parsing.
//!
//! Three families are kept apart because they fail at different times:
//!
//! - [`ConfigError`]: building a grammar (symbol registration, conflicts),
//! - [`TableError`]: writing or reloading a persisted parse table,
//! - [`ParseError`]: scanning and parsing one input, always with a [`Pos`].

use crate::Pos;
use thiserror::Error;

/// An automaton conflict found while configuring a grammar.
///
/// Symbol names are captured at detection time so the diagnostic can be
/// printed without the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    /// Shift and reduce both apply and precedence/associativity could not
    /// decide between them.
    #[error("shift/reduce conflict in state {state} on {symbol:?} (reduce by rule {rule}: {rule_text})")]
    ShiftReduce {
        state: usize,
        symbol: String,
        rule: usize,
        rule_text: String,
    },

    /// More than one rule can be reduced on the same lookahead.
    #[error("reduce/reduce conflict in state {state} on {symbol:?} between rules {rules:?}")]
    ReduceReduce {
        state: usize,
        symbol: String,
        rules: Vec<usize>,
    },
}

impl Conflict {
    /// The state the conflict was found in.
    pub fn state(&self) -> usize {
        match self {
            Conflict::ShiftReduce { state, .. } | Conflict::ReduceReduce { state, .. } => *state,
        }
    }
}

/// Grammar-build failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("symbol table is full ({max} symbols)")]
    TooManySymbols { max: usize },

    #[error("symbol {name:?} is already registered with a different kind")]
    DuplicateSymbol { name: String },

    #[error("no start symbol set")]
    NoStartSymbol,

    #[error("start symbol {name:?} is not a nonterminal")]
    StartNotNonTerminal { name: String },

    #[error("rule {id} has terminal {name:?} on its left-hand side")]
    TerminalLhs { id: u32, name: String },

    /// Every unresolved conflict of one configuration pass.
    #[error("{} unresolved conflict(s)", .0.len())]
    Conflicts(Vec<Conflict>),
}

/// Failures writing or reloading a persisted parse table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: unknown symbol {name:?}")]
    UnknownSymbol { line: usize, name: String },

    #[error("table has {found} rules, grammar has {expected}")]
    RuleCountMismatch { expected: usize, found: usize },

    #[error("grammar is not configured")]
    NotConfigured,

    #[error("nonterminal name {name:?} cannot be written to a table")]
    UnwritableName { name: String },
}

/// Scanning and parsing failures for one input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A character with no valid class or transition.
    #[error("unexpected character {found:?} at {pos}")]
    Lexical { pos: Pos, found: String },

    /// Input ended inside a token or an incomplete construct.
    #[error("unexpected end of input at {pos}")]
    UnexpectedEnd { pos: Pos },

    /// A token with no action in the current state.
    #[error("unexpected {found} at {pos}, expected one of: {expected}")]
    Syntactic {
        pos: Pos,
        found: String,
        expected: String,
    },

    /// Client-level validation failed inside a tree builder.
    #[error("{message} at {pos}")]
    Semantic { pos: Pos, message: String },

    /// The tree builder produced no node for a rule it is responsible for.
    #[error("no tree node built for rule id {rule_id} at {pos}")]
    UnhandledReduction { pos: Pos, rule_id: u32 },

    /// The grammar has no installed states.
    #[error("grammar is not configured")]
    NotConfigured,
}

impl ParseError {
    /// Source position of the failure, if it has one.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            ParseError::Lexical { pos, .. }
            | ParseError::UnexpectedEnd { pos }
            | ParseError::Syntactic { pos, .. }
            | ParseError::Semantic { pos, .. }
            | ParseError::UnhandledReduction { pos, .. } => Some(*pos),
            ParseError::NotConfigured => None,
        }
    }

    /// Convenience constructor for tree builders.
    pub fn semantic(pos: Pos, message: impl Into<String>) -> Self {
        ParseError::Semantic {
            pos,
            message: message.into(),
        }
    }
}
