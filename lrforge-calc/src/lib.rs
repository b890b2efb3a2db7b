//! # lrforge-calc
//!
//! An arithmetic calculator built on `lrforge`, showing a complete client:
//! a grammar with operator precedence ([`grammar`]), a tree builder
//! ([`CalcBuilder`]), an evaluator ([`Env`]) and the built-in scanner.
//!
//! ```text
//! 1 + 2 * 3        => (1+(2*3))
//! 2 ^ 3 ^ 2        => (2^(3^2))
//! sqrt(<load:avg[0]>) / 2
//! ```

pub mod builder;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod tree;

pub use builder::CalcBuilder;
pub use error::CalcError;
pub use eval::Env;
pub use grammar::{CalcSymbols, NEG_PREC};
pub use tree::{BinOp, Func, Node, NodeKind, Reference};

use lrforge::{Grammar, Parser, ParserStats, Scanner};

/// Parses calculator expressions into [`Node`] trees.
pub struct CalcParser<'g> {
    parser: Parser<'g, Scanner, CalcBuilder>,
}

impl CalcParser<'static> {
    /// A parser over the process-wide calculator grammar.
    pub fn new() -> Result<Self, CalcError> {
        Ok(Self::with_grammar(grammar::grammar()?))
    }
}

impl<'g> CalcParser<'g> {
    /// A parser over `grammar`, which must be built by
    /// [`grammar::build_grammar`] (configured or loaded from a table).
    pub fn with_grammar(grammar: &'g Grammar<'g>) -> Self {
        Self {
            parser: Parser::new(grammar, Scanner::new(), CalcBuilder::new()),
        }
    }

    pub fn parse(&mut self, text: &str) -> Result<Node, CalcError> {
        Ok(self.parser.parse(text)?)
    }

    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }
}

/// Parses and evaluates `text` in `env`.
pub fn eval(text: &str, env: &Env) -> Result<f64, CalcError> {
    let node = CalcParser::new()?.parse(text)?;
    env.eval(&node)
}
