//! Calculator errors.
//!
//! Grammar, table and parse failures from `lrforge` convert with `?`; the
//! remaining variants come from evaluation and carry the position of the
//! offending node.

use lrforge::{ConfigError, ParseError, Pos, TableError};
use smartstring::alias::String;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("unknown variable {name:?} at {pos}")]
    UnknownVariable { name: String, pos: Pos },

    #[error("unknown reference {key:?} at {pos}")]
    UnknownReference { key: String, pos: Pos },

    /// A time index that is not a whole number within the series.
    #[error("time index {index} out of range for {key:?} at {pos}")]
    TimeIndex { key: String, index: f64, pos: Pos },

    #[error("division by zero at {pos}")]
    DivisionByZero { pos: Pos },
}

impl CalcError {
    pub fn pos(&self) -> Option<Pos> {
        match self {
            CalcError::Parse(e) => e.pos(),
            CalcError::Config(_) | CalcError::Table(_) => None,
            CalcError::UnknownVariable { pos, .. }
            | CalcError::UnknownReference { pos, .. }
            | CalcError::TimeIndex { pos, .. }
            | CalcError::DivisionByZero { pos } => Some(*pos),
        }
    }
}
