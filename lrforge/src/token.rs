//! Tokens produced by a [`TokenSource`](crate::TokenSource).
//!
//! A token's type is a `u32`: values below 256 are literal character codes
//! (punctuation such as `+` or `(`), values from 256 upward are multi-character
//! token kinds. The built-in kinds produced by the [`Scanner`](crate::Scanner)
//! are listed in [`TokenKind`]; clients with their own scanners may use any
//! other value above 255.

use crate::Pos;
use smartstring::alias::String;
use std::fmt;

/// First type id available for multi-character token kinds.
pub const FIRST_KIND_TYPE: u32 = 256;

/// Built-in multi-character token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TokenKind {
    Int = 256,
    Float = 257,
    Str = 258,
    Bool = 259,
    Ident = 260,
    End = 261,
    Whitespace = 262,
}

impl TokenKind {
    pub const ALL: [TokenKind; 7] = [
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Str,
        TokenKind::Bool,
        TokenKind::Ident,
        TokenKind::End,
        TokenKind::Whitespace,
    ];

    /// The token type id of this kind.
    #[inline]
    pub fn type_id(self) -> u32 {
        self as u32
    }

    pub fn from_type_id(ttype: u32) -> Option<TokenKind> {
        Self::ALL.into_iter().find(|k| k.type_id() == ttype)
    }

    /// Lowercase name, also used as the default display name of the
    /// terminal symbol registered for this kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::Str => "string",
            TokenKind::Bool => "bool",
            TokenKind::Ident => "ident",
            TokenKind::End => "end",
            TokenKind::Whitespace => "whitespace",
        }
    }

    pub fn from_name(name: &str) -> Option<TokenKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal payload carried by a token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    /// Punctuation, whitespace and end of input.
    #[default]
    None,
    Int(i64),
    Float(f64),
    /// String literal contents, without the quotes.
    Str(String),
    Bool(bool),
    Ident(String),
}

/// A scanned token: position, type id and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub pos: Pos,
    pub ttype: u32,
    pub value: TokenValue,
}

impl Token {
    #[must_use]
    pub fn new(pos: Pos, ttype: u32, value: TokenValue) -> Self {
        Self { pos, ttype, value }
    }

    /// A single-character punctuation token.
    #[must_use]
    pub fn punct(pos: Pos, ch: char) -> Self {
        Self::new(pos, ch as u32, TokenValue::None)
    }

    /// The end-of-input token.
    #[must_use]
    pub fn end(offset: usize) -> Self {
        Self::new(Pos::at(offset), TokenKind::End.type_id(), TokenValue::None)
    }

    /// The built-in kind of this token, `None` for character tokens and
    /// client-defined kinds.
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_type_id(self.ttype)
    }

    /// The literal character of a punctuation token.
    pub fn as_char(&self) -> Option<char> {
        if self.ttype < FIRST_KIND_TYPE {
            char::from_u32(self.ttype)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.ttype == TokenKind::End.type_id()
    }

    /// Tokens the parser skips.
    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.ttype == TokenKind::Whitespace.type_id()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.as_char()) {
            (TokenValue::None, Some(ch)) => write!(f, "'{}'", ch),
            (TokenValue::None, None) => match self.kind() {
                Some(kind) => write!(f, "{}", kind),
                None => write!(f, "token type {}", self.ttype),
            },
            (TokenValue::Int(n), _) => write!(f, "int {}", n),
            (TokenValue::Float(x), _) => write!(f, "float {}", x),
            (TokenValue::Str(s), _) => write!(f, "string {:?}", s.as_str()),
            (TokenValue::Bool(b), _) => write!(f, "bool {}", b),
            (TokenValue::Ident(s), _) => write!(f, "ident {}", s),
        }
    }
}
