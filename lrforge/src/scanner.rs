//! Table-driven lexical scanner.
//!
//! Each input character is reduced to a [`CharClass`], and a small DFA over
//! classes recognises one token at a time with maximal munch: the scanner
//! keeps the longest accepted prefix and rewinds to just after it when the
//! DFA gets stuck.
//!
//! Angle brackets open a "bracketed reference" context tracked on a mode
//! stack. Inside `<...>` signs, dots and exponent letters count as
//! alphabetic, so `<a-b.c>` is one identifier. `:` moves to the spec part of
//! the reference, and `[...]` inside it scans normally again so numbers keep
//! their meaning.

use crate::{ParseError, Pos, Token, TokenKind, TokenValue};
use smartstring::alias::String;

/// Supplies tokens to the [`Parser`](crate::Parser).
pub trait TokenSource {
    /// Resets the source to scan `text` from the beginning.
    fn set_input(&mut self, text: &str);

    /// Next token; once the input is exhausted every call returns an end
    /// token.
    fn scan_one_token(&mut self) -> Result<Token, ParseError>;
}

/// Character classes the DFA runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CharClass {
    Quote,
    Sign,
    Symbol,
    Exponent,
    Alpha,
    Digit,
    Dot,
    Whitespace,
    Error,
}

const N_CLASSES: usize = 9;

impl CharClass {
    /// Class of `ch` outside any bracketed reference.
    pub fn of(ch: char) -> CharClass {
        match ch {
            '"' => CharClass::Quote,
            '+' | '-' => CharClass::Sign,
            'e' | 'E' => CharClass::Exponent,
            'a'..='z' | 'A'..='Z' | '_' => CharClass::Alpha,
            '0'..='9' => CharClass::Digit,
            '.' => CharClass::Dot,
            ' ' | '\t' | '\n' | '\r' => CharClass::Whitespace,
            '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>' | ':' | ';' | ',' | '*' | '/' | '^'
            | '%' | '=' | '!' | '&' | '|' | '?' | '~' | '@' | '$' => CharClass::Symbol,
            _ => CharClass::Error,
        }
    }
}

/// Lexical context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Inside `<`, before any `:`.
    Bracket,
    /// Inside `<name:`.
    Spec,
    /// Inside `[` within a reference.
    TimeSpec,
}

impl Mode {
    fn classify(self, ch: char) -> CharClass {
        let class = CharClass::of(ch);
        match (self, class) {
            (
                Mode::Bracket | Mode::Spec,
                CharClass::Sign | CharClass::Dot | CharClass::Exponent,
            ) => CharClass::Alpha,
            _ => class,
        }
    }
}

/// What an accepting DFA state produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    No,
    Punct,
    Ident,
    Int,
    Float,
    Space,
    Str,
}

const X: u8 = u8::MAX;

// States: 0 start, 1 in string, 2 sign, 3 symbol, 4 ident, 5 int, 6 dot,
// 7 whitespace, 8 string, 9 fraction, 10 exponent mark, 11 exponent sign,
// 12 exponent digits.
#[rustfmt::skip]
const TRANSITIONS: [[u8; N_CLASSES]; 13] = [
    //  Q   S   P   E   A   D   O   W   X
    [   1,  2,  3,  4,  4,  5,  6,  7,  X ],
    [   8,  1,  1,  1,  1,  1,  1,  1,  1 ],
    [   X,  X,  X,  X,  X,  X,  X,  X,  X ],
    [   X,  X,  X,  X,  X,  X,  X,  X,  X ],
    [   X,  X,  X,  4,  4,  4,  4,  X,  X ],
    [   X,  X,  X, 10,  X,  5,  9,  X,  X ],
    [   X,  X,  X,  X,  X,  9,  X,  X,  X ],
    [   X,  X,  X,  X,  X,  X,  X,  7,  X ],
    [   X,  X,  X,  X,  X,  X,  X,  X,  X ],
    [   X,  X,  X, 10,  X,  9,  X,  X,  X ],
    [   X, 11,  X,  X,  X, 12,  X,  X,  X ],
    [   X,  X,  X,  X,  X, 12,  X,  X,  X ],
    [   X,  X,  X,  X,  X, 12,  X,  X,  X ],
];

const ACCEPTS: [Accept; 13] = [
    Accept::No,
    Accept::No,
    Accept::Punct,
    Accept::Punct,
    Accept::Ident,
    Accept::Int,
    Accept::Punct,
    Accept::Space,
    Accept::Str,
    Accept::Float,
    Accept::No,
    Accept::No,
    Accept::Float,
];

#[derive(Debug, Clone, Default)]
pub struct ScannerStats {
    pub tokens: usize,
    pub chars: usize,
    pub rewinds: usize,
}

/// The built-in scanner.
///
/// Produces [`TokenKind`] tokens for literals, identifiers and whitespace,
/// and single-character tokens for punctuation and signs.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    chars: Vec<char>,
    cursor: usize,
    modes: Vec<Mode>,
    stats: ScannerStats,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(text: &str) -> Self {
        let mut scanner = Self::new();
        scanner.set_input(text);
        scanner
    }

    /// Current lexical mode.
    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Normal)
    }

    pub fn stats(&self) -> ScannerStats {
        self.stats.clone()
    }

    /// Scans all of `text`, ending with the end token.
    pub fn scan_all(&mut self, text: &str) -> Result<Vec<Token>, ParseError> {
        self.set_input(text);
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_one_token()?;
            let end = token.is_end();
            tokens.push(token);
            if end {
                return Ok(tokens);
            }
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().copied().collect()
    }

    fn token(&self, accept: Accept, start: usize, end: usize) -> Result<Token, ParseError> {
        let pos = Pos::new(start, end - 1);
        let text = self.text(start, end);
        let (kind, value) = match accept {
            Accept::Punct => return Ok(Token::punct(pos, self.chars[start])),
            Accept::Space => (TokenKind::Whitespace, TokenValue::None),
            Accept::Str => (
                TokenKind::Str,
                TokenValue::Str(self.text(start + 1, end - 1)),
            ),
            Accept::Ident => match text.as_str() {
                "true" => (TokenKind::Bool, TokenValue::Bool(true)),
                "false" => (TokenKind::Bool, TokenValue::Bool(false)),
                _ => (TokenKind::Ident, TokenValue::Ident(text)),
            },
            Accept::Int => match text.parse::<i64>() {
                Ok(n) => (TokenKind::Int, TokenValue::Int(n)),
                Err(_) => {
                    return Err(ParseError::Lexical {
                        pos,
                        found: text.to_string(),
                    })
                }
            },
            Accept::Float => match text.parse::<f64>() {
                Ok(x) => (TokenKind::Float, TokenValue::Float(x)),
                Err(_) => {
                    return Err(ParseError::Lexical {
                        pos,
                        found: text.to_string(),
                    })
                }
            },
            Accept::No => unreachable!("token built from a non-accepting state"),
        };
        Ok(Token::new(pos, kind.type_id(), value))
    }

    fn update_mode(&mut self, token: &Token) {
        let Some(ch) = token.as_char() else {
            return;
        };
        match (ch, self.mode()) {
            ('<', _) => self.modes.push(Mode::Bracket),
            (':', Mode::Bracket) => {
                self.modes.pop();
                self.modes.push(Mode::Spec);
            }
            ('[', Mode::Bracket | Mode::Spec) => self.modes.push(Mode::TimeSpec),
            (']', Mode::TimeSpec) | ('>', Mode::Bracket | Mode::Spec) => {
                self.modes.pop();
            }
            _ => {}
        }
    }
}

impl TokenSource for Scanner {
    fn set_input(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = 0;
        self.modes.clear();
    }

    fn scan_one_token(&mut self) -> Result<Token, ParseError> {
        let start = self.cursor;
        if start >= self.chars.len() {
            return Ok(Token::end(self.chars.len()));
        }
        let mode = self.mode();
        let mut state = 0;
        let mut best = None;
        let mut i = start;
        while let Some(&ch) = self.chars.get(i) {
            let next = TRANSITIONS[state][mode.classify(ch) as usize];
            if next == X {
                break;
            }
            state = next as usize;
            i += 1;
            self.stats.chars += 1;
            if ACCEPTS[state] != Accept::No {
                best = Some((i, ACCEPTS[state]));
            }
        }

        let Some((end, accept)) = best else {
            return Err(match self.chars.get(i) {
                Some(&ch) => ParseError::Lexical {
                    pos: Pos::at(i),
                    found: ch.to_string(),
                },
                None => ParseError::UnexpectedEnd {
                    pos: Pos::at(self.chars.len()),
                },
            });
        };
        if end < i {
            self.stats.rewinds += 1;
        }
        let token = self.token(accept, start, end)?;
        self.cursor = end;
        self.update_mode(&token);
        self.stats.tokens += 1;
        log::trace!("scanned {} at {} in {:?} mode", token, token.pos, mode);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn kinds(tokens: &[Token]) -> Vec<u32> {
        tokens.iter().map(|t| t.ttype).collect()
    }

    fn ty(kind: TokenKind) -> u32 {
        kind.type_id()
    }

    #[test]
    fn dot_is_folded_into_identifier() {
        init_logger();
        let tokens = Scanner::new().scan_all("alpha.1").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, TokenValue::Ident("alpha.1".into()));
        assert_eq!(tokens[0].pos, Pos::new(0, 6));
        assert!(tokens[1].is_end());
    }

    #[test]
    fn numbers() {
        let tokens = Scanner::new().scan_all("3.14").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Float(3.14));
        assert_eq!(tokens.len(), 2);

        let tokens = Scanner::new().scan_all("3 .5").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                ty(TokenKind::Int),
                ty(TokenKind::Whitespace),
                ty(TokenKind::Float),
                ty(TokenKind::End)
            ]
        );
        assert_eq!(tokens[0].value, TokenValue::Int(3));
        assert_eq!(tokens[2].value, TokenValue::Float(0.5));

        let tokens = Scanner::new().scan_all("2e-3 7E2").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Float(0.002));
        assert_eq!(tokens[2].value, TokenValue::Float(700.0));
    }

    #[test]
    fn incomplete_exponent_rewinds() {
        let mut scanner = Scanner::new();
        let tokens = scanner.scan_all("3e+").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Int(3));
        assert_eq!(tokens[1].value, TokenValue::Ident("e".into()));
        assert_eq!(tokens[2].as_char(), Some('+'));
        assert!(scanner.stats().rewinds >= 1);
    }

    #[test]
    fn brackets_change_classes() {
        let mut scanner = Scanner::new();
        scanner.set_input("<a-b.c>");
        let lt = scanner.scan_one_token().unwrap();
        assert_eq!(lt.as_char(), Some('<'));
        assert_eq!(scanner.mode(), Mode::Bracket);
        let name = scanner.scan_one_token().unwrap();
        assert_eq!(name.value, TokenValue::Ident("a-b.c".into()));
        let gt = scanner.scan_one_token().unwrap();
        assert_eq!(gt.as_char(), Some('>'));
        assert_eq!(scanner.mode(), Mode::Normal);
        assert!(scanner.scan_one_token().unwrap().is_end());

        let tokens = scanner.scan_all("a-b").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].as_char(), Some('-'));
        let tokens = scanner.scan_all("-").unwrap();
        assert_eq!(tokens[0], Token::punct(Pos::at(0), '-'));
    }

    #[test]
    fn spec_and_time_spec_modes() {
        let mut scanner = Scanner::new();
        scanner.set_input("<x:y.z[1.5]>");
        let mut modes = Vec::new();
        let mut values = Vec::new();
        loop {
            let t = scanner.scan_one_token().unwrap();
            if t.is_end() {
                break;
            }
            modes.push(scanner.mode());
            values.push(t.value);
        }
        assert_eq!(
            modes,
            vec![
                Mode::Bracket,
                Mode::Bracket,
                Mode::Spec,
                Mode::Spec,
                Mode::TimeSpec,
                Mode::TimeSpec,
                Mode::Spec,
                Mode::Normal
            ]
        );
        assert_eq!(values[3], TokenValue::Ident("y.z".into()));
        assert_eq!(values[5], TokenValue::Float(1.5));
    }

    #[test]
    fn strings_and_booleans() {
        let tokens = Scanner::new().scan_all("\"a b#\" true false truth").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Str("a b#".into()));
        assert_eq!(tokens[0].pos, Pos::new(0, 5));
        assert_eq!(tokens[2].value, TokenValue::Bool(true));
        assert_eq!(tokens[2].ttype, ty(TokenKind::Bool));
        assert_eq!(tokens[4].value, TokenValue::Bool(false));
        assert_eq!(tokens[6].value, TokenValue::Ident("truth".into()));
    }

    #[test]
    fn unterminated_string_is_unexpected_end() {
        let err = Scanner::new().scan_all("1 + \"abc").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEnd { pos: Pos::at(8) });
    }

    #[test]
    fn invalid_character_is_lexical_error() {
        let err = Scanner::new().scan_all("1 # 2").unwrap_err();
        assert_eq!(
            err,
            ParseError::Lexical {
                pos: Pos::at(2),
                found: "#".into()
            }
        );
    }

    #[test]
    fn integer_overflow_is_lexical_error() {
        let err = Scanner::new().scan_all("99999999999999999999").unwrap_err();
        assert!(matches!(err, ParseError::Lexical { .. }));
    }

    #[test]
    fn end_repeats() {
        let mut scanner = Scanner::with_input("x");
        scanner.scan_one_token().unwrap();
        assert_eq!(scanner.scan_one_token().unwrap(), Token::end(1));
        assert_eq!(scanner.scan_one_token().unwrap(), Token::end(1));
        assert_eq!(scanner.stats().tokens, 1);
    }
}
