//! Reader for textual grammar files.
//!
//! One declaration per line:
//!
//! ```text
//! -- comment
//! %start Expr
//! %left 10 + -
//! %right 30 ^
//! add: Expr -> Expr + Expr
//! neg: Expr -> - Expr %prec 25
//! ```
//!
//! Capitalised names are nonterminals, lowercase names are built-in token
//! kinds (`int`, `float`, `string`, `bool`, `ident`) and single punctuation
//! characters are character terminals. A rule may start with a `label:` and
//! may end with `%prec <level>`; its id is its 1-based position among the
//! rules. Without `%start` the first rule's left-hand side is the start
//! symbol.
//!
//! `--` always starts a comment, so two `-` terminals in a row must be
//! written `- -`. A comment glued to the end of a token (`E--`) is rejected.

use anyhow::{anyhow, bail, Result};
use logos::Logos;
use lrforge::{Assoc, Grammar, Rule, SymbolId, SymbolTable, TokenKind};
use smartstring::alias::String;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
enum RawToken {
    #[token("\n")]
    LineFeed,

    #[regex(r"--[^\n]*")]
    Comment,

    #[token("->")]
    Arrow,

    #[regex(r"[a-z][a-zA-Z0-9_]*:")]
    Label,

    #[regex(r"[a-z][a-zA-Z0-9_]*")]
    Atom,

    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    Var,

    #[regex(r"%[a-z]+")]
    Directive,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r###"[-~`!@#$%^&*+=|\\<>?/;\(\)\[\]{},\.'":]"###)]
    Sym,
}

/// A lexed item with its text.
#[derive(Debug, Clone, PartialEq)]
struct Lexeme<'a> {
    kind: RawToken,
    text: &'a str,
}

/// A terminal as written in a grammar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Char(char),
    Kind(TokenKind),
}

impl Terminal {
    pub fn type_id(self) -> u32 {
        match self {
            Terminal::Char(ch) => ch as u32,
            Terminal::Kind(kind) => kind.type_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSymbol {
    Terminal(Terminal),
    NonTerminal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub label: Option<String>,
    pub lhs: String,
    pub rhs: Vec<GrammarSymbol>,
    pub prec: Option<i32>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecedenceDecl {
    pub assoc: Assoc,
    pub level: i32,
    pub terminals: Vec<Terminal>,
}

/// A parsed grammar file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarFile {
    pub start: Option<String>,
    pub precedence: Vec<PrecedenceDecl>,
    pub productions: Vec<Production>,
}

fn lex_lines(source: &str) -> Result<Vec<(usize, Vec<Lexeme<'_>>)>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut line = 1;
    let mut lexer = RawToken::lexer(source);
    while let Some(kind) = lexer.next() {
        let text = lexer.slice();
        match kind {
            Ok(RawToken::LineFeed) => {
                lines.push((line, std::mem::take(&mut current)));
                line += 1;
            }
            Ok(RawToken::Comment) => {
                let start = lexer.span().start;
                if source[..start].ends_with(|c: char| !c.is_whitespace()) {
                    bail!(
                        "line {}: `--` directly after a token; write `- -` for two terminals",
                        line
                    );
                }
            }
            Ok(kind) => current.push(Lexeme { kind, text }),
            Err(()) => bail!("line {}: unexpected {:?}", line, text),
        }
    }
    lines.push((line, current));
    lines.retain(|(_, lexemes)| !lexemes.is_empty());
    Ok(lines)
}

fn terminal(lexeme: &Lexeme, line: usize) -> Result<Terminal> {
    match lexeme.kind {
        RawToken::Sym => lexeme
            .text
            .chars()
            .next()
            .map(Terminal::Char)
            .ok_or_else(|| anyhow!("line {}: empty symbol", line)),
        RawToken::Atom => match TokenKind::from_name(lexeme.text) {
            Some(TokenKind::End | TokenKind::Whitespace) | None => {
                bail!("line {}: {:?} is not a token kind", line, lexeme.text)
            }
            Some(kind) => Ok(Terminal::Kind(kind)),
        },
        _ => bail!("line {}: expected a terminal, found {:?}", line, lexeme.text),
    }
}

fn level(lexeme: Option<&Lexeme>, line: usize) -> Result<i32> {
    match lexeme {
        Some(Lexeme {
            kind: RawToken::Number,
            text,
        }) => Ok(text.parse()?),
        Some(l) => bail!("line {}: expected a precedence level, found {:?}", line, l.text),
        None => bail!("line {}: missing precedence level", line),
    }
}

impl GrammarFile {
    pub fn parse(source: &str) -> Result<Self> {
        let mut file = GrammarFile::default();
        for (line, lexemes) in lex_lines(source)? {
            if lexemes[0].kind == RawToken::Directive {
                file.directive(line, &lexemes)?;
            } else {
                file.production(line, &lexemes)?;
            }
        }
        if file.productions.is_empty() {
            bail!("grammar has no rules");
        }
        Ok(file)
    }

    fn directive(&mut self, line: usize, lexemes: &[Lexeme]) -> Result<()> {
        let assoc = match lexemes[0].text {
            "%start" => {
                return match lexemes {
                    [_, Lexeme {
                        kind: RawToken::Var,
                        text,
                    }] => {
                        self.start = Some((*text).into());
                        Ok(())
                    }
                    _ => bail!("line {}: expected `%start Name`", line),
                }
            }
            "%left" => Assoc::Left,
            "%right" => Assoc::Right,
            "%nonassoc" => Assoc::NonAssoc,
            other => bail!("line {}: unknown directive {}", line, other),
        };
        let level = level(lexemes.get(1), line)?;
        let terminals = lexemes[2..]
            .iter()
            .map(|l| terminal(l, line))
            .collect::<Result<Vec<_>>>()?;
        if terminals.is_empty() {
            bail!("line {}: {} lists no terminals", line, lexemes[0].text);
        }
        self.precedence.push(PrecedenceDecl {
            assoc,
            level,
            terminals,
        });
        Ok(())
    }

    fn production(&mut self, line: usize, mut lexemes: &[Lexeme]) -> Result<()> {
        let mut label = None;
        if let [Lexeme {
            kind: RawToken::Label,
            text,
        }, rest @ ..] = lexemes
        {
            label = Some(text.trim_end_matches(':').into());
            lexemes = rest;
        }
        let (lhs, mut rest) = match lexemes {
            [Lexeme {
                kind: RawToken::Var,
                text,
            }, Lexeme {
                kind: RawToken::Arrow,
                ..
            }, rest @ ..] => (String::from(*text), rest),
            _ => bail!("line {}: expected `Name -> ...`", line),
        };

        let mut prec = None;
        if let Some(i) = rest
            .iter()
            .position(|l| l.kind == RawToken::Directive && l.text == "%prec")
        {
            if i + 2 != rest.len() {
                bail!("line {}: `%prec <level>` must end the rule", line);
            }
            prec = Some(level(rest.get(i + 1), line)?);
            rest = &rest[..i];
        }

        let rhs = rest
            .iter()
            .map(|l| match l.kind {
                RawToken::Var => Ok(GrammarSymbol::NonTerminal(l.text.into())),
                _ => terminal(l, line).map(GrammarSymbol::Terminal),
            })
            .collect::<Result<Vec<_>>>()?;

        self.productions.push(Production {
            label,
            lhs,
            rhs,
            prec,
            line,
        });
        Ok(())
    }

    /// The declared start symbol, else the first rule's left-hand side.
    pub fn start_symbol(&self) -> Option<&str> {
        self.start
            .as_deref()
            .or_else(|| self.productions.first().map(|p| p.lhs.as_str()))
    }

    /// Registers every symbol the file mentions, in order of appearance.
    pub fn symbols(&self) -> Result<SymbolTable> {
        let mut tab = SymbolTable::new();
        for decl in &self.precedence {
            for t in &decl.terminals {
                tab.terminal(t.type_id())?;
            }
        }
        for prod in &self.productions {
            tab.nonterminal(&prod.lhs)?;
            for sym in &prod.rhs {
                match sym {
                    GrammarSymbol::Terminal(t) => tab.terminal(t.type_id())?,
                    GrammarSymbol::NonTerminal(name) => tab.nonterminal(name)?,
                };
            }
        }
        Ok(tab)
    }

    /// Builds an unconfigured grammar over `tab`, which must come from
    /// [`symbols`](GrammarFile::symbols).
    pub fn grammar<'s>(&self, tab: &'s SymbolTable) -> Result<Grammar<'s>> {
        let lookup = |name: &str| {
            tab.by_name(name)
                .ok_or_else(|| anyhow!("unknown symbol {:?}", name))
        };
        let term = |t: Terminal| {
            tab.by_type(t.type_id())
                .ok_or_else(|| anyhow!("unknown terminal {:?}", t))
        };

        let mut g = Grammar::new(tab);
        for (i, prod) in self.productions.iter().enumerate() {
            let lhs = lookup(prod.lhs.as_str())?;
            let rhs = prod
                .rhs
                .iter()
                .map(|sym| match sym {
                    GrammarSymbol::Terminal(t) => term(*t),
                    GrammarSymbol::NonTerminal(name) => lookup(name.as_str()),
                })
                .collect::<Result<Vec<SymbolId>>>()?;
            let mut rule = Rule::new(i as u32 + 1, lhs) >> rhs;
            if let Some(prec) = prod.prec {
                rule.set_prec(prec);
            }
            g.add_rule(rule);
        }

        for prod in &self.productions {
            for sym in &prod.rhs {
                if let GrammarSymbol::NonTerminal(name) = sym {
                    if !self.productions.iter().any(|p| &p.lhs == name) {
                        bail!("line {}: nonterminal {} has no rules", prod.line, name);
                    }
                }
            }
        }

        let start = self
            .start_symbol()
            .ok_or_else(|| anyhow!("grammar has no rules"))?;
        g.set_start(lookup(start)?);

        for decl in &self.precedence {
            let terminals = decl
                .terminals
                .iter()
                .map(|t| term(*t))
                .collect::<Result<Vec<_>>>()?;
            match decl.assoc {
                Assoc::Left => g.left(decl.level, &terminals),
                Assoc::Right => g.right(decl.level, &terminals),
                Assoc::NonAssoc => g.nonassoc(decl.level, &terminals),
            }
        }
        Ok(g)
    }

    /// Labels of the rules, `rule<N>` where none was given.
    pub fn labels(&self) -> Vec<String> {
        self.productions
            .iter()
            .enumerate()
            .map(|(i, p)| match &p.label {
                Some(label) => label.clone(),
                None => format!("rule{}", i + 1).into(),
            })
            .collect()
    }
}
