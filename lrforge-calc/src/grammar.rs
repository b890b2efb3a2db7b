//! The calculator grammar.
//!
//! ```text
//! Expr -> Expr + Expr | Expr - Expr | Expr * Expr | Expr / Expr
//!       | Expr ^ Expr | - Expr | ( Expr ) | int | float | ident
//!       | ident ( Expr ) | < Ref >
//! Ref  -> ident | ident : ident | ident : ident [ Expr ]
//! ```
//!
//! `+ -` bind at 10 and `* /` at 20, both left-associative. `^` binds at 30
//! and is right-associative. Unary minus sits at [`NEG_PREC`], so `-2^2` is
//! `-(2^2)`.

use crate::CalcError;
use lrforge::{ConfigError, Grammar, Rule, SymbolId, SymbolTable, TokenKind};
use once_cell::sync::Lazy;
use std::io::BufRead;

pub const ADD: u32 = 1;
pub const SUB: u32 = 2;
pub const MUL: u32 = 3;
pub const DIV: u32 = 4;
pub const POW: u32 = 5;
pub const NEG: u32 = 6;
pub const PAREN: u32 = 7;
pub const INT: u32 = 8;
pub const FLOAT: u32 = 9;
pub const VAR: u32 = 10;
pub const CALL: u32 = 11;
pub const REF: u32 = 12;
pub const REF_NAME: u32 = 13;
pub const REF_SPEC: u32 = 14;
pub const REF_TIME: u32 = 15;

/// Precedence of the unary minus rule.
pub const NEG_PREC: i32 = 25;

/// The calculator's symbol registry with handles to every symbol.
#[derive(Debug)]
pub struct CalcSymbols {
    pub table: SymbolTable,
    pub expr: SymbolId,
    pub reference: SymbolId,
    pub plus: SymbolId,
    pub minus: SymbolId,
    pub star: SymbolId,
    pub slash: SymbolId,
    pub caret: SymbolId,
    pub lparen: SymbolId,
    pub rparen: SymbolId,
    pub lt: SymbolId,
    pub gt: SymbolId,
    pub colon: SymbolId,
    pub lbracket: SymbolId,
    pub rbracket: SymbolId,
    pub int: SymbolId,
    pub float: SymbolId,
    pub ident: SymbolId,
}

impl CalcSymbols {
    pub fn new() -> Result<Self, ConfigError> {
        let mut table = SymbolTable::new();
        let expr = table.nonterminal("Expr")?;
        let reference = table.nonterminal("Ref")?;
        let mut ch = |c: char| table.terminal(c as u32);
        let plus = ch('+')?;
        let minus = ch('-')?;
        let star = ch('*')?;
        let slash = ch('/')?;
        let caret = ch('^')?;
        let lparen = ch('(')?;
        let rparen = ch(')')?;
        let lt = ch('<')?;
        let gt = ch('>')?;
        let colon = ch(':')?;
        let lbracket = ch('[')?;
        let rbracket = ch(']')?;
        let int = table.terminal(TokenKind::Int.type_id())?;
        let float = table.terminal(TokenKind::Float.type_id())?;
        let ident = table.terminal(TokenKind::Ident.type_id())?;
        Ok(Self {
            table,
            expr,
            reference,
            plus,
            minus,
            star,
            slash,
            caret,
            lparen,
            rparen,
            lt,
            gt,
            colon,
            lbracket,
            rbracket,
            int,
            float,
            ident,
        })
    }
}

/// Builds the unconfigured calculator grammar with unary minus at
/// `neg_prec`.
pub fn build_grammar(s: &CalcSymbols, neg_prec: i32) -> Grammar<'_> {
    let mut g = Grammar::new(&s.table);
    let e = s.expr;
    g.add_rule(Rule::new(ADD, e) >> [e, s.plus, e]);
    g.add_rule(Rule::new(SUB, e) >> [e, s.minus, e]);
    g.add_rule(Rule::new(MUL, e) >> [e, s.star, e]);
    g.add_rule(Rule::new(DIV, e) >> [e, s.slash, e]);
    g.add_rule(Rule::new(POW, e) >> [e, s.caret, e]);
    g.add_rule((Rule::new(NEG, e) >> [s.minus, e]).with_prec(neg_prec));
    g.add_rule(Rule::new(PAREN, e) >> [s.lparen, e, s.rparen]);
    g.add_rule(Rule::new(INT, e) >> [s.int]);
    g.add_rule(Rule::new(FLOAT, e) >> [s.float]);
    g.add_rule(Rule::new(VAR, e) >> [s.ident]);
    g.add_rule(Rule::new(CALL, e) >> [s.ident, s.lparen, e, s.rparen]);
    g.add_rule(Rule::new(REF, e) >> [s.lt, s.reference, s.gt]);
    g.add_rule(Rule::new(REF_NAME, s.reference) >> [s.ident]);
    g.add_rule(Rule::new(REF_SPEC, s.reference) >> [s.ident, s.colon, s.ident]);
    g.add_rule(
        Rule::new(REF_TIME, s.reference)
            >> [s.ident, s.colon, s.ident, s.lbracket, e, s.rbracket],
    );
    g.set_start(e);
    g.left(10, &[s.plus, s.minus]);
    g.left(20, &[s.star, s.slash]);
    g.right(30, &[s.caret]);
    g
}

/// Builds and configures the grammar with unary minus at `neg_prec`.
pub fn configured_grammar(s: &CalcSymbols, neg_prec: i32) -> Result<Grammar<'_>, ConfigError> {
    let mut g = build_grammar(s, neg_prec);
    g.configure()?;
    Ok(g)
}

/// Builds the grammar and installs states from a table written by
/// [`lrforge::write_table`] instead of configuring it.
pub fn load_grammar<R: BufRead>(s: &CalcSymbols, reader: R) -> Result<Grammar<'_>, CalcError> {
    let mut g = build_grammar(s, NEG_PREC);
    g.load_table(reader)?;
    Ok(g)
}

static SYMBOLS: Lazy<Result<CalcSymbols, ConfigError>> = Lazy::new(CalcSymbols::new);

static GRAMMAR: Lazy<Result<Grammar<'static>, ConfigError>> = Lazy::new(|| {
    let s = SYMBOLS.as_ref().map_err(Clone::clone)?;
    configured_grammar(s, NEG_PREC)
});

/// The process-wide symbol registry.
pub fn symbols() -> Result<&'static CalcSymbols, CalcError> {
    SYMBOLS.as_ref().map_err(|e| CalcError::Config(e.clone()))
}

/// The process-wide configured grammar, built on first use.
pub fn grammar() -> Result<&'static Grammar<'static>, CalcError> {
    GRAMMAR.as_ref().map_err(|e| CalcError::Config(e.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configures_without_conflicts() {
        let g = grammar().unwrap();
        assert!(g.is_configured());
        assert!(g.conflicts().is_empty());
        assert_eq!(g.rules().len(), 16);
        assert_eq!(g.rule(6).map(|r| r.id()), Some(NEG));
    }

    #[test]
    fn neg_takes_declared_precedence() {
        let s = symbols().unwrap();
        let g = build_grammar(s, NEG_PREC);
        assert_eq!(g.rule_precedence(&g.rules()[6]), Some(NEG_PREC));
        assert_eq!(g.rule_precedence(&g.rules()[1]), Some(10));
        assert_eq!(g.rule_precedence(&g.rules()[5]), Some(30));
        assert_eq!(g.rule_precedence(&g.rules()[8]), None);
    }

    #[test]
    fn unresolved_without_precedence() {
        let s = CalcSymbols::new().unwrap();
        let mut g = Grammar::new(&s.table);
        g.add_rule(Rule::new(ADD, s.expr) >> [s.expr, s.plus, s.expr]);
        g.add_rule(Rule::new(INT, s.expr) >> [s.int]);
        g.set_start(s.expr);
        assert!(matches!(g.configure(), Err(ConfigError::Conflicts(_))));
    }
}
