//! The shift-reduce driver.

use crate::{Grammar, ParseError, Pos, Rule, SymbolId, Token, TokenSource};
use std::fmt::Write;

/// A reduction child: a shifted token or a node built by an earlier
/// reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Child<N> {
    Token(Token),
    Node(N),
}

impl<N> Child<N> {
    pub fn token(&self) -> Option<&Token> {
        match self {
            Child::Token(t) => Some(t),
            Child::Node(_) => None,
        }
    }

    pub fn into_token(self) -> Option<Token> {
        match self {
            Child::Token(t) => Some(t),
            Child::Node(_) => None,
        }
    }

    pub fn into_node(self) -> Option<N> {
        match self {
            Child::Node(n) => Some(n),
            Child::Token(_) => None,
        }
    }
}

/// Client tree construction, called once per reduction.
pub trait TreeBuilder {
    type Node;

    /// Builds the node for `rule` from its children, left to right. `pos`
    /// spans all children; for an empty rule it is the lookahead's start.
    ///
    /// Returning `Ok(None)` means the builder does not handle the rule,
    /// which aborts the parse with [`ParseError::UnhandledReduction`].
    fn apply_rule(
        &mut self,
        lhs: SymbolId,
        rule: &Rule,
        children: Vec<Child<Self::Node>>,
        pos: Pos,
    ) -> Result<Option<Self::Node>, ParseError>;
}

#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

struct Frame<N> {
    sym: SymbolId,
    child: Child<N>,
    pos: Pos,
}

/// Drives a [`TokenSource`] through the states of a configured grammar.
///
/// The parse stack is owned by the parser and cleared at the start of every
/// [`parse`](Parser::parse), so nodes built before an error are dropped with
/// it.
pub struct Parser<'g, L, B>
where
    L: TokenSource,
    B: TreeBuilder,
{
    grammar: &'g Grammar<'g>,
    source: L,
    builder: B,
    states: Vec<usize>,
    frames: Vec<Frame<B::Node>>,
    stats: ParserStats,
}

impl<'g, L, B> Parser<'g, L, B>
where
    L: TokenSource,
    B: TreeBuilder,
{
    pub fn new(grammar: &'g Grammar<'g>, source: L, builder: B) -> Self {
        Self {
            grammar,
            source,
            builder,
            states: Vec::new(),
            frames: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar<'g> {
        self.grammar
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Counters accumulated over every parse run by this parser.
    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            let token = self.source.scan_one_token()?;
            self.stats.tokens += 1;
            if !token.is_trivia() {
                return Ok(token);
            }
        }
    }

    fn expected(&self, state: usize) -> String {
        let symbols = self.grammar.symbols();
        self.grammar.states()[state]
            .expected(symbols)
            .into_iter()
            .map(|sym| symbols.name(sym))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn error(&self, state: usize, token: &Token) -> ParseError {
        if token.is_end() {
            ParseError::UnexpectedEnd { pos: token.pos }
        } else {
            ParseError::Syntactic {
                pos: token.pos,
                found: token.to_string(),
                expected: self.expected(state),
            }
        }
    }

    /// Parses `text` and returns the node built for the start symbol.
    pub fn parse(&mut self, text: &str) -> Result<B::Node, ParseError> {
        let grammar = self.grammar;
        if !grammar.is_configured() {
            return Err(ParseError::NotConfigured);
        }
        let symbols = grammar.symbols();
        self.source.set_input(text);
        self.frames.clear();
        self.states.clear();
        self.states.push(0);

        let mut token = self.next_token()?;
        loop {
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state(&token);
            }
            let state = self.states[self.states.len() - 1];
            let Some(sym) = symbols.by_type(token.ttype) else {
                return Err(self.error(state, &token));
            };
            let actions = &grammar.states()[state];

            if let Some(next) = actions.shift(sym) {
                log::trace!("Shift {}", next);
                let pos = token.pos;
                self.frames.push(Frame {
                    sym,
                    child: Child::Token(token),
                    pos,
                });
                self.states.push(next);
                self.stats.shifts += 1;
                token = self.next_token()?;
                continue;
            }

            let Some(rule_index) = actions.reduce(sym) else {
                return Err(self.error(state, &token));
            };

            if rule_index == 0 {
                log::trace!("Accept");
                return match self.frames.pop().map(|f| f.child) {
                    Some(Child::Node(node)) if self.frames.is_empty() => Ok(node),
                    _ => Err(self.error(state, &token)),
                };
            }

            let rule = &grammar.rules()[rule_index];
            log::trace!("Reduce {} ({})", rule_index, rule.display(symbols));
            // A reloaded table can ask for more frames than the stack holds.
            let Some(base) = self.frames.len().checked_sub(rule.len()) else {
                return Err(self.error(state, &token));
            };
            let popped = self.frames.split_off(base);
            self.states.truncate(base + 1);
            let pos = popped
                .iter()
                .map(|f| f.pos)
                .reduce(|a, b| a.join(&b))
                .unwrap_or_else(|| Pos::at(token.pos.start));
            let children = popped.into_iter().map(|f| f.child).collect();
            let node = self
                .builder
                .apply_rule(rule.lhs(), rule, children, pos)?
                .ok_or(ParseError::UnhandledReduction {
                    pos,
                    rule_id: rule.id(),
                })?;

            let exposed = self.states[base];
            let Some(next) = grammar.states()[exposed].shift(rule.lhs()) else {
                return Err(self.error(exposed, &token));
            };
            self.frames.push(Frame {
                sym: rule.lhs(),
                child: Child::Node(node),
                pos,
            });
            self.states.push(next);
            self.stats.reductions += 1;
        }
    }

    fn dump_state(&self, incoming: &Token) {
        let symbols = self.grammar.symbols();
        let mut output = String::new();
        for (frame, state) in self.frames.iter().zip(self.states.iter()) {
            let _ = write!(output, "<{}> {}  ", state, symbols.name(frame.sym));
        }
        if let Some(state) = self.states.last() {
            let _ = write!(output, "<{}>  <-  {}", state, incoming);
        }
        log::trace!("{}", output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scanner, SymbolTable, TokenKind, TokenValue};
    use std::io::Cursor;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const ADD: u32 = 1;
    const MUL: u32 = 2;
    const PAREN: u32 = 3;
    const INT: u32 = 4;
    const LIST: u32 = 5;
    const EMPTY: u32 = 6;

    // E -> E + E | E * E | ( E ) | int | [ L ] ; L -> L int | ε
    fn symbols() -> SymbolTable {
        let mut tab = SymbolTable::new();
        for ch in ['+', '*', '(', ')', '[', ']'] {
            tab.terminal(ch as u32).unwrap();
        }
        tab.terminal(TokenKind::Int.type_id()).unwrap();
        tab.nonterminal("E").unwrap();
        tab.nonterminal("L").unwrap();
        tab
    }

    fn grammar(tab: &SymbolTable) -> Grammar<'_> {
        let t = |ch: char| tab.by_type(ch as u32).unwrap();
        let int = tab.by_type(TokenKind::Int.type_id()).unwrap();
        let e = tab.by_name("E").unwrap();
        let l = tab.by_name("L").unwrap();
        let mut g = Grammar::new(tab);
        g.add_rule(Rule::new(ADD, e) >> [e, t('+'), e]);
        g.add_rule(Rule::new(MUL, e) >> [e, t('*'), e]);
        g.add_rule(Rule::new(PAREN, e) >> [t('('), e, t(')')]);
        g.add_rule(Rule::new(INT, e) >> [int]);
        g.add_rule(Rule::new(LIST, e) >> [t('['), l, t(']')]);
        g.add_rule(Rule::new(LIST, l) >> [l, int]);
        g.add_rule(Rule::new(EMPTY, l) >> crate::Sequence::new());
        g.set_start(e);
        g.left(10, &[t('+')]);
        g.left(20, &[t('*')]);
        g.configure().unwrap();
        g
    }

    /// Renders the tree fully parenthesised, with positions on lists.
    #[derive(Default)]
    struct Render {
        skip: Option<u32>,
    }

    impl TreeBuilder for Render {
        type Node = String;

        fn apply_rule(
            &mut self,
            _lhs: SymbolId,
            rule: &Rule,
            children: Vec<Child<String>>,
            pos: Pos,
        ) -> Result<Option<String>, ParseError> {
            if self.skip == Some(rule.id()) {
                return Ok(None);
            }
            let mut it = children.into_iter();
            let node = match rule.id() {
                ADD | MUL => {
                    let lhs = it.next().and_then(Child::into_node).unwrap_or_default();
                    let op = it
                        .next()
                        .and_then(|c| c.token().and_then(Token::as_char))
                        .unwrap_or('?');
                    let rhs = it.next().and_then(Child::into_node).unwrap_or_default();
                    format!("({}{}{})", lhs, op, rhs)
                }
                PAREN => it.nth(1).and_then(Child::into_node).unwrap_or_default(),
                INT => match it.next().and_then(Child::into_token).map(|t| t.value) {
                    Some(TokenValue::Int(n)) => n.to_string(),
                    _ => return Err(ParseError::semantic(pos, "expected an integer")),
                },
                LIST if rule.len() == 3 => {
                    let items = it.nth(1).and_then(Child::into_node).unwrap_or_default();
                    format!("[{}]@{}", items, pos)
                }
                LIST => {
                    let head = it.next().and_then(Child::into_node).unwrap_or_default();
                    match it.next().and_then(Child::into_token).map(|t| t.value) {
                        Some(TokenValue::Int(n)) if head.is_empty() => n.to_string(),
                        Some(TokenValue::Int(n)) => format!("{} {}", head, n),
                        _ => head,
                    }
                }
                EMPTY => String::new(),
                _ => return Ok(None),
            };
            Ok(Some(node))
        }
    }

    fn parse_with(g: &Grammar, text: &str) -> Result<String, ParseError> {
        Parser::new(g, Scanner::new(), Render::default()).parse(text)
    }

    #[test]
    fn precedence_and_associativity_group_correctly() {
        init_logger();
        let tab = symbols();
        let g = grammar(&tab);
        assert_eq!(parse_with(&g, "1+2*3").unwrap(), "(1+(2*3))");
        assert_eq!(parse_with(&g, "1*2+3").unwrap(), "((1*2)+3)");
        assert_eq!(parse_with(&g, "1 + 2 + 3").unwrap(), "((1+2)+3)");
        assert_eq!(parse_with(&g, "(1+2)*3").unwrap(), "((1+2)*3)");
    }

    #[test]
    fn empty_reductions_take_lookahead_position() {
        let tab = symbols();
        let g = grammar(&tab);
        assert_eq!(parse_with(&g, "[1 2 3]").unwrap(), "[1 2 3]@offsets 0..=6");
        assert_eq!(parse_with(&g, "[]").unwrap(), "[]@offsets 0..=1");
    }

    #[test]
    fn stats_count_work() {
        let tab = symbols();
        let g = grammar(&tab);
        let mut parser = Parser::new(&g, Scanner::new(), Render::default());
        parser.parse("1 + 2").unwrap();
        let stats = parser.stats();
        // 1, ws, +, ws, 2, end
        assert_eq!(stats.tokens, 6);
        assert_eq!(stats.shifts, 3);
        assert_eq!(stats.reductions, 3);
    }

    #[test]
    fn reduce_deeper_than_stack_is_an_error() {
        let tab = symbols();
        let mut g = grammar(&tab);
        g.load_table(Cursor::new("RULES,8\nSTATES,1\nS,0\nRD,256,1\n"))
            .unwrap();
        assert!(matches!(
            parse_with(&g, "1"),
            Err(ParseError::Syntactic { pos, .. }) if pos == Pos::at(0)
        ));
    }

    #[test]
    fn truncated_input_is_unexpected_end() {
        let tab = symbols();
        let g = grammar(&tab);
        assert_eq!(
            parse_with(&g, "(1+"),
            Err(ParseError::UnexpectedEnd { pos: Pos::at(3) })
        );
        assert!(matches!(
            parse_with(&g, ""),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn unexpected_token_lists_expected_terminals() {
        let tab = symbols();
        let g = grammar(&tab);
        let err = parse_with(&g, "1 2").unwrap_err();
        let ParseError::Syntactic { pos, found, expected } = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(pos, Pos::at(2));
        assert_eq!(found, "int 2");
        assert_eq!(expected, "end, +, *");

        // `-` is not a terminal of this grammar
        assert!(matches!(
            parse_with(&g, "1 - 2"),
            Err(ParseError::Syntactic { .. })
        ));
    }

    #[test]
    fn missing_node_is_unhandled_reduction() {
        let tab = symbols();
        let g = grammar(&tab);
        let mut parser = Parser::new(&g, Scanner::new(), Render { skip: Some(MUL) });
        assert_eq!(parser.parse("1+2").unwrap(), "(1+2)");
        assert_eq!(
            parser.parse("1 * 2"),
            Err(ParseError::UnhandledReduction {
                pos: Pos::new(0, 4),
                rule_id: MUL
            })
        );
    }

    #[test]
    fn unconfigured_grammar_is_rejected() {
        let tab = symbols();
        let g = Grammar::new(&tab);
        assert_eq!(parse_with(&g, "1"), Err(ParseError::NotConfigured));
    }

    #[test]
    fn reloaded_table_parses_identically() {
        let tab = symbols();
        let g = grammar(&tab);
        let mut buf = Vec::new();
        crate::write_table(&g, &mut buf).unwrap();

        let mut h = Grammar::new(&tab);
        for rule in &g.rules()[1..] {
            h.add_rule(rule.clone());
        }
        h.set_start(tab.by_name("E").unwrap());
        h.load_table(Cursor::new(buf)).unwrap();

        for text in ["1+2*3", "(1+2)*3*4", "[4 5]+6", "1+", "2 3"] {
            assert_eq!(parse_with(&g, text), parse_with(&h, text), "{}", text);
        }
    }
}
