//! Tree construction for the calculator grammar.

use crate::grammar::*;
use crate::tree::{BinOp, Func, Node, NodeKind, Reference};
use lrforge::{Child, ParseError, Pos, Rule, SymbolId, TokenValue, TreeBuilder};
use smartstring::alias::String;
use std::vec::IntoIter;

/// Builds [`Node`]s, one per reduction.
#[derive(Debug, Default)]
pub struct CalcBuilder {
    nodes: usize,
}

impl CalcBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes built since creation.
    pub fn nodes(&self) -> usize {
        self.nodes
    }
}

/// Pulls children of a reduction in order.
struct Children {
    iter: IntoIter<Child<Node>>,
    pos: Pos,
}

impl Children {
    fn node(&mut self) -> Result<Box<Node>, ParseError> {
        match self.iter.next() {
            Some(Child::Node(n)) => Ok(Box::new(n)),
            _ => Err(ParseError::semantic(self.pos, "expected a subexpression")),
        }
    }

    fn value(&mut self) -> Result<TokenValue, ParseError> {
        match self.iter.next() {
            Some(Child::Token(t)) => Ok(t.value),
            _ => Err(ParseError::semantic(self.pos, "expected a token")),
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.value()? {
            TokenValue::Ident(name) => Ok(name),
            _ => Err(ParseError::semantic(self.pos, "expected an identifier")),
        }
    }

    fn skip(&mut self) -> &mut Self {
        self.iter.next();
        self
    }
}

impl TreeBuilder for CalcBuilder {
    type Node = Node;

    fn apply_rule(
        &mut self,
        _lhs: SymbolId,
        rule: &Rule,
        children: Vec<Child<Node>>,
        pos: Pos,
    ) -> Result<Option<Node>, ParseError> {
        let mut c = Children {
            iter: children.into_iter(),
            pos,
        };
        let binary = |c: &mut Children, op| -> Result<NodeKind, ParseError> {
            let lhs = c.node()?;
            let rhs = c.skip().node()?;
            Ok(NodeKind::Binary { op, lhs, rhs })
        };
        let reference = |name, spec, time| NodeKind::Ref(Reference { name, spec, time });

        let kind = match rule.id() {
            ADD => binary(&mut c, BinOp::Add)?,
            SUB => binary(&mut c, BinOp::Sub)?,
            MUL => binary(&mut c, BinOp::Mul)?,
            DIV => binary(&mut c, BinOp::Div)?,
            POW => binary(&mut c, BinOp::Pow)?,
            NEG => NodeKind::Neg(c.skip().node()?),
            // Parentheses and `< Ref >` only widen the inner node's range.
            PAREN | REF => {
                let mut inner = c.skip().node()?;
                inner.pos = pos;
                self.nodes += 1;
                return Ok(Some(*inner));
            }
            INT => match c.value()? {
                TokenValue::Int(n) => NodeKind::Int(n),
                _ => return Err(ParseError::semantic(pos, "expected an integer")),
            },
            FLOAT => match c.value()? {
                TokenValue::Float(x) => NodeKind::Float(x),
                _ => return Err(ParseError::semantic(pos, "expected a number")),
            },
            VAR => NodeKind::Var(c.ident()?),
            CALL => {
                let name = c.ident()?;
                let func = Func::from_name(&name)
                    .ok_or_else(|| ParseError::semantic(pos, format!("unknown function {}", name)))?;
                NodeKind::Call {
                    func,
                    arg: c.skip().node()?,
                }
            }
            REF_NAME => reference(c.ident()?, None, None),
            REF_SPEC => {
                let name = c.ident()?;
                let spec = c.skip().ident()?;
                reference(name, Some(spec), None)
            }
            REF_TIME => {
                let name = c.ident()?;
                let spec = c.skip().ident()?;
                let time = c.skip().node()?;
                reference(name, Some(spec), Some(time))
            }
            _ => return Ok(None),
        };
        self.nodes += 1;
        Ok(Some(Node::new(kind, pos)))
    }
}
