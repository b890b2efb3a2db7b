//! Expression trees.

use lrforge::Pos;
use smartstring::alias::String;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
            BinOp::Pow => '^',
        }
    }
}

/// Built-in functions callable as `name(expr)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Sqrt,
    Abs,
    Exp,
    Log,
}

impl Func {
    const ALL: [Func; 6] = [Func::Sin, Func::Cos, Func::Sqrt, Func::Abs, Func::Exp, Func::Log];

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Exp => "exp",
            Func::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Func> {
        Func::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Sqrt => x.sqrt(),
            Func::Abs => x.abs(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
        }
    }
}

/// A bracketed reference: `<name>`, `<name:spec>` or `<name:spec[time]>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub spec: Option<String>,
    pub time: Option<Box<Node>>,
}

impl Reference {
    /// Lookup key in the environment: `name` or `name:spec`.
    pub fn key(&self) -> String {
        match &self.spec {
            Some(spec) => {
                let mut key = self.name.clone();
                key.push(':');
                key.push_str(spec);
                key
            }
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Int(i64),
    Float(f64),
    Var(String),
    Neg(Box<Node>),
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Call {
        func: Func,
        arg: Box<Node>,
    },
    Ref(Reference),
}

/// An expression node and the source range it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: Pos,
}

impl Node {
    pub fn new(kind: NodeKind, pos: Pos) -> Self {
        Self { kind, pos }
    }
}

/// Fully parenthesised: every operator application is wrapped, so the
/// output shows how the input was grouped.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Int(n) => write!(f, "{}", n),
            NodeKind::Float(x) => write!(f, "{:?}", x),
            NodeKind::Var(name) => write!(f, "{}", name),
            NodeKind::Neg(e) => write!(f, "(-{})", e),
            NodeKind::Binary { op, lhs, rhs } => write!(f, "({}{}{})", lhs, op.symbol(), rhs),
            NodeKind::Call { func, arg } => write!(f, "{}({})", func.name(), arg),
            NodeKind::Ref(r) => {
                write!(f, "<{}", r.key())?;
                if let Some(time) = &r.time {
                    write!(f, "[{}]", time)?;
                }
                write!(f, ">")
            }
        }
    }
}
