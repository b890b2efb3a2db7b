//! Evaluation of expression trees.

use crate::tree::{BinOp, Node, NodeKind, Reference};
use crate::CalcError;
use indexmap::IndexMap;
use smartstring::alias::String;

/// Variable bindings and reference series.
///
/// A reference `<name>` or `<name:spec>` reads the latest sample of the
/// series stored under [`Reference::key`]; `<name:spec[t]>` reads sample
/// `t`, counted from the oldest.
#[derive(Debug, Default, Clone)]
pub struct Env {
    vars: IndexMap<String, f64>,
    series: IndexMap<String, Vec<f64>>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl AsRef<str>, value: f64) {
        self.vars.insert(String::from(name.as_ref()), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    /// Appends a sample to the series under `key`.
    pub fn record(&mut self, key: impl AsRef<str>, value: f64) {
        self.series
            .entry(String::from(key.as_ref()))
            .or_default()
            .push(value);
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, f64)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn reference(&self, r: &Reference, node: &Node) -> Result<f64, CalcError> {
        let key = r.key();
        let samples = match self.series.get(&key) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(CalcError::UnknownReference { key, pos: node.pos }),
        };
        let Some(time) = &r.time else {
            return Ok(samples[samples.len() - 1]);
        };
        let index = self.eval(time)?;
        if index.fract() != 0.0 || index < 0.0 || index >= samples.len() as f64 {
            return Err(CalcError::TimeIndex {
                key,
                index,
                pos: time.pos,
            });
        }
        Ok(samples[index as usize])
    }

    pub fn eval(&self, node: &Node) -> Result<f64, CalcError> {
        Ok(match &node.kind {
            NodeKind::Int(n) => *n as f64,
            NodeKind::Float(x) => *x,
            NodeKind::Var(name) => self.get(name).ok_or_else(|| CalcError::UnknownVariable {
                name: name.clone(),
                pos: node.pos,
            })?,
            NodeKind::Neg(e) => -self.eval(e)?,
            NodeKind::Binary { op, lhs, rhs } => {
                let a = self.eval(lhs)?;
                let b = self.eval(rhs)?;
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div if b == 0.0 => {
                        return Err(CalcError::DivisionByZero { pos: node.pos })
                    }
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
            NodeKind::Call { func, arg } => func.apply(self.eval(arg)?),
            NodeKind::Ref(r) => self.reference(r, node)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrforge::Pos;

    fn int(n: i64) -> Box<Node> {
        Box::new(Node::new(NodeKind::Int(n), Pos::at(0)))
    }

    #[test]
    fn arithmetic() {
        let env = Env::new();
        let e = Node::new(
            NodeKind::Binary {
                op: BinOp::Pow,
                lhs: int(2),
                rhs: int(10),
            },
            Pos::new(0, 3),
        );
        assert_eq!(env.eval(&e).unwrap(), 1024.0);
    }

    #[test]
    fn division_by_zero_reports_position() {
        let e = Node::new(
            NodeKind::Binary {
                op: BinOp::Div,
                lhs: int(1),
                rhs: int(0),
            },
            Pos::new(4, 6),
        );
        let err = Env::new().eval(&e).unwrap_err();
        assert_eq!(err.pos(), Some(Pos::new(4, 6)));
    }

    #[test]
    fn variables_and_series() {
        let mut env = Env::new();
        env.set("x", 1.5);
        env.set("x", 2.5);
        assert_eq!(env.get("x"), Some(2.5));
        assert_eq!(env.vars().count(), 1);

        env.record("a:b", 1.0);
        env.record("a:b", 4.0);
        let r = |time| {
            Node::new(
                NodeKind::Ref(Reference {
                    name: "a".into(),
                    spec: Some("b".into()),
                    time,
                }),
                Pos::at(0),
            )
        };
        assert_eq!(env.eval(&r(None)).unwrap(), 4.0);
        assert_eq!(env.eval(&r(Some(int(0)))).unwrap(), 1.0);
        assert!(matches!(
            env.eval(&r(Some(int(2)))),
            Err(CalcError::TimeIndex { .. })
        ));
    }
}
