//! Algebraic expressions over facts and named unknowns
//!
//! Expressions stay deliberately small: numbers, fact references, unknowns and
//! the four arithmetic operations. They only ever get solved in closed form.

use super::keys::{Angle, FactRef, Segment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A named unknown quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Unknown {
    id: u32,
    name: String,
}

impl Unknown {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Mints unknowns with distinct ids
///
/// Owned by whoever builds constraints; there is no global counter.
#[derive(Debug, Clone, Default)]
pub struct UnknownGen {
    next: u32,
}

impl UnknownGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh anonymous unknown named `?<id>`
    pub fn fresh(&mut self) -> Unknown {
        let id = self.next;
        self.named(&format!("?{}", id))
    }

    pub fn named(&mut self, name: &str) -> Unknown {
        let id = self.next;
        self.next += 1;
        Unknown {
            id,
            name: name.to_string(),
        }
    }
}

/// Anything an equation can be solved for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Fact(FactRef),
    Unknown(Unknown),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Fact(fact) => fact.fmt(f),
            Slot::Unknown(u) => u.fmt(f),
        }
    }
}

/// Arithmetic expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    Fact(FactRef),
    Unknown(Unknown),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    /// Collect every fact and unknown referenced by the expression
    pub fn collect_slots(&self, out: &mut BTreeSet<Slot>) {
        match self {
            Expr::Number(_) => {}
            Expr::Fact(fact) => {
                out.insert(Slot::Fact(fact.clone()));
            }
            Expr::Unknown(u) => {
                out.insert(Slot::Unknown(u.clone()));
            }
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                l.collect_slots(out);
                r.collect_slots(out);
            }
            Expr::Neg(inner) => inner.collect_slots(out),
        }
    }

    pub fn slots(&self) -> BTreeSet<Slot> {
        let mut out = BTreeSet::new();
        self.collect_slots(&mut out);
        out
    }

    /// Numeric value, if every slot has one
    pub fn evaluate(&self, lookup: &impl Fn(&Slot) -> Option<f64>) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            Expr::Fact(fact) => lookup(&Slot::Fact(fact.clone())),
            Expr::Unknown(u) => lookup(&Slot::Unknown(u.clone())),
            Expr::Add(l, r) => Some(l.evaluate(lookup)? + r.evaluate(lookup)?),
            Expr::Sub(l, r) => Some(l.evaluate(lookup)? - r.evaluate(lookup)?),
            Expr::Mul(l, r) => Some(l.evaluate(lookup)? * r.evaluate(lookup)?),
            Expr::Div(l, r) => {
                let denominator = r.evaluate(lookup)?;
                if denominator == 0.0 {
                    return None;
                }
                Some(l.evaluate(lookup)? / denominator)
            }
            Expr::Neg(inner) => Some(-inner.evaluate(lookup)?),
        }
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::Number(n)
    }
}

impl From<Segment> for Expr {
    fn from(segment: Segment) -> Self {
        Expr::Fact(FactRef::Segment(segment))
    }
}

impl From<Angle> for Expr {
    fn from(angle: Angle) -> Self {
        Expr::Fact(FactRef::Angle(angle))
    }
}

impl From<FactRef> for Expr {
    fn from(fact: FactRef) -> Self {
        Expr::Fact(fact)
    }
}

impl From<Unknown> for Expr {
    fn from(u: Unknown) -> Self {
        Expr::Unknown(u)
    }
}

impl<R: Into<Expr>> Add<R> for Expr {
    type Output = Expr;
    fn add(self, rhs: R) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<Expr>> Sub<R> for Expr {
    type Output = Expr;
    fn sub(self, rhs: R) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<Expr>> Mul<R> for Expr {
    type Output = Expr;
    fn mul(self, rhs: R) -> Expr {
        Expr::Mul(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<Expr>> Div<R> for Expr {
    type Output = Expr;
    fn div(self, rhs: R) -> Expr {
        Expr::Div(Box::new(self), Box::new(rhs.into()))
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Fact(fact) => write!(f, "{}", fact),
            Expr::Unknown(u) => write!(f, "{}", u),
            Expr::Add(l, r) => write!(f, "({} + {})", l, r),
            Expr::Sub(l, r) => write!(f, "({} - {})", l, r),
            Expr::Mul(l, r) => write!(f, "{} * {}", l, r),
            Expr::Div(l, r) => write!(f, "{} / {}", l, r),
            Expr::Neg(inner) => write!(f, "-{}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{segment_key, Point};

    #[test]
    fn test_unknown_gen_mints_distinct_ids() {
        let mut gen = UnknownGen::new();
        let a = gen.fresh();
        let b = gen.named("x");

        assert_ne!(a, b);
        assert_eq!(a.name(), "?0");
        assert_eq!(b.id(), 1);
    }

    #[test]
    fn test_evaluate_with_lookup() {
        let ab = segment_key(&Point::new("A"), &Point::new("B"));
        let expr = Expr::from(ab.clone()) * 2.0 + 1.0;

        let known = |slot: &Slot| match slot {
            Slot::Fact(FactRef::Segment(s)) if *s == ab => Some(3.0),
            _ => None,
        };
        assert_eq!(expr.evaluate(&known), Some(7.0));
        assert_eq!(expr.evaluate(&|_: &Slot| None), None);
    }

    #[test]
    fn test_division_by_zero_is_undefined() {
        let expr = Expr::from(1.0) / 0.0;
        assert_eq!(expr.evaluate(&|_: &Slot| None), None);
    }

    #[test]
    fn test_slots() {
        let mut gen = UnknownGen::new();
        let x = gen.named("x");
        let ab = segment_key(&Point::new("A"), &Point::new("B"));
        let expr = Expr::from(x.clone()) * Expr::from(x.clone()) - Expr::from(ab.clone());

        let slots = expr.slots();
        assert_eq!(slots.len(), 2);
        assert!(slots.contains(&Slot::Unknown(x)));
        assert!(slots.contains(&Slot::Fact(ab.into())));
    }
}
