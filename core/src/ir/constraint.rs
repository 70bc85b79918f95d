//! Asserted constraints and their shapes
//!
//! A constraint is classified once, at construction, into a closed set of
//! shapes. Rules and validators dispatch on the shape; operand combinations
//! that fit no shape are rejected up front.

use super::error::{EngineError, EngineResult};
use super::expr::{Expr, Slot};
use super::keys::{Angle, FactRef, Segment};
use super::symbols::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Segment(Segment),
    Angle(Angle),
    Number(f64),
    Point(Point),
    Expr(Expr),
}

/// What an operand measures, for shape checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Length,
    Degrees,
    Scalar,
    Place,
}

impl Operand {
    fn measure(&self) -> Measure {
        match self {
            Operand::Segment(_) => Measure::Length,
            Operand::Angle(_) => Measure::Degrees,
            Operand::Number(_) | Operand::Expr(_) => Measure::Scalar,
            Operand::Point(_) => Measure::Place,
        }
    }

    /// The operand as an arithmetic expression; points have none
    pub fn as_expr(&self) -> Option<Expr> {
        match self {
            Operand::Segment(s) => Some(Expr::from(s.clone())),
            Operand::Angle(a) => Some(Expr::from(a.clone())),
            Operand::Number(n) => Some(Expr::Number(*n)),
            Operand::Expr(e) => Some(e.clone()),
            Operand::Point(_) => None,
        }
    }

    /// The fact this operand names directly, if any
    pub fn as_fact(&self) -> Option<FactRef> {
        match self {
            Operand::Segment(s) => Some(FactRef::Segment(s.clone())),
            Operand::Angle(a) => Some(FactRef::Angle(a.clone())),
            _ => None,
        }
    }
}

impl From<Segment> for Operand {
    fn from(segment: Segment) -> Self {
        Operand::Segment(segment)
    }
}

impl From<Angle> for Operand {
    fn from(angle: Angle) -> Self {
        Operand::Angle(angle)
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<Point> for Operand {
    fn from(point: Point) -> Self {
        Operand::Point(point)
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Operand::Expr(expr)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Segment(s) => s.fmt(f),
            Operand::Angle(a) => a.fmt(f),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Point(p) => p.fmt(f),
            Operand::Expr(e) => e.fmt(f),
        }
    }
}

/// Constraint operators, each with a negation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Parallel,
    NotParallel,
    Lt,
    Le,
    Gt,
    Ge,
    On,
    NotOn,
}

impl Operator {
    pub fn negate(self) -> Self {
        match self {
            Operator::Eq => Operator::NotEq,
            Operator::NotEq => Operator::Eq,
            Operator::Parallel => Operator::NotParallel,
            Operator::NotParallel => Operator::Parallel,
            Operator::Lt => Operator::Ge,
            Operator::Ge => Operator::Lt,
            Operator::Le => Operator::Gt,
            Operator::Gt => Operator::Le,
            Operator::On => Operator::NotOn,
            Operator::NotOn => Operator::On,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Parallel => "//",
            Operator::NotParallel => "!//",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::On => "on",
            Operator::NotOn => "not on",
        }
    }

    /// Parse an operator from its symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        const ALL: [Operator; 10] = [
            Operator::Eq,
            Operator::NotEq,
            Operator::Parallel,
            Operator::NotParallel,
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
            Operator::On,
            Operator::NotOn,
        ];
        let symbol = symbol.trim();
        ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Shape of a constraint, decided by its operator and operand kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintShape {
    /// Segment == Number
    SegmentValue,
    /// Angle == Number
    AngleValue,
    /// Segment == Segment
    SegmentEquality,
    /// Angle == Angle
    AngleEquality,
    /// Segment // Segment
    SegmentParallel,
    /// Arithmetic equality solved in closed form
    Equation,
    /// `!=`, `<`, `<=`, `>`, `>=` between numeric operands
    Comparison,
    /// Segment !// Segment
    NotParallel,
    /// Point on (or not on) Segment
    Incidence,
}

impl ConstraintShape {
    /// Shapes that only ever get validated, never propagated
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ConstraintShape::Comparison | ConstraintShape::NotParallel | ConstraintShape::Incidence
        )
    }
}

/// An immutable asserted constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    left: Operand,
    operator: Operator,
    right: Operand,
    shape: ConstraintShape,
}

impl Constraint {
    /// Classify and build a constraint
    ///
    /// Value assignments are normalised so the fact is on the left, and
    /// incidences so the point is on the left.
    pub fn new(
        left: impl Into<Operand>,
        operator: Operator,
        right: impl Into<Operand>,
    ) -> EngineResult<Self> {
        let (left, right) = (left.into(), right.into());
        let shape = classify(&left, operator, &right).ok_or_else(|| {
            EngineError::UnsupportedConstraintShape {
                left: left.to_string(),
                operator: operator.to_string(),
                right: right.to_string(),
            }
        })?;

        let swap = match shape {
            ConstraintShape::SegmentValue | ConstraintShape::AngleValue => {
                matches!(left, Operand::Number(_))
            }
            ConstraintShape::Incidence => matches!(left, Operand::Segment(_)),
            _ => false,
        };
        let (left, right) = if swap { (right, left) } else { (left, right) };

        Ok(Self {
            left,
            operator,
            right,
            shape,
        })
    }

    /// `left == right`
    pub fn equal(left: impl Into<Operand>, right: impl Into<Operand>) -> EngineResult<Self> {
        Self::new(left, Operator::Eq, right)
    }

    /// The constraint with its operator negated
    pub fn negate(&self) -> EngineResult<Self> {
        Self::new(
            self.left.clone(),
            self.operator.negate(),
            self.right.clone(),
        )
    }

    pub fn left(&self) -> &Operand {
        &self.left
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    pub fn shape(&self) -> ConstraintShape {
        self.shape
    }

    /// Angles named by either side, directly or inside an expression
    pub fn angles(&self) -> Vec<Angle> {
        let mut angles = Vec::new();
        for expr in [&self.left, &self.right].into_iter().filter_map(|op| op.as_expr()) {
            for slot in expr.slots() {
                if let Slot::Fact(FactRef::Angle(angle)) = slot {
                    if !angles.contains(&angle) {
                        angles.push(angle);
                    }
                }
            }
        }
        angles
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

fn classify(left: &Operand, operator: Operator, right: &Operand) -> Option<ConstraintShape> {
    use Measure::*;

    let (l, r) = (left.measure(), right.measure());
    let numeric = |m: Measure| m != Place;
    // lengths and angles never compare directly
    let mixed = matches!((l, r), (Length, Degrees) | (Degrees, Length));
    let comparable = numeric(l) && numeric(r) && !mixed;

    match operator {
        Operator::Eq => match (left, right) {
            (Operand::Segment(_), Operand::Number(_))
            | (Operand::Number(_), Operand::Segment(_)) => Some(ConstraintShape::SegmentValue),
            (Operand::Angle(_), Operand::Number(_))
            | (Operand::Number(_), Operand::Angle(_)) => Some(ConstraintShape::AngleValue),
            (Operand::Segment(_), Operand::Segment(_)) => Some(ConstraintShape::SegmentEquality),
            (Operand::Angle(_), Operand::Angle(_)) => Some(ConstraintShape::AngleEquality),
            _ if comparable => Some(ConstraintShape::Equation),
            _ => None,
        },
        Operator::NotEq | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            comparable.then_some(ConstraintShape::Comparison)
        }
        Operator::Parallel => matches!((left, right), (Operand::Segment(_), Operand::Segment(_)))
            .then_some(ConstraintShape::SegmentParallel),
        Operator::NotParallel => matches!((left, right), (Operand::Segment(_), Operand::Segment(_)))
            .then_some(ConstraintShape::NotParallel),
        Operator::On | Operator::NotOn => matches!(
            (left, right),
            (Operand::Point(_), Operand::Segment(_)) | (Operand::Segment(_), Operand::Point(_))
        )
        .then_some(ConstraintShape::Incidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{angle_key, segment_key};

    fn p(name: &str) -> Point {
        Point::new(name)
    }

    fn ab() -> Segment {
        segment_key(&p("A"), &p("B"))
    }

    fn abc() -> Angle {
        angle_key(&p("A"), &p("B"), &p("C"))
    }

    #[test]
    fn test_value_shapes_put_fact_on_the_left() {
        let c = Constraint::equal(5.0, ab()).unwrap();
        assert_eq!(c.shape(), ConstraintShape::SegmentValue);
        assert_eq!(c.left(), &Operand::Segment(ab()));
        assert_eq!(c.right(), &Operand::Number(5.0));

        let c = Constraint::equal(abc(), 30.0).unwrap();
        assert_eq!(c.shape(), ConstraintShape::AngleValue);
        assert_eq!(c.angles(), vec![abc()]);
    }

    #[test]
    fn test_equality_and_parallel_shapes() {
        let cd = segment_key(&p("C"), &p("D"));
        assert_eq!(
            Constraint::equal(ab(), cd.clone()).unwrap().shape(),
            ConstraintShape::SegmentEquality
        );
        assert_eq!(
            Constraint::new(ab(), Operator::Parallel, cd.clone()).unwrap().shape(),
            ConstraintShape::SegmentParallel
        );
        assert_eq!(
            Constraint::new(ab(), Operator::Parallel, cd).unwrap().negate().unwrap().shape(),
            ConstraintShape::NotParallel
        );
    }

    #[test]
    fn test_expressions_make_equations() {
        let expr = Expr::from(ab()) * 2.0;
        let c = Constraint::equal(expr, 10.0).unwrap();
        assert_eq!(c.shape(), ConstraintShape::Equation);

        let c = Constraint::equal(3.0, 3.0).unwrap();
        assert_eq!(c.shape(), ConstraintShape::Equation);
    }

    #[test]
    fn test_angles_inside_expressions() {
        let bac = angle_key(&p("B"), &p("A"), &p("C"));
        let expr = Expr::from(abc()) + Expr::from(bac.clone()) * 2.0 - Expr::from(abc());
        let c = Constraint::equal(expr, 100.0).unwrap();
        assert_eq!(c.angles(), vec![abc(), bac]);

        let c = Constraint::equal(Expr::from(ab()) * 2.0, 10.0).unwrap();
        assert!(c.angles().is_empty());
    }

    #[test]
    fn test_angle_against_point_is_unsupported() {
        let err = Constraint::equal(abc(), p("P")).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedConstraintShape { .. }));
        assert!(!err.is_contradiction());
    }

    #[test]
    fn test_length_against_angle_is_unsupported() {
        assert!(Constraint::equal(ab(), abc()).is_err());
        assert!(Constraint::new(ab(), Operator::Lt, abc()).is_err());
        assert!(Constraint::new(abc(), Operator::Parallel, abc()).is_err());
    }

    #[test]
    fn test_incidence_puts_point_first() {
        let c = Constraint::new(ab(), Operator::On, p("P")).unwrap();
        assert_eq!(c.shape(), ConstraintShape::Incidence);
        assert_eq!(c.left(), &Operand::Point(p("P")));
        assert!(c.shape().is_relational());
    }

    #[test]
    fn test_operator_symbols_round_trip() {
        assert_eq!(Operator::from_symbol("!//"), Some(Operator::NotParallel));
        assert_eq!(Operator::from_symbol(" not on "), Some(Operator::NotOn));
        assert_eq!(Operator::from_symbol("=~"), None);
    }

    #[test]
    fn test_negation() {
        let c = Constraint::equal(ab(), 4.0).unwrap().negate().unwrap();
        assert_eq!(c.operator(), Operator::NotEq);
        assert_eq!(c.shape(), ConstraintShape::Comparison);

        assert_eq!(Operator::Lt.negate(), Operator::Ge);
        assert_eq!(Operator::On.negate().negate(), Operator::On);
        assert_eq!(c.to_string(), "AB != 4");
    }
}
