//! Problem loader for JSON problem files
//!
//! A problem lists points (optionally with coordinates), constraints and
//! query targets. Running it replays everything against a fresh solver.

pub mod json;

pub use json::*;

use crate::ir::{
    angle_key, segment_key, Constraint, EngineError, Expr, Operand, Operator, Point, Point2D,
    Unknown, UnknownGen,
};
use crate::solver::{Solutions, Solver, SolverConfig};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// An operand as written in a problem file
///
/// Segments and angles name their points either letter by letter (`"ABC"`)
/// or separated by spaces or dashes (`"P1-Q-P2"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandSpec {
    Segment(String),
    Angle(String),
    Number(f64),
    Point(String),
    Unknown(String),
    Add(Box<OperandSpec>, Box<OperandSpec>),
    Sub(Box<OperandSpec>, Box<OperandSpec>),
    Mul(Box<OperandSpec>, Box<OperandSpec>),
    Div(Box<OperandSpec>, Box<OperandSpec>),
    Neg(Box<OperandSpec>),
}

/// A constraint as written in a problem file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub left: OperandSpec,

    /// Operator symbol: `==`, `!=`, `//`, `!//`, `<`, `<=`, `>`, `>=`, `on`, `not on`
    pub op: String,

    pub right: OperandSpec,

    /// Assert the negation instead
    #[serde(default)]
    pub negate: bool,
}

/// A geometric problem: points, constraints and queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryProblem {
    /// Problem ID
    pub id: String,

    /// Problem description (natural language)
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub points: Vec<PointSpec>,

    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,

    /// Segments and angles to resolve
    #[serde(default)]
    pub queries: Vec<OperandSpec>,
}

/// A problem after replay
#[derive(Debug, Clone)]
pub struct ProblemRun {
    pub solver: Solver,
    pub solutions: Solutions,
}

/// Problem loader result
pub type LoadResult<T> = Result<T, LoadError>;

/// Problem loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Split a point list such as `"ABC"` or `"P1 P2"` into names
fn point_names(spec: &str) -> Vec<String> {
    if spec.contains(|c: char| c.is_whitespace() || c == '-') {
        spec.split(|c: char| c.is_whitespace() || c == '-')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        spec.chars().map(|c| c.to_string()).collect()
    }
}

/// Turns operand specs into operands, minting unknowns by name
#[derive(Debug, Default)]
struct OperandBuilder {
    unknowns: UnknownGen,
    named: FxHashMap<String, Unknown>,
}

impl OperandBuilder {
    fn points<const N: usize>(&self, spec: &str) -> LoadResult<[Point; N]> {
        let names = point_names(spec);
        let count = names.len();
        let points: Vec<Point> = names.into_iter().map(Point::new).collect();
        points.try_into().map_err(|_| {
            LoadError::InvalidFormat(format!(
                "expected {} points in {:?}, found {}",
                N, spec, count
            ))
        })
    }

    fn unknown(&mut self, name: &str) -> Unknown {
        if let Some(u) = self.named.get(name) {
            return u.clone();
        }
        let u = self.unknowns.named(name);
        self.named.insert(name.to_string(), u.clone());
        u
    }

    fn operand(&mut self, spec: &OperandSpec) -> LoadResult<Operand> {
        Ok(match spec {
            OperandSpec::Segment(s) => {
                let [a, b] = self.points(s)?;
                Operand::Segment(segment_key(&a, &b))
            }
            OperandSpec::Angle(s) => {
                let [a, v, b] = self.points(s)?;
                Operand::Angle(angle_key(&a, &v, &b))
            }
            OperandSpec::Number(n) => Operand::Number(*n),
            OperandSpec::Point(name) => Operand::Point(Point::new(name.as_str())),
            _ => Operand::Expr(self.expr(spec)?),
        })
    }

    fn expr(&mut self, spec: &OperandSpec) -> LoadResult<Expr> {
        Ok(match spec {
            OperandSpec::Unknown(name) => Expr::from(self.unknown(name)),
            OperandSpec::Add(l, r) => self.expr(l)? + self.expr(r)?,
            OperandSpec::Sub(l, r) => self.expr(l)? - self.expr(r)?,
            OperandSpec::Mul(l, r) => self.expr(l)? * self.expr(r)?,
            OperandSpec::Div(l, r) => self.expr(l)? / self.expr(r)?,
            OperandSpec::Neg(inner) => -self.expr(inner)?,
            OperandSpec::Point(name) => {
                return Err(LoadError::InvalidFormat(format!(
                    "point {} cannot appear in arithmetic",
                    name
                )))
            }
            leaf => self.operand(leaf)?.as_expr().ok_or_else(|| {
                LoadError::InvalidFormat(format!("{:?} is not arithmetic", leaf))
            })?,
        })
    }

    fn constraint(&mut self, spec: &ConstraintSpec) -> LoadResult<Constraint> {
        let operator = Operator::from_symbol(&spec.op)
            .ok_or_else(|| LoadError::InvalidFormat(format!("unknown operator {:?}", spec.op)))?;
        let left = self.operand(&spec.left)?;
        let right = self.operand(&spec.right)?;
        let constraint = Constraint::new(left, operator, right)?;
        Ok(if spec.negate {
            constraint.negate()?
        } else {
            constraint
        })
    }
}

impl GeometryProblem {
    /// Replay the problem against a fresh solver and answer its queries
    pub fn run(&self, config: SolverConfig) -> LoadResult<ProblemRun> {
        let mut solver = Solver::with_config(config);
        let mut builder = OperandBuilder::default();

        for point in &self.points {
            match (point.x, point.y) {
                (Some(x), Some(y)) => {
                    solver.add_point_at(&point.name, Point2D::new(x, y))?;
                }
                (None, None) => {
                    solver.add_point(&point.name);
                }
                _ => {
                    return Err(LoadError::InvalidFormat(format!(
                        "point {} needs both coordinates or neither",
                        point.name
                    )))
                }
            }
        }

        for spec in &self.constraints {
            let constraint = builder.constraint(spec)?;
            solver.add_constraint(constraint)?;
        }

        let targets = self
            .queries
            .iter()
            .map(|q| builder.operand(q))
            .collect::<LoadResult<Vec<_>>>()?;
        let solutions = solver.solve_operands(&targets)?;

        Ok(ProblemRun { solver, solutions })
    }
}
