//! Degeneracy detection for point triples
//!
//! Triangles are only meaningful for non-collinear triples. The engine never
//! decides collinearity on its own beyond coordinates; callers that know more
//! can install their own predicate.

use crate::ir::{ops, Point, SymbolTable};
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether three points fail to form a triangle
pub trait Degeneracy: Send + Sync {
    fn is_degenerate(&self, symbols: &SymbolTable, a: &Point, b: &Point, c: &Point) -> bool;
}

impl<F> Degeneracy for F
where
    F: Fn(&SymbolTable, &Point, &Point, &Point) -> bool + Send + Sync,
{
    fn is_degenerate(&self, symbols: &SymbolTable, a: &Point, b: &Point, c: &Point) -> bool {
        self(symbols, a, b, c)
    }
}

/// Degenerate when all three points have coordinates and no circle passes
/// through them
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateDegeneracy;

impl Degeneracy for CoordinateDegeneracy {
    fn is_degenerate(&self, symbols: &SymbolTable, a: &Point, b: &Point, c: &Point) -> bool {
        match (
            symbols.coordinates(a),
            symbols.coordinates(b),
            symbols.coordinates(c),
        ) {
            (Some(pa), Some(pb), Some(pc)) => ops::circumcircle(pa, pb, pc).is_none(),
            _ => false,
        }
    }
}

/// Set of degeneracy predicates; a triple is degenerate if any says so
#[derive(Clone)]
pub struct DegeneracyChecks {
    checks: Vec<Arc<dyn Degeneracy>>,
}

impl Default for DegeneracyChecks {
    fn default() -> Self {
        Self {
            checks: vec![Arc::new(CoordinateDegeneracy)],
        }
    }
}

impl DegeneracyChecks {
    pub fn push(&mut self, check: Arc<dyn Degeneracy>) {
        self.checks.push(check);
    }

    pub fn is_degenerate(&self, symbols: &SymbolTable, a: &Point, b: &Point, c: &Point) -> bool {
        a == b
            || b == c
            || a == c
            || self.checks.iter().any(|check| check.is_degenerate(symbols, a, b, c))
    }
}

impl fmt::Debug for DegeneracyChecks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DegeneracyChecks")
            .field("checks", &self.checks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Point2D;

    #[test]
    fn test_collinear_coordinates_are_degenerate() {
        let mut symbols = SymbolTable::new();
        symbols.add_point_at("A", Point2D::new(0.0, 0.0));
        symbols.add_point_at("B", Point2D::new(1.0, 1.0));
        symbols.add_point_at("C", Point2D::new(2.0, 2.0));
        symbols.add_point_at("D", Point2D::new(2.0, 0.0));
        let [a, b, c, d] = ["A", "B", "C", "D"].map(Point::new);

        let checks = DegeneracyChecks::default();
        assert!(checks.is_degenerate(&symbols, &a, &b, &c));
        assert!(!checks.is_degenerate(&symbols, &a, &b, &d));
    }

    #[test]
    fn test_small_triangle_is_not_degenerate() {
        let mut symbols = SymbolTable::new();
        symbols.add_point_at("A", Point2D::new(0.0, 0.0));
        symbols.add_point_at("B", Point2D::new(3e-6, 0.0));
        symbols.add_point_at("C", Point2D::new(0.0, 4e-6));
        let [a, b, c] = ["A", "B", "C"].map(Point::new);

        assert!(!DegeneracyChecks::default().is_degenerate(&symbols, &a, &b, &c));
    }

    #[test]
    fn test_missing_coordinates_are_not_degenerate() {
        let symbols = SymbolTable::new();
        let [a, b, c] = ["A", "B", "C"].map(Point::new);

        assert!(!CoordinateDegeneracy.is_degenerate(&symbols, &a, &b, &c));
        assert!(DegeneracyChecks::default().is_degenerate(&symbols, &a, &a, &c));
    }

    #[test]
    fn test_custom_predicate() {
        let symbols = SymbolTable::new();
        let [a, b, c] = ["A", "B", "C"].map(Point::new);

        let mut checks = DegeneracyChecks::default();
        checks.push(Arc::new(|_: &SymbolTable, a: &Point, _: &Point, _: &Point| {
            a.name() == "A"
        }));
        assert!(checks.is_degenerate(&symbols, &a, &b, &c));
        assert!(!checks.is_degenerate(&symbols, &b, &a, &c));
    }
}
