//! Coordinate geometry support
//!
//! Optional coordinates for points. When every point of a segment or angle is
//! pinned, its measure can be read off directly instead of derived.

use super::symbols::Point;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// 2D point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Dot product with another point (as vectors from origin)
    pub fn dot(&self, other: &Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Cross product z-component (for 2D)
    pub fn cross_z(&self, other: &Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn minus(&self, other: &Point2D) -> Point2D {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

/// Coordinate store - maps points to coordinates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinateStore {
    coords: FxHashMap<Point, Point2D>,
}

impl CoordinateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coordinates for a point
    pub fn set(&mut self, point: Point, coords: Point2D) {
        self.coords.insert(point, coords);
    }

    /// Get coordinates for a point
    pub fn get(&self, point: &Point) -> Option<Point2D> {
        self.coords.get(point).copied()
    }

    /// Number of points with coordinates
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Closed-form computations on coordinates
pub mod ops {
    use super::*;

    /// Check if three points are collinear (using cross product)
    pub fn are_collinear(p1: Point2D, p2: Point2D, p3: Point2D, epsilon: f64) -> bool {
        p2.minus(&p1).cross_z(&p3.minus(&p1)).abs() < epsilon
    }

    /// Check if `p` lies on the closed segment `a`-`b`
    pub fn is_on_segment(p: Point2D, a: Point2D, b: Point2D, epsilon: f64) -> bool {
        if !are_collinear(a, b, p, epsilon) {
            return false;
        }
        let along = p.minus(&a).dot(&b.minus(&a));
        along >= -epsilon && along <= b.minus(&a).dot(&b.minus(&a)) + epsilon
    }

    /// Angle at `vertex` formed by `p1`-`vertex`-`p3`, in degrees
    ///
    /// Returns None when one of the sides has zero length.
    pub fn angle_degrees(p1: Point2D, vertex: Point2D, p3: Point2D) -> Option<f64> {
        let v1 = p1.minus(&vertex);
        let v2 = p3.minus(&vertex);

        let mag1 = v1.x.hypot(v1.y);
        let mag2 = v2.x.hypot(v2.y);
        if mag1 == 0.0 || mag2 == 0.0 {
            return None;
        }

        let cos_theta = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
        Some(cos_theta.acos().to_degrees())
    }

    /// Circle through three points as `(center, radius)`
    ///
    /// Returns None when the points are collinear or coincide. Collinearity
    /// is judged on the sine of the angle at `b`, so it does not depend on
    /// the size of the figure.
    pub fn circumcircle(a: Point2D, b: Point2D, c: Point2D) -> Option<(Point2D, f64)> {
        let temp = b.x * b.x + b.y * b.y;
        let bc = (a.x * a.x + a.y * a.y - temp) / 2.0;
        let cd = (temp - c.x * c.x - c.y * c.y) / 2.0;
        let det = (a.x - b.x) * (b.y - c.y) - (b.x - c.x) * (a.y - b.y);

        if det.abs() <= 1e-10 * a.distance(&b) * b.distance(&c) {
            return None;
        }

        let center = Point2D::new(
            (bc * (b.y - c.y) - cd * (a.y - b.y)) / det,
            ((a.x - b.x) * cd - (b.x - c.x) * bc) / det,
        );
        Some((center, center.distance(&a)))
    }
}
