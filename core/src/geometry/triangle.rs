//! Triangles derived from three points
//!
//! A triangle exposes, per vertex, the opposite side and the angle at that
//! vertex. Rules address vertices by index `0..3`.

use crate::ir::{angle_key, segment_key, Angle, Point, Segment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-independent identity of a point triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriangleKey([Point; 3]);

impl TriangleKey {
    pub fn new(a: &Point, b: &Point, c: &Point) -> Self {
        let mut points = [a.clone(), b.clone(), c.clone()];
        points.sort();
        Self(points)
    }

    pub fn points(&self) -> &[Point; 3] {
        &self.0
    }

    /// Whether every given point is a vertex of this triple
    pub fn contains_all(&self, points: &[&Point]) -> bool {
        points.iter().all(|p| self.0.contains(p))
    }
}

/// A triangle with its sides and angles keyed per vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    key: TriangleKey,
    sides: [Segment; 3],
    angles: [Angle; 3],
}

impl Triangle {
    pub fn new(a: &Point, b: &Point, c: &Point) -> Self {
        let key = TriangleKey::new(a, b, c);
        let [p0, p1, p2] = key.points().clone();
        Self {
            sides: [
                segment_key(&p1, &p2),
                segment_key(&p0, &p2),
                segment_key(&p0, &p1),
            ],
            angles: [
                angle_key(&p1, &p0, &p2),
                angle_key(&p0, &p1, &p2),
                angle_key(&p0, &p2, &p1),
            ],
            key,
        }
    }

    /// The triangle an angle belongs to
    pub fn from_angle(angle: &Angle) -> Self {
        let [r1, v, r2] = angle.points();
        Self::new(r1, v, r2)
    }

    pub fn key(&self) -> &TriangleKey {
        &self.key
    }

    pub fn vertex(&self, i: usize) -> &Point {
        &self.key.points()[i]
    }

    /// Side opposite the vertex `i`
    pub fn side(&self, i: usize) -> &Segment {
        &self.sides[i]
    }

    /// Angle at the vertex `i`
    pub fn angle(&self, i: usize) -> &Angle {
        &self.angles[i]
    }

    pub fn sides(&self) -> &[Segment; 3] {
        &self.sides
    }

    pub fn angles(&self) -> &[Angle; 3] {
        &self.angles
    }

    /// Whether every given point is a vertex of this triangle
    pub fn contains_all(&self, points: &[&Point]) -> bool {
        self.key.contains_all(points)
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.key.points();
        write!(f, "△{}{}{}", a, b, c)
    }
}
