//! Canonical keys for segments and angles
//!
//! Segments are unordered point pairs, angles are ray/vertex/ray triples with
//! the rays sorted by name. Constructing either through this module always
//! yields the canonical form, so `AB == BA` and `∠ABC == ∠CBA` hold by value.

use super::symbols::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered pair of points, stored with its endpoints sorted by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    a: Point,
    b: Point,
}

/// Angle at `vertex` between the rays to `ray1` and `ray2`
///
/// The rays are sorted by name; the vertex always stays in the middle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Angle {
    ray1: Point,
    vertex: Point,
    ray2: Point,
}

/// Canonical key of the segment between `a` and `b`
pub fn segment_key(a: &Point, b: &Point) -> Segment {
    Segment::new(a.clone(), b.clone())
}

/// Canonical key of the angle `ray1`-`vertex`-`ray2`
pub fn angle_key(ray1: &Point, vertex: &Point, ray2: &Point) -> Angle {
    Angle::new(ray1.clone(), vertex.clone(), ray2.clone())
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn points(&self) -> [&Point; 2] {
        [&self.a, &self.b]
    }

    pub fn contains(&self, point: &Point) -> bool {
        &self.a == point || &self.b == point
    }
}

impl Angle {
    pub fn new(ray1: Point, vertex: Point, ray2: Point) -> Self {
        if ray1 <= ray2 {
            Self { ray1, vertex, ray2 }
        } else {
            Self {
                ray1: ray2,
                vertex,
                ray2: ray1,
            }
        }
    }

    pub fn vertex(&self) -> &Point {
        &self.vertex
    }

    pub fn rays(&self) -> [&Point; 2] {
        [&self.ray1, &self.ray2]
    }

    /// All three points, vertex in the middle
    pub fn points(&self) -> [&Point; 3] {
        [&self.ray1, &self.vertex, &self.ray2]
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.a, self.b)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "∠{}{}{}", self.ray1, self.vertex, self.ray2)
    }
}

/// Kind of a fact tracked by the fact store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactKind {
    Segment,
    Angle,
}

/// Reference to a segment length or angle measure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactRef {
    Segment(Segment),
    Angle(Angle),
}

impl FactRef {
    pub fn kind(&self) -> FactKind {
        match self {
            FactRef::Segment(_) => FactKind::Segment,
            FactRef::Angle(_) => FactKind::Angle,
        }
    }

    pub fn points(&self) -> Vec<&Point> {
        match self {
            FactRef::Segment(s) => s.points().to_vec(),
            FactRef::Angle(a) => a.points().to_vec(),
        }
    }

    /// Whether `value` can measure this fact in a proper triangle
    ///
    /// Lengths must be positive, angles strictly between 0 and 180 degrees.
    pub fn admits(&self, value: f64) -> bool {
        value.is_finite()
            && match self {
                FactRef::Segment(_) => value > 0.0,
                FactRef::Angle(_) => value > 0.0 && value < 180.0,
            }
    }
}

impl From<Segment> for FactRef {
    fn from(segment: Segment) -> Self {
        FactRef::Segment(segment)
    }
}

impl From<Angle> for FactRef {
    fn from(angle: Angle) -> Self {
        FactRef::Angle(angle)
    }
}

impl fmt::Display for FactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactRef::Segment(s) => s.fmt(f),
            FactRef::Angle(a) => a.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Point {
        Point::new(name)
    }

    #[test]
    fn test_segment_key_is_order_independent() {
        assert_eq!(segment_key(&p("A"), &p("B")), segment_key(&p("B"), &p("A")));
        assert_eq!(segment_key(&p("B"), &p("A")).to_string(), "AB");
    }

    #[test]
    fn test_angle_key_normalizes_rays() {
        let abc = angle_key(&p("A"), &p("B"), &p("C"));
        let cba = angle_key(&p("C"), &p("B"), &p("A"));

        assert_eq!(abc, cba);
        assert_eq!(cba.to_string(), "∠ABC");
        assert_eq!(abc.vertex(), &p("B"));
    }

    #[test]
    fn test_angle_key_keeps_vertex() {
        let abc = angle_key(&p("A"), &p("B"), &p("C"));
        let acb = angle_key(&p("A"), &p("C"), &p("B"));
        let bac = angle_key(&p("B"), &p("A"), &p("C"));

        assert_ne!(abc, acb);
        assert_ne!(abc, bac);
        assert_ne!(acb, bac);
    }

    #[test]
    fn test_fact_ref_kind() {
        let seg: FactRef = segment_key(&p("A"), &p("B")).into();
        let ang: FactRef = angle_key(&p("A"), &p("B"), &p("C")).into();

        assert_eq!(seg.kind(), FactKind::Segment);
        assert_eq!(ang.kind(), FactKind::Angle);
        assert_eq!(ang.points().len(), 3);
    }

    #[test]
    fn test_admissible_values() {
        let seg: FactRef = segment_key(&p("A"), &p("B")).into();
        let ang: FactRef = angle_key(&p("A"), &p("B"), &p("C")).into();

        assert!(seg.admits(0.5));
        assert!(!seg.admits(0.0));
        assert!(!seg.admits(-2.0));
        assert!(ang.admits(179.0));
        assert!(!ang.admits(180.0));
        assert!(!ang.admits(f64::NAN));
    }

    #[test]
    fn test_multi_letter_names_sort_lexically() {
        let s = segment_key(&p("P2"), &p("P10"));
        assert_eq!(s.points(), [&p("P10"), &p("P2")]);
    }
}
