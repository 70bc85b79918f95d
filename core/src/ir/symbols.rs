//! Named points and the per-branch symbol table
//!
//! Points are identified by name: two points with the same name are the same
//! point. Each solver branch owns its own `SymbolTable`, so cloning a branch
//! deep-copies the table and nothing is shared between branches.

use super::coords::{CoordinateStore, Point2D};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named point; equality, ordering and hashing go by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point(String);

impl Point {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbol table mapping point names to points and optional coordinates
///
/// Registration is idempotent by name; the insertion order is kept so that
/// iteration (and therefore rule application) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    point_map: FxHashMap<String, Point>,
    point_order: Vec<Point>,
    coords: CoordinateStore,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point by name, returning the existing point if already known
    pub fn get_or_intern_point(&mut self, name: &str) -> Point {
        if let Some(point) = self.point_map.get(name) {
            return point.clone();
        }
        let point = Point::new(name);
        self.point_map.insert(name.to_string(), point.clone());
        self.point_order.push(point.clone());
        point
    }

    /// Register a point and pin it to coordinates
    ///
    /// Returns true if the coordinates of the point changed.
    pub fn add_point_at(&mut self, name: &str, at: Point2D) -> bool {
        let point = self.get_or_intern_point(name);
        let changed = self.coords.get(&point) != Some(at);
        self.coords.set(point, at);
        changed
    }

    /// Look up a point by name
    pub fn point(&self, name: &str) -> Option<&Point> {
        self.point_map.get(name)
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.point_map.contains_key(point.name())
    }

    /// Coordinates of a point, when known
    pub fn coordinates(&self, point: &Point) -> Option<Point2D> {
        self.coords.get(point)
    }

    /// Points in registration order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.point_order.iter()
    }

    /// Get the number of registered points
    pub fn num_points(&self) -> usize {
        self.point_order.len()
    }
}
