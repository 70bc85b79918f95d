//! Fact store: equivalence classes of segments and angles plus known values
//!
//! Every class root may carry one numeric value (a length, or a measure in
//! degrees). Merging or assigning detects numeric conflicts at once, so a
//! contradiction is attributed to the fact that introduced it.

use super::dsu::DisjointSets;
use super::error::{EngineError, EngineResult};
use super::keys::{Angle, FactRef, Segment};
use super::symbols::Point;
use crate::geometry::{Triangle, TriangleKey};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::hash::Hash;

/// Tolerance for comparing segment lengths
pub const SEGMENT_TOLERANCE: f64 = 1e-12;

/// Tolerance for comparing angle measures in degrees
///
/// Looser than lengths: angles often come out of inverse trigonometry.
pub const ANGLE_TOLERANCE: f64 = 1e-10;

/// Tolerance for merging two valued classes of either kind
pub const MERGE_TOLERANCE: f64 = 1e-10;

/// Compare two values with a tolerance relative to their magnitude
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * 1f64.max(a.abs()).max(b.abs())
}

/// Equivalence classes over one key type, with an optional value per root
#[derive(Debug, Clone)]
struct ValueClasses<K: Eq + Hash> {
    dsu: DisjointSets<K>,
    values: FxHashMap<K, f64>,
    tolerance: f64,
}

impl<K: Clone + Eq + Hash + Display> ValueClasses<K> {
    fn new(tolerance: f64) -> Self {
        Self {
            dsu: DisjointSets::new(),
            values: FxHashMap::default(),
            tolerance,
        }
    }

    fn merge(&mut self, a: &K, b: &K) -> EngineResult<bool> {
        let ra = self.dsu.find(a);
        let rb = self.dsu.find(b);
        if ra == rb {
            return Ok(false);
        }

        let va = self.values.get(&ra).copied();
        let vb = self.values.get(&rb).copied();
        if let (Some(va), Some(vb)) = (va, vb) {
            if !approx_eq(va, vb, MERGE_TOLERANCE) {
                return Err(EngineError::impossible(format!(
                    "{} = {} conflicts with {} = {}",
                    a, va, b, vb
                )));
            }
        }

        let root = self.dsu.union(&ra, &rb);
        self.values.remove(&ra);
        self.values.remove(&rb);
        if let Some(value) = va.or(vb) {
            self.values.insert(root, value);
        }
        Ok(true)
    }

    fn set_value(&mut self, key: &K, value: f64) -> EngineResult<bool> {
        if !value.is_finite() {
            return Err(EngineError::impossible(format!(
                "{} cannot take the value {}",
                key, value
            )));
        }
        let root = self.dsu.find(key);
        match self.values.get(&root) {
            None => {
                self.values.insert(root, value);
                Ok(true)
            }
            Some(&known) if approx_eq(known, value, self.tolerance) => Ok(false),
            Some(&known) => Err(EngineError::impossible(format!(
                "{} is already {}, cannot be {}",
                key, known, value
            ))),
        }
    }

    fn value(&self, key: &K) -> Option<f64> {
        let root = self.dsu.peek(key)?;
        self.values.get(&root).copied()
    }

    fn same(&self, a: &K, b: &K) -> bool {
        if a == b {
            return true;
        }
        match (self.dsu.peek(a), self.dsu.peek(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Every key seen so far whose class holds a value
    fn valued_keys(&self) -> Vec<(K, f64)> {
        self.dsu
            .keys()
            .filter_map(|k| self.value(k).map(|v| (k.clone(), v)))
            .collect()
    }
}

/// An angle that the law of sines could not pin down to a single value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub angle: Angle,
    pub candidates: Vec<f64>,
}

/// Authoritative store of what is currently known in one branch
///
/// Holds segment and angle classes with their values, the parallel classes
/// of segments, the registry of triangles, and pending ambiguities.
#[derive(Debug, Clone)]
pub struct FactStore {
    segments: ValueClasses<Segment>,
    angles: ValueClasses<Angle>,
    parallels: DisjointSets<Segment>,
    triangles: BTreeMap<TriangleKey, Triangle>,
    ambiguities: Vec<Ambiguity>,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FactStore {
    /// Create a new empty fact store
    pub fn new() -> Self {
        Self {
            segments: ValueClasses::new(SEGMENT_TOLERANCE),
            angles: ValueClasses::new(ANGLE_TOLERANCE),
            parallels: DisjointSets::new(),
            triangles: BTreeMap::new(),
            ambiguities: Vec::new(),
        }
    }

    // --- Segments ---

    /// Put `a` and `b` in the same length class
    ///
    /// Returns false if they already were.
    pub fn merge_segments(&mut self, a: &Segment, b: &Segment) -> EngineResult<bool> {
        self.segments.merge(a, b)
    }

    pub fn set_segment_value(&mut self, segment: &Segment, length: f64) -> EngineResult<bool> {
        self.segments.set_value(segment, length)
    }

    pub fn segment_value(&self, segment: &Segment) -> Option<f64> {
        self.segments.value(segment)
    }

    pub fn same_segment_class(&self, a: &Segment, b: &Segment) -> bool {
        self.segments.same(a, b)
    }

    pub fn valued_segments(&self) -> Vec<(Segment, f64)> {
        self.segments.valued_keys()
    }

    // --- Angles ---

    pub fn merge_angles(&mut self, a: &Angle, b: &Angle) -> EngineResult<bool> {
        self.angles.merge(a, b)
    }

    pub fn set_angle_value(&mut self, angle: &Angle, degrees: f64) -> EngineResult<bool> {
        self.angles.set_value(angle, degrees)
    }

    pub fn angle_value(&self, angle: &Angle) -> Option<f64> {
        self.angles.value(angle)
    }

    pub fn same_angle_class(&self, a: &Angle, b: &Angle) -> bool {
        self.angles.same(a, b)
    }

    pub fn valued_angles(&self) -> Vec<(Angle, f64)> {
        self.angles.valued_keys()
    }

    // --- Parallels ---

    /// Put two segments in the same direction class
    pub fn merge_parallels(&mut self, a: &Segment, b: &Segment) -> bool {
        if self.parallels.same(a, b) {
            return false;
        }
        self.parallels.union(a, b);
        true
    }

    pub fn are_parallel(&self, a: &Segment, b: &Segment) -> bool {
        match (self.parallels.peek(a), self.parallels.peek(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    // --- Dispatch by fact kind ---

    pub fn value(&self, fact: &FactRef) -> Option<f64> {
        match fact {
            FactRef::Segment(s) => self.segment_value(s),
            FactRef::Angle(a) => self.angle_value(a),
        }
    }

    pub fn set_value(&mut self, fact: &FactRef, value: f64) -> EngineResult<bool> {
        match fact {
            FactRef::Segment(s) => self.set_segment_value(s, value),
            FactRef::Angle(a) => self.set_angle_value(a, value),
        }
    }

    // --- Triangles ---

    /// Register a triangle, returning false if it was already known
    pub fn register_triangle(&mut self, triangle: Triangle) -> bool {
        if self.triangles.contains_key(triangle.key()) {
            return false;
        }
        self.triangles.insert(triangle.key().clone(), triangle);
        true
    }

    pub fn remove_triangle(&mut self, key: &TriangleKey) -> Option<Triangle> {
        self.triangles.remove(key)
    }

    pub fn has_triangle(&self, key: &TriangleKey) -> bool {
        self.triangles.contains_key(key)
    }

    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.values()
    }

    /// Registered triangles having every given point as a vertex
    pub fn triangles_containing(&self, points: &[&Point]) -> Vec<Triangle> {
        self.triangles
            .values()
            .filter(|tri| tri.contains_all(points))
            .cloned()
            .collect()
    }

    // --- Ambiguities ---

    /// Record alternative values for an angle, once per angle
    pub fn record_ambiguity(&mut self, angle: &Angle, candidates: Vec<f64>) -> bool {
        if self.ambiguities.iter().any(|a| &a.angle == angle) {
            return false;
        }
        self.ambiguities.push(Ambiguity {
            angle: angle.clone(),
            candidates,
        });
        true
    }

    pub fn take_ambiguities(&mut self) -> Vec<Ambiguity> {
        std::mem::take(&mut self.ambiguities)
    }

    pub fn restore_ambiguities(&mut self, ambiguities: Vec<Ambiguity>) {
        self.ambiguities = ambiguities;
    }

    /// Stable textual summary of every known value
    ///
    /// Two stores with the same summary hold the same assignments.
    pub fn fingerprint(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .valued_segments()
            .into_iter()
            .map(|(s, v)| format!("{}={:.9}", s, v))
            .chain(
                self.valued_angles()
                    .into_iter()
                    .map(|(a, v)| format!("{}={:.9}", a, v)),
            )
            .collect();
        entries.sort();
        entries
    }
}
