//! Solver module - branch management and queries
//!
//! The solver holds every live branch. Constraints fan out to all of them;
//! branches that contradict a constraint are pruned, and branches that split
//! on an ambiguous value are merged back in with duplicates removed.

pub mod branch;
pub mod config;
pub mod equation;
pub mod relations;

pub use branch::*;
pub use config::*;
pub use equation::*;
pub use relations::*;

use crate::geometry::Degeneracy;
use crate::ir::{
    approx_eq, Constraint, EngineError, EngineResult, FactKind, FactRef, Operand, Operator, Point,
    Point2D, ANGLE_TOLERANCE, SEGMENT_TOLERANCE,
};
use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Answers for one query target, one per live branch in branch order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSolution {
    pub target: FactRef,
    pub resolutions: Vec<Resolution>,
}

/// Query results, in target order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solutions {
    entries: Vec<TargetSolution>,
}

impl Solutions {
    pub fn iter(&self) -> impl Iterator<Item = &TargetSolution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-branch answers for `target`, if it was queried
    pub fn get(&self, target: &FactRef) -> Option<&[Resolution]> {
        self.entries
            .iter()
            .find(|e| &e.target == target)
            .map(|e| e.resolutions.as_slice())
    }

    /// Values of `target` across branches, duplicates removed, branch order kept
    pub fn distinct_values(&self, target: &FactRef) -> Vec<f64> {
        let tolerance = match target.kind() {
            FactKind::Segment => SEGMENT_TOLERANCE,
            FactKind::Angle => ANGLE_TOLERANCE,
        };
        let mut values: Vec<f64> = Vec::new();
        for v in self.get(target).unwrap_or_default().iter().filter_map(Resolution::value) {
            if !values.iter().any(|&seen| approx_eq(seen, v, tolerance)) {
                values.push(v);
            }
        }
        values
    }

    /// Whether every branch has a value for `target`
    pub fn is_determined(&self, target: &FactRef) -> bool {
        self.get(target)
            .map(|r| !r.is_empty() && r.iter().all(|res| res.value().is_some()))
            .unwrap_or(false)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Constraint engine over a set of live branches
#[derive(Debug, Clone)]
pub struct Solver {
    branches: Vec<SolverBranch>,
    config: SolverConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a solver with one empty branch and the default configuration
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        let mut root = SolverBranch::default();
        root.set_record_trace(config.record_trace);
        Self {
            branches: vec![root],
            config,
        }
    }

    /// Install an extra degeneracy predicate on every branch
    pub fn with_degeneracy(mut self, check: impl Degeneracy + 'static) -> Self {
        let check: Arc<dyn Degeneracy> = Arc::new(check);
        for branch in &mut self.branches {
            branch.add_degeneracy_check(check.clone());
        }
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn branches(&self) -> &[SolverBranch] {
        &self.branches
    }

    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    /// Register a point in every branch; idempotent by name
    pub fn add_point(&mut self, name: &str) -> Point {
        for branch in &mut self.branches {
            branch.add_point(name);
        }
        Point::new(name)
    }

    /// Register a point with coordinates in every branch
    ///
    /// Branches whose facts contradict the measured coordinates are pruned.
    pub fn add_point_at(&mut self, name: &str, at: Point2D) -> EngineResult<Point> {
        self.update_branches(name, |mut branch, config| {
            branch.add_point_at(name, at)?;
            branch.settle(&[], config)
        })?;
        Ok(Point::new(name))
    }

    /// Build and assert `left operator right`
    ///
    /// Operand kinds with no matching rule fail with
    /// `UnsupportedConstraintShape` before any branch is touched.
    pub fn constrain(
        &mut self,
        left: impl Into<Operand>,
        operator: Operator,
        right: impl Into<Operand>,
    ) -> EngineResult<()> {
        let constraint = Constraint::new(left, operator, right)?;
        self.add_constraint(constraint)
    }

    /// Assert a constraint in every branch
    ///
    /// Contradicted branches are pruned. If none survives, the contradiction
    /// is returned and the solver is left as it was before the call.
    pub fn add_constraint(&mut self, constraint: Constraint) -> EngineResult<()> {
        debug!("asserting {}", constraint);
        let label = constraint.to_string();
        self.update_branches(&label, |mut branch, config| {
            branch.add_constraint(constraint.clone())?;
            branch.settle(&[], config)
        })
    }

    /// Merge new branches into the live set
    ///
    /// Branches whose assignments match a live branch are dropped. Fails with
    /// `BranchLimitExceeded`, leaving the live set untouched, if the result
    /// would exceed the configured ceiling.
    pub fn fork(&mut self, new_branches: Vec<SolverBranch>) -> EngineResult<()> {
        let mut seen: FxHashSet<u64> = self.branches.iter().map(|b| b.fingerprint()).collect();
        let fresh: Vec<SolverBranch> = new_branches
            .into_iter()
            .filter(|b| seen.insert(b.fingerprint()))
            .collect();

        if self.branches.len() + fresh.len() > self.config.max_branches {
            return Err(EngineError::BranchLimitExceeded {
                limit: self.config.max_branches,
            });
        }
        self.branches.extend(fresh);
        Ok(())
    }

    /// Resolve every target in every branch
    ///
    /// Ambiguities discovered while answering may split branches; the split
    /// persists for later constraints and queries.
    pub fn solve(&mut self, targets: &[FactRef]) -> EngineResult<Solutions> {
        self.update_branches("query", |mut branch, config| {
            branch.prepare_query(targets)?;
            branch.settle(targets, config)
        })?;

        let entries = targets
            .iter()
            .map(|target| TargetSolution {
                target: target.clone(),
                resolutions: self.branches.iter().map(|b| b.resolve(target)).collect(),
            })
            .collect();
        Ok(Solutions { entries })
    }

    /// Resolve targets given as operands; only segments and angles qualify
    pub fn solve_operands(&mut self, targets: &[Operand]) -> EngineResult<Solutions> {
        let facts = targets
            .iter()
            .map(|op| {
                op.as_fact()
                    .ok_or_else(|| EngineError::NotATarget(op.to_string()))
            })
            .collect::<EngineResult<Vec<_>>>()?;
        self.solve(&facts)
    }

    /// Replace every branch by what `step` turns it into
    ///
    /// Contradictions prune; if every branch is pruned, or any other error
    /// occurs, the previous branches are restored and the error returned.
    fn update_branches<F>(&mut self, what: &str, step: F) -> EngineResult<()>
    where
        F: Fn(SolverBranch, &SolverConfig) -> EngineResult<Vec<SolverBranch>>,
    {
        let previous = std::mem::take(&mut self.branches);
        let mut survivors = Vec::new();
        let mut last_error = None;

        for branch in previous.iter().cloned() {
            match step(branch, &self.config) {
                Ok(branches) => survivors.extend(branches),
                Err(err) if err.is_contradiction() => {
                    debug!("pruned a branch on {}: {}", what, err);
                    last_error = Some(err);
                }
                Err(err) => {
                    self.branches = previous;
                    return Err(err);
                }
            }
        }

        if survivors.is_empty() {
            self.branches = previous;
            return Err(last_error.unwrap_or_else(|| {
                EngineError::impossible(format!("no branch survives {}", what))
            }));
        }

        if let Err(err) = self.fork(survivors) {
            self.branches = previous;
            return Err(err);
        }
        if self.branches.len() > 1 {
            debug!("{} live branches after {}", self.branches.len(), what);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{segment_key, Expr};

    #[test]
    fn test_solver_starts_with_one_branch() {
        let solver = Solver::new();
        assert_eq!(solver.num_branches(), 1);
        assert_eq!(solver.config().max_branches, 64);
    }

    #[test]
    fn test_fork_deduplicates() {
        let mut solver = Solver::new();
        let copy = solver.branches()[0].clone();
        solver.fork(vec![copy.clone(), copy]).unwrap();
        assert_eq!(solver.num_branches(), 1);
    }

    #[test]
    fn test_branch_limit() {
        let mut solver = Solver::with_config(SolverConfig {
            max_branches: 1,
            ..SolverConfig::default()
        });
        let a = solver.add_point("A");
        let b = solver.add_point("B");
        let ab = Expr::from(segment_key(&a, &b));

        let err = solver
            .constrain(ab.clone() * ab.clone() - ab * 5.0 + 6.0, Operator::Eq, 0.0)
            .unwrap_err();
        assert_eq!(err, EngineError::BranchLimitExceeded { limit: 1 });
        assert_eq!(solver.num_branches(), 1);
        assert!(solver.branches()[0].constraints().is_empty());
    }

    #[test]
    fn test_contradiction_leaves_solver_unchanged() {
        let mut solver = Solver::new();
        let a = solver.add_point("A");
        let b = solver.add_point("B");
        solver.constrain(segment_key(&a, &b), Operator::Eq, 3.0).unwrap();

        let err = solver
            .constrain(segment_key(&a, &b), Operator::Eq, 4.0)
            .unwrap_err();
        assert!(err.is_contradiction());
        assert_eq!(solver.branches()[0].constraints().len(), 1);
    }

    #[test]
    fn test_points_are_not_targets() {
        let mut solver = Solver::new();
        let a = solver.add_point("A");
        let err = solver.solve_operands(&[Operand::Point(a)]).unwrap_err();
        assert_eq!(err, EngineError::NotATarget("A".to_string()));
    }

    #[test]
    fn test_distinct_values() {
        let [a, b] = ["A", "B"].map(Point::new);
        let ab: FactRef = segment_key(&a, &b).into();
        let solutions = Solutions {
            entries: vec![TargetSolution {
                target: ab.clone(),
                resolutions: vec![
                    Resolution::Value(2.0),
                    Resolution::Value(2.0),
                    Resolution::Undeterminable,
                    Resolution::Value(3.0),
                ],
            }],
        };
        assert_eq!(solutions.distinct_values(&ab), vec![2.0, 3.0]);
        assert!(!solutions.is_determined(&ab));
    }
}
