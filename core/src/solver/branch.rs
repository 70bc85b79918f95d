//! Solver branches
//!
//! A branch is one self-consistent hypothesis about the figure. It owns its
//! symbol table, constraints and fact store outright; forking clones all of
//! them, so branches never share mutable state.

use super::config::SolverConfig;
use super::equation::{solve_equation, EquationOutcome};
use super::relations::{check_relation, Verdict};
use crate::geometry::{Degeneracy, DegeneracyChecks, Triangle, TriangleKey};
use crate::ir::{
    ops, Angle, Constraint, ConstraintShape, Derivation, EngineError, EngineResult, FactRef,
    FactStore, Operand, Point, Point2D, Slot, SymbolTable, Unknown,
};
use crate::rules::{all_rules, AgendaItem};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Answer for one query target in one branch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Value(f64),
    /// Not enough is known to derive a value
    Undeterminable,
}

impl Resolution {
    pub fn value(&self) -> Option<f64> {
        match self {
            Resolution::Value(v) => Some(*v),
            Resolution::Undeterminable => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(v) => write!(f, "{}", v),
            Resolution::Undeterminable => f.write_str("Undeterminable"),
        }
    }
}

/// A choice the branch cannot make by propagation alone
enum Decision {
    Assign {
        slot: Slot,
        value: f64,
        rule: &'static str,
    },
    Split {
        slot: Slot,
        values: Vec<f64>,
        rule: &'static str,
    },
}

fn decide(slot: Slot, mut values: Vec<f64>, rule: &'static str) -> EngineResult<Decision> {
    match values.len() {
        0 => Err(EngineError::impossible(format!(
            "no admissible value remains for {}",
            slot
        ))),
        1 => Ok(Decision::Assign {
            slot,
            value: values.remove(0),
            rule,
        }),
        _ => Ok(Decision::Split { slot, values, rule }),
    }
}

/// Facts a constraint names, directly or inside an expression
fn facts_named(constraint: &Constraint) -> Vec<FactRef> {
    [constraint.left(), constraint.right()]
        .into_iter()
        .filter_map(|op| op.as_expr())
        .flat_map(|expr| expr.slots())
        .filter_map(|slot| match slot {
            Slot::Fact(fact) => Some(fact),
            Slot::Unknown(_) => None,
        })
        .collect()
}

/// One hypothesis: symbols, constraints, facts and assigned unknowns
#[derive(Debug, Clone)]
pub struct SolverBranch {
    symbols: SymbolTable,
    constraints: Vec<Constraint>,
    facts: FactStore,
    unknowns: BTreeMap<Unknown, f64>,
    /// Items waiting for the next propagation run
    pending: Vec<AgendaItem>,
    trace: Derivation,
    record_trace: bool,
    degeneracy: DegeneracyChecks,
}

impl Default for SolverBranch {
    fn default() -> Self {
        Self::new(DegeneracyChecks::default())
    }
}

impl SolverBranch {
    pub fn new(degeneracy: DegeneracyChecks) -> Self {
        Self {
            symbols: SymbolTable::new(),
            constraints: Vec::new(),
            facts: FactStore::new(),
            unknowns: BTreeMap::new(),
            pending: Vec::new(),
            trace: Derivation::new(),
            record_trace: true,
            degeneracy,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn trace(&self) -> &Derivation {
        &self.trace
    }

    pub fn set_record_trace(&mut self, record: bool) {
        self.record_trace = record;
    }

    fn record(&mut self, rule_id: &str, trigger: String, conclusions: Vec<FactRef>) {
        if self.record_trace {
            self.trace.record(rule_id, trigger, conclusions);
        }
    }

    pub fn value(&self, fact: &FactRef) -> Option<f64> {
        self.facts.value(fact)
    }

    pub fn unknown_value(&self, unknown: &Unknown) -> Option<f64> {
        self.unknowns.get(unknown).copied()
    }

    pub fn resolve(&self, target: &FactRef) -> Resolution {
        match self.facts.value(target) {
            Some(v) => Resolution::Value(v),
            None => Resolution::Undeterminable,
        }
    }

    fn slot_value(&self, slot: &Slot) -> Option<f64> {
        match slot {
            Slot::Fact(fact) => self.facts.value(fact),
            Slot::Unknown(u) => self.unknowns.get(u).copied(),
        }
    }

    /// Add a degeneracy predicate and drop triangles it rules out
    pub fn add_degeneracy_check(&mut self, check: Arc<dyn Degeneracy>) {
        self.degeneracy.push(check);
        self.prune_degenerate_triangles();
    }

    /// Register a point by name; idempotent
    pub fn add_point(&mut self, name: &str) -> Point {
        self.symbols.get_or_intern_point(name)
    }

    /// Register a point with coordinates
    ///
    /// New coordinates can make triangles degenerate or fix measurements, so
    /// both are re-examined.
    pub fn add_point_at(&mut self, name: &str, at: Point2D) -> EngineResult<Point> {
        let changed = self.symbols.add_point_at(name, at);
        let point = self.symbols.get_or_intern_point(name);
        if changed {
            self.prune_degenerate_triangles();
            let mut known: Vec<FactRef> = self
                .facts
                .triangles()
                .flat_map(triangle_facts)
                .collect();
            known.extend(self.constraints.iter().flat_map(facts_named));
            for fact in known.iter().filter(|f| f.points().contains(&&point)) {
                self.seed_from_coordinates(fact)?;
            }
        }
        Ok(point)
    }

    /// Append a constraint and queue it for propagation
    ///
    /// Angles named by the constraint get their triangle registered unless
    /// its points are degenerate.
    pub fn add_constraint(&mut self, constraint: Constraint) -> EngineResult<()> {
        let named = facts_named(&constraint);
        for fact in &named {
            for point in fact.points() {
                self.symbols.get_or_intern_point(point.name());
            }
        }
        if let Operand::Point(p) = constraint.left() {
            self.symbols.get_or_intern_point(p.name());
        }

        for angle in &constraint.angles() {
            self.ensure_triangle(angle)?;
        }
        for fact in &named {
            self.seed_from_coordinates(fact)?;
        }

        self.pending.push(AgendaItem::Constraint(constraint.clone()));
        self.constraints.push(constraint);
        Ok(())
    }

    /// Register the triangle owning `angle`, returning whether it is new
    fn ensure_triangle(&mut self, angle: &Angle) -> EngineResult<bool> {
        let [r1, vertex, r2] = angle.points();
        if self.degeneracy.is_degenerate(&self.symbols, r1, vertex, r2) {
            debug!("{}{}{} is degenerate, no triangle registered", r1, vertex, r2);
            return Ok(false);
        }

        let triangle = Triangle::from_angle(angle);
        if !self.facts.register_triangle(triangle.clone()) {
            return Ok(false);
        }
        // rules only see a new triangle once its facts come round again
        for fact in triangle_facts(&triangle) {
            self.seed_from_coordinates(&fact)?;
            self.pending.push(AgendaItem::Fact(fact));
        }
        Ok(true)
    }

    /// Drop registered triangles the degeneracy checks now reject
    pub fn prune_degenerate_triangles(&mut self) {
        let degenerate: Vec<TriangleKey> = self
            .facts
            .triangles()
            .filter(|tri| {
                let [a, b, c] = tri.key().points();
                self.degeneracy.is_degenerate(&self.symbols, a, b, c)
            })
            .map(|tri| tri.key().clone())
            .collect();

        for key in degenerate {
            debug!("dropping degenerate triangle {:?}", key.points());
            self.facts.remove_triangle(&key);
        }
    }

    /// Set a fact to its measured value when all its points have coordinates
    fn seed_from_coordinates(&mut self, fact: &FactRef) -> EngineResult<()> {
        let coords = |p: &Point| self.symbols.coordinates(p);
        let measured = match fact {
            FactRef::Segment(s) => {
                let [a, b] = s.points();
                match (coords(a), coords(b)) {
                    (Some(pa), Some(pb)) => Some(pa.distance(&pb)),
                    _ => None,
                }
            }
            FactRef::Angle(angle) => {
                let [r1, vertex, r2] = angle.points();
                match (coords(r1), coords(vertex), coords(r2)) {
                    (Some(p1), Some(pv), Some(p2)) => ops::angle_degrees(p1, pv, p2),
                    _ => None,
                }
            }
        };

        if let Some(value) = measured {
            if self.facts.set_value(fact, value)? {
                self.record("coordinates", format!("{} measured", fact), vec![fact.clone()]);
                self.pending.push(AgendaItem::Fact(fact.clone()));
            }
        }
        Ok(())
    }

    /// Run the rules until the agenda drains or every target has a value
    ///
    /// Items left over by an early exit or by the step ceiling stay queued
    /// for the next run.
    pub fn propagate(&mut self, targets: &[FactRef], config: &SolverConfig) -> EngineResult<()> {
        let rules = all_rules();
        let mut agenda: VecDeque<AgendaItem> = self.pending.drain(..).collect();
        let mut steps = 0;

        while let Some(item) = agenda.pop_front() {
            if steps == config.max_steps {
                warn!(
                    "propagation stopped after {} steps with {} items left",
                    steps,
                    agenda.len() + 1
                );
                agenda.push_front(item);
                self.pending.extend(agenda);
                break;
            }
            steps += 1;

            for rule in rules.iter().filter(|r| r.trigger().matches(&item)) {
                let changed = rule.apply(&item, &mut self.facts)?;
                if changed.is_empty() {
                    continue;
                }
                trace!("{} on {} changed {:?}", rule.id(), item, changed);
                self.record(rule.id(), item.to_string(), changed.clone());
                for fact in changed.into_iter().rev() {
                    agenda.push_front(AgendaItem::Fact(fact));
                }
            }

            if !targets.is_empty() && targets.iter().all(|t| self.facts.value(t).is_some()) {
                self.pending.extend(agenda);
                break;
            }
        }
        Ok(())
    }

    /// Fail if any relational constraint is violated by what is known
    pub fn check_relations(&self) -> EngineResult<()> {
        let lookup = |slot: &Slot| self.slot_value(slot);
        for constraint in self.constraints.iter().filter(|c| c.shape().is_relational()) {
            let verdict = check_relation(constraint, &self.facts, &self.symbols, &lookup);
            if verdict == Verdict::Violated {
                return Err(EngineError::impossible(format!("{} does not hold", constraint)));
            }
        }
        Ok(())
    }

    /// Next ambiguity or solvable equation, if any
    fn next_decision(&mut self) -> EngineResult<Option<Decision>> {
        let mut ambiguities = self.facts.take_ambiguities();
        ambiguities.retain(|a| self.facts.angle_value(&a.angle).is_none());
        if !ambiguities.is_empty() {
            let first = ambiguities.remove(0);
            self.facts.restore_ambiguities(ambiguities);
            let fact = FactRef::Angle(first.angle);
            let candidates = first
                .candidates
                .into_iter()
                .filter(|&v| fact.admits(v))
                .collect();
            return decide(Slot::Fact(fact), candidates, "ambiguous_law_of_sines").map(Some);
        }

        let lookup = |slot: &Slot| self.slot_value(slot);
        for constraint in &self.constraints {
            if constraint.shape() != ConstraintShape::Equation {
                continue;
            }
            let (Some(left), Some(right)) =
                (constraint.left().as_expr(), constraint.right().as_expr())
            else {
                continue;
            };
            let outcome = solve_equation(&left, &right, &lookup)?;
            if let EquationOutcome::Roots { slot, roots } = outcome {
                return decide(slot, roots, "equation").map(Some);
            }
        }
        Ok(None)
    }

    fn assign(&mut self, slot: &Slot, value: f64, rule: &str) -> EngineResult<()> {
        match slot {
            Slot::Fact(fact) => {
                if self.facts.set_value(fact, value)? {
                    self.record(rule, format!("{} = {}", slot, value), vec![fact.clone()]);
                    self.pending.push(AgendaItem::Fact(fact.clone()));
                }
            }
            Slot::Unknown(u) => {
                self.unknowns.insert(u.clone(), value);
            }
        }
        Ok(())
    }

    /// Propagate, validate and take every pending decision
    ///
    /// Returns the branches this one turns into: itself when no choice is
    /// left, or the surviving children of a split. Fails with
    /// `ImpossibleConstraint` when nothing survives.
    pub fn settle(
        mut self,
        targets: &[FactRef],
        config: &SolverConfig,
    ) -> EngineResult<Vec<SolverBranch>> {
        loop {
            self.propagate(targets, config)?;
            self.check_relations()?;

            let Some(decision) = self.next_decision()? else {
                return Ok(vec![self]);
            };
            match decision {
                Decision::Assign { slot, value, rule } => {
                    debug!("{} = {} by {}", slot, value, rule);
                    self.assign(&slot, value, rule)?;
                }
                Decision::Split { slot, values, rule } => {
                    debug!("splitting on {} by {}: {:?}", slot, rule, values);
                    let mut settled = Vec::new();
                    let mut last_error = None;

                    for value in values {
                        let mut child = self.clone();
                        let outcome = child
                            .assign(&slot, value, rule)
                            .and_then(|()| child.settle(targets, config));
                        match outcome {
                            Ok(branches) => settled.extend(branches),
                            Err(err) if err.is_contradiction() => {
                                debug!("pruned {} = {}: {}", slot, value, err);
                                last_error = Some(err);
                            }
                            Err(err) => return Err(err),
                        }
                        if settled.len() > config.max_branches {
                            return Err(EngineError::BranchLimitExceeded {
                                limit: config.max_branches,
                            });
                        }
                    }

                    if settled.is_empty() {
                        return Err(last_error.unwrap_or_else(|| {
                            EngineError::impossible(format!("no value of {} survives", slot))
                        }));
                    }
                    return Ok(settled);
                }
            }
        }
    }

    /// Get ready to answer `targets`
    ///
    /// Registers triangles for angle targets, measures targets from
    /// coordinates, and queues every constraint again.
    pub fn prepare_query(&mut self, targets: &[FactRef]) -> EngineResult<()> {
        for target in targets {
            if let FactRef::Angle(angle) = target {
                self.ensure_triangle(angle)?;
            }
            self.seed_from_coordinates(target)?;
        }
        self.pending
            .extend(self.constraints.iter().cloned().map(AgendaItem::Constraint));
        Ok(())
    }

    /// Answer `targets` from this branch alone
    ///
    /// Ambiguities and multi-root equations are left undecided; splitting
    /// on them is the [`Solver`](super::Solver)'s job.
    pub fn solve(
        &mut self,
        targets: &[FactRef],
        config: &SolverConfig,
    ) -> EngineResult<Vec<(FactRef, Resolution)>> {
        self.prepare_query(targets)?;
        self.propagate(targets, config)?;
        self.check_relations()?;
        Ok(targets.iter().map(|t| (t.clone(), self.resolve(t))).collect())
    }

    /// Hash of every known value and unknown assignment
    ///
    /// Branches with equal fingerprints hold the same hypothesis.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.facts.fingerprint().hash(&mut hasher);
        for (unknown, value) in &self.unknowns {
            unknown.hash(&mut hasher);
            format!("{:.9}", value).hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Every side and angle of a triangle
fn triangle_facts(triangle: &Triangle) -> Vec<FactRef> {
    triangle
        .sides()
        .iter()
        .cloned()
        .map(FactRef::from)
        .chain(triangle.angles().iter().cloned().map(FactRef::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{angle_key, segment_key, Operator};

    fn config() -> SolverConfig {
        SolverConfig::default()
    }

    #[test]
    fn test_add_point_is_idempotent() {
        let mut branch = SolverBranch::default();
        let a1 = branch.add_point("A");
        let a2 = branch.add_point("A");
        assert_eq!(a1, a2);
        assert_eq!(branch.symbols().num_points(), 1);
    }

    #[test]
    fn test_angle_constraint_registers_triangle() {
        let mut branch = SolverBranch::default();
        let [a, b, c] = ["A", "B", "C"].map(|n| branch.add_point(n));
        branch
            .add_constraint(Constraint::equal(angle_key(&a, &b, &c), 40.0).unwrap())
            .unwrap();

        assert!(branch.facts().has_triangle(&TriangleKey::new(&a, &b, &c)));
        assert_eq!(branch.constraints().len(), 1);
    }

    #[test]
    fn test_solve_third_angle() {
        let mut branch = SolverBranch::default();
        let [a, b, c] = ["A", "B", "C"].map(|n| branch.add_point(n));
        branch
            .add_constraint(Constraint::equal(angle_key(&b, &a, &c), 50.0).unwrap())
            .unwrap();
        branch
            .add_constraint(Constraint::equal(angle_key(&a, &b, &c), 60.0).unwrap())
            .unwrap();

        let target: FactRef = angle_key(&a, &c, &b).into();
        let answer = branch.solve(&[target.clone()], &config()).unwrap();
        let value = answer[0].1.value().unwrap();
        assert!((value - 70.0).abs() < 1e-10);
        assert!(branch.trace().rules_used().contains(&"angle_sum"));
    }

    #[test]
    fn test_undeterminable_target() {
        let mut branch = SolverBranch::default();
        let [a, b] = ["A", "B"].map(|n| branch.add_point(n));
        let target: FactRef = segment_key(&a, &b).into();

        let answer = branch.solve(&[target], &config()).unwrap();
        assert_eq!(answer[0].1, Resolution::Undeterminable);
    }

    #[test]
    fn test_step_ceiling_keeps_unprocessed_facts() {
        let mut branch = SolverBranch::default();
        let [a, b, c] = ["A", "B", "C"].map(|n| branch.add_point(n));
        branch
            .add_constraint(Constraint::equal(angle_key(&b, &a, &c), 50.0).unwrap())
            .unwrap();
        branch.propagate(&[], &config()).unwrap();

        branch
            .add_constraint(Constraint::equal(angle_key(&a, &b, &c), 60.0).unwrap())
            .unwrap();
        let one_step = SolverConfig {
            max_steps: 1,
            ..config()
        };
        branch.propagate(&[], &one_step).unwrap();
        let target: FactRef = angle_key(&a, &c, &b).into();
        assert_eq!(branch.value(&target), None);

        let answer = branch.solve(&[target], &config()).unwrap();
        let value = answer[0].1.value().unwrap();
        assert!((value - 70.0).abs() < 1e-10);
    }

    #[test]
    fn test_coordinates_measure_facts() {
        let mut branch = SolverBranch::default();
        branch.add_point_at("A", Point2D::new(0.0, 0.0)).unwrap();
        branch.add_point_at("B", Point2D::new(3.0, 4.0)).unwrap();
        let [a, b] = ["A", "B"].map(|n| branch.add_point(n));

        let answer = branch.solve(&[segment_key(&a, &b).into()], &config()).unwrap();
        assert_eq!(answer[0].1, Resolution::Value(5.0));

        let err = branch
            .add_constraint(Constraint::equal(segment_key(&a, &b), 6.0).unwrap())
            .and_then(|()| branch.propagate(&[], &config()))
            .unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_collinear_coordinates_skip_triangle() {
        let mut branch = SolverBranch::default();
        branch.add_point_at("A", Point2D::new(0.0, 0.0)).unwrap();
        branch.add_point_at("B", Point2D::new(1.0, 0.0)).unwrap();
        branch.add_point_at("C", Point2D::new(2.0, 0.0)).unwrap();
        let [a, b, c] = ["A", "B", "C"].map(|n| branch.add_point(n));

        branch
            .add_constraint(Constraint::equal(angle_key(&a, &b, &c), 180.0).unwrap())
            .unwrap();
        assert_eq!(branch.facts().triangles().count(), 0);
    }

    #[test]
    fn test_settle_splits_on_quadratic() {
        let mut branch = SolverBranch::default();
        let [a, b] = ["A", "B"].map(|n| branch.add_point(n));
        let ab = crate::ir::Expr::from(segment_key(&a, &b));
        let quadratic = ab.clone() * ab.clone() - ab * 5.0 + 6.0;
        branch
            .add_constraint(Constraint::new(quadratic, Operator::Eq, 0.0).unwrap())
            .unwrap();

        let branches = branch.settle(&[], &config()).unwrap();
        assert_eq!(branches.len(), 2);
        assert_ne!(branches[0].fingerprint(), branches[1].fingerprint());
        let target: FactRef = segment_key(&a, &b).into();
        assert_eq!(branches[0].resolve(&target), Resolution::Value(2.0));
        assert_eq!(branches[1].resolve(&target), Resolution::Value(3.0));
    }

    #[test]
    fn test_settle_prunes_violated_relation() {
        let mut branch = SolverBranch::default();
        let [a, b] = ["A", "B"].map(|n| branch.add_point(n));
        let ab = segment_key(&a, &b);
        branch
            .add_constraint(Constraint::equal(ab.clone(), 3.0).unwrap())
            .unwrap();
        branch
            .add_constraint(Constraint::new(ab, Operator::Gt, 4.0).unwrap())
            .unwrap();

        let err = branch.settle(&[], &config()).unwrap_err();
        assert!(err.is_contradiction());
    }
}
