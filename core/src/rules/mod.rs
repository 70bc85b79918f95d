//! Propagation rules
//!
//! A rule reacts to one kind of agenda item (a freshly asserted constraint,
//! a changed segment, a changed angle) and reports the facts it changed. The
//! solver pushes those back onto the agenda until nothing changes.

pub mod definition;
pub mod equality;
pub mod isosceles;
pub mod triangle;
pub mod trig;

pub use definition::*;
pub use equality::*;
pub use isosceles::*;
pub use triangle::*;
pub use trig::*;

use crate::geometry::Triangle;
use crate::ir::{Constraint, EngineResult, FactRef, FactStore};
use std::fmt;

/// Work item on a branch's propagation agenda
#[derive(Debug, Clone, PartialEq)]
pub enum AgendaItem {
    Constraint(Constraint),
    Fact(FactRef),
}

impl fmt::Display for AgendaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgendaItem::Constraint(c) => c.fmt(f),
            AgendaItem::Fact(fact) => fact.fmt(f),
        }
    }
}

/// Kind of agenda item a rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Constraint,
    Segment,
    Angle,
    /// Any changed segment or angle
    Fact,
}

impl Trigger {
    pub fn matches(self, item: &AgendaItem) -> bool {
        match (self, item) {
            (Trigger::Constraint, AgendaItem::Constraint(_)) => true,
            (Trigger::Segment, AgendaItem::Fact(FactRef::Segment(_))) => true,
            (Trigger::Angle, AgendaItem::Fact(FactRef::Angle(_))) => true,
            (Trigger::Fact, AgendaItem::Fact(_)) => true,
            _ => false,
        }
    }
}

/// Rule trait - all propagation rules implement this
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Agenda items this rule reacts to
    fn trigger(&self) -> Trigger;

    /// Apply the rule to one agenda item
    ///
    /// Returns the facts whose class or value changed. A numeric conflict
    /// is reported as `ImpossibleConstraint`.
    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>>;
}

/// Get all propagation rules, in application order
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    // Constraint definitions (1)
    rules.push(Box::new(definition::Definition));

    // Congruence closure over values (1)
    rules.push(Box::new(equality::ValueEquality));

    // Isosceles triangles (2)
    rules.push(Box::new(isosceles::IsoscelesAngleToSide));
    rules.push(Box::new(isosceles::IsoscelesSideToAngle));

    // Angle sum (1)
    rules.push(Box::new(triangle::AngleSum));

    // Trigonometry (2)
    rules.push(Box::new(trig::LawOfCosines));
    rules.push(Box::new(trig::LawOfSines));

    rules
}

/// Registered triangles having every point of `fact` as a vertex
fn triangles_touching(facts: &FactStore, fact: &FactRef) -> Vec<Triangle> {
    facts.triangles_containing(&fact.points())
}

/// Append `fact` to `changed` when a store update reported a change
fn note(changed: &mut Vec<FactRef>, updated: bool, fact: impl Into<FactRef>) {
    if updated {
        changed.push(fact.into());
    }
}
