//! Derivation traces
//!
//! A branch records which rule changed which facts, in order. The trace is
//! purely informational: replaying it is never needed to answer a query.

use super::keys::FactRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a derivation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub u32);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step{}", self.0)
    }
}

/// One rule application that changed at least one fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationStep {
    pub id: StepId,

    /// Name of the rule applied
    pub rule_id: String,

    /// The constraint or fact that triggered the rule
    pub trigger: String,

    /// Facts whose class or value changed
    pub conclusions: Vec<FactRef>,
}

/// Ordered record of derivation steps in one branch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    pub steps: Vec<DerivationStep>,
}

impl Derivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, numbering it after the existing ones
    pub fn record(&mut self, rule_id: &str, trigger: String, conclusions: Vec<FactRef>) -> StepId {
        let id = StepId(self.steps.len() as u32);
        self.steps.push(DerivationStep {
            id,
            rule_id: rule_id.to_string(),
            trigger,
            conclusions,
        });
        id
    }

    /// Steps that concluded something about `fact`
    pub fn steps_concluding<'a>(
        &'a self,
        fact: &'a FactRef,
    ) -> impl Iterator<Item = &'a DerivationStep> {
        self.steps.iter().filter(move |s| s.conclusions.contains(fact))
    }

    /// Names of the rules used, in first-use order
    pub fn rules_used(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !seen.contains(&step.rule_id.as_str()) {
                seen.push(&step.rule_id);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
