//! Engine error taxonomy
//!
//! `ImpossibleConstraint` is recoverable: the solver prunes the branch that
//! raised it. The remaining variants are returned to the caller as-is.

use thiserror::Error;

/// Errors raised by the fact store, the rule set and the solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A new fact contradicts one that is already known
    #[error("Impossible constraint: {0}")]
    ImpossibleConstraint(String),

    /// The operand kinds of a constraint have no matching rule
    #[error("Unsupported constraint shape: {left} {operator} {right}")]
    UnsupportedConstraintShape {
        left: String,
        operator: String,
        right: String,
    },

    /// Forking would exceed the configured number of live branches
    #[error("Branch limit exceeded: more than {limit} live branches")]
    BranchLimitExceeded { limit: usize },

    /// A query asked for something that is neither a segment nor an angle
    #[error("Not a queryable target: {0}")]
    NotATarget(String),
}

impl EngineError {
    pub fn impossible(message: impl Into<String>) -> Self {
        EngineError::ImpossibleConstraint(message.into())
    }

    /// Whether the solver may recover from this error by pruning a branch
    pub fn is_contradiction(&self) -> bool {
        matches!(self, EngineError::ImpossibleConstraint(_))
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contradiction_classification() {
        assert!(EngineError::impossible("AB already has a value").is_contradiction());
        assert!(!EngineError::BranchLimitExceeded { limit: 4 }.is_contradiction());
    }

    #[test]
    fn test_error_messages() {
        let err = EngineError::UnsupportedConstraintShape {
            left: "∠ABC".to_string(),
            operator: "==".to_string(),
            right: "P".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported constraint shape: ∠ABC == P");
        assert_eq!(
            EngineError::impossible("AB").to_string(),
            "Impossible constraint: AB"
        );
    }
}
