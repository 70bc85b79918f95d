//! Intermediate Representation (IR) module
//!
//! Core data structures of the engine:
//! - **keys**: canonical segment and angle identities
//! - **symbols**: named points and the per-branch symbol table
//! - **dsu**: disjoint-set union over keys
//! - **facts**: equivalence classes with numeric values and the triangle registry
//! - **constraint**: asserted constraints and their shapes
//! - **expr**: arithmetic expressions and unknowns
//! - **trace**: derivation traces
//!
//! # Example
//!
//! ```rust
//! use eukleia_core::ir::*;
//!
//! let mut symbols = SymbolTable::new();
//! let a = symbols.get_or_intern_point("A");
//! let b = symbols.get_or_intern_point("B");
//! let c = symbols.get_or_intern_point("C");
//! let d = symbols.get_or_intern_point("D");
//!
//! let mut facts = FactStore::new();
//! facts.set_segment_value(&segment_key(&a, &b), 4.0).unwrap();
//! facts.merge_segments(&segment_key(&c, &d), &segment_key(&b, &a)).unwrap();
//!
//! assert_eq!(facts.segment_value(&segment_key(&d, &c)), Some(4.0));
//! ```

mod constraint;
mod coords;
mod dsu;
mod error;
mod expr;
mod facts;
mod keys;
mod symbols;
mod trace;

// Re-export all public items for convenient access
pub use constraint::{Constraint, ConstraintShape, Operand, Operator};
pub use coords::{ops, CoordinateStore, Point2D};
pub use dsu::DisjointSets;
pub use error::{EngineError, EngineResult};
pub use expr::{Expr, Slot, Unknown, UnknownGen};
pub use facts::{
    approx_eq, Ambiguity, FactStore, ANGLE_TOLERANCE, MERGE_TOLERANCE, SEGMENT_TOLERANCE,
};
pub use keys::{angle_key, segment_key, Angle, FactKind, FactRef, Segment};
pub use symbols::{Point, SymbolTable};
pub use trace::{Derivation, DerivationStep, StepId};
