//! Eukleia Core
//!
//! Geometric constraint engine: congruence closure over segments and
//! angles, triangle rules, and branching on ambiguous values

pub mod ir;       // Intermediate representation (keys, facts, constraints, expressions)
pub mod geometry; // Geometric helpers (triangles, trigonometry, degeneracy)
pub mod rules;    // Propagation rules
pub mod solver;   // Branches, solver, equations, relations
pub mod loader;   // JSON problem files

pub use ir::*;
pub use geometry::*;
pub use rules::{all_rules, AgendaItem, Rule, Trigger};
pub use solver::{Resolution, Solutions, Solver, SolverBranch, SolverConfig, TargetSolution};
pub use loader::{load_problem, load_problems, GeometryProblem, LoadError, LoadResult, ProblemRun};
