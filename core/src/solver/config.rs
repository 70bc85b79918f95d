//! Solver configuration

/// Limits and switches for a [`Solver`](super::Solver)
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum number of live branches
    pub max_branches: usize,

    /// Maximum agenda items processed per propagation run
    pub max_steps: usize,

    /// Whether branches keep a derivation trace
    pub record_trace: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_branches: 64,
            max_steps: 100_000,
            record_trace: true,
        }
    }
}
