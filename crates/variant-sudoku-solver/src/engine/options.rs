//! Engine-wide tunables (spec §9 design notes).
//!
//! The teacher exposes solver configuration through constructors
//! (`BacktrackSolver::with_techniques`) rather than an external config file; this crate
//! follows the same idiom, bundling the handful of tunables the spec calls out by name
//! into one `Copy` struct passed to [`crate::Engine::build`].

/// Tunables governing search behavior that are not themselves constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Bound on nested `Or` depth the builder will flatten/trial-propagate before
    /// falling back to ordinary branching (spec §9: "bound recursion depth of nested
    /// `Or` to prevent exponential blowup... choose a sensible limit, e.g. depth 4").
    pub max_or_nesting_depth: u32,
    /// Number of random descents averaged by [`crate::Engine::estimate_solutions`]
    /// (spec §4.1, §4.6).
    pub estimate_solutions_samples: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { max_or_nesting_depth: 4, estimate_solutions_samples: 64 }
    }
}
