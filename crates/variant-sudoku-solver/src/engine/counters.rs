//! Search counters (spec §3).

use std::time::{Duration, Instant};

/// Statistics accumulated over the lifetime of one search (one call to any of
/// [`crate::Engine`]'s enumeration methods). Monotonic within a run.
#[derive(Debug, Clone)]
pub struct Counters {
    solutions: u64,
    guesses: u64,
    backtracks: u64,
    nodes_searched: u64,
    constraints_processed: u64,
    values_tried: u64,
    branches_ignored: u64,
    setup_start: Instant,
    puzzle_setup_time: Duration,
    run_start: Option<Instant>,
    time: Duration,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            solutions: 0,
            guesses: 0,
            backtracks: 0,
            nodes_searched: 0,
            constraints_processed: 0,
            values_tried: 0,
            branches_ignored: 0,
            setup_start: Instant::now(),
            puzzle_setup_time: Duration::ZERO,
            run_start: None,
            time: Duration::ZERO,
        }
    }
}

impl Counters {
    /// Creates a fresh counter set, starting the setup-time clock immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the end of one-time puzzle setup (build + `initialize`) and the start of
    /// search proper.
    pub fn mark_setup_done(&mut self) {
        self.puzzle_setup_time = self.setup_start.elapsed();
        self.run_start = Some(Instant::now());
    }

    /// Refreshes `time_ms` from the run clock; call before surfacing counters to a
    /// caller (solution emission, progress callback, or final result).
    pub fn refresh_time(&mut self) {
        if let Some(start) = self.run_start {
            self.time = start.elapsed();
        }
    }

    pub fn record_solution(&mut self) {
        self.solutions += 1;
    }

    pub fn record_guess(&mut self) {
        self.guesses += 1;
    }

    pub fn record_backtrack(&mut self) {
        self.backtracks += 1;
    }

    pub fn record_node(&mut self) {
        self.nodes_searched += 1;
    }

    pub fn record_constraint_processed(&mut self) {
        self.constraints_processed += 1;
    }

    pub fn record_value_tried(&mut self) {
        self.values_tried += 1;
    }

    pub fn record_branch_ignored(&mut self) {
        self.branches_ignored += 1;
    }

    #[must_use]
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    #[must_use]
    pub fn guesses(&self) -> u64 {
        self.guesses
    }

    #[must_use]
    pub fn backtracks(&self) -> u64 {
        self.backtracks
    }

    #[must_use]
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    #[must_use]
    pub fn constraints_processed(&self) -> u64 {
        self.constraints_processed
    }

    #[must_use]
    pub fn values_tried(&self) -> u64 {
        self.values_tried
    }

    #[must_use]
    pub fn branches_ignored(&self) -> u64 {
        self.branches_ignored
    }

    #[must_use]
    pub fn time_ms(&self) -> u128 {
        self.time.as_millis()
    }

    #[must_use]
    pub fn puzzle_setup_time_ms(&self) -> u128 {
        self.puzzle_setup_time.as_millis()
    }
}
