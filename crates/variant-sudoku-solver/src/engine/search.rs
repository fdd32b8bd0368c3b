//! The search engine (spec §4.1, §4.6, §5).

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape};

use crate::{
    engine::counters::Counters,
    engine::options::EngineOptions,
    engine::queue::WorkQueue,
    engine::selector::{ascending_value_order, random_value_order, select_branching_cell},
    engine::solution::{ProgressState, Solution},
    Accumulator, BoxedHandler, ScratchAllocator,
};

type ProgressCallback = Box<dyn FnMut(&ProgressState)>;

/// One step of a diagnostic trace produced by [`Engine::nth_step`].
#[derive(Debug, Clone)]
pub struct StepTrace {
    /// A debug-rendering of the handler that ran this step.
    pub handler: String,
    /// Cells whose candidate masks were touched by this step.
    pub touched: Vec<CellId>,
}

/// The compiled solver engine: shape, handler list, and exclusion graph produced by
/// the builder, plus the search machinery that drives them (spec §2 layer 5).
pub struct Engine {
    shape: Shape,
    handlers: Vec<BoxedHandler>,
    priorities: Vec<i32>,
    exclusions: ExclusionGraph,
    scratch: ScratchAllocator,
    cell_handlers: Vec<Vec<usize>>,
    initial_grid: CandidateGrid,
    options: EngineOptions,
    progress: RefCell<Option<ProgressCallback>>,
    progress_interval: Cell<Duration>,
    last_progress: Cell<Option<Instant>>,
}

impl Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("shape", &self.shape)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

impl Engine {
    /// Runs `init(puzzle)` (spec §4.1): applies every handler's `initialize`, in
    /// declaration order, over the all-candidates grid. Returns `None` if any handler
    /// proves the puzzle outright infeasible.
    #[must_use]
    pub fn build(shape: Shape, mut handlers: Vec<BoxedHandler>, options: EngineOptions) -> Option<Self> {
        let mut counters = Counters::new();
        let mut grid = CandidateGrid::new(shape);
        let mut exclusions = ExclusionGraph::new(shape.num_cells());
        let mut scratch = ScratchAllocator::new();
        for handler in &mut handlers {
            counters.record_constraint_processed();
            if !handler.initialize(&mut grid, &mut exclusions, shape, &mut scratch) {
                return None;
            }
        }
        if grid.has_contradiction() {
            return None;
        }

        let mut cell_handlers: Vec<Vec<usize>> = vec![Vec::new(); shape.num_cells()];
        for (idx, handler) in handlers.iter().enumerate() {
            for &c in handler.cells() {
                cell_handlers[c.index_usize()].push(idx);
            }
        }
        let priorities: Vec<i32> = handlers.iter().map(|h| h.priority()).collect();

        Some(Self {
            shape,
            handlers,
            priorities,
            exclusions,
            scratch,
            cell_handlers,
            initial_grid: grid,
            options,
            progress: RefCell::new(None),
            progress_interval: Cell::new(Duration::ZERO),
            last_progress: Cell::new(None),
        })
    }

    /// The puzzle's shape.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The grid snapshot captured immediately after `build` completed `initialize`.
    #[must_use]
    pub fn initial_grid(&self) -> CandidateGrid {
        self.initial_grid.clone()
    }

    /// The cell-exclusion graph, frozen after build.
    #[must_use]
    pub fn exclusions(&self) -> &ExclusionGraph {
        &self.exclusions
    }

    /// Registers a progress callback invoked between branch decisions and at solution
    /// emission, no more often than every `interval_ms` milliseconds (spec §5).
    pub fn set_progress_callback(&self, callback: impl FnMut(&ProgressState) + 'static, interval_ms: u64) {
        *self.progress.borrow_mut() = Some(Box::new(callback));
        self.progress_interval.set(Duration::from_millis(interval_ms));
        self.last_progress.set(None);
    }

    fn maybe_report_progress(&self, counters: &mut Counters) {
        if self.progress.borrow().is_none() {
            return;
        }
        let now = Instant::now();
        let due = match self.last_progress.get() {
            None => true,
            Some(last) => now.duration_since(last) >= self.progress_interval.get(),
        };
        if !due {
            return;
        }
        self.last_progress.set(Some(now));
        counters.refresh_time();
        if let Some(cb) = self.progress.borrow_mut().as_mut() {
            let state = ProgressState { counters: counters.clone(), extra: None };
            cb(&state);
        }
    }

    /// Propagates `grid` to fixpoint by running the work queue (spec §4.1 steps 1-2).
    /// Returns `false` if any handler proves infeasibility.
    fn propagate(&self, grid: &mut CandidateGrid, counters: &mut Counters) -> bool {
        let mut queue = WorkQueue::new(&self.priorities);
        while let Some(idx) = queue.dequeue() {
            counters.record_constraint_processed();
            let mut acc = Accumulator::new();
            if !self.handlers[idx].enforce(grid, &self.scratch, &mut acc) {
                return false;
            }
            for cell in acc.touched() {
                for &other_idx in &self.cell_handlers[cell.index_usize()] {
                    if other_idx != idx {
                        queue.enqueue(other_idx, self.handlers[other_idx].priority());
                    }
                }
            }
        }
        true
    }

    /// Runs propagation to fixpoint one handler step at a time, recording at most `n`
    /// steps, and returns the trace (spec §4.1 `nth_step`). `guides`, when given,
    /// restricts which cells are considered "of interest" for early termination: once
    /// every guided cell is fixed, the trace stops even if `n` steps remain.
    #[must_use]
    pub fn nth_step(&self, n: usize, guides: Option<&[CellId]>) -> (CandidateGrid, Vec<StepTrace>) {
        let mut grid = self.initial_grid.clone();
        let mut queue = WorkQueue::new(&self.priorities);
        let mut trace = Vec::new();
        while trace.len() < n {
            let Some(idx) = queue.dequeue() else { break };
            let mut acc = Accumulator::new();
            let feasible = self.handlers[idx].enforce(&mut grid, &self.scratch, &mut acc);
            trace.push(StepTrace {
                handler: format!("{:?}", self.handlers[idx]),
                touched: acc.touched().iter().collect(),
            });
            if !feasible {
                break;
            }
            for cell in acc.touched() {
                for &other_idx in &self.cell_handlers[cell.index_usize()] {
                    if other_idx != idx {
                        queue.enqueue(other_idx, self.handlers[other_idx].priority());
                    }
                }
            }
            if let Some(guides) = guides {
                if guides.iter().all(|&c| grid.is_fixed_at(c)) {
                    break;
                }
            }
        }
        (grid, trace)
    }

    fn next_branch(&self, grid: &CandidateGrid) -> Option<(CellId, Vec<u8>)> {
        let cell = select_branching_cell(grid, &self.exclusions, self.shape)?;
        // Reversed so `Vec::pop` (used to draw the next value to try) yields ascending
        // order first, matching this mode's name.
        let mut values = ascending_value_order(grid, cell);
        values.reverse();
        Some((cell, values))
    }

    /// Returns a lazy iterator over every distinct solution, in deterministic search
    /// order (spec §4.1 `solutions`). Checks `terminate` once per branch point.
    #[must_use]
    pub fn solutions<'a>(&'a self, terminate: &'a AtomicBool) -> Solutions<'a> {
        let mut counters = Counters::new();
        let mut grid = self.initial_grid.clone();
        counters.mark_setup_done();
        let feasible = self.propagate(&mut grid, &mut counters);
        let stack = if !feasible {
            Vec::new()
        } else if grid.is_solved() {
            vec![Frame { grid, counters, pending: None }]
        } else if let Some((cell, values)) = self.next_branch(&grid) {
            vec![Frame { grid, counters, pending: Some((cell, values)) }]
        } else {
            Vec::new()
        };
        Solutions { engine: self, stack, terminate }
    }

    /// Returns the (0-indexed) `n`th distinct solution, or `None` (spec §4.1
    /// `nth_solution`).
    #[must_use]
    pub fn nth_solution(&self, n: u64, terminate: &AtomicBool) -> Option<(Solution, Counters)> {
        self.solutions(terminate).nth(n as usize)
    }

    /// Counts distinct solutions up to an optional early-stop `limit` (spec §4.1
    /// `count_solutions`).
    #[must_use]
    pub fn count_solutions(&self, limit: Option<u64>, terminate: &AtomicBool) -> (u64, Counters) {
        let mut count = 0u64;
        let mut last_counters = Counters::new();
        for (_, counters) in self.solutions(terminate) {
            count += 1;
            last_counters = counters;
            if limit.is_some_and(|l| count >= l) {
                break;
            }
        }
        (count, last_counters)
    }

    /// Returns a sample solution considering only *layout* constraints active (spec
    /// §4.1 `validate_layout`): rows/columns/boxes/jigsaw/diagonals/knight/king-style
    /// uniqueness, filtering out every value-bearing constraint.
    #[must_use]
    pub fn validate_layout(&self, terminate: &AtomicBool) -> Option<Solution> {
        let layout_handlers: Vec<BoxedHandler> =
            self.handlers.iter().filter(|h| h.is_layout()).map(|h| h.clone_box()).collect();
        let layout_engine = Engine::build(self.shape, layout_handlers, self.options)?;
        layout_engine.nth_solution(0, terminate).map(|(solution, _)| solution)
    }

    /// Estimates the solution count via branch-fanout sampling (spec §4.1
    /// `estimate_solutions`): repeatedly descends from the root choosing uniformly
    /// random values, multiplying the branch width at each choice point, and averages
    /// the resulting weights across `options.estimate_solutions_samples` independent
    /// descents.
    #[must_use]
    pub fn estimate_solutions<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let samples = self.options.estimate_solutions_samples;
        if samples == 0 {
            return 0.0;
        }
        let mut total = 0.0f64;
        for _ in 0..samples {
            total += self.sample_descent(rng);
        }
        total / f64::from(samples)
    }

    fn sample_descent<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut counters = Counters::new();
        let mut grid = self.initial_grid.clone();
        if !self.propagate(&mut grid, &mut counters) {
            return 0.0;
        }
        let mut weight = 1.0f64;
        loop {
            if grid.is_solved() {
                return weight;
            }
            let Some(cell) = select_branching_cell(&grid, &self.exclusions, self.shape) else {
                return weight;
            };
            let values = random_value_order(&grid, cell, rng);
            if values.is_empty() {
                return 0.0;
            }
            weight *= values.len() as f64;
            let chosen = values[0];
            grid.place(cell, chosen);
            if !self.propagate(&mut grid, &mut counters) {
                return 0.0;
            }
        }
    }
}

struct Frame {
    grid: CandidateGrid,
    counters: Counters,
    pending: Option<(CellId, Vec<u8>)>,
}

/// A lazy, stack-based iterator over solutions (spec §4.1). Modeled directly on the
/// chronological-backtracking shape the search algorithm describes: each frame holds a
/// saved grid snapshot and the value order still left to try at its branching cell.
pub struct Solutions<'a> {
    engine: &'a Engine,
    stack: Vec<Frame>,
    terminate: &'a AtomicBool,
}

impl Iterator for Solutions<'_> {
    type Item = (Solution, Counters);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut frame) = self.stack.pop() {
            if self.terminate.load(Ordering::Relaxed) {
                return None;
            }
            let Some((cell, values)) = &mut frame.pending else {
                let mut counters = frame.counters;
                counters.record_solution();
                counters.refresh_time();
                self.engine.maybe_report_progress(&mut counters);
                let digits = frame.grid.to_solution().expect("pending=None implies a solved grid");
                let solution = Solution { digits, shape: self.engine.shape };
                return Some((solution, counters));
            };
            let Some(value) = values.pop() else {
                continue; // exhausted every value at this branch: backtrack
            };
            let cell = *cell;
            let mut grid = frame.grid.clone();
            let mut counters = frame.counters.clone();
            self.stack.push(frame);

            counters.record_node();
            counters.record_guess();
            counters.record_value_tried();
            grid.place(cell, value);
            let feasible = self.engine.propagate(&mut grid, &mut counters);
            if !feasible {
                counters.record_backtrack();
                self.engine.maybe_report_progress(&mut counters);
                continue;
            }
            self.engine.maybe_report_progress(&mut counters);
            if grid.is_solved() {
                self.stack.push(Frame { grid, counters, pending: None });
                continue;
            }
            match self.engine.next_branch(&grid) {
                Some((next_cell, next_values)) => {
                    self.stack.push(Frame { grid, counters, pending: Some((next_cell, next_values)) });
                }
                None => {
                    // `is_solved()` already covers "every cell fixed"; this is just a
                    // defensive fallback in case a handler leaves a cell fixed without
                    // going through `place` in a way `is_fixed_at` still recognizes.
                    self.stack.push(Frame { grid, counters, pending: None });
                }
            }
        }
        None
    }
}
