//! Run outcomes, progress reporting, trajectory records and cooperative stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which of the director's two solvers drove a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverRole {
    Normal,
    /// The solver used right after a breakpoint.
    Breakpoint,
}

/// Result of one call to `Director::step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// States were committed and time advanced to `time`.
    Accepted {
        time: f64,
        step_size: f64,
        solver: SolverRole,
        /// `time` is a breakpoint; the next step uses the breakpoint solver.
        at_breakpoint: bool,
    },
    /// The error estimate exceeded the tolerance; time did not advance.
    Rejected {
        time: f64,
        step_size: f64,
        next_step_size: f64,
    },
    /// Stop time reached, or the run was terminated.
    Finished,
    /// A stop was requested through a [`StopHandle`].
    Stopped,
}

/// Counters accumulated since the last `initialize`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectorStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Attempts thrown away because a breakpoint was posted inside them.
    pub discarded: usize,
    pub breakpoints_hit: usize,
    /// Rounds evaluated, including those of rejected and discarded attempts.
    pub rounds: usize,
}

/// Summary returned by `Director::run`.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub discarded: usize,
    pub final_time: f64,
    /// The run ended on a stop request rather than at its stop time.
    pub stopped: bool,
}

/// Progress snapshot passed to the `run_with_progress` callback after every
/// accepted step.
#[derive(Clone, Debug, PartialEq)]
pub struct SimProgress {
    pub time: f64,
    pub step_size: f64,
    pub accepted: usize,
    pub rejected: usize,
    /// In `[0, 1]`; zero when the run has no finite stop time.
    pub fraction_complete: f64,
}

/// Decimated trajectory of committed states.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimRecord {
    /// Time points
    pub t: Vec<f64>,
    /// Committed value of every integrator, in state order
    pub x: Vec<Vec<f64>>,
}

impl SimRecord {
    pub fn push(&mut self, t: f64, x: Vec<f64>) {
        self.t.push(t);
        self.x.push(x);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.t.last().copied()
    }

    pub fn clear(&mut self) {
        self.t.clear();
        self.x.clear();
    }
}

/// Cloneable handle that asks a running director to stop between steps.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; the next `step` returns [`StepOutcome::Stopped`].
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Consume a pending request.
    pub(crate) fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}
