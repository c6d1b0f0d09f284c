//! Error types for the director and component evaluation.

use ct_core::StateId;
use thiserror::Error;

/// Errors a component reports from `initialize`, `evaluate` or `derivatives`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("No {kind} port {index} (component has {len})")]
    InvalidPort {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("No state {index} (component owns {len})")]
    InvalidState { index: usize, len: usize },

    #[error("{what}")]
    Failed { what: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

/// Errors that abort initialization or a run.
///
/// Rejected steps are not errors; they surface as
/// [`StepOutcome::Rejected`](crate::StepOutcome::Rejected).
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Breakpoint solver {breakpoint} has higher order than normal solver {normal}")]
    IncompatibleSolvers {
        normal: &'static str,
        breakpoint: &'static str,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] ct_graph::GraphError),

    #[error("Solver error: {0}")]
    Solver(#[from] ct_solver::SolverError),

    #[error("Core error: {0}")]
    Core(#[from] ct_core::CtError),

    #[error(
        "Step size underflow at t={time}: refined step {step_size} <= minimum {min_step_size} \
         (limited by {component})"
    )]
    StepSizeUnderflow {
        time: f64,
        step_size: f64,
        min_step_size: f64,
        component: String,
        /// Limiting state, or `None` when a component's own step control
        /// asked for the step.
        state: Option<StateId>,
    },

    #[error("Non-finite {what} from {component} at t={time} (h={step_size}): {value}")]
    NonFinite {
        component: String,
        what: &'static str,
        value: f64,
        time: f64,
        step_size: f64,
    },

    #[error("Component {component} failed at t={time}: {source}")]
    Component {
        component: String,
        time: f64,
        #[source]
        source: ComponentError,
    },

    #[error("Component {component} posted breakpoint {requested} before current time {time}")]
    BreakpointInPast {
        component: String,
        requested: f64,
        time: f64,
    },

    #[error("Step limit exceeded: {max_steps} steps without reaching t={target} (at t={time})")]
    StepLimitExceeded {
        max_steps: usize,
        target: f64,
        time: f64,
    },

    #[error("Director is not initialized")]
    NotInitialized,

    #[error("Director halted by an earlier error at t={time}; initialize again to restart")]
    Halted { time: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type SimResult<T> = Result<T, SimError>;
