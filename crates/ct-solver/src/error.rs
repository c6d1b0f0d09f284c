//! Error types for solver strategies.

use thiserror::Error;

/// Errors raised by solver selection and per-round integration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Unknown solver '{name}'")]
    UnknownSolver { name: String },

    #[error("Solver {solver} needs {expected} auxiliary slots, integrator has {actual}")]
    AuxSlotMismatch {
        solver: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Round {round} out of range for {solver} ({rounds} rounds)")]
    InvalidRound {
        solver: &'static str,
        round: usize,
        rounds: usize,
    },

    #[error("Auxiliary slot {index} out of range (len={len})")]
    AuxIndexOob { index: usize, len: usize },

    #[error("Invalid step size: {h}")]
    InvalidStepSize { h: f64 },

    #[error(transparent)]
    Core(#[from] ct_core::CtError),
}

pub type SolverResult<T> = Result<T, SolverError>;
