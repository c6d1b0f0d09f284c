//! Continuous-time execution engine.
//!
//! Provides:
//! - The [`Component`] contract and the contexts components evaluate in
//! - [`Model`]: components plus the network topology wiring them
//! - [`Director`]: adaptive-step state machine with breakpoint handling,
//!   interleaving dependency-ordered evaluation with explicit Runge-Kutta
//!   rounds
//! - [`DirectorConfig`] loaded from YAML, run records and progress reporting

pub mod breakpoints;
pub mod component;
pub mod config;
pub mod director;
pub mod error;
pub mod model;
pub mod run;

// Internal modules
mod signals;

// Re-exports for public API
pub use breakpoints::BreakpointSet;
pub use component::{Component, EvalContext, InitContext};
pub use config::DirectorConfig;
pub use director::{Director, Phase};
pub use error::{ComponentError, ComponentResult, SimError, SimResult};
pub use model::Model;
pub use run::{
    DirectorStats, RunSummary, SimProgress, SimRecord, SolverRole, StepOutcome, StopHandle,
};

pub use ct_graph::Feedthrough;
pub use ct_solver::SolverKind;
