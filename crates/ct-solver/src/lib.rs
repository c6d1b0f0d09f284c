//! Explicit Runge-Kutta solver strategies for the continuous-time engine.
//!
//! This crate provides:
//! - `Integrator`: one continuous state with its derivative, per-stage
//!   auxiliary slots and the tentative value of an in-progress step
//! - `Tableau`: Butcher coefficients with an optional embedded error estimator
//! - `SolverKind`: the solver family, selected by name at configuration time
//!
//! A step is driven externally, one round at a time: the caller evaluates the
//! model at the round's trial states, stores the tentative derivative on every
//! integrator, then calls [`SolverKind::integrate`]. After the last round,
//! [`SolverKind::is_accurate`] decides acceptance and
//! [`SolverKind::suggested_next_step`] proposes the next step size.

pub mod error;
pub mod integrator;
pub mod solver;
pub mod tableau;

pub use error::{SolverError, SolverResult};
pub use integrator::Integrator;
pub use solver::SolverKind;
pub use tableau::Tableau;
