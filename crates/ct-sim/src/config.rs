//! Director configuration.

use std::path::Path;

use ct_solver::SolverKind;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Director parameters.
///
/// Missing fields in a YAML file fall back to [`Default`]. Solver names are
/// resolved by [`DirectorConfig::solvers`], so an unknown name is reported
/// when the director initializes rather than while parsing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Step size of the first attempted step.
    pub initial_step_size: f64,
    /// Upper bound on every step.
    pub max_step_size: f64,
    /// A rejection that would shrink the step to this size or below is fatal.
    pub min_step_size: f64,
    /// Absolute local error bound per integrator and step.
    pub error_tolerance: f64,
    pub start_time: f64,
    /// `.inf` in YAML runs until stopped.
    pub stop_time: f64,
    pub normal_solver: String,
    /// Solver used right after a breakpoint.
    pub breakpoint_solver: String,
    /// How many accepted steps use the breakpoint solver after a breakpoint.
    pub breakpoint_solver_steps: usize,
    /// Instants closer than this are the same instant.
    pub time_resolution: f64,
    /// Bound on attempted steps in a single `run`.
    pub max_steps: usize,
    /// Safety factor in the step-size predictor.
    pub safety_factor: f64,
    /// Record every N-th accepted step (decimation).
    pub record_every: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            initial_step_size: 0.1,
            max_step_size: 1.0,
            min_step_size: 1e-10,
            error_tolerance: 1e-4,
            start_time: 0.0,
            stop_time: f64::INFINITY,
            normal_solver: SolverKind::ExplicitRk23.name().to_string(),
            breakpoint_solver: SolverKind::HeunEuler.name().to_string(),
            breakpoint_solver_steps: 1,
            time_resolution: 1e-10,
            max_steps: 1_000_000,
            safety_factor: 0.8,
            record_every: 1,
        }
    }
}

impl DirectorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load and validate a YAML file.
    pub fn load_yaml(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check numeric parameters for consistency.
    pub fn validate(&self) -> SimResult<()> {
        positive("initial_step_size", self.initial_step_size)?;
        positive("max_step_size", self.max_step_size)?;
        positive("min_step_size", self.min_step_size)?;
        positive("error_tolerance", self.error_tolerance)?;
        positive("time_resolution", self.time_resolution)?;
        positive("safety_factor", self.safety_factor)?;

        if self.min_step_size > self.initial_step_size {
            return Err(invalid(
                "min_step_size",
                self.min_step_size,
                "must not exceed initial_step_size",
            ));
        }
        if self.initial_step_size > self.max_step_size {
            return Err(invalid(
                "initial_step_size",
                self.initial_step_size,
                "must not exceed max_step_size",
            ));
        }
        if self.safety_factor > 1.0 {
            return Err(invalid("safety_factor", self.safety_factor, "must be at most 1"));
        }
        if !self.start_time.is_finite() {
            return Err(invalid("start_time", self.start_time, "must be finite"));
        }
        if self.stop_time.is_nan() || self.stop_time < self.start_time {
            return Err(invalid(
                "stop_time",
                self.stop_time,
                "must not be before start_time",
            ));
        }
        if self.breakpoint_solver_steps == 0 {
            return Err(invalid("breakpoint_solver_steps", 0, "must be at least 1"));
        }
        if self.max_steps == 0 {
            return Err(invalid("max_steps", 0, "must be positive"));
        }
        if self.record_every == 0 {
            return Err(invalid("record_every", 0, "must be positive"));
        }
        Ok(())
    }

    /// Resolve the normal and breakpoint solvers and check they fit together.
    pub fn solvers(&self) -> SimResult<(SolverKind, SolverKind)> {
        let normal: SolverKind = self.normal_solver.parse()?;
        let breakpoint: SolverKind = self.breakpoint_solver.parse()?;
        if !breakpoint.is_compatible_breakpoint_solver(normal) {
            return Err(SimError::IncompatibleSolvers {
                normal: normal.name(),
                breakpoint: breakpoint.name(),
            });
        }
        Ok((normal, breakpoint))
    }
}

fn positive(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> SimError {
    SimError::InvalidConfig {
        field,
        value: value.to_string(),
        reason,
    }
}
