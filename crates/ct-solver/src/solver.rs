//! Solver strategy selection and per-round integration.

use std::fmt;
use std::str::FromStr;

use ct_core::ensure_finite;
use tracing::trace;

use crate::error::{SolverError, SolverResult};
use crate::integrator::Integrator;
use crate::tableau::{self, Tableau};

/// Explicit solver family.
///
/// Each variant carries a fixed [`Tableau`]. Adaptive variants need one
/// auxiliary slot per round plus one slot where [`SolverKind::is_accurate`]
/// stores the error estimate for [`SolverKind::suggested_next_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolverKind {
    /// Fixed-step forward Euler; every step is accepted.
    ForwardEuler,
    /// Heun with an embedded Euler estimate, 2 rounds.
    HeunEuler,
    /// Bogacki-Shampine 2(3), 4 rounds with the error round evaluated at the
    /// propagated solution.
    #[default]
    ExplicitRk23,
    /// Dormand-Prince 4(5), 7 rounds.
    ExplicitRk45,
}

impl SolverKind {
    pub const ALL: [SolverKind; 4] = [
        SolverKind::ForwardEuler,
        SolverKind::HeunEuler,
        SolverKind::ExplicitRk23,
        SolverKind::ExplicitRk45,
    ];

    /// Canonical name, accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::ForwardEuler => "ForwardEulerSolver",
            SolverKind::HeunEuler => "HeunEulerSolver",
            SolverKind::ExplicitRk23 => "ExplicitRK23Solver",
            SolverKind::ExplicitRk45 => "ExplicitRK45Solver",
        }
    }

    pub fn tableau(self) -> &'static Tableau {
        match self {
            SolverKind::ForwardEuler => &tableau::FORWARD_EULER,
            SolverKind::HeunEuler => &tableau::HEUN_EULER,
            SolverKind::ExplicitRk23 => &tableau::BOGACKI_SHAMPINE,
            SolverKind::ExplicitRk45 => &tableau::DORMAND_PRINCE,
        }
    }

    /// Number of rounds (model evaluations) per attempted step.
    pub fn round_count(self) -> usize {
        self.tableau().stages()
    }

    /// Auxiliary slots an [`Integrator`] needs for this solver.
    pub fn aux_slots(self) -> usize {
        let t = self.tableau();
        if t.e.is_some() {
            t.stages() + 1
        } else {
            t.stages()
        }
    }

    pub fn order(self) -> u32 {
        self.tableau().order
    }

    /// Whether the solver estimates its local error.
    pub fn is_adaptive(self) -> bool {
        self.tableau().e.is_some()
    }

    /// A solver may stand in for `normal` after a breakpoint only if it is
    /// not of higher order.
    pub fn is_compatible_breakpoint_solver(self, normal: SolverKind) -> bool {
        self.order() <= normal.order()
    }

    /// Fraction of the step at which round `round` is evaluated.
    pub fn round_time_fraction(self, round: usize) -> SolverResult<f64> {
        self.tableau()
            .c
            .get(round)
            .copied()
            .ok_or(SolverError::InvalidRound {
                solver: self.name(),
                round,
                rounds: self.round_count(),
            })
    }

    /// Verify an integrator's auxiliary array is sized for this solver.
    pub fn check_slots(self, integrator: &Integrator) -> SolverResult<()> {
        let expected = self.aux_slots();
        let actual = integrator.aux_variables().len();
        if expected != actual {
            return Err(SolverError::AuxSlotMismatch {
                solver: self.name(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Finish round `round` for one integrator.
    ///
    /// Stores the tentative derivative as the round's stage value and sets
    /// the tentative state to the trial value for the next round, or to the
    /// propagated solution after the last round. Returns the new tentative
    /// state.
    pub fn integrate(self, integrator: &mut Integrator, h: f64, round: usize) -> SolverResult<f64> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SolverError::InvalidStepSize { h });
        }
        self.check_slots(integrator)?;
        let t = self.tableau();
        let stages = t.stages();
        if round >= stages {
            return Err(SolverError::InvalidRound {
                solver: self.name(),
                round,
                rounds: stages,
            });
        }

        integrator.set_aux_variable(round, integrator.tentative_derivative())?;

        let weights = if round + 1 < stages {
            Some(t.a[round + 1])
        } else if t.fsal {
            // Already evaluated at the solution
            None
        } else {
            Some(t.b)
        };

        if let Some(weights) = weights {
            let k = integrator.aux_variables();
            let incr: f64 = weights.iter().zip(k).map(|(w, k)| w * k).sum();
            let trial = ensure_finite(integrator.state() + h * incr, "trial state")?;
            integrator.set_tentative_state(trial);
        }
        Ok(integrator.tentative_state())
    }

    /// Local truncation error estimate from the stored stage derivatives.
    pub fn error_estimate(self, integrator: &Integrator, h: f64) -> f64 {
        match self.tableau().e {
            Some(e) => {
                let k = integrator.aux_variables();
                h * e.iter().zip(k).map(|(e, k)| e * k).sum::<f64>().abs()
            }
            None => 0.0,
        }
    }

    /// Whether the completed step is within `tolerance` for this integrator.
    ///
    /// The estimate is kept in the integrator's last auxiliary slot.
    pub fn is_accurate(self, integrator: &mut Integrator, h: f64, tolerance: f64) -> SolverResult<bool> {
        if !self.is_adaptive() {
            return Ok(true);
        }
        self.check_slots(integrator)?;
        let err = self.error_estimate(integrator, h);
        integrator.set_aux_variable(self.round_count(), err)?;
        let accurate = err <= tolerance;
        if !accurate {
            trace!(solver = self.name(), h, err, tolerance, "integrator inaccurate");
        }
        Ok(accurate)
    }

    /// Step size this integrator suggests after `is_accurate` ran.
    ///
    /// Fixed-step solvers keep `h`. A zero error estimate yields infinity;
    /// the caller caps it at the configured maximum.
    pub fn suggested_next_step(self, integrator: &Integrator, h: f64, tolerance: f64, safety: f64) -> f64 {
        let t = self.tableau();
        if t.e.is_none() {
            return h;
        }
        let err = integrator
            .aux_variables()
            .get(t.stages())
            .copied()
            .unwrap_or(0.0);
        refined_step(h, tolerance, err, t.error_order, safety)
    }
}

/// `h * max(0.5, safety * (tolerance / err)^(1 / error_order))`.
pub fn refined_step(h: f64, tolerance: f64, err: f64, error_order: u32, safety: f64) -> f64 {
    let scale = safety * (tolerance / err).powf(1.0 / f64::from(error_order));
    h * scale.max(0.5)
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let key = key.strip_suffix("solver").unwrap_or(&key);
        match key {
            "forwardeuler" | "euler" => Ok(SolverKind::ForwardEuler),
            "heuneuler" | "heun" | "rk12" => Ok(SolverKind::HeunEuler),
            "explicitrk23" | "rk23" | "bogackishampine" => Ok(SolverKind::ExplicitRk23),
            "explicitrk45" | "rk45" | "dormandprince" | "dopri5" => Ok(SolverKind::ExplicitRk45),
            _ => Err(SolverError::UnknownSolver { name: s.to_string() }),
        }
    }
}
