//! Continuous state variable.

use crate::error::{SolverError, SolverResult};

/// One continuous state owned by a component.
///
/// The committed `state` changes only through [`Integrator::commit`]. While a
/// step is in progress the solver writes trial values to the tentative state
/// and per-stage derivatives to the auxiliary slots; [`Integrator::rollback`]
/// throws all of that away.
#[derive(Clone, Debug, PartialEq)]
pub struct Integrator {
    state: f64,
    derivative: f64,
    tentative_state: f64,
    tentative_derivative: f64,
    aux: Vec<f64>,
}

impl Integrator {
    /// Create an integrator holding `initial` with `aux_slots` zeroed slots.
    pub fn new(initial: f64, aux_slots: usize) -> Self {
        Self {
            state: initial,
            derivative: 0.0,
            tentative_state: initial,
            tentative_derivative: 0.0,
            aux: vec![0.0; aux_slots],
        }
    }

    /// Committed value.
    pub fn state(&self) -> f64 {
        self.state
    }

    /// Trial value of the round in progress.
    pub fn tentative_state(&self) -> f64 {
        self.tentative_state
    }

    pub fn set_tentative_state(&mut self, value: f64) {
        self.tentative_state = value;
    }

    /// Derivative at the committed state.
    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Derivative reported for the round in progress.
    pub fn tentative_derivative(&self) -> f64 {
        self.tentative_derivative
    }

    pub fn set_tentative_derivative(&mut self, value: f64) {
        self.tentative_derivative = value;
    }

    pub fn aux_variables(&self) -> &[f64] {
        &self.aux
    }

    pub fn set_aux_variable(&mut self, index: usize, value: f64) -> SolverResult<()> {
        let len = self.aux.len();
        let slot = self
            .aux
            .get_mut(index)
            .ok_or(SolverError::AuxIndexOob { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Make the tentative values current and clear the auxiliary slots.
    pub fn commit(&mut self) {
        self.state = self.tentative_state;
        self.derivative = self.tentative_derivative;
        self.aux.fill(0.0);
    }

    /// Discard the in-progress step.
    pub fn rollback(&mut self) {
        self.tentative_state = self.state;
        self.tentative_derivative = self.derivative;
        self.aux.fill(0.0);
    }

    /// Resize the auxiliary array for a different solver; all slots are cleared.
    pub fn resize_aux(&mut self, slots: usize) {
        self.aux.clear();
        self.aux.resize(slots, 0.0);
    }
}
