//! Component contract and evaluation contexts.

use ct_graph::Feedthrough;
use ct_solver::Integrator;

use crate::error::{ComponentError, ComponentResult};

/// A block in the signal network.
///
/// Every round the director calls [`Component::evaluate`] on all components
/// in dependency order, then [`Component::derivatives`] on every component
/// that owns states. A [`Feedthrough::StateOnly`] component must compute its
/// outputs from its states alone; its inputs are only guaranteed to be up to
/// date in `derivatives`.
pub trait Component: Send {
    fn input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    fn feedthrough(&self) -> Feedthrough {
        Feedthrough::Direct
    }

    /// Initial values of the continuous states this component owns.
    fn initial_states(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Called once per `Director::initialize`, before the first evaluation.
    fn initialize(&mut self, _ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        Ok(())
    }

    /// Write outputs for the current round.
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()>;

    /// Report the derivative of every owned state for the current round.
    fn derivatives(&mut self, _ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        Ok(())
    }

    /// Veto a step the integrators accepted.
    ///
    /// Asked once per attempt, with `ctx` at the end of the step and every
    /// output evaluated on the final trial states. A veto rejects the step.
    fn is_step_accurate(&self, _ctx: &EvalContext<'_>) -> bool {
        true
    }

    /// Largest step this component accepts for the next attempt.
    ///
    /// The director takes the smallest of these and the integrators'
    /// suggestions. After a veto with no suggestion the step is halved.
    fn refined_step_size(&self, _ctx: &EvalContext<'_>) -> Option<f64> {
        None
    }
}

/// Where an input port reads its value from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputSource {
    Unconnected,
    /// Output slot written in the current round.
    Live(usize),
    /// Output slot as latched at the last committed step.
    Latched(usize),
}

/// Context handed to [`Component::initialize`].
pub struct InitContext<'a> {
    pub(crate) time: f64,
    pub(crate) posted: &'a mut Vec<f64>,
}

impl InitContext<'_> {
    /// Start time of the run.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ask the director to land exactly on `t`.
    pub fn post_breakpoint(&mut self, t: f64) {
        self.posted.push(t);
    }
}

/// Context handed to [`Component::evaluate`] and [`Component::derivatives`].
pub struct EvalContext<'a> {
    pub(crate) time: f64,
    pub(crate) step_start: f64,
    pub(crate) step_size: f64,
    pub(crate) round: usize,
    pub(crate) resolution: f64,
    pub(crate) inputs: &'a [InputSource],
    pub(crate) outputs: &'a [usize],
    pub(crate) values: &'a mut [f64],
    pub(crate) latched: &'a [f64],
    pub(crate) states: &'a mut [Integrator],
    pub(crate) posted: &'a mut Vec<f64>,
}

impl EvalContext<'_> {
    /// Time of the current round.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Committed time the current step started from.
    pub fn step_start(&self) -> f64 {
        self.step_start
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// Value at input `index`; unconnected inputs read zero.
    pub fn input(&self, index: usize) -> ComponentResult<f64> {
        let source = self.inputs.get(index).ok_or(ComponentError::InvalidPort {
            kind: "input",
            index,
            len: self.inputs.len(),
        })?;
        Ok(match *source {
            InputSource::Unconnected => 0.0,
            InputSource::Live(slot) => self.values[slot],
            InputSource::Latched(slot) => self.latched[slot],
        })
    }

    /// Value input `index` had when the current step started.
    pub fn latched_input(&self, index: usize) -> ComponentResult<f64> {
        let source = self.inputs.get(index).ok_or(ComponentError::InvalidPort {
            kind: "input",
            index,
            len: self.inputs.len(),
        })?;
        Ok(match *source {
            InputSource::Unconnected => 0.0,
            InputSource::Live(slot) | InputSource::Latched(slot) => self.latched[slot],
        })
    }

    pub fn is_connected(&self, index: usize) -> bool {
        matches!(
            self.inputs.get(index),
            Some(InputSource::Live(_) | InputSource::Latched(_))
        )
    }

    pub fn set_output(&mut self, index: usize, value: f64) -> ComponentResult<()> {
        let slot = *self.outputs.get(index).ok_or(ComponentError::InvalidPort {
            kind: "output",
            index,
            len: self.outputs.len(),
        })?;
        self.values[slot] = value;
        Ok(())
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Trial value of owned state `index` for the current round.
    pub fn state(&self, index: usize) -> ComponentResult<f64> {
        self.states
            .get(index)
            .map(Integrator::tentative_state)
            .ok_or(ComponentError::InvalidState {
                index,
                len: self.states.len(),
            })
    }

    pub fn set_derivative(&mut self, index: usize, value: f64) -> ComponentResult<()> {
        let len = self.states.len();
        let state = self
            .states
            .get_mut(index)
            .ok_or(ComponentError::InvalidState { index, len })?;
        state.set_tentative_derivative(value);
        Ok(())
    }

    /// Ask the director to land exactly on `t`.
    ///
    /// A breakpoint inside the step in progress discards the attempt and
    /// retries it with the step shortened to end at `t`.
    pub fn post_breakpoint(&mut self, t: f64) {
        self.posted.push(t);
    }

    /// Whether simulated time is past `t`, with left-limit semantics at `t`:
    /// false while evaluating the end of the step that lands on `t`, true
    /// from the start of the step leaving `t`.
    pub fn has_passed(&self, t: f64) -> bool {
        self.step_start >= t - self.resolution || self.time > t + self.resolution
    }
}
