//! Blocks that own continuous states.
//!
//! Both publish their state as output and therefore declare
//! [`Feedthrough::StateOnly`]: a feedback loop through them is not an
//! algebraic loop.

use ct_graph::Feedthrough;
use ct_sim::{Component, ComponentResult, EvalContext};

/// `x' = u`, `y = x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Integrator {
    pub initial: f64,
}

impl Integrator {
    pub fn new(initial: f64) -> Self {
        Self { initial }
    }
}

impl Component for Integrator {
    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn feedthrough(&self) -> Feedthrough {
        Feedthrough::StateOnly
    }

    fn initial_states(&self) -> Vec<f64> {
        vec![self.initial]
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let x = ctx.state(0)?;
        ctx.set_output(0, x)
    }

    fn derivatives(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let u = ctx.input(0)?;
        ctx.set_derivative(0, u)
    }
}

/// Self-contained first-order decay `x' = -rate * x`, `y = x`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearDecay {
    pub rate: f64,
    pub initial: f64,
}

impl LinearDecay {
    pub fn new(rate: f64, initial: f64) -> Self {
        Self { rate, initial }
    }
}

impl Component for LinearDecay {
    fn input_count(&self) -> usize {
        0
    }

    fn output_count(&self) -> usize {
        1
    }

    fn feedthrough(&self) -> Feedthrough {
        Feedthrough::StateOnly
    }

    fn initial_states(&self) -> Vec<f64> {
        vec![self.initial]
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let x = ctx.state(0)?;
        ctx.set_output(0, x)
    }

    fn derivatives(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let x = ctx.state(0)?;
        ctx.set_derivative(0, -self.rate * x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::Constant;
    use ct_sim::{Director, DirectorConfig, Model};

    #[test]
    fn integrator_of_constant_is_a_ramp() {
        let mut model = Model::new();
        let c = model.add("c", Constant::new(2.0));
        let x = model.add("x", Integrator::new(1.0));
        model.connect(c, 0, x, 0).unwrap();

        let mut director = Director::new(DirectorConfig::default(), model);
        director.run(1.5).unwrap();
        assert!((director.state_of(x, 0).unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(director.output_of(x, 0), director.state_of(x, 0));
    }

    #[test]
    fn decay_halves_over_its_half_life() {
        let rate = 2.0;
        let mut model = Model::new();
        let d = model.add("d", LinearDecay::new(rate, 8.0));
        let mut director = Director::new(DirectorConfig::default(), model);
        director.run(2.0_f64.ln() / rate).unwrap();
        assert!((director.state_of(d, 0).unwrap() - 4.0).abs() < 1e-3);
    }
}
