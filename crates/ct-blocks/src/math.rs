//! Memoryless arithmetic blocks with direct feedthrough.

use ct_sim::{Component, ComponentResult, EvalContext};

use crate::error::{BlockError, BlockResult};

/// `y = k * u`.
#[derive(Clone, Debug, PartialEq)]
pub struct Gain {
    pub gain: f64,
}

impl Gain {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl Component for Gain {
    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let u = ctx.input(0)?;
        ctx.set_output(0, self.gain * u)
    }
}

/// Weighted sum of its inputs, one input per weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Sum {
    weights: Vec<f64>,
}

impl Sum {
    /// Build from a sign string such as `"+-"`: one input per character.
    pub fn new(signs: &str) -> BlockResult<Self> {
        let weights = signs
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '+' => Ok(1.0),
                '-' => Ok(-1.0),
                _ => Err(BlockError::InvalidArg {
                    what: "sum signs must be '+' or '-'",
                }),
            })
            .collect::<BlockResult<Vec<f64>>>()?;
        Self::weighted(weights)
    }

    pub fn weighted(weights: Vec<f64>) -> BlockResult<Self> {
        if weights.is_empty() {
            return Err(BlockError::InvalidArg {
                what: "sum needs at least one input",
            });
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Component for Sum {
    fn input_count(&self) -> usize {
        self.weights.len()
    }

    fn output_count(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let mut y = 0.0;
        for (i, w) in self.weights.iter().enumerate() {
            y += w * ctx.input(i)?;
        }
        ctx.set_output(0, y)
    }
}
