//! Event detection through the director's step-control hooks.

use ct_sim::{Component, ComponentResult, EvalContext, InitContext};

use crate::error::{BlockError, BlockResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Below,
    Above,
}

/// Counts crossings of `level` by its input, in either direction.
///
/// A step over which the input crosses the level is only accepted if it
/// ends no more than `tolerance` past the level; otherwise the block vetoes
/// it and asks for a step aimed at the middle of that window, interpolating
/// linearly from the value at the start of the step. The output is the
/// number of crossings up to the current evaluation point.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelCrossing {
    level: f64,
    tolerance: f64,
    /// Side of the level as of the last committed step.
    side: Option<Side>,
    count: u64,
    step_start: f64,
}

impl LevelCrossing {
    pub const DEFAULT_TOLERANCE: f64 = 1e-4;

    pub fn new(level: f64, tolerance: f64) -> BlockResult<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(BlockError::InvalidArg {
                what: "level crossing tolerance must be positive",
            });
        }
        Ok(Self {
            level,
            tolerance,
            side: None,
            count: 0,
            step_start: f64::NAN,
        })
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Crossings committed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    fn side_of(&self, u: f64) -> Side {
        if u < self.level { Side::Below } else { Side::Above }
    }

    fn crossed(&self, u: f64) -> bool {
        self.side.is_some_and(|side| side != self.side_of(u))
    }

    /// How far past the level `u` lies, when it has crossed.
    fn overshoot(&self, u: f64) -> Option<f64> {
        self.crossed(u).then(|| (u - self.level).abs())
    }
}

impl Component for LevelCrossing {
    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn initialize(&mut self, _ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.side = None;
        self.count = 0;
        self.step_start = f64::NAN;
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let u = ctx.input(0)?;
        if self.side.is_none() {
            self.side = Some(self.side_of(u));
            self.step_start = ctx.step_start();
        } else if ctx.step_start() != self.step_start {
            // The previous attempt was committed
            let committed = ctx.latched_input(0)?;
            if self.crossed(committed) {
                self.count += 1;
                self.side = Some(self.side_of(committed));
            }
            self.step_start = ctx.step_start();
        }
        let pending = u64::from(self.crossed(u));
        ctx.set_output(0, (self.count + pending) as f64)
    }

    fn is_step_accurate(&self, ctx: &EvalContext<'_>) -> bool {
        match ctx.input(0) {
            Ok(u) => self.overshoot(u).is_none_or(|d| d <= self.tolerance),
            Err(_) => true,
        }
    }

    fn refined_step_size(&self, ctx: &EvalContext<'_>) -> Option<f64> {
        let u = ctx.input(0).ok()?;
        if self.overshoot(u)? <= self.tolerance {
            return None;
        }
        let start = ctx.latched_input(0).ok()?;
        let target = match self.side_of(u) {
            Side::Above => self.level + 0.5 * self.tolerance,
            Side::Below => self.level - 0.5 * self.tolerance,
        };
        Some(ctx.step_size() * (target - start) / (u - start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_must_be_positive() {
        assert!(LevelCrossing::new(0.5, 0.0).is_err());
        assert!(LevelCrossing::new(0.5, f64::NAN).is_err());
        let det = LevelCrossing::new(0.5, 1e-3).unwrap();
        assert_eq!(det.level(), 0.5);
        assert_eq!(det.count(), 0);
    }

    #[test]
    fn crossing_is_relative_to_committed_side() {
        let mut det = LevelCrossing::new(1.0, 1e-3).unwrap();
        assert!(!det.crossed(5.0));
        det.side = Some(Side::Below);
        assert!(!det.crossed(0.5));
        assert!(det.overshoot(1.0005).is_some_and(|d| (d - 5e-4).abs() < 1e-12));
        assert!(det.overshoot(0.999).is_none());
        det.side = Some(Side::Above);
        assert!(det.crossed(0.9));
        assert!(!det.crossed(1.0));
    }
}
