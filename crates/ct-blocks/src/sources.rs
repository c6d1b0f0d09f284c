//! Signal sources: blocks with no inputs.

use ct_sim::{Component, ComponentResult, EvalContext, InitContext};

/// Constant output.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Component for Constant {
    fn input_count(&self) -> usize {
        0
    }

    fn output_count(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        ctx.set_output(0, self.value)
    }
}

/// Piecewise-constant source: `before` until `at`, `after` from then on.
///
/// Posts `at` as a breakpoint so the director lands on the discontinuity,
/// and reads time with left-limit semantics: the step that ends on `at`
/// still sees `before`.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub at: f64,
    pub before: f64,
    pub after: f64,
}

impl Step {
    pub fn new(at: f64, before: f64, after: f64) -> Self {
        Self { at, before, after }
    }

    /// Unit step at `at`.
    pub fn unit(at: f64) -> Self {
        Self::new(at, 0.0, 1.0)
    }
}

impl Component for Step {
    fn input_count(&self) -> usize {
        0
    }

    fn output_count(&self) -> usize {
        1
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        if self.at > ctx.time() {
            ctx.post_breakpoint(self.at);
        }
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let y = if ctx.has_passed(self.at) {
            self.after
        } else {
            self.before
        };
        ctx.set_output(0, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_sim::{Director, DirectorConfig, Model};

    #[test]
    fn constant_is_visible_after_initialize() {
        let mut model = Model::new();
        let c = model.add("c", Constant::new(2.5));
        let mut director = Director::new(DirectorConfig::default(), model);
        director.initialize().unwrap();
        assert_eq!(director.output_of(c, 0), Some(2.5));
    }

    #[test]
    fn step_posts_its_switch_time() {
        let mut model = Model::new();
        let s = model.add("s", Step::new(0.3, -1.0, 4.0));
        let mut director = Director::new(DirectorConfig::default(), model);
        director.initialize().unwrap();
        assert_eq!(director.output_of(s, 0), Some(-1.0));
        assert_eq!(director.breakpoints().first(), Some(0.3));

        director.run(0.3).unwrap();
        assert_eq!(director.time(), 0.3);
        assert_eq!(director.output_of(s, 0), Some(-1.0));

        director.run(0.5).unwrap();
        assert_eq!(director.output_of(s, 0), Some(4.0));
    }

    #[test]
    fn step_in_the_past_is_already_switched() {
        let mut model = Model::new();
        let s = model.add("s", Step::unit(-1.0));
        let mut director = Director::new(DirectorConfig::default(), model);
        director.initialize().unwrap();
        assert!(director.breakpoints().is_empty());
        assert_eq!(director.output_of(s, 0), Some(1.0));
    }
}
