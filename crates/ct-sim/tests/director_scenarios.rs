//! Integration tests: director scenarios over small hand-built models.
//!
//! Covers:
//! - adaptive RK2(3) accuracy on exponential decay and a harmonic oscillator
//! - step atomicity on rejection
//! - breakpoint exactness and the breakpoint solver hand-off
//! - delay-free integrator loops and algebraic loops as configuration errors
//! - delayed connections, non-finite values, cooperative stop, step limits
//! - failed steps leaving time and states untouched and halting the director
//! - component step-control vetoes and end-of-step breakpoints

use std::sync::{Arc, Mutex};

use ct_core::{Tolerances, nearly_equal};
use ct_graph::GraphError;
use ct_sim::{
    Component, ComponentResult, Director, DirectorConfig, EvalContext, Feedthrough, InitContext,
    Model, Phase, SimError, SolverRole, StepOutcome,
};
use ct_solver::SolverError;

/// State-output integrator: `x' = u`, output `x`.
struct Integ {
    x0: f64,
}

impl Component for Integ {
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
        vec![self.x0]
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

struct Gain(f64);

impl Component for Gain {
    fn input_count(&self) -> usize {
        1
    }
    fn output_count(&self) -> usize {
        1
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let u = ctx.input(0)?;
        ctx.set_output(0, self.0 * u)
    }
}

/// Piecewise-constant source switching at `at`.
struct Step {
    at: f64,
    after: f64,
}

impl Component for Step {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        1
    }
    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        ctx.post_breakpoint(self.at);
        Ok(())
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let y = if ctx.has_passed(self.at) { self.after } else { 0.0 };
        ctx.set_output(0, y)
    }
}

fn config() -> DirectorConfig {
    DirectorConfig::default()
}

/// `x' = k * x` built from an integrator and a gain.
fn decay_model(k: f64) -> (Model, ct_core::CompId) {
    let mut model = Model::new();
    let x = model.add("x", Integ { x0: 1.0 });
    let gain = model.add("gain", Gain(k));
    model.connect(x, 0, gain, 0).unwrap();
    model.connect(gain, 0, x, 0).unwrap();
    (model, x)
}

#[test]
fn exp_decay_reaches_e_inverse() {
    let (model, x) = decay_model(-1.0);
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();
    let summary = director.run(1.0).unwrap();

    let value = director.state_of(x, 0).unwrap();
    assert!(
        nearly_equal(value, (-1.0_f64).exp(), Tolerances::new(1e-4, 0.0)),
        "x(1) = {value}"
    );
    assert_eq!(summary.final_time, 1.0);
    assert_eq!(director.time(), 1.0);
    assert!(summary.accepted < 30, "{} steps", summary.accepted);
    assert!(summary.rejected <= 2);
    assert_eq!(director.output_of(x, 0), Some(value));
    assert_eq!(director.record().last_time(), Some(1.0));
}

#[test]
fn oscillator_tracks_cosine() {
    let mut model = Model::new();
    let p = model.add("p", Integ { x0: 1.0 });
    let v = model.add("v", Integ { x0: 0.0 });
    let neg = model.add("neg", Gain(-1.0));
    model.connect(v, 0, p, 0).unwrap();
    model.connect(p, 0, neg, 0).unwrap();
    model.connect(neg, 0, v, 0).unwrap();

    let mut director = Director::new(config(), model);
    director.run(1.0).unwrap();
    let tol = Tolerances::new(5e-4, 0.0);
    assert!(nearly_equal(director.state_of(p, 0).unwrap(), 1.0_f64.cos(), tol));
    assert!(nearly_equal(director.state_of(v, 0).unwrap(), -1.0_f64.sin(), tol));
}

#[test]
fn delay_free_integrator_loop_is_rejected() {
    let mut model = Model::new();
    let a = model.add("a", Integ { x0: 1.0 });
    let b = model.add("b", Integ { x0: 0.0 });
    model.connect(a, 0, b, 0).unwrap();
    model.connect(b, 0, a, 0).unwrap();

    let mut director = Director::new(config(), model);
    match director.initialize() {
        Err(SimError::Graph(GraphError::CyclicDependency { names, .. })) => {
            assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
    assert!(!director.is_initialized());
    assert!(matches!(director.step(), Err(SimError::NotInitialized)));
}

#[test]
fn algebraic_loop_self_edge_is_rejected() {
    let mut model = Model::new();
    let g = model.add("g", Gain(0.5));
    model.connect(g, 0, g, 0).unwrap();
    let mut director = Director::new(config(), model);
    let err = director.initialize().unwrap_err();
    assert!(err.to_string().contains("g -> g"), "{err}");
}

#[test]
fn rejected_step_is_atomic() {
    let (model, x) = decay_model(-50.0);
    let cfg = DirectorConfig {
        initial_step_size: 0.5,
        error_tolerance: 1e-6,
        ..config()
    };
    let mut director = Director::new(cfg, model);
    director.initialize().unwrap();

    match director.step().unwrap() {
        StepOutcome::Rejected {
            time,
            step_size,
            next_step_size,
        } => {
            assert_eq!(time, 0.0);
            assert_eq!(step_size, 0.5);
            assert_eq!(next_step_size, 0.25);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(director.phase(), Phase::Rejected);
    assert_eq!(director.time(), 0.0);
    let integ = &director.integrators_of(x).unwrap()[0];
    assert_eq!(integ.state(), 1.0);
    assert_eq!(integ.tentative_state(), 1.0);
    assert!(integ.aux_variables().iter().all(|&v| v == 0.0));

    let mut rejections = 1;
    let accepted_at = loop {
        match director.step().unwrap() {
            StepOutcome::Accepted { time, .. } => break time,
            StepOutcome::Rejected { .. } => rejections += 1,
            other => panic!("unexpected {other:?}"),
        }
        assert!(rejections < 50);
    };
    let integ = &director.integrators_of(x).unwrap()[0];
    assert_eq!(director.time(), accepted_at);
    assert_eq!(integ.state(), integ.tentative_state());
    assert!(integ.aux_variables().iter().all(|&v| v == 0.0));
    assert!((integ.state() - (-50.0 * accepted_at).exp()).abs() < 1e-5);
    assert_eq!(director.stats().rejected, rejections);
}

#[test]
fn breakpoint_is_hit_exactly_and_switches_solver() {
    let mut model = Model::new();
    let step = model.add("step", Step { at: 0.35, after: 1.0 });
    let x = model.add("x", Integ { x0: 0.0 });
    model.connect(step, 0, x, 0).unwrap();

    let cfg = DirectorConfig {
        max_step_size: 0.5,
        stop_time: 2.0,
        ..config()
    };
    let mut director = Director::new(cfg, model);
    director.initialize().unwrap();

    let mut accepted = Vec::new();
    loop {
        match director.step().unwrap() {
            StepOutcome::Accepted {
                time,
                solver,
                at_breakpoint,
                ..
            } => accepted.push((time, solver, at_breakpoint)),
            StepOutcome::Rejected { .. } => {}
            StepOutcome::Finished => break,
            StepOutcome::Stopped => unreachable!(),
        }
    }

    let hit = accepted
        .iter()
        .position(|&(t, _, _)| t == 0.35)
        .expect("landed on the breakpoint");
    assert!(accepted[hit].2);
    assert_eq!(accepted[hit].1, SolverRole::Normal);
    assert_eq!(accepted[hit + 1].1, SolverRole::Breakpoint);
    assert_eq!(accepted[hit + 2].1, SolverRole::Normal);
    assert_eq!(accepted.last().map(|a| a.0), Some(2.0));
    assert!(accepted.windows(2).all(|w| w[0].0 < w[1].0));

    // Left limit at the switch: nothing accumulates before 0.35
    assert!((director.state_of(x, 0).unwrap() - 1.65).abs() < 1e-12);
    assert_eq!(director.phase(), Phase::Finished);
    assert!(matches!(director.step().unwrap(), StepOutcome::Finished));
}

#[test]
fn smaller_tolerance_never_takes_a_larger_first_step() {
    let mut previous = f64::INFINITY;
    for exp in 2..=8 {
        let tol = 10f64.powi(-exp);
        let (model, _) = decay_model(-1.0);
        let cfg = DirectorConfig {
            initial_step_size: 0.5,
            error_tolerance: tol,
            ..config()
        };
        let mut director = Director::new(cfg, model);
        director.initialize().unwrap();
        let h = loop {
            match director.step().unwrap() {
                StepOutcome::Accepted { step_size, .. } => break step_size,
                StepOutcome::Rejected { .. } => {}
                other => panic!("unexpected {other:?}"),
            }
        };
        assert!(h <= previous, "tol {tol}: {h} > {previous}");
        previous = h;
    }
}

/// `y = latched(y) + 1`: counts committed steps through a delayed self-loop.
struct Counter;

impl Component for Counter {
    fn input_count(&self) -> usize {
        1
    }
    fn output_count(&self) -> usize {
        1
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let prev = ctx.input(0)?;
        ctx.set_output(0, prev + 1.0)
    }
}

#[test]
fn delayed_connection_breaks_algebraic_loop() {
    let mut model = Model::new();
    let c = model.add("counter", Counter);
    model.connect(c, 0, c, 0).unwrap();
    let mut director = Director::new(config(), model);
    assert!(matches!(
        director.initialize(),
        Err(SimError::Graph(GraphError::CyclicDependency { .. }))
    ));

    let mut model = Model::new();
    let c = model.add("counter", Counter);
    model.connect_delayed(c, 0, c, 0).unwrap();
    let cfg = DirectorConfig {
        stop_time: 3.0,
        ..config()
    };
    let mut director = Director::new(cfg, model);
    let summary = director.run(f64::INFINITY).unwrap();
    assert_eq!(summary.final_time, 3.0);
    assert_eq!(
        director.output_of(c, 0),
        Some(1.0 + director.stats().accepted as f64)
    );
}

/// Emits NaN once time passes 0.5.
struct Poison;

impl Component for Poison {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        1
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let y = if ctx.time() > 0.5 { f64::NAN } else { 1.0 };
        ctx.set_output(0, y)
    }
}

#[test]
fn non_finite_output_is_fatal() {
    let (mut model, x) = decay_model(-1.0);
    model.add("poison", Poison);
    let mut director = Director::new(config(), model);
    match director.run(1.0) {
        Err(SimError::NonFinite {
            component,
            what,
            time,
            step_size,
            ..
        }) => {
            assert_eq!(component, "poison");
            assert_eq!(what, "output");
            assert!(time > 0.5);
            assert!(step_size > 0.0);
        }
        other => panic!("expected non-finite error, got {other:?}"),
    }
    assert!(director.time() <= 0.5);
    assert_eq!(director.phase(), Phase::Failed);
    let integ = &director.integrators_of(x).unwrap()[0];
    assert_eq!(integ.state(), integ.tentative_state());
    assert!(matches!(director.step(), Err(SimError::Halted { .. })));
}

/// `y = 1 / (u - pole)`.
struct Reciprocal {
    pole: f64,
}

impl Component for Reciprocal {
    fn input_count(&self) -> usize {
        1
    }
    fn output_count(&self) -> usize {
        1
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let u = ctx.input(0)?;
        ctx.set_output(0, 1.0 / (u - self.pole))
    }
}

fn heun_config() -> DirectorConfig {
    DirectorConfig {
        normal_solver: "heun".into(),
        breakpoint_solver: "euler".into(),
        initial_step_size: 0.5,
        max_step_size: 0.5,
        error_tolerance: 1.0,
        ..config()
    }
}

#[test]
fn failure_in_end_of_step_outputs_commits_nothing() {
    // Heun from x = 1 with h = 0.5 lands on exactly 0.625; only the output
    // pass on the final trial state divides by zero.
    let (mut model, x) = decay_model(-1.0);
    let recip = model.add("recip", Reciprocal { pole: 0.625 });
    model.connect(x, 0, recip, 0).unwrap();
    let mut director = Director::new(heun_config(), model);
    director.initialize().unwrap();

    match director.step() {
        Err(SimError::NonFinite {
            component,
            what,
            time,
            ..
        }) => {
            assert_eq!(component, "recip");
            assert_eq!(what, "output");
            assert_eq!(time, 0.5);
        }
        other => panic!("expected non-finite output, got {other:?}"),
    }
    assert_eq!(director.time(), 0.0);
    assert_eq!(director.state_of(x, 0), Some(1.0));
    assert_eq!(director.output_of(recip, 0), Some(1.0 / 0.375));
    assert_eq!(director.stats().accepted, 0);
    assert_eq!(director.phase(), Phase::Failed);

    assert!(matches!(
        director.step(),
        Err(SimError::Halted { time }) if time == 0.0
    ));
    assert_eq!(director.time(), 0.0);

    director.initialize().unwrap();
    assert_eq!(director.phase(), Phase::Idle);
}

/// Posts one breakpoint from the output pass that follows the last round of
/// a non-FSAL solver.
struct EndPoster {
    rounds: usize,
    posted: Option<f64>,
}

impl Component for EndPoster {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        0
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        if self.posted.is_none() && ctx.round() == self.rounds && ctx.time() > 0.3 {
            let t = ctx.step_start() + 0.5 * ctx.step_size();
            ctx.post_breakpoint(t);
            self.posted = Some(t);
        }
        Ok(())
    }
}

#[test]
fn breakpoint_from_end_of_step_outputs_shortens_the_step() {
    let (mut model, _) = decay_model(-1.0);
    model.add(
        "poster",
        EndPoster {
            rounds: 2,
            posted: None,
        },
    );
    let cfg = DirectorConfig {
        max_step_size: 0.2,
        initial_step_size: 0.2,
        ..heun_config()
    };
    let mut director = Director::new(cfg, model);

    let mut times = Vec::new();
    let summary = director
        .run_with_progress(1.0, |p| times.push(p.time))
        .unwrap();
    assert_eq!(summary.discarded, 1);
    assert_eq!(director.stats().breakpoints_hit, 1);
    // The step from 0.2 to 0.4 is cut at the posted 0.3
    assert!(
        times.iter().any(|&t| nearly_equal(t, 0.3, Tolerances::default())),
        "{times:?}"
    );
    assert!(director.breakpoints().is_empty());
}

/// Vetoes any step longer than `max` without suggesting a size.
struct Picky {
    max: f64,
}

impl Component for Picky {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        0
    }
    fn evaluate(&mut self, _ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        Ok(())
    }
    fn is_step_accurate(&self, ctx: &EvalContext<'_>) -> bool {
        ctx.step_size() <= self.max
    }
}

/// Asks for steps of at most `max` but never vetoes.
struct Cap {
    max: f64,
}

impl Component for Cap {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        0
    }
    fn evaluate(&mut self, _ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        Ok(())
    }
    fn refined_step_size(&self, _ctx: &EvalContext<'_>) -> Option<f64> {
        Some(self.max)
    }
}

#[test]
fn component_veto_halves_the_step() {
    let mut model = Model::new();
    model.add("x", Integ { x0: 1.0 });
    model.add("picky", Picky { max: 0.03 });
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();

    assert_eq!(
        director.step().unwrap(),
        StepOutcome::Rejected {
            time: 0.0,
            step_size: 0.1,
            next_step_size: 0.05,
        }
    );
    assert_eq!(director.phase(), Phase::Rejected);
    assert!(matches!(
        director.step().unwrap(),
        StepOutcome::Rejected { step_size, .. } if step_size == 0.05
    ));
    assert!(matches!(
        director.step().unwrap(),
        StepOutcome::Accepted { time, .. } if time == 0.025
    ));
}

#[test]
fn component_suggestion_bounds_the_next_step() {
    let mut model = Model::new();
    model.add("x", Integ { x0: 1.0 });
    model.add("cap", Cap { max: 0.25 });
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();

    assert!(matches!(
        director.step().unwrap(),
        StepOutcome::Accepted { step_size, .. } if step_size == 0.1
    ));
    assert_eq!(director.next_step_size(), 0.25);
    director.step().unwrap();
    assert_eq!(director.time(), 0.35);
}

#[test]
fn endless_component_veto_underflows() {
    let mut model = Model::new();
    model.add("x", Integ { x0: 1.0 });
    model.add("picky", Picky { max: 0.0 });
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();

    let err = loop {
        match director.step() {
            Ok(StepOutcome::Rejected { .. }) => {}
            Ok(other) => panic!("unexpected {other:?}"),
            Err(err) => break err,
        }
    };
    match err {
        SimError::StepSizeUnderflow {
            component, state, ..
        } => {
            assert_eq!(component, "picky");
            assert_eq!(state, None);
        }
        other => panic!("expected underflow, got {other}"),
    }
    assert_eq!(director.time(), 0.0);
    assert_eq!(director.phase(), Phase::Failed);
}

/// Posts one breakpoint halfway through the first step that passes 0.3.
struct LatePoster {
    posted: Arc<Mutex<Option<f64>>>,
}

impl Component for LatePoster {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        0
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        let mut posted = self.posted.lock().unwrap();
        if posted.is_none() && ctx.time() > 0.3 && ctx.time() > ctx.step_start() + 1e-6 {
            let t = ctx.step_start() + 0.5 * (ctx.time() - ctx.step_start());
            ctx.post_breakpoint(t);
            *posted = Some(t);
        }
        Ok(())
    }
}

#[test]
fn breakpoint_posted_mid_step_is_not_stepped_over() {
    let (mut model, _) = decay_model(-1.0);
    let posted = Arc::new(Mutex::new(None));
    model.add(
        "poster",
        LatePoster {
            posted: Arc::clone(&posted),
        },
    );
    let mut director = Director::new(config(), model);

    let mut times = Vec::new();
    let summary = director
        .run_with_progress(1.0, |p| times.push(p.time))
        .unwrap();

    let bp = posted.lock().unwrap().expect("breakpoint posted");
    assert!(times.contains(&bp), "{bp} not in {times:?}");
    assert_eq!(summary.discarded, 1);
    assert_eq!(director.stats().breakpoints_hit, 1);
    assert!(director.breakpoints().is_empty());
}

/// Posts a breakpoint one second in the past once time passes 0.5.
struct PastPoster;

impl Component for PastPoster {
    fn input_count(&self) -> usize {
        0
    }
    fn output_count(&self) -> usize {
        0
    }
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
        if ctx.step_start() > 0.5 {
            ctx.post_breakpoint(ctx.step_start() - 1.0);
        }
        Ok(())
    }
}

#[test]
fn breakpoint_in_the_past_is_an_error() {
    let (mut model, _) = decay_model(-1.0);
    model.add("past", PastPoster);
    let mut director = Director::new(config(), model);
    match director.run(2.0) {
        Err(SimError::BreakpointInPast {
            component,
            requested,
            time,
        }) => {
            assert_eq!(component, "past");
            assert!(requested < time);
        }
        other => panic!("expected BreakpointInPast, got {other:?}"),
    }
}

#[test]
fn stop_handle_interrupts_between_steps() {
    let (model, _) = decay_model(-1.0);
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();

    let handle = director.stop_handle();
    handle.stop();
    assert_eq!(director.step().unwrap(), StepOutcome::Stopped);
    assert_eq!(director.time(), 0.0);
    assert!(matches!(
        director.step().unwrap(),
        StepOutcome::Accepted { .. }
    ));

    let remote = director.stop_handle();
    let mut seen = 0;
    let summary = director
        .run_with_progress(10.0, |_| {
            seen += 1;
            if seen == 2 {
                remote.stop();
            }
        })
        .unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.accepted, 2);
    assert!(director.time() < 10.0);
}

#[test]
fn step_limit_bounds_a_run() {
    let (model, _) = decay_model(-1.0);
    let cfg = DirectorConfig {
        max_steps: 3,
        ..config()
    };
    let mut director = Director::new(cfg, model);
    assert!(matches!(
        director.run(10.0),
        Err(SimError::StepLimitExceeded { max_steps: 3, .. })
    ));
}

#[test]
fn underflow_reports_limiting_component() {
    let (model, _) = decay_model(-1000.0);
    let cfg = DirectorConfig {
        min_step_size: 0.05,
        error_tolerance: 1e-8,
        ..config()
    };
    let mut director = Director::new(cfg, model);
    director.initialize().unwrap();
    match director.step() {
        Err(SimError::StepSizeUnderflow {
            time,
            step_size,
            min_step_size,
            component,
            ..
        }) => {
            assert_eq!(time, 0.0);
            assert!(step_size <= min_step_size);
            assert_eq!(component, "x");
        }
        other => panic!("expected underflow, got {other:?}"),
    }
    assert_eq!(director.time(), 0.0);
}

#[test]
fn configuration_errors_surface_at_initialize() {
    let (model, _) = decay_model(-1.0);
    let cfg = DirectorConfig {
        normal_solver: "leapfrog".into(),
        ..config()
    };
    let mut director = Director::new(cfg, model);
    assert!(matches!(
        director.initialize(),
        Err(SimError::Solver(SolverError::UnknownSolver { .. }))
    ));

    let (model, _) = decay_model(-1.0);
    let cfg = DirectorConfig {
        normal_solver: "ForwardEulerSolver".into(),
        ..config()
    };
    let mut director = Director::new(cfg, model);
    assert!(matches!(
        director.initialize(),
        Err(SimError::IncompatibleSolvers { .. })
    ));
}

#[test]
fn forward_euler_takes_fixed_steps() {
    let (model, x) = decay_model(-1.0);
    let cfg = DirectorConfig {
        normal_solver: "euler".into(),
        breakpoint_solver: "euler".into(),
        ..config()
    };
    let mut director = Director::new(cfg, model);
    let summary = director.run(1.0).unwrap();
    assert_eq!(summary.accepted, 10);
    assert_eq!(summary.rejected, 0);
    assert!((director.state_of(x, 0).unwrap() - 0.9_f64.powi(10)).abs() < 1e-12);
}

#[test]
fn schedule_is_cached_until_topology_changes() {
    let (model, x) = decay_model(-1.0);
    let mut director = Director::new(config(), model);
    director.initialize().unwrap();
    for _ in 0..3 {
        director.step().unwrap();
    }
    assert_eq!(director.schedule_rebuilds(), 1);

    let y = director.edit_topology(|model| {
        let y = model.add("y", Integ { x0: 0.0 });
        model.connect(x, 0, y, 0).unwrap();
        y
    });
    loop {
        match director.step().unwrap() {
            StepOutcome::Accepted { .. } => break,
            StepOutcome::Rejected { .. } => {}
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(director.schedule_rebuilds(), 2);
    assert_eq!(director.integrators().len(), 2);
    assert!(director.state_of(y, 0).unwrap() > 0.0);

    // y' = x < 1, so y(t) stays below the elapsed time
    director.run(2.0).unwrap();
    assert!(director.state_of(y, 0).unwrap() < director.time());
    assert_eq!(director.schedule_rebuilds(), 2);
}
