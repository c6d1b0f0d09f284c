//! The continuous-time director: owns simulated time, the integrators and the
//! breakpoint set, and drives round-by-round evaluation of the model.

use std::ops::Range;

use ct_core::{CompId, CtError, StateId, same_instant, strictly_inside};
use ct_graph::{Network, Scheduler};
use ct_solver::{Integrator, SolverError, SolverKind};
use tracing::{debug, info, trace, warn};

use crate::breakpoints::BreakpointSet;
use crate::component::{EvalContext, InitContext};
use crate::config::DirectorConfig;
use crate::error::{ComponentError, SimError, SimResult};
use crate::model::Model;
use crate::run::{
    DirectorStats, RunSummary, SimProgress, SimRecord, SolverRole, StepOutcome, StopHandle,
};
use crate::signals::{SignalTable, Wiring};

/// Director state machine position.
///
/// `step` always starts from `Idle` (or one of the settled states after a
/// previous step) and leaves the director in `Committed`, `AtBreakpoint`,
/// `Rejected` or `Finished`, or in `Failed` after a fatal error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    RoundEvaluation {
        step_size: f64,
        round: usize,
        solver: SolverRole,
    },
    ErrorCheck,
    Committed,
    Rejected,
    AtBreakpoint,
    Finished,
    /// A step failed; only `initialize` leaves this phase.
    Failed,
}

/// Timing of the round being evaluated.
#[derive(Clone, Copy, Debug)]
struct Frame {
    start: f64,
    end: f64,
    h: f64,
    round: usize,
    time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Outputs,
    Derivatives,
}

/// Whatever bounded the suggested next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Limiter {
    State(usize),
    Component(usize),
}

enum Attempt {
    /// A breakpoint was posted strictly inside the attempted step.
    Interrupted(f64),
    Completed(Verdict),
}

#[derive(Clone, Copy, Debug)]
struct Verdict {
    accurate: bool,
    next: f64,
    limiting: Option<Limiter>,
}

/// Adaptive-step director for a [`Model`].
pub struct Director {
    config: DirectorConfig,
    model: Model,
    network: Network,
    scheduler: Scheduler,
    wiring: Wiring,
    signals: SignalTable,
    normal: SolverKind,
    breakpoint_solver: SolverKind,
    /// Solver the auxiliary arrays are currently sized for.
    aux_kind: SolverKind,
    integrators: Vec<Integrator>,
    /// Owning component of each integrator.
    state_owners: Vec<CompId>,
    /// Integrator range of each component slot.
    state_ranges: Vec<Range<usize>>,
    breakpoints: BreakpointSet,
    posted: Vec<f64>,
    time: f64,
    next_step: f64,
    /// Upper bound on time for the `run` in progress; landing on it is not a
    /// breakpoint.
    horizon: f64,
    breakpoint_steps_left: usize,
    phase: Phase,
    initialized: bool,
    topology_dirty: bool,
    stop: StopHandle,
    stats: DirectorStats,
    record: SimRecord,
}

impl Director {
    /// Create a director; nothing is validated until [`Director::initialize`].
    pub fn new(config: DirectorConfig, model: Model) -> Self {
        let resolution = config.time_resolution;
        let start = config.start_time;
        let next_step = config.initial_step_size;
        Self {
            config,
            model,
            network: Network::default(),
            scheduler: Scheduler::new(),
            wiring: Wiring::default(),
            signals: SignalTable::default(),
            normal: SolverKind::ExplicitRk23,
            breakpoint_solver: SolverKind::HeunEuler,
            aux_kind: SolverKind::ExplicitRk23,
            integrators: Vec::new(),
            state_owners: Vec::new(),
            state_ranges: Vec::new(),
            breakpoints: BreakpointSet::new(resolution),
            posted: Vec::new(),
            time: start,
            next_step,
            horizon: f64::INFINITY,
            breakpoint_steps_left: 0,
            phase: Phase::Idle,
            initialized: false,
            topology_dirty: true,
            stop: StopHandle::new(),
            stats: DirectorStats::default(),
            record: SimRecord::default(),
        }
    }

    /// Validate the configuration and topology, create the integrators,
    /// initialize every component and evaluate the model once at the start
    /// time.
    ///
    /// Can be called again to restart from the initial states.
    pub fn initialize(&mut self) -> SimResult<()> {
        self.initialized = false;
        self.config.validate()?;
        let (normal, breakpoint) = self.config.solvers()?;
        self.normal = normal;
        self.breakpoint_solver = breakpoint;
        self.aux_kind = normal;

        self.time = self.config.start_time;
        self.next_step = self.config.initial_step_size;
        self.horizon = f64::INFINITY;
        self.breakpoint_steps_left = 0;
        self.breakpoints = BreakpointSet::new(self.config.time_resolution);
        if self.config.stop_time.is_finite() {
            self.breakpoints.insert(self.config.stop_time);
        }
        self.integrators.clear();
        self.state_owners.clear();
        self.state_ranges.clear();
        self.signals.clear();
        self.posted.clear();
        self.stats = DirectorStats::default();
        self.record.clear();
        self.scheduler.invalidate();
        self.network = Network::default();

        self.refresh_topology()?;
        let order = self.current_order()?;
        for integrator in &self.integrators {
            self.normal.check_slots(integrator)?;
        }

        let frame = Frame {
            start: self.time,
            end: self.time,
            h: self.next_step,
            round: 0,
            time: self.time,
        };
        self.evaluate_round(&order, &frame, true)?;
        for integrator in &mut self.integrators {
            integrator.commit();
        }
        self.signals.latch();
        self.record_sample();

        self.phase = Phase::Idle;
        self.initialized = true;
        info!(
            components = self.network.components().len(),
            states = self.integrators.len(),
            normal_solver = self.normal.name(),
            breakpoint_solver = self.breakpoint_solver.name(),
            start_time = self.time,
            stop_time = self.config.stop_time,
            "director initialized"
        );
        Ok(())
    }

    /// Attempt one step.
    ///
    /// A rejected step leaves every committed state and the time unchanged.
    /// On a fatal error the attempt is rolled back as well and the director
    /// moves to `Failed`; later calls report `Halted` until `initialize`.
    pub fn step(&mut self) -> SimResult<StepOutcome> {
        if !self.initialized {
            return Err(SimError::NotInitialized);
        }
        match self.phase {
            Phase::Finished => return Ok(StepOutcome::Finished),
            Phase::Failed => return Err(SimError::Halted { time: self.time }),
            _ => {}
        }
        self.phase = Phase::Idle;
        if self.stop.take() {
            debug!(t = self.time, "stop requested");
            return Ok(StepOutcome::Stopped);
        }
        if self.time >= self.config.stop_time - self.config.time_resolution {
            self.phase = Phase::Finished;
            return Ok(StepOutcome::Finished);
        }

        let result = self.attempt_step();
        if let Err(err) = &result {
            for integrator in &mut self.integrators {
                integrator.rollback();
            }
            self.phase = Phase::Failed;
            warn!(t = self.time, %err, "step failed, director halted");
        }
        result
    }

    fn attempt_step(&mut self) -> SimResult<StepOutcome> {
        if self.topology_dirty || self.network.revision() != self.model.revision() {
            self.refresh_topology()?;
        }
        let order = self.current_order()?;

        let (solver, role) = if self.breakpoint_steps_left > 0 {
            (self.breakpoint_solver, SolverRole::Breakpoint)
        } else {
            (self.normal, SolverRole::Normal)
        };
        self.size_aux_for(solver);

        let res = self.config.time_resolution;
        let start = self.time;
        let proposal = self.next_step.min(self.config.max_step_size);
        let target = self
            .breakpoints
            .next_after(start)
            .unwrap_or(f64::INFINITY)
            .min(self.horizon);
        let (h, end) = if start + proposal >= target - res {
            trace!(t = start, proposal, target, "step clipped to breakpoint");
            (target - start, target)
        } else {
            (proposal, start + proposal)
        };
        let mut step = Frame {
            start,
            end,
            h,
            round: 0,
            time: start,
        };

        loop {
            match self.try_step(&order, solver, role, &step)? {
                Attempt::Interrupted(bp) => {
                    for integrator in &mut self.integrators {
                        integrator.rollback();
                    }
                    self.stats.discarded += 1;
                    debug!(t = start, h = step.h, breakpoint = bp, "breakpoint posted inside step, retrying");
                    step.h = bp - start;
                    step.end = bp;
                }
                Attempt::Completed(verdict) if verdict.accurate => {
                    // Fixed-step solvers return to the configured step unless a
                    // component asked for less
                    let capped = matches!(verdict.limiting, Some(Limiter::Component(_)));
                    let next = if solver.is_adaptive() || capped {
                        verdict.next
                    } else {
                        self.config.initial_step_size
                    };
                    return Ok(self.commit(&step, solver, role, next));
                }
                Attempt::Completed(verdict) => return self.reject(&step, verdict),
            }
        }
    }

    fn try_step(
        &mut self,
        order: &[CompId],
        solver: SolverKind,
        role: SolverRole,
        step: &Frame,
    ) -> SimResult<Attempt> {
        for round in 0..solver.round_count() {
            let c = solver.round_time_fraction(round)?;
            let frame = Frame {
                round,
                time: if c >= 1.0 { step.end } else { step.start + c * step.h },
                ..*step
            };
            self.phase = Phase::RoundEvaluation {
                step_size: step.h,
                round,
                solver: role,
            };
            if let Some(bp) = self.evaluate_round(order, &frame, true)? {
                return Ok(Attempt::Interrupted(bp));
            }
            for i in 0..self.integrators.len() {
                if let Err(err) = solver.integrate(&mut self.integrators[i], step.h, round) {
                    return Err(self.solver_error(i, err, &frame));
                }
            }
        }

        self.phase = Phase::ErrorCheck;
        let h = step.h;
        let tolerance = self.config.error_tolerance;
        let safety = self.config.safety_factor;
        let mut verdict = Verdict {
            accurate: true,
            next: f64::INFINITY,
            limiting: None,
        };
        for (i, integrator) in self.integrators.iter_mut().enumerate() {
            if !solver.is_accurate(integrator, h, tolerance)? {
                verdict.accurate = false;
            }
            let suggested = solver.suggested_next_step(integrator, h, tolerance, safety);
            if suggested < verdict.next {
                verdict.next = suggested;
                verdict.limiting = Some(Limiter::State(i));
            }
        }
        if !verdict.accurate {
            return Ok(Attempt::Completed(verdict));
        }

        let end_frame = Frame {
            round: solver.round_count(),
            time: step.end,
            ..*step
        };
        // The last round of a non-FSAL solver ran on an intermediate trial;
        // refresh the outputs from the final one before anything is committed.
        if !solver.tableau().fsal {
            if let Some(bp) = self.evaluate_round(order, &end_frame, false)? {
                return Ok(Attempt::Interrupted(bp));
            }
        }
        self.check_components(order, &end_frame, &mut verdict)?;
        Ok(Attempt::Completed(verdict))
    }

    /// Let every component veto the step or bound the next one.
    fn check_components(
        &mut self,
        order: &[CompId],
        frame: &Frame,
        verdict: &mut Verdict,
    ) -> SimResult<()> {
        for comp in order {
            let slot = comp.slot();
            let range = self.state_ranges[slot].clone();
            let (accurate, refined) = {
                let ctx = EvalContext {
                    time: frame.time,
                    step_start: frame.start,
                    step_size: frame.h,
                    round: frame.round,
                    resolution: self.config.time_resolution,
                    inputs: &self.wiring.inputs[slot],
                    outputs: &self.wiring.outputs[slot],
                    values: &mut self.signals.values,
                    latched: &self.signals.latched,
                    states: &mut self.integrators[range],
                    posted: &mut self.posted,
                };
                let component = &self.model.components[slot];
                (
                    component.is_step_accurate(&ctx),
                    component.refined_step_size(&ctx),
                )
            };

            if let Some(r) = refined {
                if r.is_nan() {
                    return Err(self.non_finite(slot, "refined step size", r, frame));
                }
                if r <= 0.0 {
                    return Err(SimError::Component {
                        component: self.component_name(slot),
                        time: frame.time,
                        source: ComponentError::Failed {
                            what: format!("refined step size {r} is not positive"),
                        },
                    });
                }
                if r < verdict.next {
                    verdict.next = r;
                    verdict.limiting = Some(Limiter::Component(slot));
                }
            }
            if !accurate {
                trace!(t = frame.time, component = slot, refined = ?refined, "component vetoed step");
                verdict.accurate = false;
                if verdict.next >= frame.h {
                    verdict.next = 0.5 * frame.h;
                    verdict.limiting = Some(Limiter::Component(slot));
                }
            }
        }
        Ok(())
    }

    fn commit(
        &mut self,
        step: &Frame,
        solver: SolverKind,
        role: SolverRole,
        next: f64,
    ) -> StepOutcome {
        let Frame { h, end, .. } = *step;
        for integrator in &mut self.integrators {
            integrator.commit();
        }
        self.time = end;
        self.signals.latch();

        let at_breakpoint = self.breakpoints.remove_reached(end) > 0;
        if role == SolverRole::Breakpoint {
            self.breakpoint_steps_left = self.breakpoint_steps_left.saturating_sub(1);
        }
        if at_breakpoint {
            self.breakpoint_steps_left = self.config.breakpoint_solver_steps;
            self.stats.breakpoints_hit += 1;
        }
        self.next_step = next.min(self.config.max_step_size);
        self.stats.accepted += 1;
        if self.stats.accepted % self.config.record_every == 0 {
            self.record_sample();
        }

        self.phase = if self.time >= self.config.stop_time - self.config.time_resolution {
            Phase::Finished
        } else if at_breakpoint {
            Phase::AtBreakpoint
        } else {
            Phase::Committed
        };
        debug!(
            t = end,
            h,
            solver = solver.name(),
            at_breakpoint,
            next_step = self.next_step,
            "step accepted"
        );
        StepOutcome::Accepted {
            time: end,
            step_size: h,
            solver: role,
            at_breakpoint,
        }
    }

    fn reject(&mut self, step: &Frame, verdict: Verdict) -> SimResult<StepOutcome> {
        let Frame { start, h, .. } = *step;
        let next = verdict.next;
        for integrator in &mut self.integrators {
            integrator.rollback();
        }
        self.stats.rejected += 1;
        self.phase = Phase::Rejected;

        if next <= self.config.min_step_size {
            warn!(t = start, h, next, "step size underflow");
            let (component, state) = match verdict.limiting {
                Some(Limiter::Component(slot)) => (self.component_name(slot), None),
                Some(Limiter::State(i)) => (self.state_owner_name(i), Some(StateId::from_slot(i))),
                None => (self.state_owner_name(0), Some(StateId::from_slot(0))),
            };
            return Err(SimError::StepSizeUnderflow {
                time: start,
                step_size: next,
                min_step_size: self.config.min_step_size,
                component,
                state,
            });
        }
        self.next_step = next;
        debug!(t = start, h, next_step = next, "step rejected");
        Ok(StepOutcome::Rejected {
            time: start,
            step_size: h,
            next_step_size: next,
        })
    }

    /// Step until `stop_time` (capped by the configured stop time), a stop
    /// request, or an error. Initializes first if needed.
    pub fn run(&mut self, stop_time: f64) -> SimResult<RunSummary> {
        self.run_with_progress(stop_time, |_| {})
    }

    /// Like [`Director::run`], calling `progress` after every accepted step.
    pub fn run_with_progress<F>(&mut self, stop_time: f64, progress: F) -> SimResult<RunSummary>
    where
        F: FnMut(&SimProgress),
    {
        if stop_time.is_nan() {
            return Err(SimError::InvalidArg {
                what: "stop time must not be NaN",
            });
        }
        if !self.initialized {
            self.initialize()?;
        }
        let target = stop_time.min(self.config.stop_time);
        if target < self.time - self.config.time_resolution {
            return Err(SimError::InvalidArg {
                what: "stop time is before the current time",
            });
        }

        self.horizon = target;
        let result = self.run_until(target, progress);
        self.horizon = f64::INFINITY;
        result
    }

    fn run_until<F>(&mut self, target: f64, mut progress: F) -> SimResult<RunSummary>
    where
        F: FnMut(&SimProgress),
    {
        let res = self.config.time_resolution;
        let run_start = self.time;
        let first = self.stats.clone();
        let mut attempts = 0_usize;
        let mut stopped = false;

        while self.time < target - res {
            if attempts >= self.config.max_steps {
                return Err(SimError::StepLimitExceeded {
                    max_steps: self.config.max_steps,
                    target,
                    time: self.time,
                });
            }
            match self.step()? {
                StepOutcome::Accepted {
                    time, step_size, ..
                } => {
                    attempts += 1;
                    let span = target - run_start;
                    let fraction_complete = if span.is_finite() && span > 0.0 {
                        ((time - run_start) / span).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    progress(&SimProgress {
                        time,
                        step_size,
                        accepted: self.stats.accepted - first.accepted,
                        rejected: self.stats.rejected - first.rejected,
                        fraction_complete,
                    });
                }
                StepOutcome::Rejected { .. } => attempts += 1,
                StepOutcome::Finished => break,
                StepOutcome::Stopped => {
                    stopped = true;
                    break;
                }
            }
        }

        if self.record.last_time() != Some(self.time) {
            self.record_sample();
        }
        let summary = RunSummary {
            accepted: self.stats.accepted - first.accepted,
            rejected: self.stats.rejected - first.rejected,
            discarded: self.stats.discarded - first.discarded,
            final_time: self.time,
            stopped,
        };
        info!(
            t = summary.final_time,
            accepted = summary.accepted,
            rejected = summary.rejected,
            stopped,
            "run finished"
        );
        Ok(summary)
    }

    /// End the run; further steps report `Finished` until re-initialized.
    pub fn terminate(&mut self) {
        if self.initialized && self.phase != Phase::Finished {
            info!(
                t = self.time,
                accepted = self.stats.accepted,
                rejected = self.stats.rejected,
                "director terminated"
            );
        }
        self.phase = Phase::Finished;
    }

    /// Apply a batch of topology edits between steps.
    ///
    /// The cached schedule is dropped; the edited network is validated and
    /// rescheduled by the next `step`, which also creates the states of any
    /// added component and initializes it at the current time.
    pub fn edit_topology<R>(&mut self, edit: impl FnOnce(&mut Model) -> R) -> R {
        let out = edit(&mut self.model);
        self.topology_dirty = true;
        self.scheduler.invalidate();
        debug!(revision = self.model.revision(), "topology edited");
        out
    }

    /// Handle for requesting a stop from elsewhere, e.g. another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // Accessors

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Network snapshot of the last validated topology.
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current committed time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Step size the next attempt starts from, before breakpoint clipping.
    pub fn next_step_size(&self) -> f64 {
        self.next_step.min(self.config.max_step_size)
    }

    pub fn normal_solver(&self) -> SolverKind {
        self.normal
    }

    pub fn breakpoint_solver(&self) -> SolverKind {
        self.breakpoint_solver
    }

    /// Role of the solver the next step will use.
    pub fn next_solver_role(&self) -> SolverRole {
        if self.breakpoint_steps_left > 0 {
            SolverRole::Breakpoint
        } else {
            SolverRole::Normal
        }
    }

    pub fn integrators(&self) -> &[Integrator] {
        &self.integrators
    }

    /// Integrators owned by a component.
    pub fn integrators_of(&self, comp: CompId) -> Option<&[Integrator]> {
        let range = self.state_ranges.get(comp.slot())?;
        self.integrators.get(range.clone())
    }

    /// Committed value of a component's `index`-th state.
    pub fn state_of(&self, comp: CompId, index: usize) -> Option<f64> {
        self.integrators_of(comp)?
            .get(index)
            .map(Integrator::state)
    }

    /// Value of a component's output as of the last committed step.
    pub fn output_of(&self, comp: CompId, index: usize) -> Option<f64> {
        let slot = *self.wiring.outputs.get(comp.slot())?.get(index)?;
        self.signals.latched.get(slot).copied()
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    pub fn stats(&self) -> &DirectorStats {
        &self.stats
    }

    pub fn record(&self) -> &SimRecord {
        &self.record
    }

    /// How many times the evaluation order has been computed.
    pub fn schedule_rebuilds(&self) -> u64 {
        self.scheduler.rebuild_count()
    }

    // Internals

    fn current_order(&mut self) -> SimResult<Vec<CompId>> {
        match self.scheduler.schedule(&self.network) {
            Ok(schedule) => Ok(schedule.order().to_vec()),
            Err(err) => {
                warn!(%err, "scheduling failed");
                Err(err.into())
            }
        }
    }

    /// Bring the network snapshot, wiring and states in line with the model.
    fn refresh_topology(&mut self) -> SimResult<()> {
        let network = self.model.build_network()?;
        self.wiring = Wiring::new(&network);
        self.signals.resize(network.ports().len());
        self.network = network;
        self.topology_dirty = false;

        let known = self.state_ranges.len();
        for slot in known..self.network.components().len() {
            let comp = self.network.components()[slot].id;
            let component = &mut self.model.components[slot];

            let first = self.integrators.len();
            for value in component.initial_states() {
                if !value.is_finite() {
                    return Err(SimError::NonFinite {
                        component: self.network.components()[slot].name.clone(),
                        what: "initial state",
                        value,
                        time: self.time,
                        step_size: self.next_step,
                    });
                }
                self.integrators
                    .push(Integrator::new(value, self.aux_kind.aux_slots()));
                self.state_owners.push(comp);
            }
            self.state_ranges.push(first..self.integrators.len());

            let mut ctx = InitContext {
                time: self.time,
                posted: &mut self.posted,
            };
            if let Err(source) = component.initialize(&mut ctx) {
                return Err(SimError::Component {
                    component: self.component_name(slot),
                    time: self.time,
                    source,
                });
            }
            self.absorb_posted(slot, None)?;
        }

        debug!(
            revision = self.network.revision(),
            components = self.network.components().len(),
            states = self.integrators.len(),
            "topology refreshed"
        );
        Ok(())
    }

    fn size_aux_for(&mut self, solver: SolverKind) {
        if self.aux_kind != solver {
            for integrator in &mut self.integrators {
                integrator.resize_aux(solver.aux_slots());
            }
            self.aux_kind = solver;
        }
    }

    /// Output phase in schedule order, then (optionally) the derivative phase.
    ///
    /// Returns the earliest breakpoint posted strictly inside the frame's
    /// step, as soon as one appears.
    fn evaluate_round(
        &mut self,
        order: &[CompId],
        frame: &Frame,
        derivatives: bool,
    ) -> SimResult<Option<f64>> {
        self.stats.rounds += 1;
        trace!(t = frame.time, round = frame.round, h = frame.h, "evaluating round");
        for comp in order {
            if let Some(bp) = self.run_component(comp.slot(), Pass::Outputs, frame)? {
                return Ok(Some(bp));
            }
        }
        if derivatives {
            for comp in order {
                if self.state_ranges[comp.slot()].is_empty() {
                    continue;
                }
                if let Some(bp) = self.run_component(comp.slot(), Pass::Derivatives, frame)? {
                    return Ok(Some(bp));
                }
            }
        }
        Ok(None)
    }

    fn run_component(&mut self, slot: usize, pass: Pass, frame: &Frame) -> SimResult<Option<f64>> {
        let range = self.state_ranges[slot].clone();
        let mut ctx = EvalContext {
            time: frame.time,
            step_start: frame.start,
            step_size: frame.h,
            round: frame.round,
            resolution: self.config.time_resolution,
            inputs: &self.wiring.inputs[slot],
            outputs: &self.wiring.outputs[slot],
            values: &mut self.signals.values,
            latched: &self.signals.latched,
            states: &mut self.integrators[range.clone()],
            posted: &mut self.posted,
        };
        let component = &mut self.model.components[slot];
        let result = match pass {
            Pass::Outputs => component.evaluate(&mut ctx),
            Pass::Derivatives => component.derivatives(&mut ctx),
        };
        if let Err(source) = result {
            return Err(SimError::Component {
                component: self.component_name(slot),
                time: frame.time,
                source,
            });
        }

        match pass {
            Pass::Outputs => {
                for &port in &self.wiring.outputs[slot] {
                    let value = self.signals.values[port];
                    if !value.is_finite() {
                        return Err(self.non_finite(slot, "output", value, frame));
                    }
                }
            }
            Pass::Derivatives => {
                for i in range {
                    let value = self.integrators[i].tentative_derivative();
                    if !value.is_finite() {
                        return Err(self.non_finite(slot, "derivative", value, frame));
                    }
                }
            }
        }
        self.absorb_posted(slot, Some(frame))
    }

    /// Move breakpoints posted by component `slot` into the set.
    fn absorb_posted(&mut self, slot: usize, frame: Option<&Frame>) -> SimResult<Option<f64>> {
        if self.posted.is_empty() {
            return Ok(None);
        }
        let res = self.config.time_resolution;
        let mut inside: Option<f64> = None;
        let posted = std::mem::take(&mut self.posted);
        for &t in &posted {
            if t.is_nan() {
                return Err(SimError::NonFinite {
                    component: self.component_name(slot),
                    what: "breakpoint",
                    value: t,
                    time: self.time,
                    step_size: frame.map_or(self.next_step, |f| f.h),
                });
            }
            if t < self.time - res {
                return Err(SimError::BreakpointInPast {
                    component: self.component_name(slot),
                    requested: t,
                    time: self.time,
                });
            }
            if same_instant(t, self.time, res) {
                continue;
            }
            if self.breakpoints.insert(t) {
                trace!(t, component = slot, "breakpoint posted");
            }
            if let Some(frame) = frame {
                if strictly_inside(t, frame.start, frame.end, res) {
                    inside = Some(inside.map_or(t, |m: f64| m.min(t)));
                }
            }
        }
        self.posted = posted;
        self.posted.clear();
        Ok(inside)
    }

    fn record_sample(&mut self) {
        let x = self.integrators.iter().map(Integrator::state).collect();
        self.record.push(self.time, x);
    }

    fn component_name(&self, slot: usize) -> String {
        self.network
            .components()
            .get(slot)
            .map_or_else(|| format!("#{slot}"), |c| c.name.clone())
    }

    fn state_owner_name(&self, state: usize) -> String {
        match self.state_owners.get(state) {
            Some(comp) => self.component_name(comp.slot()),
            None => format!("state {state}"),
        }
    }

    fn non_finite(&self, slot: usize, what: &'static str, value: f64, frame: &Frame) -> SimError {
        SimError::NonFinite {
            component: self.component_name(slot),
            what,
            value,
            time: frame.time,
            step_size: frame.h,
        }
    }

    fn solver_error(&self, state: usize, err: SolverError, frame: &Frame) -> SimError {
        match err {
            SolverError::Core(CtError::NonFinite { value, .. }) => SimError::NonFinite {
                component: self.state_owner_name(state),
                what: "state",
                value,
                time: frame.time,
                step_size: frame.h,
            },
            other => other.into(),
        }
    }
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("phase", &self.phase)
            .field("time", &self.time)
            .field("next_step", &self.next_step)
            .field("states", &self.integrators.len())
            .field("model", &self.model)
            .finish()
    }
}
