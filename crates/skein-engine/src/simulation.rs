//! The simulation loop.
//!
//! [`Simulation`] owns all kernel state — environment, reaction arena,
//! dependency graph, scheduler, monitors — and executes the
//! next-reaction main loop. Each step is one atomic unit:
//!
//! 1. pop the reaction with the earliest tau;
//! 2. advance simulated time to it (backward is fatal);
//! 3. execute its actions against the environment;
//! 4. let it recompute its own tau (`executed = true`) and re-key its
//!    scheduler entry;
//! 5. recompute every reaction its firing can have invalidated
//!    (`executed = false`), re-keying each;
//! 6. notify monitors.
//!
//! Control commands are drained from a bounded channel strictly
//! between steps: `try_recv` while running, a blocking `recv` while
//! paused. A command that sets the loop in motion (`Play`, a `go_to`)
//! defers any commands queued behind it until the motion completes, so
//! `go_to_step(5)` followed by `terminate()` executes five steps, then
//! terminates.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use smallvec::SmallVec;

use skein_arena::ReactionArena;
use skein_core::{
    CloneError, Command, ConsistencyError, Context, Environment, Monitor, NodeId, Reaction,
    ReactionHandle, StepId, Time,
};
use skein_graph::DependencyGraph;
use skein_scheduler::Scheduler;

use crate::config::{ConfigError, EngineConfig};
use crate::handle::SimulationHandle;
use crate::metrics::RunMetrics;
use crate::status::Status;

// ── RunReport ────────────────────────────────────────────────────

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    /// Simulated time when the run ended.
    pub time: Time,
    /// Steps executed over the whole run.
    pub steps: StepId,
    /// The seed recorded in the configuration.
    pub seed: u64,
}

// ── Bound ────────────────────────────────────────────────────────

/// Pause target installed by a `go_to` command. Cleared when reached.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Bound {
    None,
    Steps(StepId),
    Time(Time),
}

// ── Simulation ───────────────────────────────────────────────────

/// A discrete-event simulation over an environment of type `E`.
///
/// Built empty, populated with [`add_reaction()`](Simulation::add_reaction),
/// steered through [`SimulationHandle`]s, and driven by
/// [`run()`](Simulation::run) on the caller's thread. Independent
/// simulations share no state and may run fully in parallel.
///
/// # Example
///
/// ```
/// use skein_core::{NodeId, Time};
/// use skein_engine::{EngineConfig, Simulation};
/// use skein_test_utils::{GridEnvironment, StubReaction};
///
/// let mut env = GridEnvironment::new();
/// env.add_node(NodeId(0));
/// let mut sim = Simulation::new(env, EngineConfig::default()).unwrap();
/// sim.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
///     .unwrap();
///
/// let handle = sim.handle();
/// handle.go_to_step(3).unwrap();
/// drop(handle);
///
/// let report = sim.run().unwrap();
/// assert_eq!(report.steps.0, 3);
/// assert_eq!(report.time, Time::new(3.0));
/// ```
pub struct Simulation<E: Environment> {
    env: E,
    arena: ReactionArena,
    graph: DependencyGraph,
    scheduler: Scheduler,
    monitors: Vec<Box<dyn Monitor<E>>>,
    time: Time,
    step: StepId,
    status: Status,
    bound: Bound,
    cmd_tx: Option<Sender<Command>>,
    cmd_rx: Receiver<Command>,
    error: Option<ConsistencyError>,
    metrics: RunMetrics,
    config: EngineConfig,
    initialized_notified: bool,
}

impl<E: Environment> Simulation<E> {
    /// Create a simulation over `env`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the configuration fails validation; the
    /// environment is returned untouched inside `self` only on
    /// success.
    pub fn new(env: E, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_capacity);
        Ok(Self {
            env,
            arena: ReactionArena::new(),
            graph: DependencyGraph::new(),
            scheduler: Scheduler::new(),
            monitors: Vec::new(),
            time: Time::ZERO,
            step: StepId(0),
            status: Status::Init,
            bound: Bound::None,
            cmd_tx: Some(cmd_tx),
            cmd_rx,
            error: None,
            metrics: RunMetrics::default(),
            config,
            initialized_notified: false,
        })
    }

    // ── Model construction ───────────────────────────────────

    /// Admit a reaction: store it, link its dependencies, compute its
    /// initial tau, and schedule it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnboundGlobalReaction`] for a reaction that
    /// declares global scope on a side with no molecules — it would
    /// link against everything while never exchanging influence.
    pub fn add_reaction(
        &mut self,
        reaction: Box<dyn Reaction>,
    ) -> Result<ReactionHandle, ConfigError> {
        let global_in = reaction.input_context() == Context::Global && reaction.reads().is_empty();
        let global_out =
            reaction.output_context() == Context::Global && reaction.writes().is_empty();
        if global_in || global_out {
            return Err(ConfigError::UnboundGlobalReaction {
                name: reaction.name().to_string(),
            });
        }

        let handle = self.arena.insert(reaction);
        self.graph.link(handle, &self.arena, &self.env);
        let reaction = self
            .arena
            .get_mut(handle)
            .expect("freshly inserted handle is live");
        reaction.update_status(self.time, false, &self.env);
        let tau = reaction.tau();
        self.scheduler
            .add(handle, tau)
            .expect("freshly minted handle cannot be scheduled twice");

        if self.status == Status::Init {
            self.status = Status::Ready;
        }
        Ok(handle)
    }

    /// Remove a reaction: atomically prune its dependency edges, its
    /// scheduler entry, and its arena slot.
    ///
    /// Returns `false` (a defensive no-op) if the handle is stale —
    /// repeated removal never corrupts the remaining reactions.
    pub fn remove_reaction(&mut self, handle: ReactionHandle) -> bool {
        self.graph.unlink(handle);
        self.scheduler.remove(handle);
        self.arena.remove(handle).is_some()
    }

    /// Clone the reaction behind `source` onto `node`, admitting the
    /// clone as a new reaction (runtime node creation).
    ///
    /// # Errors
    ///
    /// [`CloneError::Unsupported`] if the handle is stale or the
    /// reaction type refuses duplication.
    pub fn clone_reaction(
        &mut self,
        source: ReactionHandle,
        node: NodeId,
    ) -> Result<ReactionHandle, CloneError> {
        let original = self.arena.get(source).ok_or_else(|| CloneError::Unsupported {
            reaction: format!("stale handle {source}"),
            node,
        })?;
        let clone = original.clone_on_node(node)?;

        // An admitted reaction's declarations are preserved by
        // clone_on_node, so admission validation cannot fail here.
        let handle = self.arena.insert(clone);
        self.graph.link(handle, &self.arena, &self.env);
        let reaction = self
            .arena
            .get_mut(handle)
            .expect("freshly inserted handle is live");
        reaction.update_status(self.time, false, &self.env);
        let tau = reaction.tau();
        self.scheduler
            .add(handle, tau)
            .expect("freshly minted handle cannot be scheduled twice");
        Ok(handle)
    }

    /// Register a monitor. Monitors run synchronously on the
    /// simulation thread, in registration order.
    pub fn add_monitor(&mut self, monitor: Box<dyn Monitor<E>>) {
        self.monitors.push(monitor);
    }

    // ── Control surface ──────────────────────────────────────

    /// Mint a thread-safe control handle.
    ///
    /// # Panics
    ///
    /// Panics if called after [`run()`](Simulation::run) has started:
    /// the simulation releases its own sender at that point so a fully
    /// dropped control surface reads as termination, not deadlock.
    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle::new(
            self.cmd_tx
                .as_ref()
                .expect("control handles must be minted before run()")
                .clone(),
        )
    }

    // ── Accessors ────────────────────────────────────────────

    /// The environment under simulation.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Mutable access to the environment, for model setup.
    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Current simulated time.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Steps executed so far.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The next scheduled event, if any: `(handle, tau)`.
    pub fn next_event(&self) -> Option<(ReactionHandle, Time)> {
        self.scheduler.peek_next()
    }

    /// The terminal consistency error, if the run aborted on one.
    pub fn error(&self) -> Option<&ConsistencyError> {
        self.error.as_ref()
    }

    /// Metrics from the most recent `run()` call.
    pub fn last_metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    // ── Run loop ─────────────────────────────────────────────

    /// Drive the simulation until termination.
    ///
    /// Blocks the calling thread, waiting on the command channel
    /// whenever the simulation is not running. Returns when a
    /// `Terminate` command lands, a hard bound is reached, events are
    /// exhausted, or a consistency error aborts the run.
    ///
    /// # Errors
    ///
    /// The first [`ConsistencyError`] encountered; also stored for
    /// post-mortem retrieval via [`error()`](Simulation::error).
    pub fn run(&mut self) -> Result<RunReport, ConsistencyError> {
        if self.status == Status::Terminated {
            return match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(self.report()),
            };
        }

        let started = Instant::now();
        // Release our own sender: once every external handle is gone,
        // a blocking drain observes disconnection instead of waiting
        // forever for commands that cannot arrive.
        drop(self.cmd_tx.take());

        if !self.initialized_notified {
            self.initialized_notified = true;
            for monitor in &mut self.monitors {
                monitor.initialized(&self.env);
            }
        }

        let outcome = self.run_loop();
        self.status = Status::Terminated;
        self.metrics.total_us = started.elapsed().as_micros() as u64;
        for monitor in &mut self.monitors {
            monitor.finished(&self.env, self.time, self.step);
        }

        match outcome {
            Ok(()) => Ok(self.report()),
            Err(e) => {
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn report(&self) -> RunReport {
        RunReport {
            time: self.time,
            steps: self.step,
            seed: self.config.seed,
        }
    }

    fn run_loop(&mut self) -> Result<(), ConsistencyError> {
        loop {
            self.drain_commands();
            match self.status {
                Status::Terminated => return Ok(()),
                Status::Running => {}
                _ => continue,
            }

            // Hard step ceiling terminates; command bounds merely pause.
            if let Some(max) = self.config.max_steps {
                if self.step.0 >= max {
                    return Ok(());
                }
            }
            if let Bound::Steps(target) = self.bound {
                if self.step >= target {
                    self.bound = Bound::None;
                    self.status = Status::Paused;
                    continue;
                }
            }

            let Some((handle, tau)) = self.scheduler.peek_next() else {
                return Ok(());
            };
            if tau.is_infinite() {
                return Ok(());
            }
            if let Some(max) = self.config.max_time {
                if tau > max {
                    return Ok(());
                }
            }
            if let Bound::Time(target) = self.bound {
                if tau > target {
                    self.bound = Bound::None;
                    self.status = Status::Paused;
                    continue;
                }
            }

            self.step_once(handle, tau)?;
        }
    }

    /// One atomic step. Runs to completion or fails the run; commands
    /// never interleave.
    fn step_once(&mut self, handle: ReactionHandle, tau: Time) -> Result<(), ConsistencyError> {
        if tau < self.time {
            return Err(ConsistencyError::TimeMovedBackward {
                from: self.time,
                to: tau,
            });
        }
        self.time = tau;

        let Some(reaction) = self.arena.get_mut(handle) else {
            // A scheduler entry outliving its reaction is tolerated
            // like any other idempotent-teardown leftover.
            self.scheduler.remove(handle);
            return Ok(());
        };
        let execution = reaction.execute(&mut self.env)?;

        if let Some(context) = execution.widened_to {
            self.graph
                .widen_context(handle, context, &self.arena, &self.env);
        }

        let reaction = self
            .arena
            .get_mut(handle)
            .expect("fired reaction is live");
        reaction.update_status(self.time, true, &self.env);
        let new_tau = reaction.tau();
        self.scheduler.update(handle, new_tau);

        // The self-edge is skipped: the executed update above already
        // covered it.
        let affected: SmallVec<[ReactionHandle; 16]> = self
            .graph
            .affected_by(handle)
            .filter(|&h| h != handle)
            .collect();
        for dependent in affected {
            let Some(reaction) = self.arena.get_mut(dependent) else {
                continue;
            };
            reaction.update_status(self.time, false, &self.env);
            let tau = reaction.tau();
            self.scheduler.update(dependent, tau);
            self.metrics.dependency_updates += 1;
        }

        self.step = StepId(self.step.0 + 1);
        self.metrics.executed_steps += 1;
        for monitor in &mut self.monitors {
            monitor.step_done(&self.env, handle, self.time, self.step);
        }
        Ok(())
    }

    /// Apply queued commands at a safe point.
    ///
    /// Blocks while the simulation is not running; disconnection of
    /// every handle while blocked terminates the run. A command that
    /// sets the loop in motion stops the drain so queued followers
    /// apply only after the motion completes.
    fn drain_commands(&mut self) {
        loop {
            if self.status == Status::Terminated {
                break;
            }
            let was_running = self.status == Status::Running;
            let command = if was_running {
                match self.cmd_rx.try_recv() {
                    Ok(c) => c,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match self.cmd_rx.recv() {
                    Ok(c) => c,
                    Err(_) => {
                        self.status = Status::Terminated;
                        break;
                    }
                }
            };
            self.apply_command(command);
            if !was_running && self.status == Status::Running {
                break;
            }
        }
    }

    fn apply_command(&mut self, command: Command) {
        self.metrics.commands_applied += 1;
        match command {
            Command::Play => {
                self.bound = Bound::None;
                self.status = Status::Running;
            }
            Command::Pause => {
                self.bound = Bound::None;
                self.status = Status::Paused;
            }
            Command::GoToStep { target } => {
                if self.step >= target {
                    self.bound = Bound::None;
                    self.status = Status::Paused;
                } else {
                    self.bound = Bound::Steps(target);
                    self.status = Status::Running;
                }
            }
            Command::GoToTime { target } => {
                if self.time >= target {
                    self.bound = Bound::None;
                    self.status = Status::Paused;
                } else {
                    self.bound = Bound::Time(target);
                    self.status = Status::Running;
                }
            }
            Command::Terminate => {
                self.status = Status::Terminated;
            }
        }
    }
}

impl<E: Environment> std::fmt::Debug for Simulation<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("status", &self.status)
            .field("time", &self.time)
            .field("step", &self.step)
            .field("reactions", &self.arena.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_core::MoleculeId;
    use skein_test_utils::{GridEnvironment, Probe, SharedMonitor, StubReaction};

    const X: MoleculeId = MoleculeId(0);

    fn one_node_env() -> GridEnvironment {
        let mut env = GridEnvironment::new();
        env.add_node(NodeId(0));
        env
    }

    fn sim(env: GridEnvironment) -> Simulation<GridEnvironment> {
        Simulation::new(env, EngineConfig::default()).unwrap()
    }

    // ── Lifecycle ────────────────────────────────────────────

    #[test]
    fn new_simulation_is_init() {
        let s = sim(one_node_env());
        assert_eq!(s.status(), Status::Init);
        assert_eq!(s.time(), Time::ZERO);
        assert_eq!(s.step(), StepId(0));
        assert!(s.next_event().is_none());
    }

    #[test]
    fn add_reaction_schedules_and_readies() {
        let mut s = sim(one_node_env());
        let h = s
            .add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(2.0))))
            .unwrap();
        assert_eq!(s.status(), Status::Ready);
        assert_eq!(s.next_event(), Some((h, Time::new(2.0))));
    }

    #[test]
    fn unbound_global_reaction_rejected() {
        let mut s = sim(one_node_env());
        let err = s
            .add_reaction(Box::new(
                StubReaction::new("void", NodeId(0), Time::new(1.0))
                    .with_output_context(Context::Global),
            ))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnboundGlobalReaction { .. }));
        // Nothing was admitted.
        assert_eq!(s.status(), Status::Init);
        assert!(s.next_event().is_none());
    }

    #[test]
    fn global_reaction_with_molecules_admitted() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(
            StubReaction::new("broadcast", NodeId(0), Time::new(1.0))
                .with_writes([X])
                .with_output_context(Context::Global),
        ))
        .unwrap();
        assert_eq!(s.status(), Status::Ready);
    }

    // ── Command-driven runs ──────────────────────────────────

    #[test]
    fn go_to_step_zero_executes_nothing() {
        let mut s = sim(one_node_env());
        let r = StubReaction::new("tick", NodeId(0), Time::new(1.0));
        let probe = r.probe();
        s.add_reaction(Box::new(r)).unwrap();

        let handle = s.handle();
        handle.go_to_step(0).unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(0));
        assert_eq!(report.time, Time::ZERO);
        assert_eq!(probe.executions(), 0);
        assert_eq!(s.status(), Status::Terminated);
    }

    #[test]
    fn go_to_step_executes_exactly_n() {
        let mut s = sim(one_node_env());
        let r = StubReaction::new("tick", NodeId(0), Time::new(1.0));
        let probe = r.probe();
        s.add_reaction(Box::new(r)).unwrap();

        let handle = s.handle();
        handle.go_to_step(3).unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(3));
        assert_eq!(report.time, Time::new(3.0));
        assert_eq!(probe.executions(), 3);
    }

    #[test]
    fn sequential_goto_commands_compose() {
        // go_to_step(1) then go_to_step(3): the second applies only
        // after the first bound is reached.
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.go_to_step(1).unwrap();
        handle.go_to_step(3).unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(3));
    }

    #[test]
    fn goto_behind_current_position_pauses_immediately() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.go_to_step(2).unwrap();
        handle.go_to_step(1).unwrap(); // already passed once applied
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(2));
    }

    #[test]
    fn play_then_terminate_stops_at_next_safe_point() {
        let mut s = sim(one_node_env());
        let r = StubReaction::new("tick", NodeId(0), Time::new(1.0));
        let probe = r.probe();
        s.add_reaction(Box::new(r)).unwrap();

        let handle = s.handle();
        handle.play().unwrap();
        handle.terminate().unwrap();
        drop(handle);

        s.run().unwrap();
        // Play starts the loop; Terminate lands at the safe point
        // after the first atomic step.
        assert_eq!(probe.executions(), 1);
    }

    #[test]
    fn go_to_time_does_not_overshoot() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.go_to_time(Time::new(2.5)).unwrap();
        drop(handle);

        let report = s.run().unwrap();
        // Events at 1.0 and 2.0 execute; 3.0 > 2.5 stays pending.
        assert_eq!(report.steps, StepId(2));
        assert_eq!(report.time, Time::new(2.0));
    }

    #[test]
    fn pause_then_play_resumes() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.go_to_step(1).unwrap();
        handle.pause().unwrap(); // redundant: bound already pauses
        handle.go_to_step(2).unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(2));
    }

    // ── Exhaustion and hard bounds ───────────────────────────

    #[test]
    fn infinite_tau_terminates_as_exhaustion() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("never", NodeId(0), Time::INFINITY)))
            .unwrap();

        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(0));
        assert_eq!(report.time, Time::ZERO);
        assert_eq!(s.status(), Status::Terminated);
    }

    #[test]
    fn empty_scheduler_terminates_as_exhaustion() {
        let mut s = sim(one_node_env());
        let h = s
            .add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();
        s.remove_reaction(h);

        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(0));
    }

    #[test]
    fn max_steps_is_a_hard_ceiling() {
        let env = one_node_env();
        let config = EngineConfig {
            max_steps: Some(2),
            ..Default::default()
        };
        let mut s = Simulation::new(env, config).unwrap();
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(2));
        assert_eq!(s.status(), Status::Terminated);
    }

    #[test]
    fn max_time_is_a_hard_ceiling() {
        let env = one_node_env();
        let config = EngineConfig {
            max_time: Some(Time::new(2.5)),
            ..Default::default()
        };
        let mut s = Simulation::new(env, config).unwrap();
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(2));
        assert_eq!(report.time, Time::new(2.0));
    }

    // ── Dependency updates ───────────────────────────────────

    fn probed_pair(
        s: &mut Simulation<GridEnvironment>,
    ) -> (ReactionHandle, Probe, ReactionHandle, Probe) {
        // "fast" writes X every step; "slow" reads X but would only
        // fire at t=100 on its own.
        let fast = StubReaction::new("fast", NodeId(0), Time::new(1.0)).with_writes([X]);
        let slow = StubReaction::new("slow", NodeId(0), Time::new(100.0)).with_reads([X]);
        let fast_probe = fast.probe();
        let slow_probe = slow.probe();
        let fh = s.add_reaction(Box::new(fast)).unwrap();
        let sh = s.add_reaction(Box::new(slow)).unwrap();
        (fh, fast_probe, sh, slow_probe)
    }

    #[test]
    fn firing_updates_dependents_without_executing_them() {
        let mut s = sim(one_node_env());
        let (_, fast_probe, _, slow_probe) = probed_pair(&mut s);
        let updates_after_admission = slow_probe.updates();

        let handle = s.handle();
        handle.go_to_step(2).unwrap();
        drop(handle);
        s.run().unwrap();

        assert_eq!(fast_probe.executions(), 2);
        assert_eq!(slow_probe.executions(), 0);
        // One dependency-triggered update per firing of "fast".
        assert_eq!(slow_probe.updates(), updates_after_admission + 2);
        assert_eq!(s.last_metrics().dependency_updates, 2);
    }

    #[test]
    fn removed_reaction_stops_receiving_updates() {
        let mut s = sim(one_node_env());
        let (_, _, slow_handle, slow_probe) = probed_pair(&mut s);

        s.remove_reaction(slow_handle);
        let updates_at_removal = slow_probe.updates();

        let handle = s.handle();
        handle.go_to_step(2).unwrap();
        drop(handle);
        s.run().unwrap();

        assert_eq!(slow_probe.updates(), updates_at_removal);
    }

    #[test]
    fn widening_reaches_new_dependents_same_step() {
        let mut env = one_node_env();
        env.add_node(NodeId(9));
        let mut s = sim(env);

        let wide = StubReaction::new("wide", NodeId(0), Time::new(1.0))
            .with_writes([X])
            .widening(Context::Global);
        let distant = StubReaction::new("distant", NodeId(9), Time::new(100.0)).with_reads([X]);
        let distant_probe = distant.probe();
        s.add_reaction(Box::new(wide)).unwrap();
        s.add_reaction(Box::new(distant)).unwrap();
        let updates_after_admission = distant_probe.updates();

        let handle = s.handle();
        handle.go_to_step(1).unwrap();
        drop(handle);
        s.run().unwrap();

        // The graph was widened before dependents were recomputed, so
        // the very first firing already updated the distant reader.
        assert_eq!(distant_probe.updates(), updates_after_admission + 1);
    }

    // ── Errors ───────────────────────────────────────────────

    #[test]
    fn failing_reaction_aborts_and_is_retrievable_post_mortem() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(
            StubReaction::new("broken", NodeId(0), Time::new(1.0)).failing(),
        ))
        .unwrap();

        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let err = s.run().unwrap_err();
        assert!(matches!(err, ConsistencyError::ConditionUnsatisfied { .. }));
        assert_eq!(s.error(), Some(&err));
        assert_eq!(s.status(), Status::Terminated);
    }

    #[test]
    fn rerun_after_error_returns_the_same_error() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(
            StubReaction::new("broken", NodeId(0), Time::new(1.0)).failing(),
        ))
        .unwrap();
        let handle = s.handle();
        handle.play().unwrap();
        drop(handle);

        let first = s.run().unwrap_err();
        let second = s.run().unwrap_err();
        assert_eq!(first, second);
    }

    // ── Monitors ─────────────────────────────────────────────

    #[test]
    fn monitors_observe_every_step_and_one_finish() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();
        let monitor = SharedMonitor::new();
        let view = monitor.clone();
        s.add_monitor(Box::new(monitor));

        let handle = s.handle();
        handle.go_to_step(3).unwrap();
        drop(handle);
        s.run().unwrap();
        // Re-running a terminated simulation must not re-notify.
        let _ = s.run();

        let records = view.records();
        assert_eq!(records.initialized_count, 1);
        assert_eq!(records.steps.len(), 3);
        assert_eq!(records.finished.len(), 1);
        assert_eq!(records.finished[0], (Time::new(3.0), StepId(3)));

        // Time is non-decreasing and steps count up from 1.
        for (i, (_, time, step)) in records.steps.iter().enumerate() {
            assert_eq!(*step, StepId(i as u64 + 1));
            if i > 0 {
                assert!(*time >= records.steps[i - 1].1);
            }
        }
    }

    #[test]
    fn metrics_match_observed_run() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();

        let handle = s.handle();
        handle.go_to_step(2).unwrap();
        drop(handle);
        s.run().unwrap();

        let metrics = s.last_metrics();
        assert_eq!(metrics.executed_steps, 2);
        // go_to_step was the only command applied.
        assert_eq!(metrics.commands_applied, 1);
    }

    // ── Cloning ──────────────────────────────────────────────

    #[test]
    fn clone_reaction_admits_on_new_node() {
        let mut env = one_node_env();
        env.add_node(NodeId(1));
        let mut s = sim(env);

        let original = s
            .add_reaction(Box::new(
                StubReaction::new("tick", NodeId(0), Time::new(1.0)).with_writes([X]),
            ))
            .unwrap();
        let clone = s.clone_reaction(original, NodeId(1)).unwrap();

        assert_ne!(original, clone);
        // Both scheduled.
        assert!(s.next_event().is_some());
        let handle = s.handle();
        handle.go_to_step(2).unwrap();
        drop(handle);
        let report = s.run().unwrap();
        assert_eq!(report.steps, StepId(2));
    }

    #[test]
    fn clone_of_stale_handle_fails() {
        let mut s = sim(one_node_env());
        let h = s
            .add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();
        s.remove_reaction(h);
        let err = s.clone_reaction(h, NodeId(0)).unwrap_err();
        assert!(matches!(err, CloneError::Unsupported { .. }));
    }

    // ── Cross-thread control ─────────────────────────────────

    #[test]
    fn commands_from_another_thread_take_effect() {
        let mut s = sim(one_node_env());
        s.add_reaction(Box::new(StubReaction::new("tick", NodeId(0), Time::new(1.0))))
            .unwrap();
        let handle = s.handle();

        let controller = std::thread::spawn(move || {
            handle.go_to_step(5).unwrap();
            // Dropping the handle releases the control surface; the
            // paused loop observes the disconnect and terminates.
        });

        let report = s.run().unwrap();
        controller.join().unwrap();
        assert_eq!(report.steps, StepId(5));
        assert_eq!(s.status(), Status::Terminated);
    }

    #[test]
    fn debug_impl_reports_state() {
        let s = sim(one_node_env());
        let debug = format!("{s:?}");
        assert!(debug.contains("Simulation"));
        assert!(debug.contains("status"));
    }
}
