//! Core abstraction traits: reactions, their parts, the environment
//! collaborator, and run observers.
//!
//! The kernel depends only on these contracts. Concrete behaviors are
//! injected as trait objects by the model builder; the reference set
//! lives in `skein-reactions`.

use smallvec::SmallVec;

use crate::context::Context;
use crate::error::{CloneError, ConsistencyError};
use crate::id::{MoleculeId, NodeId, ReactionHandle, StepId};
use crate::molecule::MoleculeSet;
use crate::time::Time;

/// Inline capacity for neighbor lists; spills to the heap for denser
/// topologies.
pub type Neighbors = SmallVec<[NodeId; 8]>;

/// The world the kernel simulates over: node adjacency and per-node
/// molecule storage.
///
/// The kernel calls into the environment only while executing a
/// reaction, recomputing a rate, or linking neighborhood-scoped
/// dependencies. How positions, movement, and adjacency are computed
/// is entirely the environment's business.
pub trait Environment: Send {
    /// The nodes currently adjacent to `node`, excluding `node` itself.
    fn neighborhood(&self, node: NodeId) -> Neighbors;

    /// The concentration/count of `molecule` stored on `node`.
    /// Zero for molecules the node has never seen.
    fn molecule_count(&self, node: NodeId, molecule: MoleculeId) -> f64;

    /// Set the concentration/count of `molecule` on `node`.
    fn set_molecule_count(&mut self, node: NodeId, molecule: MoleculeId, count: f64);

    /// Whether two nodes are currently adjacent.
    fn are_neighbors(&self, a: NodeId, b: NodeId) -> bool {
        self.neighborhood(a).contains(&b)
    }
}

/// A predicate gating a reaction and contributing to its propensity.
pub trait Condition: Send + std::fmt::Debug {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// How far this condition's reads reach.
    fn context(&self) -> Context;

    /// The molecules whose change can flip this condition or move its
    /// contribution.
    fn reads(&self) -> MoleculeSet;

    /// Whether the condition currently holds.
    fn is_satisfied(&self, env: &dyn Environment) -> bool;

    /// Multiplicative propensity contribution. Zero when the condition
    /// cannot fire; the owning reaction multiplies contributions into
    /// its rate.
    fn propensity_contribution(&self, env: &dyn Environment) -> f64;

    /// A structurally identical condition bound to `node`, or `None`
    /// if this condition type cannot be duplicated.
    fn rebind(&self, node: NodeId) -> Option<Box<dyn Condition>>;
}

/// An effect applied when a reaction fires.
///
/// Actions may carry internal state (e.g. a neighbor binding observed
/// at runtime), so execution takes `&mut self`. An action whose state
/// change broadens [`context()`](Action::context) or
/// [`writes()`](Action::writes) is picked up by the owning reaction,
/// which reports the widening to the engine.
pub trait Action: Send + std::fmt::Debug {
    /// How far this action's writes reach. May widen over a run,
    /// never narrow.
    fn context(&self) -> Context;

    /// The molecules this action may modify.
    fn writes(&self) -> MoleculeSet;

    /// Apply the effect.
    fn execute(&mut self, env: &mut dyn Environment);

    /// A structurally identical action bound to `node`, or `None` if
    /// this action type cannot be duplicated.
    fn rebind(&self, node: NodeId) -> Option<Box<dyn Action>>;
}

/// A stateful sampler producing a reaction's next firing time.
///
/// Implementations may be Markovian (exponential waiting times),
/// deterministic (fixed period or mean-rate), or anything else that can
/// answer "given this propensity, when next?". Internal state — RNG
/// streams, residual waiting time — is opaque to the kernel.
pub trait TimeDistribution: Send + std::fmt::Debug {
    /// Recompute the next occurrence.
    ///
    /// `executed` is true when the owning reaction just fired (draw a
    /// fresh inter-event time) and false when a dependency changed the
    /// propensity mid-wait (adjust the residual). Returns the new
    /// absolute occurrence time; [`Time::INFINITY`] when `propensity`
    /// is zero or the distribution is exhausted.
    fn update(&mut self, now: Time, executed: bool, propensity: f64) -> Time;

    /// The occurrence computed by the last [`update`](TimeDistribution::update)
    /// call. Before the first update this is the distribution's initial
    /// occurrence — [`Time::INFINITY`] for samplers that need a
    /// propensity, an absolute time for fixed schedules.
    fn next_occurrence(&self) -> Time;

    /// An equivalent distribution with independent internal state (a
    /// fresh RNG stream for stochastic samplers), or `None` if this
    /// distribution type cannot be duplicated.
    fn fork(&self) -> Option<Box<dyn TimeDistribution>>;
}

/// Report returned by a successful [`Reaction::execute`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Execution {
    /// Set when an action's effect reached beyond the output context
    /// the reaction was linked with; the engine must widen the
    /// dependency graph before recomputing dependents.
    pub widened_to: Option<Context>,
}

impl Execution {
    /// An execution that stayed within the declared output context.
    pub fn completed() -> Self {
        Self { widened_to: None }
    }

    /// An execution whose effects reached `context`.
    pub fn widened(context: Context) -> Self {
        Self {
            widened_to: Some(context),
        }
    }
}

/// A timed, rate-governed event source bound to one node.
///
/// # Contract
///
/// - [`tau()`](Reaction::tau) is side-effect free and always equals the
///   value computed by this reaction's own last
///   [`update_status()`](Reaction::update_status) call; the scheduler
///   never computes firing times itself.
/// - [`update_status()`](Reaction::update_status) recomputes rate and
///   tau without performing effects, and is idempotent while the
///   environment is unchanged and `executed` is false.
/// - [`execute()`](Reaction::execute) applies all actions in
///   declaration order and fails (propagating, never swallowing) if a
///   required condition is unsatisfied at execution time.
///
/// # Object safety
///
/// This trait is object-safe; the arena stores reactions as
/// `Box<dyn Reaction>`.
pub trait Reaction: Send + std::fmt::Debug {
    /// Human-readable name for error reporting and telemetry.
    fn name(&self) -> &str;

    /// The node this reaction is bound to.
    fn node(&self) -> NodeId;

    /// How far this reaction's reads reach (what can invalidate it).
    fn input_context(&self) -> Context;

    /// How far this reaction's writes reach (whom it can invalidate).
    fn output_context(&self) -> Context;

    /// The molecules whose change requires recomputing this reaction.
    fn reads(&self) -> MoleculeSet;

    /// The molecules this reaction may modify when it fires.
    fn writes(&self) -> MoleculeSet;

    /// The next scheduled firing time.
    fn tau(&self) -> Time;

    /// The current propensity (instantaneous firing rate weight).
    fn rate(&self) -> f64;

    /// Recompute propensity and tau from current environment state.
    ///
    /// Called with `executed = true` immediately after this reaction
    /// fires, and `executed = false` when a dependency's firing may
    /// have changed this reaction's inputs.
    fn update_status(&mut self, now: Time, executed: bool, env: &dyn Environment);

    /// Fire: apply all actions, in declaration order.
    fn execute(&mut self, env: &mut dyn Environment) -> Result<Execution, ConsistencyError>;

    /// A structurally identical reaction bound to `node`, for runtime
    /// node creation.
    fn clone_on_node(&self, node: NodeId) -> Result<Box<dyn Reaction>, CloneError>;
}

/// Observer of a simulation run.
///
/// Monitors run synchronously on the simulation thread: `step_done` is
/// delivered at least once per executed step, `finished` exactly once
/// per run. Slow monitor work costs throughput, never correctness.
pub trait Monitor<E: Environment>: Send {
    /// The initial state is in place and the run is about to start.
    fn initialized(&mut self, env: &E) {
        let _ = env;
    }

    /// A reaction finished executing and all dependents were updated.
    fn step_done(&mut self, env: &E, fired: ReactionHandle, time: Time, step: StepId);

    /// The run reached its end (command, bound, or event exhaustion).
    fn finished(&mut self, env: &E, time: Time, step: StepId);
}
