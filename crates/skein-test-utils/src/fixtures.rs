//! Reusable reaction fixtures.
//!
//! [`StubReaction`] is a fully configurable [`Reaction`] for kernel
//! testing: fixed firing period, explicit read/write sets and contexts,
//! optional deliberate execution failure, optional one-shot context
//! widening, and shared counters observable from outside the arena via
//! [`Probe`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use skein_core::{
    CloneError, ConsistencyError, Context, Environment, Execution, MoleculeId, MoleculeSet,
    NodeId, Reaction, Time,
};

/// Shared view of a [`StubReaction`]'s call counters.
///
/// Counters are `Arc`-shared so tests can observe a reaction after it
/// has been moved into the arena.
#[derive(Clone, Debug)]
pub struct Probe {
    executions: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
}

impl Probe {
    /// How many times `execute()` has been called.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }

    /// How many times `update_status()` has been called.
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

/// A configurable fixture reaction with a fixed firing period.
///
/// `update_status` always reschedules `period` after `now`; an
/// infinite period models a reaction that never fires.
#[derive(Debug)]
pub struct StubReaction {
    name: String,
    node: NodeId,
    input_context: Context,
    output_context: Context,
    reads: MoleculeSet,
    writes: MoleculeSet,
    period: Time,
    tau: Time,
    rate: f64,
    fail_execution: bool,
    widen_on_execute: Option<Context>,
    effect: Option<(MoleculeId, f64)>,
    executions: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
}

impl StubReaction {
    /// A local/local stub on `node` firing every `period`.
    pub fn new(name: impl Into<String>, node: NodeId, period: Time) -> Self {
        Self {
            name: name.into(),
            node,
            input_context: Context::Local,
            output_context: Context::Local,
            reads: MoleculeSet::empty(),
            writes: MoleculeSet::empty(),
            period,
            tau: Time::INFINITY,
            rate: 0.0,
            fail_execution: false,
            widen_on_execute: None,
            effect: None,
            executions: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Declare the molecules whose change invalidates this reaction.
    pub fn with_reads(mut self, molecules: impl IntoIterator<Item = MoleculeId>) -> Self {
        self.reads = molecules.into_iter().collect();
        self
    }

    /// Declare the molecules this reaction may modify.
    pub fn with_writes(mut self, molecules: impl IntoIterator<Item = MoleculeId>) -> Self {
        self.writes = molecules.into_iter().collect();
        self
    }

    /// Override the input (sensitivity) context.
    pub fn with_input_context(mut self, context: Context) -> Self {
        self.input_context = context;
        self
    }

    /// Override the output (influence) context.
    pub fn with_output_context(mut self, context: Context) -> Self {
        self.output_context = context;
        self
    }

    /// Make every `execute()` call fail with an unsatisfied condition.
    pub fn failing(mut self) -> Self {
        self.fail_execution = true;
        self
    }

    /// Make the first `execute()` call widen the output context.
    pub fn widening(mut self, context: Context) -> Self {
        self.widen_on_execute = Some(context);
        self
    }

    /// Make every `execute()` add `delta` to `molecule` on the owning node.
    pub fn with_effect(mut self, molecule: MoleculeId, delta: f64) -> Self {
        self.effect = Some((molecule, delta));
        self
    }

    /// A shared counter view that survives moving the reaction into
    /// the arena.
    pub fn probe(&self) -> Probe {
        Probe {
            executions: Arc::clone(&self.executions),
            updates: Arc::clone(&self.updates),
        }
    }
}

impl Reaction for StubReaction {
    fn name(&self) -> &str {
        &self.name
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn input_context(&self) -> Context {
        self.input_context
    }

    fn output_context(&self) -> Context {
        self.output_context
    }

    fn reads(&self) -> MoleculeSet {
        self.reads.clone()
    }

    fn writes(&self) -> MoleculeSet {
        self.writes.clone()
    }

    fn tau(&self) -> Time {
        self.tau
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn update_status(&mut self, now: Time, _executed: bool, _env: &dyn Environment) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.tau = now.plus(self.period);
        self.rate = if self.period.is_infinite() {
            0.0
        } else {
            1.0 / self.period.value()
        };
    }

    fn execute(&mut self, env: &mut dyn Environment) -> Result<Execution, ConsistencyError> {
        self.executions.fetch_add(1, Ordering::Relaxed);
        if self.fail_execution {
            return Err(ConsistencyError::ConditionUnsatisfied {
                reaction: self.name.clone(),
                condition: "always_false".into(),
            });
        }
        if let Some((molecule, delta)) = self.effect {
            let count = env.molecule_count(self.node, molecule);
            env.set_molecule_count(self.node, molecule, count + delta);
        }
        if let Some(context) = self.widen_on_execute.take() {
            self.output_context = self.output_context.widest(context);
            return Ok(Execution::widened(self.output_context));
        }
        Ok(Execution::completed())
    }

    fn clone_on_node(&self, node: NodeId) -> Result<Box<dyn Reaction>, CloneError> {
        // Counters are shared with the original: probes observe the
        // whole family.
        Ok(Box::new(Self {
            name: self.name.clone(),
            node,
            input_context: self.input_context,
            output_context: self.output_context,
            reads: self.reads.clone(),
            writes: self.writes.clone(),
            period: self.period,
            tau: Time::INFINITY,
            rate: 0.0,
            fail_execution: self.fail_execution,
            widen_on_execute: self.widen_on_execute,
            effect: self.effect,
            executions: Arc::clone(&self.executions),
            updates: Arc::clone(&self.updates),
        }))
    }
}
