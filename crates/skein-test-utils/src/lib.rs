//! Test utilities and mock types for Skein development.
//!
//! Provides an in-memory [`Environment`] implementation
//! ([`GridEnvironment`]), a recording [`Monitor`]
//! ([`CountingMonitor`]), and fixture reactions (see [`fixtures`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::{IndexMap, IndexSet};

use skein_core::{
    Environment, MoleculeId, Monitor, Neighbors, NodeId, ReactionHandle, StepId, Time,
};

pub use fixtures::{Probe, StubReaction};

/// In-memory environment: explicit nodes, explicit adjacency, per-node
/// molecule counts.
///
/// Backed by `IndexMap`s so iteration (and therefore test traces) is
/// deterministic. Pre-populate with [`add_node`](GridEnvironment::add_node)
/// and [`connect`](GridEnvironment::connect) before passing to code
/// under test.
#[derive(Debug, Default)]
pub struct GridEnvironment {
    nodes: IndexMap<NodeId, IndexMap<MoleculeId, f64>>,
    adjacency: IndexMap<NodeId, IndexSet<NodeId>>,
}

impl GridEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with no molecules and no neighbors.
    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.entry(node).or_default();
        self.adjacency.entry(node).or_default();
    }

    /// Make `a` and `b` mutual neighbors (registering both if needed).
    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        self.add_node(a);
        self.add_node(b);
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Remove the adjacency between `a` and `b`, if present.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) {
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.shift_remove(&b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.shift_remove(&a);
        }
    }

    /// All registered nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }
}

impl Environment for GridEnvironment {
    fn neighborhood(&self, node: NodeId) -> Neighbors {
        self.adjacency
            .get(&node)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn molecule_count(&self, node: NodeId, molecule: MoleculeId) -> f64 {
        self.nodes
            .get(&node)
            .and_then(|m| m.get(&molecule))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_molecule_count(&mut self, node: NodeId, molecule: MoleculeId, count: f64) {
        self.nodes.entry(node).or_default().insert(molecule, count);
    }
}

/// Monitor that records every notification it receives.
#[derive(Debug, Default)]
pub struct CountingMonitor {
    pub steps: Vec<(ReactionHandle, Time, StepId)>,
    pub finished: Vec<(Time, StepId)>,
    pub initialized_count: usize,
}

impl CountingMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Environment> Monitor<E> for CountingMonitor {
    fn initialized(&mut self, _env: &E) {
        self.initialized_count += 1;
    }

    fn step_done(&mut self, _env: &E, fired: ReactionHandle, time: Time, step: StepId) {
        self.steps.push((fired, time, step));
    }

    fn finished(&mut self, _env: &E, time: Time, step: StepId) {
        self.finished.push((time, step));
    }
}

/// A [`CountingMonitor`] behind `Arc<Mutex<…>>`, observable after
/// being moved into a simulation.
#[derive(Clone, Debug, Default)]
pub struct SharedMonitor {
    inner: Arc<Mutex<CountingMonitor>>,
}

impl SharedMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded notifications so far.
    pub fn records(&self) -> MutexGuard<'_, CountingMonitor> {
        self.inner.lock().expect("monitor mutex poisoned")
    }
}

impl<E: Environment> Monitor<E> for SharedMonitor {
    fn initialized(&mut self, env: &E) {
        self.records().initialized(env);
    }

    fn step_done(&mut self, env: &E, fired: ReactionHandle, time: Time, step: StepId) {
        self.records().step_done(env, fired, time, step);
    }

    fn finished(&mut self, env: &E, time: Time, step: StepId) {
        self.records().finished(env, time, step);
    }
}
