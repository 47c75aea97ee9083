//! Reference actions.

use skein_core::{Action, Context, Environment, MoleculeId, MoleculeSet, NodeId};

// ── SetMolecule ──────────────────────────────────────────────────

/// Overwrite a molecule's count on the owning node.
#[derive(Clone, Debug)]
pub struct SetMolecule {
    node: NodeId,
    molecule: MoleculeId,
    level: f64,
}

impl SetMolecule {
    /// Set `molecule` on `node` to `level` on every firing.
    pub fn new(node: NodeId, molecule: MoleculeId, level: f64) -> Self {
        Self {
            node,
            molecule,
            level,
        }
    }
}

impl Action for SetMolecule {
    fn context(&self) -> Context {
        Context::Local
    }

    fn writes(&self) -> MoleculeSet {
        [self.molecule].into_iter().collect()
    }

    fn execute(&mut self, env: &mut dyn Environment) {
        env.set_molecule_count(self.node, self.molecule, self.level);
    }

    fn rebind(&self, node: NodeId) -> Option<Box<dyn Action>> {
        Some(Box::new(Self::new(node, self.molecule, self.level)))
    }
}

// ── AddMolecule ──────────────────────────────────────────────────

/// Add a (possibly negative) delta to a molecule's count on the owning
/// node, clamped at zero — counts never go negative.
#[derive(Clone, Debug)]
pub struct AddMolecule {
    node: NodeId,
    molecule: MoleculeId,
    delta: f64,
}

impl AddMolecule {
    /// Add `delta` of `molecule` on `node` on every firing.
    pub fn new(node: NodeId, molecule: MoleculeId, delta: f64) -> Self {
        Self {
            node,
            molecule,
            delta,
        }
    }
}

impl Action for AddMolecule {
    fn context(&self) -> Context {
        Context::Local
    }

    fn writes(&self) -> MoleculeSet {
        [self.molecule].into_iter().collect()
    }

    fn execute(&mut self, env: &mut dyn Environment) {
        let count = env.molecule_count(self.node, self.molecule);
        env.set_molecule_count(self.node, self.molecule, (count + self.delta).max(0.0));
    }

    fn rebind(&self, node: NodeId) -> Option<Box<dyn Action>> {
        Some(Box::new(Self::new(node, self.molecule, self.delta)))
    }
}

// ── AddToNeighbors ───────────────────────────────────────────────

/// Add a delta to a molecule's count on every current neighbor of the
/// owning node, clamped at zero per node.
///
/// The neighbor set is read at execution time, so the action always
/// reaches the *current* adjacency even when the dependency graph's
/// edges are stale.
#[derive(Clone, Debug)]
pub struct AddToNeighbors {
    node: NodeId,
    molecule: MoleculeId,
    delta: f64,
}

impl AddToNeighbors {
    /// Add `delta` of `molecule` on each neighbor of `node`.
    pub fn new(node: NodeId, molecule: MoleculeId, delta: f64) -> Self {
        Self {
            node,
            molecule,
            delta,
        }
    }
}

impl Action for AddToNeighbors {
    fn context(&self) -> Context {
        Context::Neighborhood
    }

    fn writes(&self) -> MoleculeSet {
        [self.molecule].into_iter().collect()
    }

    fn execute(&mut self, env: &mut dyn Environment) {
        for neighbor in env.neighborhood(self.node) {
            let count = env.molecule_count(neighbor, self.molecule);
            env.set_molecule_count(neighbor, self.molecule, (count + self.delta).max(0.0));
        }
    }

    fn rebind(&self, node: NodeId) -> Option<Box<dyn Action>> {
        Some(Box::new(Self::new(node, self.molecule, self.delta)))
    }
}
