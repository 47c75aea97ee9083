//! Strongly-typed identifiers for nodes, molecules, reactions, and steps.

use std::fmt;

/// Identifies a node (an agent/location hosting reactions) within a
/// simulation.
///
/// Node IDs are assigned by the environment; the kernel treats them as
/// opaque. Two reactions on the same node share a `NodeId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a molecule (a named resource/datum stored per node).
///
/// Molecules are registered by the model before the run and assigned
/// sequential IDs. `MoleculeId(n)` corresponds to the n-th registered
/// molecule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeId(pub u32);

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MoleculeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Stable handle to a reaction stored in the reaction arena.
///
/// Handles are (slot, generation) pairs: the slot indexes the arena's
/// storage vector and the generation detects reuse after removal, so a
/// handle held across a `remove` resolves to "stale", never to an
/// unrelated reaction. Dependency edges and scheduler entries store
/// handles, not references, which keeps the cyclic dependency graph
/// free of ownership cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionHandle {
    slot: u32,
    generation: u32,
}

impl ReactionHandle {
    /// Create a handle from raw parts. Only the arena mints meaningful
    /// handles; this is public for tests and serialization.
    pub fn from_parts(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// The arena slot this handle points at.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// The arena generation this handle was minted in.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ReactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}g{}", self.slot, self.generation)
    }
}

/// Monotonically increasing count of executed simulation steps.
///
/// Incremented once per reaction firing; never advanced by updates that
/// do not execute a reaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trip() {
        let h = ReactionHandle::from_parts(7, 3);
        assert_eq!(h.slot(), 7);
        assert_eq!(h.generation(), 3);
        assert_eq!(h.to_string(), "r7g3");
    }

    #[test]
    fn handles_differ_across_generations() {
        let a = ReactionHandle::from_parts(0, 0);
        let b = ReactionHandle::from_parts(0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn display_impls() {
        assert_eq!(NodeId(9).to_string(), "9");
        assert_eq!(MoleculeId(2).to_string(), "2");
        assert_eq!(StepId(11).to_string(), "11");
    }
}
