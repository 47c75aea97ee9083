//! Benchmark profiles for the Skein simulation kernel.
//!
//! Provides deterministic model builders shared by the benches:
//!
//! - [`ring_environment`]: N nodes on a ring, each adjacent to its two
//!   neighbors.
//! - [`decay_reactions`]: one mass-action decay reaction per node,
//!   seeded with molecule counts.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use skein_core::{Environment, MoleculeId, NodeId, Reaction};
use skein_reactions::{AddMolecule, ConstantRate, KineticReaction, MoleculePresent};
use skein_test_utils::GridEnvironment;

/// The molecule every benchmark reaction reads and writes.
pub const SPECIES: MoleculeId = MoleculeId(0);

/// N nodes on a ring, each holding `initial` units of [`SPECIES`].
pub fn ring_environment(nodes: u64, initial: f64) -> GridEnvironment {
    let mut env = GridEnvironment::new();
    for i in 0..nodes {
        env.add_node(NodeId(i));
        env.set_molecule_count(NodeId(i), SPECIES, initial);
    }
    for i in 0..nodes {
        env.connect(NodeId(i), NodeId((i + 1) % nodes));
    }
    env
}

/// One deterministic mass-action decay reaction per node.
pub fn decay_reactions(nodes: u64) -> Vec<Box<dyn Reaction>> {
    (0..nodes)
        .map(|i| {
            let node = NodeId(i);
            Box::new(
                KineticReaction::builder(format!("decay_{i}"), node)
                    .condition(Box::new(MoleculePresent::new(node, SPECIES, 1.0)))
                    .action(Box::new(AddMolecule::new(node, SPECIES, -1.0)))
                    .distribution(Box::new(ConstantRate::new()))
                    .build()
                    .expect("benchmark reaction is statically valid"),
            ) as Box<dyn Reaction>
        })
        .collect()
}
