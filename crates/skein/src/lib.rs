//! Skein: a discrete-event simulation kernel for stochastic
//! multi-agent models.
//!
//! A population of nodes hosts rate-governed reactions; the kernel
//! always knows which reaction fires next and, after each firing,
//! recomputes only the reactions that firing can have invalidated —
//! the incremental "next reaction" scheme that keeps large models
//! tractable.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Skein sub-crates. For most users, adding `skein` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use skein::prelude::*;
//! use skein::reactions::{AddMolecule, ConstantRate, KineticReaction, MoleculePresent};
//! use skein_test_utils::GridEnvironment;
//!
//! // One node holding three units of a molecule that decays away.
//! let mut env = GridEnvironment::new();
//! env.add_node(NodeId(0));
//! env.set_molecule_count(NodeId(0), MoleculeId(0), 3.0);
//!
//! let mut sim = Simulation::new(env, EngineConfig::default()).unwrap();
//! sim.add_reaction(Box::new(
//!     KineticReaction::builder("decay", NodeId(0))
//!         .condition(Box::new(MoleculePresent::new(NodeId(0), MoleculeId(0), 1.0)))
//!         .action(Box::new(AddMolecule::new(NodeId(0), MoleculeId(0), -1.0)))
//!         .distribution(Box::new(ConstantRate::new()))
//!         .build()
//!         .unwrap(),
//! ))
//! .unwrap();
//!
//! let handle = sim.handle();
//! handle.play().unwrap();
//! drop(handle);
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.steps.0, 3);
//! assert_eq!(sim.environment().molecule_count(NodeId(0), MoleculeId(0)), 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skein-core` | IDs, [`types::Time`], contexts, molecule sets, core traits, errors |
//! | [`arena`] | `skein-arena` | Handle-indexed reaction storage |
//! | [`scheduler`] | `skein-scheduler` | The indexed event queue |
//! | [`graph`] | `skein-graph` | The reaction dependency graph |
//! | [`engine`] | `skein-engine` | The simulation loop and control surface |
//! | [`reactions`] | `skein-reactions` | Reference reactions, conditions, actions, distributions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`skein-core`).
///
/// Contains [`types::Time`], [`types::Context`], [`types::MoleculeSet`],
/// the [`types::Reaction`] contract and its parts, the
/// [`types::Environment`] and [`types::Monitor`] collaborator traits,
/// and the error taxonomy.
pub use skein_core as types;

/// Handle-indexed reaction storage (`skein-arena`).
///
/// [`arena::ReactionArena`] owns every reaction behind stable,
/// generation-checked handles.
pub use skein_arena as arena;

/// The indexed event queue (`skein-scheduler`).
///
/// [`scheduler::Scheduler`] keeps all reactions ordered by next firing
/// time with O(log n) re-keying.
pub use skein_scheduler as scheduler;

/// The reaction dependency graph (`skein-graph`).
///
/// [`graph::DependencyGraph`] derives "who invalidates whom" from
/// declared molecule sets and contexts.
pub use skein_graph as graph;

/// The simulation loop and control surface (`skein-engine`).
///
/// [`engine::Simulation`] drives the run;
/// [`engine::SimulationHandle`] steers it from any thread.
pub use skein_engine as engine;

/// Reference reactions (`skein-reactions`).
///
/// The out-of-box incarnation: chemical-like kinetics over per-node
/// molecule counts.
pub use skein_reactions as reactions;

/// Common imports for typical Skein usage.
///
/// ```rust
/// use skein::prelude::*;
/// ```
///
/// This imports the most frequently used types: the simulation and its
/// configuration, core IDs and time, the reaction contract traits, and
/// the error taxonomy.
pub mod prelude {
    // IDs and values
    pub use skein_core::{Context, MoleculeId, MoleculeSet, NodeId, ReactionHandle, StepId, Time};

    // Core traits
    pub use skein_core::{
        Action, Condition, Environment, Execution, Monitor, Reaction, TimeDistribution,
    };

    // Errors
    pub use skein_core::{CloneError, Command, ConsistencyError, SubmitError};

    // Kernel structures
    pub use skein_arena::ReactionArena;
    pub use skein_graph::DependencyGraph;
    pub use skein_scheduler::{Scheduler, SchedulerError};

    // Engine
    pub use skein_engine::{
        ConfigError, EngineConfig, RunMetrics, RunReport, Simulation, SimulationHandle, Status,
    };
}
