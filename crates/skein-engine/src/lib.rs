//! Simulation loop orchestrating the Skein kernel.
//!
//! [`Simulation`] wires together the reaction arena, dependency graph,
//! and event scheduler into the next-reaction main loop: pop the
//! earliest reaction, execute it, recompute exactly the reactions its
//! firing can have invalidated, repeat. Control (play, pause, go-to,
//! terminate) arrives over a bounded command channel drained only at
//! loop safe points, so external threads steer the run without ever
//! touching loop state directly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod handle;
pub mod metrics;
pub mod simulation;
pub mod status;

pub use config::{ConfigError, EngineConfig};
pub use handle::SimulationHandle;
pub use metrics::RunMetrics;
pub use simulation::{RunReport, Simulation};
pub use status::Status;
