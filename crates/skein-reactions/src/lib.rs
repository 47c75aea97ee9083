//! Reference reactions for the Skein simulation kernel.
//!
//! The kernel is agnostic to what reactions actually do; this crate is
//! the out-of-box incarnation — chemical-like kinetics over per-node
//! molecule counts:
//!
//! - [`Exponential`], [`ConstantRate`], [`DiracComb`], [`Trigger`] —
//!   time distributions.
//! - [`MoleculePresent`] — threshold condition with mass-action
//!   propensity.
//! - [`SetMolecule`], [`AddMolecule`], [`AddToNeighbors`] — actions.
//! - [`KineticReaction`] — the standard condition/action/distribution
//!   composite, built via [`KineticReaction::builder`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actions;
pub mod conditions;
pub mod distributions;
pub mod kinetic;

pub use actions::{AddMolecule, AddToNeighbors, SetMolecule};
pub use conditions::MoleculePresent;
pub use distributions::{ConstantRate, DiracComb, Exponential, Trigger};
pub use kinetic::{KineticReaction, KineticReactionBuilder};
