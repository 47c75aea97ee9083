//! Error types shared across the Skein workspace.
//!
//! Organized by failure class: consistency violations (fatal to a run),
//! cloning failures (reported at node-creation time), and command
//! submission failures (control surface). Configuration errors live
//! with the engine's configuration code.

use std::error::Error;
use std::fmt;

use crate::id::{NodeId, ReactionHandle};
use crate::time::Time;

/// A fatal violation of a kernel invariant.
///
/// Consistency errors abort the run: the engine records the error,
/// transitions to the terminated state, and surfaces it to the caller.
/// They indicate a modeling or kernel bug, never a transient fault,
/// so the loop does not retry.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsistencyError {
    /// The next scheduled firing precedes the current simulated time.
    TimeMovedBackward {
        /// The engine's current time.
        from: Time,
        /// The offending firing time.
        to: Time,
    },
    /// A reaction fired while one of its conditions was unsatisfied.
    ConditionUnsatisfied {
        /// Name of the reaction that was executed.
        reaction: String,
        /// Name of the failing condition.
        condition: String,
    },
    /// The dependency graph's inbound/outbound edge sets disagree.
    AsymmetricDependency {
        /// The reaction holding the outbound edge.
        from: ReactionHandle,
        /// The reaction missing the matching inbound edge.
        to: ReactionHandle,
    },
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeMovedBackward { from, to } => {
                write!(f, "simulated time moved backward: {from} -> {to}")
            }
            Self::ConditionUnsatisfied { reaction, condition } => {
                write!(f, "reaction '{reaction}' fired with unsatisfied condition '{condition}'")
            }
            Self::AsymmetricDependency { from, to } => {
                write!(f, "dependency edge {from} -> {to} has no inbound counterpart")
            }
        }
    }
}

impl Error for ConsistencyError {}

/// Failure to clone a reaction onto a new node.
///
/// Runtime node creation (e.g. cell division) clones each reaction of
/// the template node. Reaction types that hold non-duplicable state may
/// refuse; the refusal is surfaced before any partial node is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloneError {
    /// The reaction type declares no cloning support.
    Unsupported {
        /// Name of the refusing reaction type.
        reaction: String,
        /// The node the clone was requested for.
        node: NodeId,
    },
}

impl fmt::Display for CloneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { reaction, node } => {
                write!(f, "reaction type '{reaction}' does not support cloning onto node {node}")
            }
        }
    }
}

impl Error for CloneError {}

/// Error submitting a control command to a running simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The simulation has terminated and its command channel is closed.
    Terminated,
    /// The command channel is full (back-pressure).
    ChannelFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminated => write!(f, "simulation has terminated"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl Error for SubmitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_times() {
        let e = ConsistencyError::TimeMovedBackward {
            from: Time::new(2.0),
            to: Time::new(1.0),
        };
        let msg = e.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn clone_error_names_type() {
        let e = CloneError::Unsupported {
            reaction: "frozen".into(),
            node: NodeId(4),
        };
        assert!(e.to_string().contains("frozen"));
        assert!(e.to_string().contains('4'));
    }
}
