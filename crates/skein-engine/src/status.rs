//! Simulation run status.

use std::fmt;

/// Lifecycle state of a [`Simulation`](crate::Simulation).
///
/// ```text
/// Init ──> Ready ──> Running <──> Paused
///                       │            │
///                       └──> Terminated <┘
/// ```
///
/// Transitions are driven only by the engine: in response to control
/// commands applied at loop safe points, or by internal exhaustion
/// (empty scheduler, infinite next tau, hard bound reached).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Constructed; no reactions admitted yet.
    Init,
    /// Reactions are linked and scheduled; awaiting the first command.
    Ready,
    /// Executing steps.
    Running,
    /// Holding between steps; the loop blocks awaiting commands.
    Paused,
    /// The run is over. Terminal.
    Terminated,
}

impl Status {
    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}
