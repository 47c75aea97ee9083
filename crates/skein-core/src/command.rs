//! Control commands for a running simulation.
//!
//! Commands originate from any thread (UI, RPC, test harness) and are
//! delivered to the engine over a bounded channel. The engine drains
//! the channel only at loop safe points — between atomic steps — so a
//! command can never observe or interrupt a half-executed firing.

use crate::id::StepId;
use crate::time::Time;

/// A control command applied at the next loop safe point.
///
/// Later commands supersede earlier ones within a single drain: pausing
/// and immediately playing leaves the simulation running.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Run until event exhaustion or a later command.
    Play,
    /// Hold at the current step; the loop blocks awaiting commands.
    Pause,
    /// Run until the executed-step count reaches `target`, then pause.
    ///
    /// The target is absolute: a target at or before the current step
    /// pauses immediately without executing anything.
    GoToStep {
        /// Absolute step count to stop at.
        target: StepId,
    },
    /// Run until simulated time reaches `target`, then pause.
    ///
    /// The engine stops *before* executing the first reaction scheduled
    /// strictly after `target`; simulated time does not overshoot.
    GoToTime {
        /// Absolute simulated time to stop at.
        target: Time,
    },
    /// End the run after the current atomic step.
    Terminate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_plain_values() {
        let c = Command::GoToStep { target: StepId(5) };
        assert_eq!(c, Command::GoToStep { target: StepId(5) });
        assert_ne!(c, Command::Pause);
    }
}
