//! Thread-safe control surface for a running simulation.

use crossbeam_channel::{Sender, TrySendError};

use skein_core::{Command, StepId, SubmitError, Time};

/// Cloneable handle for steering a [`Simulation`](crate::Simulation)
/// from any thread.
///
/// Commands are buffered in the simulation's bounded channel and
/// applied at loop safe points — between atomic steps, never
/// mid-firing. Sends are non-blocking: a full channel surfaces as
/// [`SubmitError::ChannelFull`] back-pressure rather than stalling the
/// controller.
///
/// Dropping every handle while the simulation is paused reads as a
/// release of the control surface: the run terminates instead of
/// waiting forever for commands that can no longer arrive.
#[derive(Clone, Debug)]
pub struct SimulationHandle {
    tx: Sender<Command>,
}

impl SimulationHandle {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Run until event exhaustion or a later command.
    pub fn play(&self) -> Result<(), SubmitError> {
        self.send(Command::Play)
    }

    /// Hold at the current step.
    pub fn pause(&self) -> Result<(), SubmitError> {
        self.send(Command::Pause)
    }

    /// Run until the executed-step count reaches `target`, then pause.
    pub fn go_to_step(&self, target: u64) -> Result<(), SubmitError> {
        self.send(Command::GoToStep {
            target: StepId(target),
        })
    }

    /// Run until simulated time reaches `target`, then pause.
    pub fn go_to_time(&self, target: Time) -> Result<(), SubmitError> {
        self.send(Command::GoToTime { target })
    }

    /// End the run after the current atomic step.
    pub fn terminate(&self) -> Result<(), SubmitError> {
        self.send(Command::Terminate)
    }

    /// Submit a raw command.
    pub fn send(&self, command: Command) -> Result<(), SubmitError> {
        self.tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Terminated,
        })
    }
}
