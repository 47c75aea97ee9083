//! Engine configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use skein_core::Time;

/// Configuration for a [`Simulation`](crate::Simulation).
///
/// `seed` is recorded for the run and surfaced in the
/// [`RunReport`](crate::RunReport); reaction-level samplers own their
/// streams, so reproducing a run means rebuilding the model with the
/// same seed-derived streams. The hard bounds terminate the run (they
/// are ceilings, unlike the pausable `go_to` commands).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Seed this run's model was built with. Reporting only.
    pub seed: u64,
    /// Capacity of the bounded control command channel. Default: 64.
    pub command_capacity: usize,
    /// Hard ceiling on executed steps; `None` = unbounded.
    pub max_steps: Option<u64>,
    /// Hard ceiling on simulated time; `None` = unbounded.
    pub max_time: Option<Time>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            command_capacity: 64,
            max_steps: None,
            max_time: None,
        }
    }
}

impl EngineConfig {
    /// Check structural invariants at construction time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_capacity == 0 {
            return Err(ConfigError::CommandCapacityZero);
        }
        if let Some(t) = self.max_time {
            if t.is_infinite() || t < Time::ZERO {
                return Err(ConfigError::InvalidTimeBound { value: t });
            }
        }
        Ok(())
    }
}

/// Errors detected before the loop starts; the simulation state is
/// untouched when one is reported.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The command channel capacity is zero.
    CommandCapacityZero,
    /// `max_time` is infinite or negative.
    InvalidTimeBound {
        /// The invalid bound.
        value: Time,
    },
    /// A reaction declares global context in both directions but no
    /// molecules at all — it could neither affect nor be affected by
    /// anything, yet would link against every reaction forever.
    UnboundGlobalReaction {
        /// Name of the rejected reaction.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandCapacityZero => write!(f, "command channel capacity must be at least 1"),
            Self::InvalidTimeBound { value } => {
                write!(f, "max_time must be finite and non-negative, got {value}")
            }
            Self::UnboundGlobalReaction { name } => {
                write!(f, "reaction '{name}' is global in both directions but declares no molecules")
            }
        }
    }
}

impl Error for ConfigError {}
