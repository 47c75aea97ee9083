//! Per-run performance metrics.

/// Counters and timing collected across a [`run()`](crate::Simulation::run).
///
/// Populated by the engine as the loop executes; read them back via
/// [`last_metrics()`](crate::Simulation::last_metrics) after (or, from
/// a monitor, during) the run.
#[derive(Clone, Debug, Default)]
pub struct RunMetrics {
    /// Reactions executed (equals the final step count).
    pub executed_steps: u64,
    /// Dependent-reaction recomputations pushed to the scheduler.
    pub dependency_updates: u64,
    /// Control commands applied at safe points.
    pub commands_applied: u64,
    /// Wall-clock duration of the last `run()` call, in microseconds.
    pub total_us: u64,
}
