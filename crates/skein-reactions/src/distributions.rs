//! Reference time distributions.
//!
//! All four implement the same contract: `update(now, executed, p)`
//! recomputes the next absolute occurrence, where `executed` tells the
//! distribution whether the owning reaction just fired (start a fresh
//! wait) or a dependency merely changed its propensity (adjust the
//! residual wait).

use std::sync::atomic::{AtomicU64, Ordering};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use skein_core::{Time, TimeDistribution};

/// Clamp a raw propensity into the usable range: non-finite and
/// negative values gate the reaction off.
fn usable(propensity: f64) -> f64 {
    if propensity.is_finite() && propensity > 0.0 {
        propensity
    } else {
        0.0
    }
}

// ── Exponential ──────────────────────────────────────────────────

/// Markovian waiting times: the canonical next-reaction distribution.
///
/// On execution, draws a fresh `Exp(propensity)` inter-event time from
/// a seeded `ChaCha8` stream. On a propensity change without
/// execution, the residual wait is rescaled by `old_rate / new_rate` —
/// the exponential's memorylessness makes the rescaled residual
/// exactly distributed as a fresh draw at the new rate, so dependents
/// never need re-sampling. Zero propensity parks the occurrence at
/// infinity; a later revival draws fresh.
#[derive(Debug)]
pub struct Exponential {
    seed: u64,
    rng: ChaCha8Rng,
    rate: f64,
    next: Time,
    forks: AtomicU64,
}

impl Exponential {
    /// Create a sampler with its own deterministic stream.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            rate: 0.0,
            next: Time::INFINITY,
            forks: AtomicU64::new(0),
        }
    }

    /// Draw a unit-rate exponential sample.
    fn sample_unit(&mut self) -> f64 {
        // Inverse CDF; clamp away from zero to avoid ln(0).
        let u: f64 = self.rng.random::<f64>().max(1e-300);
        -u.ln()
    }
}

impl TimeDistribution for Exponential {
    fn update(&mut self, now: Time, executed: bool, propensity: f64) -> Time {
        let rate = usable(propensity);
        self.next = if rate == 0.0 {
            Time::INFINITY
        } else if executed || self.rate == 0.0 || self.next.is_infinite() {
            now.plus(Time::new(self.sample_unit() / rate))
        } else if rate == self.rate {
            self.next
        } else {
            now.plus(self.next.minus(now).times(self.rate / rate))
        };
        self.rate = rate;
        self.next
    }

    fn next_occurrence(&self) -> Time {
        self.next
    }

    fn fork(&self) -> Option<Box<dyn TimeDistribution>> {
        // Derive a distinct child stream per fork; the golden-ratio
        // multiplier decorrelates consecutive fork indices.
        let n = self.forks.fetch_add(1, Ordering::Relaxed) + 1;
        Some(Box::new(Self::new(
            self.seed ^ n.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        )))
    }
}

// ── ConstantRate ─────────────────────────────────────────────────

/// Deterministic mean-rate waiting times: `delta = 1 / propensity`.
///
/// The exponential-equivalent deterministic case — useful for
/// reproducible traces and rate-equation-style models. A reaction at
/// propensity 1.0 fired at t = 0 comes due again at exactly t = 1.0.
#[derive(Clone, Debug)]
pub struct ConstantRate {
    rate: f64,
    next: Time,
}

impl ConstantRate {
    /// Create an idle distribution; the first update schedules it.
    pub fn new() -> Self {
        Self {
            rate: 0.0,
            next: Time::INFINITY,
        }
    }
}

impl Default for ConstantRate {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeDistribution for ConstantRate {
    fn update(&mut self, now: Time, executed: bool, propensity: f64) -> Time {
        let rate = usable(propensity);
        self.next = if rate == 0.0 {
            Time::INFINITY
        } else if executed || self.rate == 0.0 || self.next.is_infinite() || rate != self.rate {
            now.plus(Time::new(1.0 / rate))
        } else {
            self.next
        };
        self.rate = rate;
        self.next
    }

    fn next_occurrence(&self) -> Time {
        self.next
    }

    fn fork(&self) -> Option<Box<dyn TimeDistribution>> {
        Some(Box::new(Self::new()))
    }
}

// ── DiracComb ────────────────────────────────────────────────────

/// Fixed-period occurrences: `start, start + period, start + 2·period…`
///
/// Ignores propensity entirely — the comb models clocked behavior
/// (sensor rounds, protocol ticks) whose cadence no condition can
/// speed up or slow down. Conditions still gate *validity* at
/// execution time.
#[derive(Clone, Debug)]
pub struct DiracComb {
    period: Time,
    next: Time,
}

impl DiracComb {
    /// A comb with its first tooth at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is infinite or not positive — a comb that
    /// never repeats is a [`Trigger`].
    pub fn new(start: Time, period: Time) -> Self {
        assert!(
            !period.is_infinite() && period > Time::ZERO,
            "DiracComb period must be finite and positive"
        );
        Self {
            period,
            next: start,
        }
    }
}

impl TimeDistribution for DiracComb {
    fn update(&mut self, _now: Time, executed: bool, _propensity: f64) -> Time {
        if executed {
            self.next = self.next.plus(self.period);
        }
        self.next
    }

    fn next_occurrence(&self) -> Time {
        self.next
    }

    fn fork(&self) -> Option<Box<dyn TimeDistribution>> {
        Some(Box::new(self.clone()))
    }
}

// ── Trigger ──────────────────────────────────────────────────────

/// A single occurrence at an absolute time, then never again.
#[derive(Clone, Debug)]
pub struct Trigger {
    next: Time,
}

impl Trigger {
    /// A trigger due at `at`.
    pub fn new(at: Time) -> Self {
        Self { next: at }
    }
}

impl TimeDistribution for Trigger {
    fn update(&mut self, _now: Time, executed: bool, _propensity: f64) -> Time {
        if executed {
            self.next = Time::INFINITY;
        }
        self.next
    }

    fn next_occurrence(&self) -> Time {
        self.next
    }

    fn fork(&self) -> Option<Box<dyn TimeDistribution>> {
        Some(Box::new(self.clone()))
    }
}
