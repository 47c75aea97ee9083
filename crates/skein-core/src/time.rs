//! Simulated time with an infinite "never fires" sentinel.
//!
//! [`Time`] is a totally ordered value type. The sentinel
//! [`Time::INFINITY`] marks an event that will never occur: it compares
//! greater than every finite time, two infinite times compare equal,
//! and any arithmetic involving it yields infinity again. NaN and
//! negative infinity are unrepresentable by construction, which is what
//! makes the total order (and use as an ordering key) sound.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Sub};

/// An instant (or duration) of simulated time.
///
/// # Examples
///
/// ```
/// use skein_core::Time;
///
/// let t = Time::new(2.5).plus(Time::new(0.5));
/// assert_eq!(t, Time::new(3.0));
/// assert!(t < Time::INFINITY);
/// assert!(Time::INFINITY.plus(t).is_infinite());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Time(f64);

impl Time {
    /// The origin of simulated time.
    pub const ZERO: Time = Time(0.0);

    /// The sentinel for "never": greater than every finite time and
    /// absorbing under all arithmetic.
    pub const INFINITY: Time = Time(f64::INFINITY);

    /// Create a time from a magnitude.
    ///
    /// # Panics
    ///
    /// Panics if `v` is NaN or negative infinity; neither has a place
    /// in the total order.
    pub fn new(v: f64) -> Self {
        assert!(!v.is_nan(), "Time cannot be NaN");
        assert!(v != f64::NEG_INFINITY, "Time cannot be negative infinity");
        // Normalize -0.0 so Hash agrees with Eq.
        Time(if v == 0.0 { 0.0 } else { v })
    }

    /// The underlying magnitude. Infinite for [`Time::INFINITY`].
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether this is the "never" sentinel.
    pub fn is_infinite(&self) -> bool {
        self.0.is_infinite()
    }

    /// `self + other`. Infinity absorbs.
    pub fn plus(self, other: Time) -> Time {
        if self.is_infinite() || other.is_infinite() {
            Time::INFINITY
        } else {
            Time::new(self.0 + other.0)
        }
    }

    /// `self - other`. Infinity absorbs: subtracting from (or
    /// subtracting) the sentinel yields the sentinel, never negative
    /// infinity.
    pub fn minus(self, other: Time) -> Time {
        if self.is_infinite() || other.is_infinite() {
            Time::INFINITY
        } else {
            Time::new(self.0 - other.0)
        }
    }

    /// `self * scalar`. Infinity absorbs regardless of the scalar's
    /// sign or magnitude.
    ///
    /// # Panics
    ///
    /// Panics if `scalar` is NaN.
    pub fn times(self, scalar: f64) -> Time {
        assert!(!scalar.is_nan(), "Time scalar cannot be NaN");
        if self.is_infinite() {
            Time::INFINITY
        } else {
            Time::new(self.0 * scalar)
        }
    }

}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN is unrepresentable, so total_cmp coincides with the
        // numeric order; two infinities compare equal.
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Add for Time {
    type Output = Time;
    fn add(self, rhs: Time) -> Time {
        self.plus(rhs)
    }
}

impl Sub for Time {
    type Output = Time;
    fn sub(self, rhs: Time) -> Time {
        self.minus(rhs)
    }
}

impl Mul<f64> for Time {
    type Output = Time;
    fn mul(self, rhs: f64) -> Time {
        self.times(rhs)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "∞")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Arithmetic ───────────────────────────────────────────

    #[test]
    fn finite_arithmetic() {
        let a = Time::new(1.5);
        let b = Time::new(2.0);
        assert_eq!(a.plus(b), Time::new(3.5));
        assert_eq!(b.minus(a), Time::new(0.5));
        assert_eq!(a.times(2.0), Time::new(3.0));
        assert_eq!(a + b, Time::new(3.5));
        assert_eq!(b - a, Time::new(0.5));
        assert_eq!(a * 2.0, Time::new(3.0));
    }

    #[test]
    fn infinity_absorbs_addition() {
        let t = Time::new(4.0);
        assert!(Time::INFINITY.plus(t).is_infinite());
        assert!(t.plus(Time::INFINITY).is_infinite());
    }

    #[test]
    fn infinity_absorbs_subtraction() {
        let t = Time::new(4.0);
        assert!(Time::INFINITY.minus(t).is_infinite());
        assert!(t.minus(Time::INFINITY).is_infinite());
        assert!(Time::INFINITY.minus(Time::INFINITY).is_infinite());
    }

    #[test]
    fn infinity_absorbs_scaling() {
        assert!(Time::INFINITY.times(0.0).is_infinite());
        assert!(Time::INFINITY.times(-3.0).is_infinite());
    }

    // ── Ordering ─────────────────────────────────────────────

    #[test]
    fn infinity_greater_than_all_finite() {
        assert!(Time::INFINITY > Time::new(f64::MAX));
        assert!(Time::INFINITY > Time::ZERO);
        assert!(Time::INFINITY > Time::new(-1.0));
    }

    #[test]
    fn two_infinities_compare_equal() {
        assert_eq!(Time::INFINITY, Time::INFINITY);
        assert_eq!(Time::INFINITY.cmp(&Time::INFINITY), Ordering::Equal);
    }

    #[test]
    fn finite_order_is_numeric() {
        assert!(Time::new(1.0) < Time::new(2.0));
        assert!(Time::new(-1.0) < Time::ZERO);
        assert_eq!(Time::new(1.0).max(Time::new(2.0)), Time::new(2.0));
    }

    #[test]
    fn negative_zero_normalized() {
        assert_eq!(Time::new(-0.0), Time::ZERO);
        assert_eq!(Time::new(-0.0).value().to_bits(), 0.0f64.to_bits());
    }

    // ── Constructor contract ─────────────────────────────────

    #[test]
    #[should_panic(expected = "NaN")]
    fn nan_rejected() {
        let _ = Time::new(f64::NAN);
    }

    #[test]
    #[should_panic(expected = "negative infinity")]
    fn negative_infinity_rejected() {
        let _ = Time::new(f64::NEG_INFINITY);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Time::new(2.5).to_string(), "2.5");
        assert_eq!(Time::INFINITY.to_string(), "∞");
    }
}
