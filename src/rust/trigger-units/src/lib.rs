// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Typed quantities used by the trigger emulator.
//!
//! # Examples
//! ```rust
//! use trigger_units::{hertz, rpm};
//!
//! let rate = rpm(6000.0).to_cycle_rate(2.0);
//! assert_eq!(rate, hertz(200.0));
//! ```

use num_traits::Float;
use std::fmt::{self, Display, Formatter};

#[macro_use]
mod unit;

quantity!(Speed);
quantity!(Frequency);
quantity!(Duration);

const SECONDS_PER_MINUTE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RevolutionsPerMinute;

impl Display for RevolutionsPerMinute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "rpm")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hertz;

impl Display for Hertz {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Hz")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Seconds;

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s")
    }
}

pub const fn rpm<T>(value: T) -> Speed<RevolutionsPerMinute, T> {
    Speed {
        value,
        unit: RevolutionsPerMinute,
    }
}

pub const fn hertz<T>(value: T) -> Frequency<Hertz, T> {
    Frequency { value, unit: Hertz }
}

pub const fn seconds<T>(value: T) -> Duration<Seconds, T> {
    Duration {
        value,
        unit: Seconds,
    }
}

impl Speed<RevolutionsPerMinute> {
    /// Number of full trigger cycles per second at this speed.
    ///
    /// `multiplier` is the number of trigger cycles per crank revolution implied by the
    /// operating mode.
    pub fn to_cycle_rate(self, multiplier: f64) -> Frequency<Hertz> {
        hertz(self.value * multiplier / SECONDS_PER_MINUTE)
    }
}

impl<T: Float> Frequency<Hertz, T> {
    /// Duration of one cycle, `None` unless the rate is positive and finite.
    pub fn period(self) -> Option<Duration<Seconds, T>> {
        if self.value.is_normal() && self.value > T::zero() {
            Some(seconds(T::one() / self.value))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_rate() {
        assert_eq!(rpm(6000.0).to_cycle_rate(2.0), hertz(200.0));
        assert_eq!(rpm(600.0).to_cycle_rate(0.5), hertz(5.0));
        assert_eq!(rpm(0.0).to_cycle_rate(1.0), hertz(0.0));
    }

    #[test]
    fn test_period() {
        assert_eq!(hertz(200.0).period(), Some(seconds(0.005)));
        assert_eq!(hertz(0.0).period(), None);
        assert_eq!(hertz(f64::NAN).period(), None);
        assert_eq!(hertz(-1.0).period(), None);
        assert_eq!(hertz(f64::INFINITY).period(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", hertz(200.0)), "200.0 Hz");
        assert_eq!(format!("{}", rpm(6000.0)), "6000.0 rpm");
        assert_eq!(format!("{}", seconds(1e-6)), "1e-6 s");
        assert_eq!(format!("{:#}", seconds(0.5)), "0.5 s");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(seconds(1.0) + seconds(0.5), seconds(1.5));
        assert_eq!(seconds(1.0) - seconds(1.0), seconds(-0.0));
        assert_eq!(seconds(0.25) * 4.0, seconds(1.0));
        assert!(hertz(1.0) < hertz(2.0));
    }
}
