//! Unit types for motion quantities.
//!
//! Type-safe step-rate values used by configuration so a speed cannot be
//! passed where an acceleration is expected.

use serde::Deserialize;

/// Speed in steps per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSec(pub f32);

impl StepsPerSec {
    /// Create a new StepsPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Step interval in microseconds at this speed, `None` when stopped.
    ///
    /// Never `Some(0)`: speeds above one million steps/sec round up to 1us.
    #[inline]
    pub fn interval_us(self) -> Option<u32> {
        if self.0 == 0.0 {
            None
        } else {
            Some((libm::fabsf(1_000_000.0 / self.0) as u32).max(1))
        }
    }
}

/// Acceleration in steps per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub f32);

impl StepsPerSecSquared {
    /// Create a new StepsPerSecSquared value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Steps needed to stop from `speed`, from `v² / 2a`, rounded up.
    #[inline]
    pub fn stopping_distance(self, speed: StepsPerSec) -> i64 {
        (speed.0 * speed.0 / (2.0 * self.0)) as i64 + 1
    }
}
