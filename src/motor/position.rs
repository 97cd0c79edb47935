//! Position tracking for stepper motors.
//!
//! Holds the step-counted current and target positions.

/// Current and target position in steps.
///
/// The current position only ever moves one step at a time; stepper motors
/// are open loop, so it is the count of emitted pulses, not a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    current: i64,
    target: i64,
}

impl Position {
    /// Create a position tracker at the origin.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a position tracker at rest at `steps`.
    #[inline]
    pub fn at(steps: i64) -> Self {
        Self {
            current: steps,
            target: steps,
        }
    }

    /// Get current position in steps.
    #[inline]
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Get target position in steps.
    #[inline]
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Signed steps from the current position to the target.
    #[inline]
    pub fn distance_to_go(&self) -> i64 {
        self.target - self.current
    }

    /// Set the target. Returns `true` if it changed.
    #[inline]
    pub fn set_target(&mut self, target: i64) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }

    /// Move one step (`delta` is +1 or -1) and return the new position.
    #[inline]
    pub fn advance(&mut self, delta: i64) -> i64 {
        self.current += delta;
        self.current
    }

    /// Place both current and target at `steps`.
    #[inline]
    pub fn reset(&mut self, steps: i64) {
        *self = Self::at(steps);
    }
}
