//! Motion profile planner.
//!
//! Recomputes the interval until the next step from the current speed, the
//! acceleration limit and the signed distance still to go. Successive calls
//! trace a trapezoidal velocity profile using the recurrence
//!
//! ```text
//! c[n] = c[n-1] - 2 * c[n-1] / (4 * n + 1)
//! ```
//!
//! which needs one division per step and no square roots. `n` counts steps
//! since the last zero-velocity point; it is negative while decelerating.

use libm::{fabsf, sqrtf};

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::error::{MotionError, Result};

/// Microseconds per second, the unit conversion between intervals and speeds.
const MICROS_PER_SEC: f32 = 1_000_000.0;

/// Correction applied to the first-step interval of a profile segment.
const BASE_INTERVAL_CORRECTION: f32 = 0.676;

/// Divisor used by [`Planner::recompute`] to decide when to start braking.
///
/// The physical stopping distance is `v² / 2a`. The recurrence decides with
/// `v² / 20a`, which starts deceleration later; changing it moves where every
/// profile comes to rest.
pub const STOP_TRIGGER_DIVISOR: f32 = 20.0;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (position increases).
    Clockwise,
    /// Counter-clockwise (position decreases).
    CounterClockwise,
}

impl Direction {
    /// Direction required to cover a signed distance.
    ///
    /// Zero maps to counter-clockwise.
    #[inline]
    pub fn from_distance(distance: i64) -> Self {
        if distance > 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Current phase of the motion profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Stopped, no step pending.
    Idle,
    /// Speeding up toward the max speed.
    Accelerating,
    /// Moving at the speed cap, or at a fixed speed set directly.
    Cruising,
    /// Slowing down toward a stop.
    Decelerating,
}

/// Planner state for one motor.
#[derive(Debug, Clone)]
pub struct Planner {
    /// Signed speed in steps/sec (negative is counter-clockwise).
    speed: f32,

    /// Speed cap in steps/sec.
    max_speed: f32,

    /// Acceleration in steps/sec².
    acceleration: f32,

    /// Direction of the current profile segment.
    direction: Direction,

    /// Microseconds until the next step, 0 when stopped.
    step_interval_us: u32,

    /// Steps since the last zero-velocity point, negative while decelerating.
    step_index: i64,

    /// First-step interval of a segment in microseconds, from the acceleration.
    base_interval: f32,

    /// Interval of the most recent step in microseconds.
    current_interval: f32,

    /// Interval floor in microseconds, from the max speed.
    min_interval: f32,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Create a stopped planner with acceleration 1 step/sec² and max speed 1 step/sec.
    pub fn new() -> Self {
        let acceleration = 1.0;
        let max_speed = 1.0;
        Self {
            speed: 0.0,
            max_speed,
            acceleration,
            direction: Direction::CounterClockwise,
            step_interval_us: 0,
            step_index: 0,
            base_interval: base_interval_for(acceleration),
            current_interval: 0.0,
            min_interval: MICROS_PER_SEC / max_speed,
        }
    }

    /// Signed speed in steps/sec.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed cap in steps/sec.
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps/sec².
    #[inline]
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Direction of the current profile segment.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Microseconds until the next step, 0 when no step is pending.
    #[inline]
    pub fn step_interval_us(&self) -> u32 {
        self.step_interval_us
    }

    /// Signed step index within the current profile segment.
    #[inline]
    pub fn step_index(&self) -> i64 {
        self.step_index
    }

    /// Current phase of the profile.
    pub fn phase(&self) -> MotionPhase {
        if self.step_interval_us == 0 {
            MotionPhase::Idle
        } else if self.step_index < 0 {
            MotionPhase::Decelerating
        } else if self.step_index == 0 || self.current_interval <= self.min_interval {
            MotionPhase::Cruising
        } else {
            MotionPhase::Accelerating
        }
    }

    /// Steps needed to brake to a standstill from the current speed, rounded up.
    pub fn stopping_distance(&self) -> i64 {
        StepsPerSecSquared(self.acceleration).stopping_distance(StepsPerSec(self.speed))
    }

    /// Recompute the next step interval and speed for a signed distance to go.
    ///
    /// Returns the new interval in microseconds (0 once the target is reached
    /// and the motor is slow enough to halt).
    pub fn recompute(&mut self, distance_to_go: i64) -> u32 {
        let steps_to_stop =
            (self.speed * self.speed / (STOP_TRIGGER_DIVISOR * self.acceleration)) as i64;

        if distance_to_go == 0 && steps_to_stop <= 1 {
            self.halt();
            return self.step_interval_us;
        }

        if distance_to_go > 0 {
            self.choose_phase(distance_to_go, steps_to_stop, Direction::Clockwise);
        } else if distance_to_go < 0 {
            self.choose_phase(-distance_to_go, steps_to_stop, Direction::CounterClockwise);
        }

        if self.step_index == 0 {
            // First step of a segment: seed from rest, then walk the recurrence
            // forward until it catches up with any speed already in hand.
            self.current_interval = self.base_interval;
            if self.speed > 0.0 {
                while MICROS_PER_SEC / self.current_interval < self.speed {
                    self.step_index += 1;
                    self.advance_interval();
                }
            }
            self.direction = Direction::from_distance(distance_to_go);
        } else {
            self.advance_interval();
        }
        self.current_interval = self.current_interval.max(self.min_interval);

        self.step_index += 1;
        // Sub-microsecond intervals still step, at one per tick.
        self.step_interval_us = (self.current_interval as u32).max(1);
        self.speed = MICROS_PER_SEC / self.current_interval;
        if self.direction == Direction::CounterClockwise {
            self.speed = -self.speed;
        }
        self.step_interval_us
    }

    /// Flip between accelerating and decelerating for a move that needs `required`.
    fn choose_phase(&mut self, remaining: i64, steps_to_stop: i64, required: Direction) {
        if self.step_index > 0 {
            // Braking now, either to land on the target or to turn around.
            if steps_to_stop >= remaining || self.direction != required {
                self.step_index = -steps_to_stop;
            }
        } else if self.step_index < 0 && steps_to_stop < remaining && self.direction == required {
            self.step_index = -self.step_index;
        }
    }

    fn advance_interval(&mut self) {
        let n = self.step_index as f32;
        self.current_interval -= (2.0 * self.current_interval) / (4.0 * n + 1.0);
    }

    fn halt(&mut self) {
        self.step_interval_us = 0;
        self.speed = 0.0;
        self.step_index = 0;
    }

    /// Set a constant speed in steps/sec, bypassing the profile.
    ///
    /// The speed is clamped to `[-max_speed, max_speed]`; the sign selects the direction.
    pub fn set_speed(&mut self, speed: f32) {
        if speed == self.speed {
            return;
        }
        let speed = speed.clamp(-self.max_speed, self.max_speed);
        self.step_interval_us = StepsPerSec(speed).interval_us().unwrap_or(0);
        if speed > 0.0 {
            self.direction = Direction::Clockwise;
        } else if speed < 0.0 {
            self.direction = Direction::CounterClockwise;
        }
        self.speed = speed;
        self.step_index = 0;
    }

    /// Set the speed cap in steps/sec. The sign is ignored.
    ///
    /// While accelerating or cruising the step index is re-derived from the
    /// current speed and the next interval is recomputed immediately.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidMaxSpeed` for zero or non-finite values.
    pub fn set_max_speed(&mut self, max_speed: f32, distance_to_go: i64) -> Result<()> {
        let max_speed = fabsf(max_speed);
        if max_speed == 0.0 || !max_speed.is_finite() {
            return Err(MotionError::InvalidMaxSpeed(max_speed).into());
        }
        if self.max_speed != max_speed {
            self.max_speed = max_speed;
            self.min_interval = MICROS_PER_SEC / max_speed;
            if self.step_index > 0 {
                self.step_index = (self.speed * self.speed / (2.0 * self.acceleration)) as i64;
                self.recompute(distance_to_go);
            }
        }
        Ok(())
    }

    /// Set the acceleration in steps/sec². The sign is ignored.
    ///
    /// The step index is rescaled to the new rate and the next interval is
    /// recomputed immediately.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidAcceleration` for zero or non-finite values;
    /// the previous acceleration remains in force.
    pub fn set_acceleration(&mut self, acceleration: f32, distance_to_go: i64) -> Result<()> {
        let acceleration = fabsf(acceleration);
        if acceleration == 0.0 || !acceleration.is_finite() {
            return Err(MotionError::InvalidAcceleration(acceleration).into());
        }
        if self.acceleration != acceleration {
            self.step_index = (self.step_index as f32 * (self.acceleration / acceleration)) as i64;
            self.base_interval = base_interval_for(acceleration);
            self.acceleration = acceleration;
            self.recompute(distance_to_go);
        }
        Ok(())
    }

    /// Point constant-speed stepping in `direction` without touching the speed.
    pub(crate) fn face(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Drop all motion: speed, pending interval and step index return to zero.
    pub fn reset(&mut self) {
        self.halt();
    }
}

/// First-step interval in microseconds for an acceleration in steps/sec².
fn base_interval_for(acceleration: f32) -> f32 {
    BASE_INTERVAL_CORRECTION * sqrtf(2.0 / acceleration) * MICROS_PER_SEC
}
