//! Motion module for stepper-accel.
//!
//! Provides the step-interval planner behind acceleration-limited moves.

mod planner;

pub use planner::{Direction, MotionPhase, Planner, STOP_TRIGGER_DIVISOR};
