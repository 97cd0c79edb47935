//! Motor module for stepper-accel.
//!
//! Provides the polled stepper motor driver, its builder and position tracking.

mod builder;
mod clock;
mod driver;
mod position;

pub use builder::StepperMotorBuilder;
pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use driver::StepperMotor;
pub use position::Position;
