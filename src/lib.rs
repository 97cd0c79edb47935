//! # stepper-accel
//!
//! Polled stepper motor control with acceleration-limited motion profiles and
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Acceleration profiles**: Step intervals recomputed after every step, so
//!   targets can change mid-move without losing position
//! - **Polled execution**: No timers or interrupts; call `poll_profiled` from the main loop
//! - **Wiring topologies**: Step/dir driver boards, 2/3/4-wire full step, 3/4-wire
//!   half step, or caller-supplied step callbacks
//! - **embedded-hal 1.0**: Uses `OutputPin` for coil/driver pins, `DelayNs` for the step pulse
//! - **no_std compatible**: Core library works without standard library
//! - **Configuration-driven**: Optionally describe motors in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_accel::{Interface, StepperMotor, StepsPerSec, StepsPerSecSquared};
//!
//! let mut motor = StepperMotor::builder()
//!     .interface(Interface::Driver)
//!     .pin_driver([step_pin, dir_pin])
//!     .pins(&[0, 1])
//!     .delay(delay)
//!     .clock(clock)
//!     .max_speed(StepsPerSec(800.0))
//!     .acceleration(StepsPerSecSquared(400.0))
//!     .build()?;
//!
//! motor.move_to(3200);
//! while motor.poll_profiled()? {
//!     // other work
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `StdClock`
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod sequence;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPhase, Planner};
pub use motor::{Clock, Position, StepperMotor, StepperMotorBuilder};
pub use sequence::{Functional, Interface, PhaseSequencer, PinDriver, StepOutput};

#[cfg(feature = "std")]
pub use motor::StdClock;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{StepsPerSec, StepsPerSecSquared};
