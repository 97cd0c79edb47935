//! Error types for stepper-accel.
//!
//! Provides unified error handling across configuration, pin output, and motion parameters.
//! The profile planner itself never fails; errors come from the output path and from
//! configuration that would put the planner outside its preconditions.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-accel operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Pin output error
    Motor(MotorError),
    /// Rejected motion parameter
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Invalid max speed (must be > 0 and finite)
    InvalidMaxSpeed(f32),
    /// Invalid acceleration (must be > 0 and finite)
    InvalidAcceleration(f32),
    /// Number of configured pins does not match the interface
    PinCountMismatch {
        /// Interface name
        interface: &'static str,
        /// Pins the interface drives
        expected: usize,
        /// Pins configured
        found: usize,
    },
    /// More inversion flags than configured pins
    TooManyInversions {
        /// Inversion flags configured
        flags: usize,
        /// Pins configured
        pins: usize,
    },
    /// Interface cannot be driven through pins (functional motors take callbacks)
    UnsupportedInterface(&'static str),
    /// A required builder field was not provided
    MissingField(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Pin output errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// Pin number is not served by the pin driver
    UnknownPin(u8),
}

/// Rejected motion parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Acceleration must be non-zero and finite; the previous value stays in force
    InvalidAcceleration(f32),
    /// Max speed must be non-zero and finite; the previous value stays in force
    InvalidMaxSpeed(f32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::PinCountMismatch {
                interface,
                expected,
                found,
            } => write!(
                f,
                "Interface '{}' drives {} pins, {} configured",
                interface, expected, found
            ),
            ConfigError::TooManyInversions { flags, pins } => {
                write!(f, "{} inversion flags for {} pins", flags, pins)
            }
            ConfigError::UnsupportedInterface(name) => {
                write!(f, "Interface '{}' cannot be driven through pins", name)
            }
            ConfigError::MissingField(field) => write!(f, "{} is required", field),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::UnknownPin(pin) => write!(f, "Pin {} is not served by the pin driver", pin),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidAcceleration(v) => {
                write!(f, "Acceleration {} rejected, must be non-zero", v)
            }
            MotionError::InvalidMaxSpeed(v) => write!(f, "Max speed {} rejected, must be non-zero", v),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
