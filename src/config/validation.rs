//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks every motor with [`validate_motor`].
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, motor) in config.motors.iter() {
        validate_motor(motor)?;
    }

    Ok(())
}

/// Validate one motor configuration.
///
/// Checks:
/// - Max speed and acceleration are positive and finite
/// - Pin count matches the interface
/// - No more inversion flags than pins
pub fn validate_motor(config: &MotorConfig) -> Result<()> {
    let max_speed = config.max_speed.0;
    if !(max_speed > 0.0 && max_speed.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed(max_speed)));
    }

    let acceleration = config.acceleration.0;
    if !(acceleration > 0.0 && acceleration.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidAcceleration(acceleration)));
    }

    let expected = config.interface.pin_count();
    if config.pins.len() != expected {
        return Err(Error::Config(ConfigError::PinCountMismatch {
            interface: config.interface.name(),
            expected,
            found: config.pins.len(),
        }));
    }

    if config.invert_pins.len() > config.pins.len() {
        return Err(Error::Config(ConfigError::TooManyInversions {
            flags: config.invert_pins.len(),
            pins: config.pins.len(),
        }));
    }

    Ok(())
}
