//! Motor configuration from TOML.

use heapless::{String, Vec};
use serde::Deserialize;

use super::units::{StepsPerSec, StepsPerSecSquared};
use crate::sequence::Interface;

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Wiring topology.
    pub interface: Interface,

    /// Pin numbers in wiring order (pin 1 first); empty for functional motors.
    #[serde(default)]
    pub pins: Vec<u8, 4>,

    /// Optional enable pin, driven active when outputs are enabled.
    #[serde(default)]
    pub enable_pin: Option<u8>,

    /// Maximum speed in steps per second.
    #[serde(rename = "max_speed_steps_per_sec")]
    pub max_speed: StepsPerSec,

    /// Acceleration and deceleration in steps per second squared.
    #[serde(rename = "acceleration_steps_per_sec2")]
    pub acceleration: StepsPerSecSquared,

    /// Minimum STEP pulse width in microseconds (driver interface).
    #[serde(default = "default_min_pulse_width")]
    pub min_pulse_width_us: u32,

    /// Per-pin inversion flags, in the same order as `pins`.
    #[serde(default)]
    pub invert_pins: Vec<bool, 4>,

    /// Invert enable pin logic.
    #[serde(default)]
    pub invert_enable: bool,
}

fn default_min_pulse_width() -> u32 {
    1
}

impl MotorConfig {
    /// Inversion flags padded to all four pin positions.
    pub fn inversion_mask(&self) -> [bool; 4] {
        let mut mask = [false; 4];
        for (slot, &invert) in mask.iter_mut().zip(self.invert_pins.iter()) {
            *slot = invert;
        }
        mask
    }

    /// Shortest step interval in microseconds, reached at max speed.
    pub fn min_step_interval_us(&self) -> Option<u32> {
        self.max_speed.interval_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> MotorConfig {
        MotorConfig {
            name: String::try_from("test").unwrap(),
            interface: Interface::Full4Wire,
            pins: Vec::from_slice(&[0, 1, 2, 3]).unwrap(),
            enable_pin: None,
            max_speed: StepsPerSec(400.0),
            acceleration: StepsPerSecSquared(200.0),
            min_pulse_width_us: 1,
            invert_pins: Vec::from_slice(&[true, false]).unwrap(),
            invert_enable: false,
        }
    }

    #[test]
    fn test_inversion_mask_pads() {
        let config = make_test_config();
        assert_eq!(config.inversion_mask(), [true, false, false, false]);
    }

    #[test]
    fn test_min_step_interval() {
        let config = make_test_config();
        assert_eq!(config.min_step_interval_us(), Some(2500));
    }
}
