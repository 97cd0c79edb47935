//! Builder pattern for pin-driven StepperMotor.

use embedded_hal::delay::DelayNs;

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::sequence::{Interface, PhaseSequencer, PinDriver};

use super::clock::Clock;
use super::driver::StepperMotor;

/// Builder for creating StepperMotor instances driven through pins.
pub struct StepperMotorBuilder<P, D, C>
where
    P: PinDriver,
    D: DelayNs,
    C: Clock,
{
    pin_driver: Option<P>,
    delay: Option<D>,
    clock: Option<C>,
    name: Option<heapless::String<32>>,
    interface: Option<Interface>,
    pins: Option<heapless::Vec<u8, 4>>,
    enable_pin: Option<u8>,
    max_speed: Option<StepsPerSec>,
    acceleration: Option<StepsPerSecSquared>,
    min_pulse_width_us: u32,
    invert_pins: [bool; 4],
    invert_enable: bool,
}

impl<P, D, C> Default for StepperMotorBuilder<P, D, C>
where
    P: PinDriver,
    D: DelayNs,
    C: Clock,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, D, C> StepperMotorBuilder<P, D, C>
where
    P: PinDriver,
    D: DelayNs,
    C: Clock,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            pin_driver: None,
            delay: None,
            clock: None,
            name: None,
            interface: None,
            pins: None,
            enable_pin: None,
            max_speed: None,
            acceleration: None,
            min_pulse_width_us: 1,
            invert_pins: [false; 4],
            invert_enable: false,
        }
    }

    /// Set the pin driver.
    pub fn pin_driver(mut self, driver: P) -> Self {
        self.pin_driver = Some(driver);
        self
    }

    /// Set the delay provider used for the STEP pulse width.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the microsecond clock.
    pub fn clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the wiring topology.
    pub fn interface(mut self, interface: Interface) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Set the pin numbers in wiring order (pin 1 first, at most four).
    pub fn pins(mut self, pins: &[u8]) -> Self {
        self.pins = heapless::Vec::from_slice(pins).ok();
        self
    }

    /// Set the enable pin.
    pub fn enable_pin(mut self, pin: u8) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set maximum speed.
    pub fn max_speed(mut self, speed: StepsPerSec) -> Self {
        self.max_speed = Some(speed);
        self
    }

    /// Set acceleration.
    pub fn acceleration(mut self, acceleration: StepsPerSecSquared) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    /// Set the minimum STEP pulse width in microseconds.
    pub fn min_pulse_width_us(mut self, width_us: u32) -> Self {
        self.min_pulse_width_us = width_us;
        self
    }

    /// Set pin inversion, pin 1 first.
    pub fn invert_pins(mut self, invert: [bool; 4]) -> Self {
        self.invert_pins = invert;
        self
    }

    /// Set enable pin inversion.
    pub fn invert_enable(mut self, invert: bool) -> Self {
        self.invert_enable = invert;
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.name = Some(config.name.clone());
        self.interface = Some(config.interface);
        self.pins = Some(config.pins.clone());
        self.enable_pin = config.enable_pin;
        self.max_speed = Some(config.max_speed);
        self.acceleration = Some(config.acceleration);
        self.min_pulse_width_us = config.min_pulse_width_us;
        self.invert_pins = config.inversion_mask();
        self.invert_enable = config.invert_enable;
        self
    }

    /// Configure from SystemConfig by motor name.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.motor(motor_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_motor_config(motor_config))
    }

    /// Build the StepperMotor.
    ///
    /// Applies speed limits, inversion and the enable pin (driven active).
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, the pins do not fit the
    /// interface, a limit is rejected, or the enable pin cannot be driven.
    pub fn build(self) -> Result<StepperMotor<PhaseSequencer<P, D>, C>> {
        let interface = self
            .interface
            .ok_or(Error::Config(ConfigError::MissingField("interface")))?;
        let pin_driver = self
            .pin_driver
            .ok_or(Error::Config(ConfigError::MissingField("pin_driver")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingField("delay")))?;
        let clock = self
            .clock
            .ok_or(Error::Config(ConfigError::MissingField("clock")))?;
        let pins = self
            .pins
            .ok_or(Error::Config(ConfigError::MissingField("pins")))?;

        let mut sequencer = PhaseSequencer::new(interface, pin_driver, delay, &pins)?;
        sequencer.set_min_pulse_width(self.min_pulse_width_us);
        sequencer.set_pins_inverted(self.invert_pins, self.invert_enable);

        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("motor").unwrap_or_default());
        let mut motor = StepperMotor::new(sequencer, clock).with_name(name);

        if let Some(max_speed) = self.max_speed {
            motor.set_max_speed(max_speed.0)?;
        }
        if let Some(acceleration) = self.acceleration {
            motor.set_acceleration(acceleration.0)?;
        }
        if let Some(pin) = self.enable_pin {
            motor.set_enable_pin(pin)?;
        }

        Ok(motor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::PinState;

    #[derive(Default)]
    struct Recorder(Vec<(u8, PinState)>);

    impl PinDriver for Recorder {
        fn write(&mut self, pin: u8, level: PinState) -> Result<()> {
            self.0.push((pin, level));
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    struct ZeroClock;

    impl Clock for ZeroClock {
        fn now_us(&mut self) -> u32 {
            0
        }
    }

    fn builder() -> StepperMotorBuilder<Recorder, NoDelay, ZeroClock> {
        StepperMotorBuilder::new()
            .pin_driver(Recorder::default())
            .delay(NoDelay)
            .clock(ZeroClock)
    }

    #[test]
    fn test_build_applies_limits() {
        let motor = builder()
            .name("x")
            .interface(Interface::Driver)
            .pins(&[2, 3])
            .max_speed(StepsPerSec(300.0))
            .acceleration(StepsPerSecSquared(150.0))
            .min_pulse_width_us(5)
            .build()
            .unwrap();

        assert_eq!(motor.name(), "x");
        assert_eq!(motor.max_speed(), 300.0);
        assert_eq!(motor.acceleration(), 150.0);
        assert_eq!(motor.output().min_pulse_width_us(), 5);
        assert_eq!(motor.output().interface(), Interface::Driver);
    }

    #[test]
    fn test_build_drives_enable_pin() {
        let motor = builder()
            .interface(Interface::Full2Wire)
            .pins(&[0, 1])
            .enable_pin(9)
            .invert_enable(true)
            .build()
            .unwrap();

        let (sequencer, _) = motor.release();
        let (recorder, _) = sequencer.release();
        assert_eq!(recorder.0, [(9, PinState::Low)]);
    }

    #[test]
    fn test_missing_interface() {
        let result = builder().pins(&[0, 1]).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("interface")))
        ));
    }

    #[test]
    fn test_zero_acceleration_rejected() {
        let result = builder()
            .interface(Interface::Driver)
            .pins(&[0, 1])
            .acceleration(StepsPerSecSquared(0.0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_motor_name() {
        let result = builder().from_config(&SystemConfig::default(), "nope");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MotorNotFound(_)))
        ));
    }
}
