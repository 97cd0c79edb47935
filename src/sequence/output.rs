//! Step outputs: pin sequencing and functional callbacks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{ConfigError, MotorError, Result};
use crate::motion::Direction;

use super::Interface;

/// Pin-level output primitive.
///
/// Pins must already be configured as outputs.
pub trait PinDriver {
    /// Drive `pin` to `level`.
    fn write(&mut self, pin: u8, level: PinState) -> Result<()>;
}

/// Uniformly typed pins (degraded HAL pins, mocks) addressed by array index.
impl<P: OutputPin, const N: usize> PinDriver for [P; N] {
    fn write(&mut self, pin: u8, level: PinState) -> Result<()> {
        self.get_mut(pin as usize)
            .ok_or(MotorError::UnknownPin(pin))?
            .set_state(level)
            .map_err(|_| MotorError::PinError)?;
        Ok(())
    }
}

/// Something that physically realises one step.
pub trait StepOutput {
    /// Emit the step that moved the motor to `position` in `direction`.
    fn step(&mut self, position: i64, direction: Direction) -> Result<()>;

    /// Energise the outputs.
    fn enable(&mut self) -> Result<()> {
        Ok(())
    }

    /// De-energise the outputs.
    fn disable(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Functional topology: one callback per step, no pins.
pub struct Functional<F, B> {
    forward: F,
    backward: B,
}

impl<F, B> Functional<F, B>
where
    F: FnMut(),
    B: FnMut(),
{
    /// Wrap forward and backward step callbacks.
    pub fn new(forward: F, backward: B) -> Self {
        Self { forward, backward }
    }
}

impl<F, B> StepOutput for Functional<F, B>
where
    F: FnMut(),
    B: FnMut(),
{
    fn step(&mut self, _position: i64, direction: Direction) -> Result<()> {
        match direction {
            Direction::Clockwise => (self.forward)(),
            Direction::CounterClockwise => (self.backward)(),
        }
        Ok(())
    }
}

/// Pin sequencer for the driver and coil topologies.
///
/// Generic over:
/// - `P`: pin driver that writes logical pin numbers
/// - `D`: delay provider for the driver step pulse
pub struct PhaseSequencer<P, D> {
    interface: Interface,

    driver: P,

    delay: D,

    /// Pin number per pattern slot.
    slots: [u8; 4],

    /// Inversion per pattern slot.
    inverted: [bool; 4],

    enable_pin: Option<u8>,

    enable_inverted: bool,

    /// Minimum STEP pulse width in microseconds (driver topology).
    min_pulse_width_us: u32,
}

impl<P, D> PhaseSequencer<P, D>
where
    P: PinDriver,
    D: DelayNs,
{
    /// Create a sequencer for `interface` driving `pins` (pin 1 first).
    ///
    /// # Errors
    ///
    /// Returns an error if the interface is `Functional` or the pin count
    /// does not match the interface.
    pub fn new(interface: Interface, driver: P, delay: D, pins: &[u8]) -> Result<Self> {
        if interface == Interface::Functional {
            return Err(ConfigError::UnsupportedInterface(interface.name()).into());
        }
        if pins.len() != interface.pin_count() {
            return Err(ConfigError::PinCountMismatch {
                interface: interface.name(),
                expected: interface.pin_count(),
                found: pins.len(),
            }
            .into());
        }

        let mut slots = [0u8; 4];
        for (i, &pin) in pins.iter().enumerate() {
            slots[slot_of(interface, i)] = pin;
        }

        Ok(Self {
            interface,
            driver,
            delay,
            slots,
            inverted: [false; 4],
            enable_pin: None,
            enable_inverted: false,
            min_pulse_width_us: 1,
        })
    }

    /// Get the wiring topology.
    #[inline]
    pub fn interface(&self) -> Interface {
        self.interface
    }

    /// Get the minimum STEP pulse width in microseconds.
    #[inline]
    pub fn min_pulse_width_us(&self) -> u32 {
        self.min_pulse_width_us
    }

    /// Set the minimum STEP pulse width in microseconds.
    pub fn set_min_pulse_width(&mut self, width_us: u32) {
        self.min_pulse_width_us = width_us;
    }

    /// Use `pin` as the enable pin and drive it active straight away.
    pub fn set_enable_pin(&mut self, pin: u8) -> Result<()> {
        self.enable_pin = Some(pin);
        let level = self.enable_level(true);
        self.driver.write(pin, level)
    }

    /// Invert the STEP, DIR and enable pins of a driver board.
    pub fn set_driver_pins_inverted(&mut self, direction: bool, step: bool, enable: bool) {
        self.inverted[0] = step;
        self.inverted[1] = direction;
        self.enable_inverted = enable;
    }

    /// Invert pins in the order they were given (pin 1 first) and the enable pin.
    pub fn set_pins_inverted(&mut self, pins: [bool; 4], enable: bool) {
        for (i, invert) in pins.into_iter().enumerate() {
            self.inverted[slot_of(self.interface, i)] = invert;
        }
        self.enable_inverted = enable;
    }

    /// Release the pin driver and delay.
    pub fn release(self) -> (P, D) {
        (self.driver, self.delay)
    }

    /// Write a pattern: bit `i` drives slot `i`, inversion applied per slot.
    fn set_output_pins(&mut self, mask: u8) -> Result<()> {
        for slot in 0..self.interface.pin_count() {
            let active = mask & (1 << slot) != 0;
            let level = PinState::from(active != self.inverted[slot]);
            self.driver.write(self.slots[slot], level)?;
        }
        Ok(())
    }

    fn enable_level(&self, active: bool) -> PinState {
        PinState::from(active != self.enable_inverted)
    }

    /// STEP pulse with DIR settled first; some drivers take a rogue step otherwise.
    fn pulse(&mut self, direction: Direction) -> Result<()> {
        let dir = match direction {
            Direction::Clockwise => 0b10,
            Direction::CounterClockwise => 0b00,
        };
        self.set_output_pins(dir)?;
        self.set_output_pins(dir | 0b01)?;
        self.delay.delay_us(self.min_pulse_width_us);
        self.set_output_pins(dir)
    }
}

impl<P, D> StepOutput for PhaseSequencer<P, D>
where
    P: PinDriver,
    D: DelayNs,
{
    fn step(&mut self, position: i64, direction: Direction) -> Result<()> {
        match self.interface.pattern(position) {
            Some(mask) => self.set_output_pins(mask),
            None if self.interface == Interface::Driver => self.pulse(direction),
            None => Ok(()),
        }
    }

    fn enable(&mut self) -> Result<()> {
        let level = self.enable_level(true);
        match self.enable_pin {
            Some(pin) => self.driver.write(pin, level),
            None => Ok(()),
        }
    }

    fn disable(&mut self) -> Result<()> {
        self.set_output_pins(0)?;
        let level = self.enable_level(false);
        match self.enable_pin {
            Some(pin) => self.driver.write(pin, level),
            None => Ok(()),
        }
    }
}

/// Pattern slot of the `index`-th configured pin.
fn slot_of(interface: Interface, index: usize) -> usize {
    match index {
        0 if interface.swaps_outer_pins() => 3,
        3 if interface.swaps_outer_pins() => 0,
        _ => index,
    }
}
