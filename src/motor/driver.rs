//! Stepper motor driver.
//!
//! Polled step timing on top of the [`Planner`]. Call [`StepperMotor::poll_profiled`]
//! (or [`StepperMotor::poll_constant_speed`]) from the main loop at least as often as
//! the shortest step interval; each poll emits at most one step.

use embedded_hal::delay::DelayNs;

use crate::error::Result;
use crate::motion::{Direction, MotionPhase, Planner};
use crate::sequence::{Functional, PhaseSequencer, PinDriver, StepOutput};

use super::builder::StepperMotorBuilder;
use super::clock::Clock;
use super::position::Position;

/// Stepper motor with an acceleration-limited motion profile.
///
/// Generic over:
/// - `O`: step output (pin sequencer or functional callbacks)
/// - `C`: microsecond clock
pub struct StepperMotor<O, C> {
    /// Step output.
    output: O,

    /// Time source for step timing.
    clock: C,

    /// Current and target position.
    position: Position,

    /// Interval planner.
    planner: Planner,

    /// Timestamp of the last emitted step.
    last_step_us: u32,

    /// Motor name for logging/debugging.
    name: heapless::String<32>,
}

impl<F, B, C> StepperMotor<Functional<F, B>, C>
where
    F: FnMut(),
    B: FnMut(),
    C: Clock,
{
    /// Create a motor that calls `forward` or `backward` once per step.
    pub fn functional(forward: F, backward: B, clock: C) -> Self {
        Self::new(Functional::new(forward, backward), clock)
    }
}

impl<O, C> StepperMotor<O, C>
where
    O: StepOutput,
    C: Clock,
{
    /// Create a stopped motor at position 0 with max speed and acceleration of 1.
    pub fn new(output: O, clock: C) -> Self {
        Self {
            output,
            clock,
            position: Position::new(),
            planner: Planner::new(),
            last_step_us: 0,
            name: heapless::String::try_from("motor").unwrap_or_default(),
        }
    }

    pub(crate) fn with_name(mut self, name: heapless::String<32>) -> Self {
        self.name = name;
        self
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Set an absolute target position.
    ///
    /// The next interval is replanned immediately, so a move can be redirected
    /// at any point of a profile.
    pub fn move_to(&mut self, absolute: i64) {
        if self.position.set_target(absolute) {
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: target {} from {}", self.name.as_str(), absolute, self.position.current());
            self.planner.recompute(self.position.distance_to_go());
        }
    }

    /// Set a target relative to the current position.
    pub fn move_by(&mut self, relative: i64) {
        self.move_to(self.position.current() + relative);
    }

    /// Emit a step if the current interval has elapsed, without replanning.
    ///
    /// Returns `true` if a step occurred.
    pub fn poll_constant_speed(&mut self) -> Result<bool> {
        let interval = self.planner.step_interval_us();
        if interval == 0 {
            return Ok(false);
        }

        let now = self.clock.now_us();
        if now.wrapping_sub(self.last_step_us) < interval {
            return Ok(false);
        }

        let direction = self.planner.direction();
        let position = self.position.advance(direction.sign());
        self.output.step(position, direction)?;
        // Time spent in the output is not subtracted from the next interval.
        self.last_step_us = now;
        Ok(true)
    }

    /// Emit a due step and plan the next one.
    ///
    /// Returns `true` while the motor is moving or has distance to go.
    pub fn poll_profiled(&mut self) -> Result<bool> {
        if self.poll_constant_speed()? {
            #[cfg(feature = "defmt")]
            defmt::trace!("{}: step to {}", self.name.as_str(), self.position.current());
            self.planner.recompute(self.position.distance_to_go());
        }
        Ok(self.planner.speed() != 0.0 || self.position.distance_to_go() != 0)
    }

    /// Poll until the target is reached and the motor has stopped (blocking).
    pub fn run_until_arrival(&mut self) -> Result<()> {
        self.run_until_arrival_with(|| {})
    }

    /// Poll until arrival, calling `housekeeping` between polls (blocking).
    pub fn run_until_arrival_with<H>(&mut self, mut housekeeping: H) -> Result<()>
    where
        H: FnMut(),
    {
        while self.poll_profiled()? {
            housekeeping();
        }
        Ok(())
    }

    /// Move to `position` and block until arrival.
    pub fn run_until_arrival_at(&mut self, position: i64) -> Result<()> {
        self.move_to(position);
        self.run_until_arrival()
    }

    /// Step at the constant speed toward the target.
    ///
    /// Returns `true` if a step occurred; never steps once at the target.
    pub fn run_speed_to_position(&mut self) -> Result<bool> {
        let distance = self.position.distance_to_go();
        if distance == 0 {
            return Ok(false);
        }
        self.planner.face(Direction::from_distance(distance));
        self.poll_constant_speed()
    }

    /// Brake to a standstill as quickly as the acceleration allows.
    ///
    /// Retargets to the nearest position the motor can stop at.
    pub fn stop(&mut self) {
        let speed = self.planner.speed();
        if speed != 0.0 {
            let steps = self.planner.stopping_distance();
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: stop within {} steps", self.name.as_str(), steps);
            self.move_by(if speed > 0.0 { steps } else { -steps });
        }
    }

    /// Emit one clockwise step now, regardless of timing.
    pub fn step_forward(&mut self) -> Result<i64> {
        self.step_now(Direction::Clockwise)
    }

    /// Emit one counter-clockwise step now, regardless of timing.
    pub fn step_backward(&mut self) -> Result<i64> {
        self.step_now(Direction::CounterClockwise)
    }

    fn step_now(&mut self, direction: Direction) -> Result<i64> {
        let position = self.position.advance(direction.sign());
        self.output.step(position, direction)?;
        self.last_step_us = self.clock.now_us();
        Ok(position)
    }

    /// Set a constant speed in steps/sec for [`Self::poll_constant_speed`].
    ///
    /// Clamped to `[-max_speed, max_speed]`; bypasses the profile.
    pub fn set_speed(&mut self, speed: f32) {
        self.planner.set_speed(speed);
    }

    /// Set the maximum speed in steps/sec.
    ///
    /// # Errors
    ///
    /// Rejects zero and non-finite values; the previous max speed stays in force.
    pub fn set_max_speed(&mut self, max_speed: f32) -> Result<()> {
        self.planner
            .set_max_speed(max_speed, self.position.distance_to_go())
    }

    /// Set the acceleration and deceleration rate in steps/sec².
    ///
    /// # Errors
    ///
    /// Rejects zero and non-finite values; the previous acceleration stays in force.
    pub fn set_acceleration(&mut self, acceleration: f32) -> Result<()> {
        self.planner
            .set_acceleration(acceleration, self.position.distance_to_go())
    }

    /// Redefine the current position, e.g. after homing.
    ///
    /// Also sets the target to `position` and drops all speed. Not meant for
    /// use mid-move: the motor stops dead.
    pub fn set_current_position(&mut self, position: i64) {
        #[cfg(feature = "defmt")]
        defmt::debug!("{}: position reset to {}", self.name.as_str(), position);
        self.position.reset(position);
        self.planner.reset();
    }

    /// Signed steps from the current position to the target.
    #[inline]
    pub fn distance_to_go(&self) -> i64 {
        self.position.distance_to_go()
    }

    /// Current position in steps.
    #[inline]
    pub fn current_position(&self) -> i64 {
        self.position.current()
    }

    /// Most recently set target position in steps.
    #[inline]
    pub fn target_position(&self) -> i64 {
        self.position.target()
    }

    /// Whether the motor is moving or has distance to go.
    #[inline]
    pub fn is_running(&self) -> bool {
        !(self.planner.speed() == 0.0 && self.position.distance_to_go() == 0)
    }

    /// Signed speed in steps/sec.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.planner.speed()
    }

    /// Maximum speed in steps/sec.
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.planner.max_speed()
    }

    /// Acceleration in steps/sec².
    #[inline]
    pub fn acceleration(&self) -> f32 {
        self.planner.acceleration()
    }

    /// Microseconds between steps at the moment, 0 when stopped.
    #[inline]
    pub fn step_interval_us(&self) -> u32 {
        self.planner.step_interval_us()
    }

    /// Direction of the current or last motion.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.planner.direction()
    }

    /// Current phase of the motion profile.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.planner.phase()
    }

    /// Energise the outputs (drives the enable pin active).
    pub fn enable_outputs(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::debug!("{}: outputs enabled", self.name.as_str());
        self.output.enable()
    }

    /// De-energise the outputs to save power; holding torque is lost.
    pub fn disable_outputs(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::debug!("{}: outputs disabled", self.name.as_str());
        self.output.disable()
    }

    /// Get the step output.
    #[inline]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get the step output mutably.
    #[inline]
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Release the step output and clock.
    pub fn release(self) -> (O, C) {
        (self.output, self.clock)
    }
}

impl<P, D, C> StepperMotor<PhaseSequencer<P, D>, C>
where
    P: PinDriver,
    D: DelayNs,
    C: Clock,
{
    /// Create a builder for a pin-driven motor.
    pub fn builder() -> StepperMotorBuilder<P, D, C> {
        StepperMotorBuilder::new()
    }

    /// Set the minimum STEP pulse width in microseconds (driver topology).
    pub fn set_min_pulse_width(&mut self, width_us: u32) {
        self.output.set_min_pulse_width(width_us);
    }

    /// Use `pin` as the enable pin; it is driven active immediately.
    pub fn set_enable_pin(&mut self, pin: u8) -> Result<()> {
        self.output.set_enable_pin(pin)
    }

    /// Invert the DIR, STEP and enable pins of a driver board.
    pub fn set_driver_pins_inverted(&mut self, direction: bool, step: bool, enable: bool) {
        self.output.set_driver_pins_inverted(direction, step, enable);
    }

    /// Invert coil pins (pin 1 first) and the enable pin.
    pub fn set_pins_inverted(&mut self, pins: [bool; 4], enable: bool) {
        self.output.set_pins_inverted(pins, enable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::Cell;

    /// Jumps far enough on every read that each poll finds a step due.
    struct SteppingClock(u32);

    impl Clock for SteppingClock {
        fn now_us(&mut self) -> u32 {
            self.0 = self.0.wrapping_add(100_000_000);
            self.0
        }
    }

    /// Never advances.
    struct FrozenClock;

    impl Clock for FrozenClock {
        fn now_us(&mut self) -> u32 {
            0
        }
    }

    #[test]
    fn test_new_motor_is_idle() {
        let motor = StepperMotor::functional(|| {}, || {}, FrozenClock);
        assert_eq!(motor.current_position(), 0);
        assert_eq!(motor.target_position(), 0);
        assert!(!motor.is_running());
        assert_eq!(motor.phase(), MotionPhase::Idle);
        assert_eq!(motor.max_speed(), 1.0);
        assert_eq!(motor.acceleration(), 1.0);
        assert_eq!(motor.name(), "motor");
    }

    #[test]
    fn test_step_waits_for_interval() {
        let mut motor = StepperMotor::functional(|| {}, || {}, FrozenClock);
        motor.move_to(5);
        assert!(motor.step_interval_us() > 0);
        assert!(!motor.poll_constant_speed().unwrap());
        assert_eq!(motor.current_position(), 0);
    }

    #[test]
    fn test_constant_speed_does_not_replan() {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_max_speed(100.0).unwrap();
        motor.set_speed(-50.0);

        for _ in 0..10 {
            assert!(motor.poll_constant_speed().unwrap());
        }
        assert_eq!(motor.current_position(), -10);
        assert_eq!(motor.step_interval_us(), 20_000);
        assert_eq!(motor.speed(), -50.0);
    }

    #[test]
    fn test_run_until_arrival_at() {
        let forward = Cell::new(0);
        let mut motor = StepperMotor::functional(
            || forward.set(forward.get() + 1),
            || {},
            SteppingClock(0),
        );
        motor.set_max_speed(200.0).unwrap();
        motor.set_acceleration(100.0).unwrap();

        motor.run_until_arrival_at(50).unwrap();

        assert_eq!(motor.current_position(), 50);
        assert!(!motor.is_running());
        drop(motor);
        assert_eq!(forward.get(), 50);
    }

    #[test]
    fn test_extreme_limits_still_arrive() {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_max_speed(5_000_000.0).unwrap();
        motor.set_acceleration(1e13).unwrap();
        motor.move_to(10);
        assert_ne!(motor.step_interval_us(), 0);

        let mut polls = 0;
        while motor.poll_profiled().unwrap() {
            polls += 1;
            assert!(polls < 1000);
        }
        assert_eq!(motor.current_position(), 10);
        assert!(!motor.is_running());
    }

    #[test]
    fn test_housekeeping_runs_between_polls() {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_max_speed(10.0).unwrap();
        motor.set_acceleration(10.0).unwrap();
        motor.move_to(10);

        let mut yields = 0;
        motor.run_until_arrival_with(|| yields += 1).unwrap();
        assert_eq!(motor.current_position(), 10);
        assert_eq!(yields, 9);
    }

    #[test]
    fn test_run_speed_to_position_stops_at_target() {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_max_speed(100.0).unwrap();
        motor.move_to(-3);
        motor.set_speed(100.0);

        while motor.run_speed_to_position().unwrap() {}
        assert_eq!(motor.current_position(), -3);
        assert!(!motor.run_speed_to_position().unwrap());
    }

    #[test]
    fn test_single_steps() {
        let backward = Cell::new(0);
        let mut motor = StepperMotor::functional(
            || {},
            || backward.set(backward.get() + 1),
            FrozenClock,
        );
        assert_eq!(motor.step_forward().unwrap(), 1);
        assert_eq!(motor.step_backward().unwrap(), 0);
        assert_eq!(motor.step_backward().unwrap(), -1);
        drop(motor);
        assert_eq!(backward.get(), 2);
    }
}
