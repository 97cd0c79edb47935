//! Basic motor control example.
//!
//! Builds a step/dir motor from configuration, runs an accelerated move and
//! a retargeted move, then stops a third move early.
//!
//! Uses in-memory pins so it runs without real hardware.

use stepper_accel::{MotionPhase, StdClock, StepperMotor};

/// Delay provider backed by thread sleep.
struct SleepDelay;

impl embedded_hal::delay::DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// Output pin that only remembers its level.
struct MemoryPin {
    high: bool,
}

impl MemoryPin {
    fn new() -> Self {
        Self { high: false }
    }
}

impl embedded_hal::digital::ErrorType for MemoryPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MemoryPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }
}

const CONFIG: &str = r#"
[motors.demo]
name = "demo_motor"
interface = "driver"
pins = [0, 1]
enable_pin = 2
max_speed_steps_per_sec = 2000.0
acceleration_steps_per_sec2 = 4000.0
min_pulse_width_us = 2
"#;

fn main() -> stepper_accel::Result<()> {
    println!("=== Basic Motor Control Example ===\n");

    let config = stepper_accel::parse_config(CONFIG)?;
    println!("Loaded configuration with {} motor(s)", config.motors.len());

    let mut motor = StepperMotor::builder()
        .from_config(&config, "demo")?
        .pin_driver([MemoryPin::new(), MemoryPin::new(), MemoryPin::new()])
        .delay(SleepDelay)
        .clock(StdClock::new())
        .build()?;

    println!("Motor created: {}", motor.name());
    println!(
        "Max speed {} steps/s, acceleration {} steps/s²",
        motor.max_speed(),
        motor.acceleration()
    );

    println!("\n=== Accelerated move to 2000 ===");
    motor.move_to(2000);
    let mut last_phase = MotionPhase::Idle;
    while motor.poll_profiled()? {
        if motor.phase() != last_phase {
            last_phase = motor.phase();
            println!(
                "  {:>5} steps  {:>7.1} steps/s  {:?}",
                motor.current_position(),
                motor.speed(),
                last_phase
            );
        }
    }
    println!("Arrived at {}", motor.current_position());

    println!("\n=== Retarget mid-move ===");
    motor.move_to(4000);
    while motor.current_position() < 2500 {
        motor.poll_profiled()?;
    }
    println!("At {} moving {:.1} steps/s, new target 1000", motor.current_position(), motor.speed());
    motor.move_to(1000);
    motor.run_until_arrival()?;
    println!("Arrived at {}", motor.current_position());

    println!("\n=== Stop early ===");
    motor.move_by(3000);
    while motor.phase() != MotionPhase::Cruising {
        motor.poll_profiled()?;
    }
    motor.stop();
    println!("Stopping at {} instead of 4000", motor.target_position());
    motor.run_until_arrival()?;

    motor.disable_outputs()?;
    println!("\nFinal position: {} steps", motor.current_position());
    println!("=== Example Complete ===");
    Ok(())
}
