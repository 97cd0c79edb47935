//! Property tests for profiled motion.

use proptest::prelude::*;

use stepper_accel::{Clock, StepperMotor};

struct SteppingClock(u32);

impl Clock for SteppingClock {
    fn now_us(&mut self) -> u32 {
        self.0 = self.0.wrapping_add(100_000_000);
        self.0
    }
}

/// Generous bound on polls for any move in the tested ranges.
const POLL_LIMIT: usize = 200_000;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn moves_terminate_at_target_within_speed_limit(
        acceleration in 1.0f32..5000.0,
        max_speed in 1.0f32..5000.0,
        targets in prop::collection::vec(-3000i64..3000, 1..4),
    ) {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_acceleration(acceleration).unwrap();
        motor.set_max_speed(max_speed).unwrap();

        for target in targets {
            motor.move_to(target);
            let mut polls = 0;
            while motor.poll_profiled().unwrap() {
                prop_assert!(motor.speed().abs() <= max_speed * 1.0001);
                polls += 1;
                prop_assert!(polls < POLL_LIMIT, "no arrival at {}", target);
            }
            prop_assert_eq!(motor.current_position(), target);
            prop_assert_eq!(motor.speed(), 0.0);
        }
    }

    #[test]
    fn retargeting_mid_move_still_arrives(
        first in -2000i64..2000,
        second in -2000i64..2000,
        steps_before in 0usize..300,
    ) {
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_acceleration(800.0).unwrap();
        motor.set_max_speed(600.0).unwrap();

        motor.move_to(first);
        for _ in 0..steps_before {
            motor.poll_profiled().unwrap();
        }
        motor.move_to(second);

        let mut polls = 0;
        while motor.poll_profiled().unwrap() {
            polls += 1;
            prop_assert!(polls < POLL_LIMIT);
        }
        prop_assert_eq!(motor.current_position(), second);
    }

    #[test]
    fn constant_speed_steps_match_sign(speed in -1000.0f32..1000.0, count in 1usize..50) {
        prop_assume!(speed.abs() >= 1.0);
        let mut motor = StepperMotor::functional(|| {}, || {}, SteppingClock(0));
        motor.set_max_speed(1000.0).unwrap();
        motor.set_speed(speed);

        for _ in 0..count {
            prop_assert!(motor.poll_constant_speed().unwrap());
        }
        let expected = if speed > 0.0 { count as i64 } else { -(count as i64) };
        prop_assert_eq!(motor.current_position(), expected);
    }
}
