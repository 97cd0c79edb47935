//! Configuration loading and validation through the public API.

use stepper_accel::config::{load_config, parse_config, validate_config, SystemConfig};
use stepper_accel::error::{ConfigError, Error};
use stepper_accel::Interface;

const BENCH_CONFIG: &str = r#"
[motors.x_axis]
name = "X Axis"
interface = "driver"
pins = [0, 1]
enable_pin = 4
max_speed_steps_per_sec = 800.0
acceleration_steps_per_sec2 = 400.0
min_pulse_width_us = 2

[motors.turret]
name = "Turret"
interface = "half4wire"
pins = [8, 9, 10, 11]
invert_pins = [false, true]
max_speed_steps_per_sec = 300.0
acceleration_steps_per_sec2 = 150.0
"#;

#[test]
fn test_parse_bench_config() {
    let config = parse_config(BENCH_CONFIG).expect("bench config should parse");

    let names: Vec<_> = config.motor_names().collect();
    assert_eq!(names, ["x_axis", "turret"]);

    let x = config.motor("x_axis").unwrap();
    assert_eq!(x.name.as_str(), "X Axis");
    assert_eq!(x.interface, Interface::Driver);
    assert_eq!(x.enable_pin, Some(4));
    assert_eq!(x.min_pulse_width_us, 2);
    assert_eq!(x.min_step_interval_us(), Some(1250));

    let turret = config.motor("turret").unwrap();
    assert_eq!(turret.interface, Interface::Half4Wire);
    assert_eq!(turret.inversion_mask(), [false, true, false, false]);
    assert!(!turret.invert_enable);
}

#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stepper-accel-{}.toml", std::process::id()));
    std::fs::write(&path, BENCH_CONFIG).unwrap();

    let config = load_config(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.unwrap().motors.len(), 2);
}

#[test]
fn test_unknown_interface_is_a_parse_error() {
    let toml = r#"
[motors.m]
name = "M"
interface = "full5wire"
pins = [0, 1, 2, 3, 4]
max_speed_steps_per_sec = 10.0
acceleration_steps_per_sec2 = 10.0
"#;

    assert!(matches!(
        parse_config(toml),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

#[test]
fn test_validation_rejects_zero_acceleration() {
    let toml = r#"
[motors.m]
name = "M"
interface = "full2wire"
pins = [0, 1]
max_speed_steps_per_sec = 10.0
acceleration_steps_per_sec2 = 0.0
"#;

    // Deserialisation alone accepts it; validation does not.
    let config: SystemConfig = toml::from_str(toml).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAcceleration(_)))
    ));
    assert!(parse_config(toml).is_err());
}

#[test]
fn test_validation_rejects_extra_inversion_flags() {
    let toml = r#"
[motors.m]
name = "M"
interface = "full3wire"
pins = [0, 1, 2]
invert_pins = [true, true, true, true]
max_speed_steps_per_sec = 10.0
acceleration_steps_per_sec2 = 10.0
"#;

    assert!(matches!(
        parse_config(toml),
        Err(Error::Config(ConfigError::TooManyInversions { flags: 4, pins: 3 }))
    ));
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = parse_config(
        r#"
[motors.m]
name = "M"
interface = "driver"
pins = [0]
max_speed_steps_per_sec = 10.0
acceleration_steps_per_sec2 = 10.0
"#,
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("driver"), "{}", message);
}
