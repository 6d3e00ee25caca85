//! Unit tests for TOML configuration parsing.

use std::io::Write;

use stepper_focuser::config::{load_config, parse_config, FocuserConfig};
use stepper_focuser::hardware::Polarity;
use stepper_focuser::Millis;

const BOARD_CONFIG: &str = r#"
[timing]
pulse_width_ms = 2
dir_settle_ms = 1
motor_settle_ms = 3
inter_step_ms = 1
home_debounce_ms = 1

[motion]
backlash_approach_steps = 250
home_seek_steps = 40000

[wiring]
step = "active_high"
dir = "active_low"
motor_enable = "active_low"
home = "active_high"
"#;

/// Test parsing a complete board configuration.
#[test]
fn test_parse_full_config() {
    let config: FocuserConfig = toml::from_str(BOARD_CONFIG).expect("Failed to parse TOML");

    assert_eq!(config.timing.pulse_width, Millis::new(2));
    assert_eq!(config.timing.dir_settle, Millis::new(1));
    assert_eq!(config.timing.motor_settle, Millis::new(3));
    assert_eq!(config.timing.inter_step, Millis::new(1));
    assert_eq!(config.timing.home_debounce, Millis::new(1));
    assert_eq!(config.motion.backlash_approach_steps, 250);
    assert_eq!(config.motion.home_seek_steps, 40_000);
    assert_eq!(config.wiring.dir, Polarity::ActiveLow);
    assert_eq!(config.wiring.home, Polarity::ActiveHigh);
}

/// Test that missing tables fall back to defaults.
#[test]
fn test_partial_config_uses_defaults() {
    let config = parse_config("[timing]\nmotor_settle_ms = 250\n").expect("Failed to parse");

    let defaults = FocuserConfig::default();
    assert_eq!(config.timing.motor_settle, Millis::new(250));
    assert_eq!(config.timing.pulse_width, defaults.timing.pulse_width);
    assert_eq!(config.motion, defaults.motion);
    assert_eq!(config.wiring, defaults.wiring);
}

/// Test that an unknown polarity is a parse error.
#[test]
fn test_unknown_polarity_rejected() {
    let result = parse_config("[wiring]\nstep = \"sideways\"\n");
    assert!(result.is_err());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stepper-focuser-{}.toml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).expect("Failed to create temp file");
        file.write_all(BOARD_CONFIG.as_bytes()).expect("Failed to write temp file");
    }

    let config = load_config(&path).expect("Failed to load config");
    std::fs::remove_file(&path).ok();

    assert_eq!(config.motion.backlash_approach_steps, 250);
    assert_eq!(config.wiring.dir, Polarity::ActiveLow);
}
