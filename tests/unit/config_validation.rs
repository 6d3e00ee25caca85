//! Unit tests for configuration validation.

use stepper_focuser::config::{parse_config, validate_config, FocuserConfig};
use stepper_focuser::error::{ConfigError, Error};
use stepper_focuser::hardware::SimulatedFocuser;
use stepper_focuser::{Focuser, FocuserBuilder};

/// Test validation of the default configuration.
#[test]
fn test_default_config_passes_validation() {
    assert!(validate_config(&FocuserConfig::default()).is_ok());
}

/// Test validation fails for a zero-width step pulse.
#[test]
fn test_zero_pulse_width_rejected() {
    let result = parse_config("[timing]\npulse_width_ms = 0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidPulseWidth(0)))
    ));
}

/// Test validation fails for a homing seek with no travel.
#[test]
fn test_zero_home_seek_rejected() {
    let config: FocuserConfig =
        toml::from_str("[motion]\nhome_seek_steps = 0\n").expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidHomeSeekSteps(0)))
    ));

    let result = Focuser::from_config(SimulatedFocuser::default(), &config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidHomeSeekSteps(0)))
    ));
}

/// Test that a builder configured from file settings validates them.
#[test]
fn test_builder_from_config() {
    let config = parse_config("[motion]\nbacklash_approach_steps = 10\n").expect("Failed to parse");
    let focuser = FocuserBuilder::new()
        .hardware(SimulatedFocuser::default())
        .from_config(&config)
        .build()
        .expect("Failed to build focuser");
    assert_eq!(focuser.timing(), &config.timing);
}
