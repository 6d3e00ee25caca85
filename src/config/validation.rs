//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{FocuserConfig, MotionConfig, TimingParameters};

/// Validate a focuser configuration.
///
/// Checks:
/// - Step pulses are at least one tick wide
/// - Homing has a non-zero travel budget
pub fn validate_config(config: &FocuserConfig) -> Result<()> {
    validate_timing(&config.timing)?;
    validate_motion(&config.motion)?;
    Ok(())
}

/// Validate timing parameters on their own.
pub fn validate_timing(timing: &TimingParameters) -> Result<()> {
    // A zero-width pulse would assert and release STEP in the same tick
    if timing.pulse_width.is_zero() {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(
            timing.pulse_width.value(),
        )));
    }
    Ok(())
}

fn validate_motion(motion: &MotionConfig) -> Result<()> {
    if motion.home_seek_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidHomeSeekSteps(
            motion.home_seek_steps,
        )));
    }
    Ok(())
}
