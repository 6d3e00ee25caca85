//! Builder pattern for Focuser.

use crate::config::{validate_config, FocuserConfig, MotionConfig, TimingParameters};
use crate::error::{ConfigError, Error, Result};
use crate::hardware::HardwareInterface;

use super::driver::Focuser;

/// Builder for creating Focuser instances.
pub struct FocuserBuilder<H>
where
    H: HardwareInterface,
{
    hardware: Option<H>,
    timing: TimingParameters,
    motion: MotionConfig,
}

impl<H> Default for FocuserBuilder<H>
where
    H: HardwareInterface,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<H> FocuserBuilder<H>
where
    H: HardwareInterface,
{
    /// Create a new builder with default timing and motion settings.
    pub fn new() -> Self {
        Self {
            hardware: None,
            timing: TimingParameters::default(),
            motion: MotionConfig::default(),
        }
    }

    /// Set the hardware.
    pub fn hardware(mut self, hardware: H) -> Self {
        self.hardware = Some(hardware);
        self
    }

    /// Set the timing parameters.
    pub fn timing(mut self, timing: TimingParameters) -> Self {
        self.timing = timing;
        self
    }

    /// Set the motion settings.
    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Set how far below a lower target an absolute move turns around.
    pub fn backlash_approach_steps(mut self, steps: u32) -> Self {
        self.motion.backlash_approach_steps = steps;
        self
    }

    /// Set the most steps a homing seek may travel.
    pub fn home_seek_steps(mut self, steps: u32) -> Self {
        self.motion.home_seek_steps = steps;
        self
    }

    /// Take timing and motion settings from a loaded configuration.
    pub fn from_config(mut self, config: &FocuserConfig) -> Self {
        self.timing = config.timing;
        self.motion = config.motion;
        self
    }

    /// Build the Focuser.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware is missing, the settings are
    /// invalid, or the pins cannot be configured.
    pub fn build(self) -> Result<Focuser<H>> {
        let hardware = self
            .hardware
            .ok_or(Error::Config(ConfigError::MissingField("hardware")))?;

        let config = FocuserConfig {
            timing: self.timing,
            motion: self.motion,
            ..FocuserConfig::default()
        };
        validate_config(&config)?;

        Focuser::assemble(hardware, self.timing, self.motion)
    }
}
