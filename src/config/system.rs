//! Focuser configuration - root configuration structure.

use serde::Deserialize;

use super::motion::MotionConfig;
use super::timing::TimingParameters;
use super::wiring::WiringConfig;

/// Root configuration structure from TOML.
///
/// Every table is optional; missing values take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FocuserConfig {
    /// State machine delays.
    pub timing: TimingParameters,

    /// Absolute move and homing behaviour.
    pub motion: MotionConfig,

    /// Pin polarities.
    pub wiring: WiringConfig,
}
