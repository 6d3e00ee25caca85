//! Motion behaviour settings.

use serde::Deserialize;

/// How absolute moves and homing are planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Extra reverse travel taken before approaching a lower target, so
    /// every absolute move finishes travelling forward.
    pub backlash_approach_steps: u32,

    /// Maximum reverse travel while searching for the home switch.
    pub home_seek_steps: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            backlash_approach_steps: 500,
            home_seek_steps: 100_000,
        }
    }
}
