//! Timing parameters for the focuser state machine.

use serde::Deserialize;

use super::units::Millis;

/// Every delay the state machine enforces, in logical milliseconds.
///
/// Fixed for the lifetime of a focuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingParameters {
    /// Minimum time STEP stays active.
    #[serde(rename = "pulse_width_ms")]
    pub pulse_width: Millis,

    /// Wait after changing DIR before the driver may act on it.
    #[serde(rename = "dir_settle_ms")]
    pub dir_settle: Millis,

    /// Wait after enabling the driver before the first step.
    #[serde(rename = "motor_settle_ms")]
    pub motor_settle: Millis,

    /// Wait between the end of one pulse and the start of the next.
    ///
    /// Also the settle time after the final pulse of a move.
    #[serde(rename = "inter_step_ms")]
    pub inter_step: Millis,

    /// How long HOME must stay asserted while idle before it counts.
    #[serde(rename = "home_debounce_ms")]
    pub home_debounce: Millis,
}

impl TimingParameters {
    /// Build a parameter set from raw millisecond values.
    pub const fn new(pulse_width: u32, dir_settle: u32, motor_settle: u32, inter_step: u32, home_debounce: u32) -> Self {
        Self {
            pulse_width: Millis(pulse_width),
            dir_settle: Millis(dir_settle),
            motor_settle: Millis(motor_settle),
            inter_step: Millis(inter_step),
            home_debounce: Millis(home_debounce),
        }
    }
}

impl Default for TimingParameters {
    /// Values suited to an A4988-class driver and a microswitch.
    fn default() -> Self {
        Self::new(1, 1, 100, 1, 10)
    }
}
