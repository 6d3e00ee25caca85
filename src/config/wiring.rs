//! Electrical wiring of the focuser's pins.

use serde::Deserialize;

use crate::hardware::{Pin, Polarity};

/// Polarity of each line as wired on the board.
///
/// Defaults match a Pololu-style driver carrier (active-low ~EN) and a
/// home microswitch pulling its input to ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// STEP line polarity.
    pub step: Polarity,
    /// DIR line polarity (asserted = forward).
    pub dir: Polarity,
    /// Driver enable polarity.
    pub motor_enable: Polarity,
    /// Home switch polarity.
    pub home: Polarity,
}

impl WiringConfig {
    /// Polarity of one pin.
    #[inline]
    pub fn polarity(&self, pin: Pin) -> Polarity {
        match pin {
            Pin::Step => self.step,
            Pin::Dir => self.dir,
            Pin::MotorEnable => self.motor_enable,
            Pin::Home => self.home,
        }
    }
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            step: Polarity::ActiveHigh,
            dir: Polarity::ActiveHigh,
            motor_enable: Polarity::ActiveLow,
            home: Polarity::ActiveLow,
        }
    }
}
