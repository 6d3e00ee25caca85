//! A virtual focuser for integration testing without hardware.

use crate::config::units::Steps;
use crate::error::HardwareError;

use super::modes::PinModes;
use super::pin::{Pin, PinIoMode, PinState};
use super::{check_state, HardwareInterface};

/// Simulated focuser mechanics.
///
/// Models the drive train the way the firmware sees it: a rising STEP edge
/// with the driver enabled moves the draw tube one step in the direction
/// DIR selects. The home switch closes whenever the tube sits at or below
/// the home position. Travel past `travel_limit` is blocked, like a hard
/// mechanical end stop.
#[derive(Debug, Clone)]
pub struct SimulatedFocuser {
    modes: PinModes,
    position: Steps,
    home_position: Steps,
    travel_limit: Option<Steps>,
    step: PinState,
    dir: PinState,
    motor: PinState,
    pulses: u64,
    missed_pulses: u64,
    dir_changes_mid_pulse: u64,
}

impl SimulatedFocuser {
    /// A focuser resting at `position` with the home switch at zero.
    pub fn new(position: Steps) -> Self {
        Self {
            modes: PinModes::new(),
            position,
            home_position: Steps::new(0),
            travel_limit: None,
            step: PinState::StepInactive,
            dir: PinState::DirForward,
            motor: PinState::MotorOff,
            pulses: 0,
            missed_pulses: 0,
            dir_changes_mid_pulse: 0,
        }
    }

    /// Move the home switch.
    pub fn with_home_position(mut self, home: Steps) -> Self {
        self.home_position = home;
        self
    }

    /// Add a hard end stop at the far end of travel.
    pub fn with_travel_limit(mut self, limit: Steps) -> Self {
        self.travel_limit = Some(limit);
        self
    }

    /// Actual mechanical position.
    #[inline]
    pub fn position(&self) -> Steps {
        self.position
    }

    /// Whether the driver is enabled.
    #[inline]
    pub fn motor_on(&self) -> bool {
        self.motor == PinState::MotorOn
    }

    /// Whether the home switch is currently closed.
    #[inline]
    pub fn at_home(&self) -> bool {
        self.position <= self.home_position
    }

    /// Rising STEP edges seen with the driver enabled.
    #[inline]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Rising STEP edges seen with the driver disabled.
    #[inline]
    pub fn missed_pulses(&self) -> u64 {
        self.missed_pulses
    }

    /// DIR changes made while STEP was active.
    #[inline]
    pub fn dir_changes_mid_pulse(&self) -> u64 {
        self.dir_changes_mid_pulse
    }

    fn on_rising_step(&mut self) {
        if !self.motor_on() {
            self.missed_pulses += 1;
            return;
        }
        self.pulses += 1;

        let next = match self.dir {
            PinState::DirForward => Steps::new(self.position.0 + 1),
            _ => Steps::new(self.position.0 - 1),
        };
        let blocked = self.travel_limit.map(|limit| next > limit).unwrap_or(false);
        if !blocked {
            self.position = next;
        }
    }
}

impl Default for SimulatedFocuser {
    fn default() -> Self {
        Self::new(Steps::new(0))
    }
}

impl HardwareInterface for SimulatedFocuser {
    fn read(&mut self, pin: Pin) -> Result<PinState, HardwareError> {
        self.modes.check_read(pin)?;
        Ok(PinState::for_pin(Pin::Home, self.at_home()))
    }

    fn write(&mut self, pin: Pin, state: PinState) -> Result<(), HardwareError> {
        self.modes.check_write(pin)?;
        check_state(pin, state)?;

        match pin {
            Pin::Step => {
                let rising = self.step == PinState::StepInactive && state == PinState::StepActive;
                self.step = state;
                if rising {
                    self.on_rising_step();
                }
            }
            Pin::Dir => {
                if state != self.dir && self.step == PinState::StepActive {
                    self.dir_changes_mid_pulse += 1;
                }
                self.dir = state;
            }
            Pin::MotorEnable => self.motor = state,
            Pin::Home => {}
        }
        Ok(())
    }

    fn set_mode(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError> {
        self.modes.set(pin, mode)
    }
}
