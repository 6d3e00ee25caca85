//! Per-pin I/O mode bookkeeping shared by the hardware variants.

use crate::error::{HardwareError, PinOperation};

use super::pin::{Pin, PinIoMode};

/// Tracks the configured mode of every pin and polices reads and writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinModes {
    modes: [Option<PinIoMode>; Pin::COUNT],
}

impl PinModes {
    /// All pins unconfigured.
    pub const fn new() -> Self {
        Self {
            modes: [None; Pin::COUNT],
        }
    }

    /// Current mode of a pin, if set.
    #[inline]
    pub fn mode(&self, pin: Pin) -> Option<PinIoMode> {
        self.modes[pin.index()]
    }

    /// Record a mode change.
    ///
    /// A pin can only take the mode its role requires.
    pub fn set(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError> {
        if mode != pin.required_mode() {
            return Err(HardwareError::InvalidPinOperation {
                pin,
                operation: PinOperation::SetMode,
            });
        }
        self.modes[pin.index()] = Some(mode);
        Ok(())
    }

    /// Ensure `pin` is configured as an output.
    pub fn check_write(&self, pin: Pin) -> Result<(), HardwareError> {
        self.check(pin, PinIoMode::Output, PinOperation::Write)
    }

    /// Ensure `pin` is configured as an input.
    pub fn check_read(&self, pin: Pin) -> Result<(), HardwareError> {
        self.check(pin, PinIoMode::Input, PinOperation::Read)
    }

    fn check(&self, pin: Pin, wanted: PinIoMode, operation: PinOperation) -> Result<(), HardwareError> {
        if self.mode(pin) == Some(wanted) {
            Ok(())
        } else {
            Err(HardwareError::InvalidPinOperation { pin, operation })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_pins_reject_io() {
        let modes = PinModes::new();
        assert!(modes.check_write(Pin::Step).is_err());
        assert!(modes.check_read(Pin::Home).is_err());
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let mut modes = PinModes::new();
        modes.set(Pin::Home, PinIoMode::Input).unwrap();
        modes.set(Pin::Step, PinIoMode::Output).unwrap();

        assert_eq!(
            modes.check_write(Pin::Home),
            Err(HardwareError::InvalidPinOperation {
                pin: Pin::Home,
                operation: PinOperation::Write,
            })
        );
        assert!(modes.check_read(Pin::Step).is_err());
        assert!(modes.check_write(Pin::Step).is_ok());
        assert!(modes.check_read(Pin::Home).is_ok());
    }

    #[test]
    fn test_mode_must_match_role() {
        let mut modes = PinModes::new();
        assert!(modes.set(Pin::Dir, PinIoMode::Input).is_err());
        assert_eq!(modes.mode(Pin::Dir), None);
    }
}
