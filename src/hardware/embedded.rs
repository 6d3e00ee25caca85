//! Real hardware driver over embedded-hal 1.0 pins.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::WiringConfig;
use crate::error::{HardwareError, PinOperation};

use super::modes::PinModes;
use super::pin::{Pin, PinIoMode, PinState};
use super::{check_state, HardwareInterface};

/// Focuser hardware backed by embedded-hal GPIO.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `ENA`: driver enable pin type (must implement `OutputPin`)
/// - `HOME`: home switch pin type (must implement `InputPin`)
///
/// The electrical direction of each line is fixed by its type, so
/// `set_mode` only validates and records; it never reconfigures a pin.
pub struct EmbeddedHardware<STEP, DIR, ENA, HOME>
where
    STEP: OutputPin,
    DIR: OutputPin,
    ENA: OutputPin,
    HOME: InputPin,
{
    step_pin: STEP,
    dir_pin: DIR,
    enable_pin: ENA,
    home_pin: HOME,
    wiring: WiringConfig,
    modes: PinModes,
}

impl<STEP, DIR, ENA, HOME> EmbeddedHardware<STEP, DIR, ENA, HOME>
where
    STEP: OutputPin,
    DIR: OutputPin,
    ENA: OutputPin,
    HOME: InputPin,
{
    /// Wrap the four pins with the given wiring polarities.
    pub fn new(step_pin: STEP, dir_pin: DIR, enable_pin: ENA, home_pin: HOME, wiring: WiringConfig) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            home_pin,
            wiring,
            modes: PinModes::new(),
        }
    }

    /// The wiring in use.
    #[inline]
    pub fn wiring(&self) -> &WiringConfig {
        &self.wiring
    }

    /// Give the pins back.
    pub fn release(self) -> (STEP, DIR, ENA, HOME) {
        (self.step_pin, self.dir_pin, self.enable_pin, self.home_pin)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), ()> {
    if high {
        pin.set_high().map_err(|_| ())
    } else {
        pin.set_low().map_err(|_| ())
    }
}

impl<STEP, DIR, ENA, HOME> HardwareInterface for EmbeddedHardware<STEP, DIR, ENA, HOME>
where
    STEP: OutputPin,
    DIR: OutputPin,
    ENA: OutputPin,
    HOME: InputPin,
{
    fn read(&mut self, pin: Pin) -> Result<PinState, HardwareError> {
        self.modes.check_read(pin)?;
        match pin {
            Pin::Home => {
                let high = self.home_pin.is_high().map_err(|_| HardwareError::Pin(pin))?;
                Ok(self.wiring.polarity(pin).state(pin, high))
            }
            _ => Err(HardwareError::InvalidPinOperation {
                pin,
                operation: PinOperation::Read,
            }),
        }
    }

    fn write(&mut self, pin: Pin, state: PinState) -> Result<(), HardwareError> {
        self.modes.check_write(pin)?;
        check_state(pin, state)?;

        let high = self.wiring.polarity(pin).level(state);
        let result = match pin {
            Pin::Step => drive(&mut self.step_pin, high),
            Pin::Dir => drive(&mut self.dir_pin, high),
            Pin::MotorEnable => drive(&mut self.enable_pin, high),
            Pin::Home => {
                return Err(HardwareError::InvalidPinOperation {
                    pin,
                    operation: PinOperation::Write,
                })
            }
        };
        result.map_err(|_| HardwareError::Pin(pin))
    }

    fn set_mode(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError> {
        self.modes.set(pin, mode)
    }
}
