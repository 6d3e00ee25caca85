//! Hardware interface for the focuser.
//!
//! [`HardwareInterface`] is the single seam between the state machine and
//! the physical world. Three implementations ship with the crate:
//!
//! - [`EmbeddedHardware`]: real GPIO through embedded-hal 1.0 pins
//! - [`SimulatedFocuser`]: a virtual focuser with position and home switch
//! - [`TimedMock`] (std only): records every write with its timestamp

mod embedded;
mod modes;
mod pin;
mod simulator;
#[cfg(feature = "std")]
mod mock;

pub use embedded::EmbeddedHardware;
pub use modes::PinModes;
pub use pin::{Pin, PinIoMode, PinState, Polarity};
pub use simulator::SimulatedFocuser;
#[cfg(feature = "std")]
pub use mock::{PinEvent, TimedMock, TimedPinEvent};

use crate::error::HardwareError;

/// Capability set over the four logical focuser pins.
///
/// Writing to an input, reading an output, or using a pin before its mode
/// has been set fails with [`HardwareError::InvalidPinOperation`].
pub trait HardwareInterface {
    /// Sample the logical state of an input pin.
    fn read(&mut self, pin: Pin) -> Result<PinState, HardwareError>;

    /// Drive an output pin to a logical state.
    fn write(&mut self, pin: Pin, state: PinState) -> Result<(), HardwareError>;

    /// Configure a pin as input or output.
    fn set_mode(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError>;
}

/// Lets a caller lend hardware to a focuser instead of handing it over.
impl<H: HardwareInterface + ?Sized> HardwareInterface for &mut H {
    #[inline]
    fn read(&mut self, pin: Pin) -> Result<PinState, HardwareError> {
        (**self).read(pin)
    }

    #[inline]
    fn write(&mut self, pin: Pin, state: PinState) -> Result<(), HardwareError> {
        (**self).write(pin, state)
    }

    #[inline]
    fn set_mode(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError> {
        (**self).set_mode(pin, mode)
    }
}

/// Reject a state that belongs to a different pin.
pub(crate) fn check_state(pin: Pin, state: PinState) -> Result<(), HardwareError> {
    if state.pin() == pin {
        Ok(())
    } else {
        Err(HardwareError::InvalidPinState { pin, state })
    }
}
