//! Focuser façade.

use crate::config::units::{Instant, Steps};
use crate::config::{validate_config, validate_timing, FocuserConfig, MotionConfig, TimingParameters};
use crate::error::Result;
use crate::hardware::HardwareInterface;

use super::command::CommandPacket;
use super::stack::StateStack;
use super::state::State;
use super::status::Status;

/// A focuser: one state machine, one set of timing parameters and one
/// hardware implementation, wired together for the life of the firmware.
///
/// `H` is usually owned. Pass `&mut hw` instead to keep the hardware in
/// the caller's hands.
///
/// # Example
///
/// ```rust
/// use stepper_focuser::{CommandPacket, Direction, Focuser, Instant, State, TimingParameters};
/// use stepper_focuser::hardware::SimulatedFocuser;
///
/// let mut focuser = Focuser::new(SimulatedFocuser::default(), TimingParameters::default()).unwrap();
/// focuser.submit(CommandPacket::move_by(Direction::Forward, 20, Instant::ZERO)).unwrap();
///
/// let mut now = 0;
/// loop {
///     focuser.tick(Instant::new(now));
///     if now > 0 && focuser.current_state() == State::AcceptCommands {
///         break;
///     }
///     now += 1;
/// }
/// assert_eq!(focuser.hardware().position().value(), 20);
/// ```
pub struct Focuser<H: HardwareInterface> {
    hardware: H,
    timing: TimingParameters,
    stack: StateStack,
}

impl<H: HardwareInterface> Focuser<H> {
    /// Create a focuser with default motion settings.
    ///
    /// Puts the pins in their safe power-on configuration before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the timing is invalid or the hardware rejects
    /// the pin configuration.
    pub fn new(hardware: H, timing: TimingParameters) -> Result<Self> {
        validate_timing(&timing)?;
        Self::assemble(hardware, timing, MotionConfig::default())
    }

    /// Create a focuser from a full configuration.
    pub fn from_config(hardware: H, config: &FocuserConfig) -> Result<Self> {
        validate_config(config)?;
        Self::assemble(hardware, config.timing, config.motion)
    }

    pub(crate) fn assemble(mut hardware: H, timing: TimingParameters, motion: MotionConfig) -> Result<Self> {
        let mut stack = StateStack::new(motion);
        stack.configure(&mut hardware)?;
        Ok(Self {
            hardware,
            timing,
            stack,
        })
    }

    /// Queue a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is invalid or the queue is full.
    /// Either way the machine is left untouched.
    #[inline]
    pub fn submit(&mut self, command: CommandPacket) -> Result<()> {
        self.stack.submit(command)?;
        Ok(())
    }

    /// Advance the machine to `now`. Returns whether a pin was written.
    #[inline]
    pub fn tick(&mut self, now: Instant) -> bool {
        self.stack.tick(&mut self.hardware, &self.timing, now)
    }

    /// Status snapshot.
    #[inline]
    pub fn status(&self) -> Status {
        self.stack.status()
    }

    /// Current engine state.
    #[inline]
    pub fn current_state(&self) -> State {
        self.stack.current_state()
    }

    /// Position of record.
    #[inline]
    pub fn position(&self) -> Steps {
        self.stack.position()
    }

    /// Steps left in the move in progress.
    #[inline]
    pub fn remaining_steps(&self) -> u32 {
        self.stack.remaining_steps()
    }

    /// Timing in use.
    #[inline]
    pub fn timing(&self) -> &TimingParameters {
        &self.timing
    }

    /// The hardware.
    #[inline]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// The hardware, mutably (tests use this to drive a mock's clock).
    #[inline]
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Tear down and give the hardware back.
    pub fn into_hardware(self) -> H {
        self.hardware
    }
}
