//! Error types for stepper-focuser.
//!
//! Caller-visible failures (bad configuration, bad pin use, rejected
//! commands) are [`Error`]s. Hardware inconsistencies and broken
//! invariants discovered while ticking are never returned; they become a
//! [`Fault`] recorded in the status snapshot while the machine parks in
//! its error state.

use core::fmt;

use crate::focuser::{CommandKind, State};
use crate::hardware::{Pin, PinState};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-focuser operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Hardware interface error
    Hardware(HardwareError),
    /// Command submission error
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Step pulse width must be at least one tick
    InvalidPulseWidth(u32),
    /// Home seek budget must be at least one step
    InvalidHomeSeekSteps(u32),
    /// A required builder field was not supplied
    MissingField(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Pin operations, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOperation {
    /// `read`
    Read,
    /// `write`
    Write,
    /// `set_mode`
    SetMode,
}

/// Hardware interface errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// Operation does not match the pin's I/O mode (or the mode was never set)
    InvalidPinOperation {
        /// Pin involved
        pin: Pin,
        /// What was attempted
        operation: PinOperation,
    },
    /// A state that belongs to another pin was written
    InvalidPinState {
        /// Pin written
        pin: Pin,
        /// Offending state
        state: PinState,
    },
    /// The underlying pin driver reported a failure
    Pin(Pin),
}

/// Argument validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// Relative move with a negative step count
    NegativeSteps(i32),
    /// Absolute move to a negative position
    NegativePosition(i32),
    /// The argument variant does not fit the command kind
    Mismatch(CommandKind),
}

/// Command submission errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command queue is at capacity; the packet was dropped
    QueueFull,
    /// The packet's argument failed validation
    InvalidArgument(ArgumentError),
}

/// Runtime invariants checked at every tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// MOTOR_ENABLE must be OFF while idle, asleep or faulted
    MotorOffWhenIdle,
    /// STEP must be INACTIVE outside of DO_STEPS
    StepInactiveOutsideSteps,
}

/// What drove the machine into its error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// HOME asserted while the focuser was not moving
    HomeInconsistent,
    /// An output pin was observed in a forbidden state
    InvariantViolation(Invariant),
    /// A hardware operation failed mid-tick
    Hardware(HardwareError),
}

/// A recorded fault: the condition and the state it was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    /// The condition
    pub kind: FaultKind,
    /// The state that was active when it was detected
    pub state: State,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Hardware(e) => write!(f, "Hardware error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPulseWidth(v) => {
                write!(f, "Invalid pulse width: {} ms. Must be >= 1", v)
            }
            ConfigError::InvalidHomeSeekSteps(v) => {
                write!(f, "Invalid home seek steps: {}. Must be >= 1", v)
            }
            ConfigError::MissingField(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PinOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinOperation::Read => f.write_str("read"),
            PinOperation::Write => f.write_str("write"),
            PinOperation::SetMode => f.write_str("set mode"),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::InvalidPinOperation { pin, operation } => {
                write!(f, "Invalid {} on pin {}", operation, pin)
            }
            HardwareError::InvalidPinState { pin, state } => {
                write!(f, "State '{}' cannot be written to pin {}", state, pin)
            }
            HardwareError::Pin(pin) => write!(f, "GPIO operation on pin {} failed", pin),
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::NegativeSteps(v) => write!(f, "Negative step count: {}", v),
            ArgumentError::NegativePosition(v) => write!(f, "Negative target position: {}", v),
            ArgumentError::Mismatch(kind) => {
                write!(f, "Argument does not match command '{}'", kind.name())
            }
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::QueueFull => write!(f, "Command queue is full"),
            CommandError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::HomeInconsistent => {
                write!(f, "Home switch asserted in {}", self.state.name())
            }
            FaultKind::InvariantViolation(Invariant::MotorOffWhenIdle) => {
                write!(f, "Motor enabled in {}", self.state.name())
            }
            FaultKind::InvariantViolation(Invariant::StepInactiveOutsideSteps) => {
                write!(f, "Step active in {}", self.state.name())
            }
            FaultKind::Hardware(e) => write!(f, "{} in {}", e, self.state.name()),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Error::Hardware(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

impl From<ArgumentError> for CommandError {
    fn from(e: ArgumentError) -> Self {
        CommandError::InvalidArgument(e)
    }
}

impl From<ArgumentError> for Error {
    fn from(e: ArgumentError) -> Self {
        Error::Command(CommandError::InvalidArgument(e))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for HardwareError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}
