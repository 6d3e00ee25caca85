//! Logical pins, I/O modes and pin states.
//!
//! The state machine talks about what a pin *means* (motor on, step
//! active), never about voltage. [`Polarity`] is the only place where a
//! logical state meets an electrical level, and only hardware variants use it.

use core::fmt;

use serde::Deserialize;

/// Logical role of one of the focuser's I/O lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// Step pulse output.
    Step,
    /// Direction output.
    Dir,
    /// Driver enable output.
    MotorEnable,
    /// Home switch input.
    Home,
}

impl Pin {
    /// Number of logical pins.
    pub const COUNT: usize = 4;

    /// Every pin, in index order.
    pub const ALL: [Pin; Pin::COUNT] = [Pin::Step, Pin::Dir, Pin::MotorEnable, Pin::Home];

    const NAMES: [&'static str; Pin::COUNT] = ["Step", "Direction", "Motor Enable", "Home"];

    /// Dense index, suitable for array lookups.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Pin::Step => 0,
            Pin::Dir => 1,
            Pin::MotorEnable => 2,
            Pin::Home => 3,
        }
    }

    /// Stable debug name.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// The I/O mode this pin is wired for.
    #[inline]
    pub const fn required_mode(self) -> PinIoMode {
        match self {
            Pin::Home => PinIoMode::Input,
            _ => PinIoMode::Output,
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinIoMode {
    /// Driven by the controller.
    Output,
    /// Sampled by the controller.
    Input,
}

impl PinIoMode {
    /// Number of modes.
    pub const COUNT: usize = 2;

    const NAMES: [&'static str; PinIoMode::COUNT] = ["Output", "Input"];

    /// Dense index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PinIoMode::Output => 0,
            PinIoMode::Input => 1,
        }
    }

    /// Stable debug name.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }
}

impl fmt::Display for PinIoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical level of a pin.
///
/// Each pin has exactly two meaningful states; pairing a state with the
/// wrong pin is rejected by every hardware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinState {
    /// Step pulse in progress.
    StepActive,
    /// Step line idle.
    StepInactive,
    /// Travel toward higher positions.
    DirForward,
    /// Travel toward the home switch.
    DirBackward,
    /// Driver enabled, coils energised.
    MotorOn,
    /// Driver disabled.
    MotorOff,
    /// Home switch closed.
    HomeActive,
    /// Home switch open.
    HomeInactive,
}

impl PinState {
    /// Number of pin states.
    pub const COUNT: usize = 8;

    /// Every state, in index order.
    pub const ALL: [PinState; PinState::COUNT] = [
        PinState::StepActive,
        PinState::StepInactive,
        PinState::DirForward,
        PinState::DirBackward,
        PinState::MotorOn,
        PinState::MotorOff,
        PinState::HomeActive,
        PinState::HomeInactive,
    ];

    const NAMES: [&'static str; PinState::COUNT] = [
        "Step Active",
        "Step Inactive",
        "Dir Forward",
        "Dir Backward",
        "Motor On",
        "Motor Off",
        "Home Active",
        "Home Inactive",
    ];

    /// Dense index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PinState::StepActive => 0,
            PinState::StepInactive => 1,
            PinState::DirForward => 2,
            PinState::DirBackward => 3,
            PinState::MotorOn => 4,
            PinState::MotorOff => 5,
            PinState::HomeActive => 6,
            PinState::HomeInactive => 7,
        }
    }

    /// Stable debug name.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// The pin this state belongs to.
    #[inline]
    pub const fn pin(self) -> Pin {
        match self {
            PinState::StepActive | PinState::StepInactive => Pin::Step,
            PinState::DirForward | PinState::DirBackward => Pin::Dir,
            PinState::MotorOn | PinState::MotorOff => Pin::MotorEnable,
            PinState::HomeActive | PinState::HomeInactive => Pin::Home,
        }
    }

    /// Whether this is the "asserted" state of its pin.
    ///
    /// Forward counts as asserted for DIR.
    #[inline]
    pub const fn is_asserted(self) -> bool {
        matches!(
            self,
            PinState::StepActive | PinState::DirForward | PinState::MotorOn | PinState::HomeActive
        )
    }

    /// Build the asserted or released state for a pin.
    #[inline]
    pub const fn for_pin(pin: Pin, asserted: bool) -> PinState {
        match (pin, asserted) {
            (Pin::Step, true) => PinState::StepActive,
            (Pin::Step, false) => PinState::StepInactive,
            (Pin::Dir, true) => PinState::DirForward,
            (Pin::Dir, false) => PinState::DirBackward,
            (Pin::MotorEnable, true) => PinState::MotorOn,
            (Pin::MotorEnable, false) => PinState::MotorOff,
            (Pin::Home, true) => PinState::HomeActive,
            (Pin::Home, false) => PinState::HomeInactive,
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Electrical polarity of a line: which voltage level means "asserted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// High level asserts.
    #[default]
    ActiveHigh,
    /// Low level asserts.
    ActiveLow,
}

impl Polarity {
    /// Electrical level (true = high) for a logical state.
    #[inline]
    pub const fn level(self, state: PinState) -> bool {
        match self {
            Polarity::ActiveHigh => state.is_asserted(),
            Polarity::ActiveLow => !state.is_asserted(),
        }
    }

    /// Logical state of `pin` for a sampled electrical level.
    #[inline]
    pub const fn state(self, pin: Pin, high: bool) -> PinState {
        let asserted = match self {
            Polarity::ActiveHigh => high,
            Polarity::ActiveLow => !high,
        };
        PinState::for_pin(pin, asserted)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pin {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinIoMode {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}
