//! Focuser machine states.

use core::fmt;

/// State of the focuser engine.
///
/// `Moving` is never occupied by the engine itself. It names the composite
/// "a move is in progress" status that spans `SetDir` through
/// `StepperInactiveAndWait`; see [`State::is_moving`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Idle, taking commands.
    AcceptCommands,
    /// Driving DIR and waiting for it to settle.
    SetDir,
    /// Driver enabled, waiting for the coils to settle.
    StepperActiveAndWait,
    /// Issuing step pulses.
    DoSteps,
    /// Last pulse issued, holding the motor before releasing it.
    StepperInactiveAndWait,
    /// Composite "in motion" status.
    Moving,
    /// Home switch forced a stop.
    StopAtHome,
    /// Low-power mode.
    Sleep,
    /// Fail-safe sink; only a reset leaves it.
    Error,
}

impl State {
    /// Number of states.
    pub const COUNT: usize = 9;

    /// Every state, in index order.
    pub const ALL: [State; State::COUNT] = [
        State::AcceptCommands,
        State::SetDir,
        State::StepperActiveAndWait,
        State::DoSteps,
        State::StepperInactiveAndWait,
        State::Moving,
        State::StopAtHome,
        State::Sleep,
        State::Error,
    ];

    const NAMES: [&'static str; State::COUNT] = [
        "ACCEPTING_COMMANDS",
        "SET_DIR",
        "STEPPER_ACTIVE",
        "DO_STEPS",
        "STEPPER_INACTIVE",
        "MOVING",
        "STOP_AT_HOME",
        "SLEEP",
        "ERROR_STATE",
    ];

    /// Dense index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            State::AcceptCommands => 0,
            State::SetDir => 1,
            State::StepperActiveAndWait => 2,
            State::DoSteps => 3,
            State::StepperInactiveAndWait => 4,
            State::Moving => 5,
            State::StopAtHome => 6,
            State::Sleep => 7,
            State::Error => 8,
        }
    }

    /// Stable name for status reports and logs.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Whether this state is part of a move in progress.
    #[inline]
    pub const fn is_moving(self) -> bool {
        matches!(
            self,
            State::SetDir
                | State::StepperActiveAndWait
                | State::DoSteps
                | State::StepperInactiveAndWait
                | State::Moving
        )
    }

    /// Whether the driver must be disabled in this state.
    #[inline]
    pub const fn requires_motor_off(self) -> bool {
        matches!(
            self,
            State::AcceptCommands | State::StopAtHome | State::Sleep | State::Error
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}
