//! Commands handed to the focuser by the command parser.

use core::fmt;

use crate::config::units::{Instant, Millis};
use crate::error::ArgumentError;
use crate::hardware::PinState;

use super::state::State;

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Away from home; position increases.
    Forward,
    /// Toward home; position decreases.
    Reverse,
}

impl Direction {
    /// DIR pin state that selects this direction.
    #[inline]
    pub const fn pin_state(self) -> PinState {
        match self {
            Direction::Forward => PinState::DirForward,
            Direction::Reverse => PinState::DirBackward,
        }
    }

    /// Position change per step.
    #[inline]
    pub const fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// Stable name for logs.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Forward => "FORWARD",
            Direction::Reverse => "REVERSE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Relative move by a step count.
    Move,
    /// Absolute move to a position.
    MoveTo,
    /// Seek the home switch.
    Home,
    /// Abandon the current move.
    Stop,
    /// Enter low-power mode.
    Sleep,
    /// Leave low-power mode.
    Wake,
    /// Leave the error state.
    Reset,
}

impl CommandKind {
    /// Number of command kinds.
    pub const COUNT: usize = 7;

    /// Every kind, in index order.
    pub const ALL: [CommandKind; CommandKind::COUNT] = [
        CommandKind::Move,
        CommandKind::MoveTo,
        CommandKind::Home,
        CommandKind::Stop,
        CommandKind::Sleep,
        CommandKind::Wake,
        CommandKind::Reset,
    ];

    const NAMES: [&'static str; CommandKind::COUNT] =
        ["MOVE", "MOVE_TO", "HOME", "STOP", "SLEEP", "WAKE", "RESET"];

    /// Dense index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            CommandKind::Move => 0,
            CommandKind::MoveTo => 1,
            CommandKind::Home => 2,
            CommandKind::Stop => 3,
            CommandKind::Sleep => 4,
            CommandKind::Wake => 5,
            CommandKind::Reset => 6,
        }
    }

    /// Stable name for logs.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Whether the command starts motor travel.
    #[inline]
    pub const fn is_motion(self) -> bool {
        matches!(self, CommandKind::Move | CommandKind::MoveTo | CommandKind::Home)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a queued command of `kind` preempts the activity of `state`.
///
/// Only the stepping and final-settle phases of a move can be preempted,
/// and only by `stop` or a new motion command. The settle windows of
/// SET_DIR and STEPPER_ACTIVE are never torn.
pub const fn interrupts(state: State, kind: CommandKind) -> bool {
    matches!(state, State::DoSteps | State::StepperInactiveAndWait)
        && (kind.is_motion() || matches!(kind, CommandKind::Stop))
}

/// Payload of a command. Exactly one variant fits each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArgument {
    /// No payload (`home`, `stop`, `wake`, `reset`).
    None,
    /// Relative travel (`move`).
    Steps {
        /// Direction of travel
        direction: Direction,
        /// Number of steps; must not be negative
        count: i32,
    },
    /// Absolute target (`move_to`); must not be negative.
    Position(i32),
    /// Sleep length (`sleep`); zero sleeps until `wake`.
    Duration(Millis),
}

/// A unit of work for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPacket {
    /// What to do
    pub kind: CommandKind,
    /// Its argument
    pub argument: StateArgument,
    /// When the parser produced it
    pub submitted_at: Instant,
}

impl CommandPacket {
    /// A packet from raw parts. Validated on submission, not here.
    pub const fn new(kind: CommandKind, argument: StateArgument, submitted_at: Instant) -> Self {
        Self {
            kind,
            argument,
            submitted_at,
        }
    }

    /// `move(direction, count)`
    pub const fn move_by(direction: Direction, count: i32, submitted_at: Instant) -> Self {
        Self::new(
            CommandKind::Move,
            StateArgument::Steps { direction, count },
            submitted_at,
        )
    }

    /// `move_to(position)`
    pub const fn move_to(position: i32, submitted_at: Instant) -> Self {
        Self::new(CommandKind::MoveTo, StateArgument::Position(position), submitted_at)
    }

    /// `home`
    pub const fn home(submitted_at: Instant) -> Self {
        Self::new(CommandKind::Home, StateArgument::None, submitted_at)
    }

    /// `stop`
    pub const fn stop(submitted_at: Instant) -> Self {
        Self::new(CommandKind::Stop, StateArgument::None, submitted_at)
    }

    /// `sleep(duration)`
    pub const fn sleep(duration: Millis, submitted_at: Instant) -> Self {
        Self::new(CommandKind::Sleep, StateArgument::Duration(duration), submitted_at)
    }

    /// `wake`
    pub const fn wake(submitted_at: Instant) -> Self {
        Self::new(CommandKind::Wake, StateArgument::None, submitted_at)
    }

    /// `reset`
    pub const fn reset(submitted_at: Instant) -> Self {
        Self::new(CommandKind::Reset, StateArgument::None, submitted_at)
    }

    /// Check the argument against the kind and its range.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        match (self.kind, self.argument) {
            (CommandKind::Move, StateArgument::Steps { count, .. }) if count < 0 => {
                Err(ArgumentError::NegativeSteps(count))
            }
            (CommandKind::Move, StateArgument::Steps { .. }) => Ok(()),
            (CommandKind::MoveTo, StateArgument::Position(p)) if p < 0 => {
                Err(ArgumentError::NegativePosition(p))
            }
            (CommandKind::MoveTo, StateArgument::Position(_)) => Ok(()),
            (CommandKind::Sleep, StateArgument::Duration(_)) => Ok(()),
            (
                CommandKind::Home | CommandKind::Stop | CommandKind::Wake | CommandKind::Reset,
                StateArgument::None,
            ) => Ok(()),
            (kind, _) => Err(ArgumentError::Mismatch(kind)),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Direction {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}
