//! Status snapshot for the reporting layers.

use core::fmt;

use crate::config::units::Steps;
use crate::error::Fault;

use super::state::State;

/// Why the last move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopReason {
    /// No move has ended yet.
    #[default]
    None,
    /// Every step was issued.
    Completed,
    /// A `stop` command abandoned it.
    Stopped,
    /// A newer motion command replaced it.
    Superseded,
    /// The home switch stopped it.
    HomeSwitch,
    /// A homing seek used its whole budget without finding the switch.
    HomeNotFound,
    /// The machine faulted.
    Fault,
}

impl StopReason {
    /// Stable name for status reports.
    pub const fn name(self) -> &'static str {
        match self {
            StopReason::None => "NONE",
            StopReason::Completed => "COMPLETED",
            StopReason::Stopped => "STOPPED",
            StopReason::Superseded => "SUPERSEDED",
            StopReason::HomeSwitch => "HOME_SWITCH",
            StopReason::HomeNotFound => "HOME_NOT_FOUND",
            StopReason::Fault => "FAULT",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StopReason {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

/// Point-in-time view of the focuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Engine state
    pub state: State,
    /// Position of record
    pub position: Steps,
    /// Steps left in the current move, including a pending approach segment
    pub remaining_steps: u32,
    /// Whether the home switch has set the position since boot or reset
    pub homed: bool,
    /// How the last move ended
    pub last_stop: StopReason,
    /// The fault holding the machine in its error state, if any
    pub fault: Option<Fault>,
}

impl Status {
    /// State as reported to the outside: the phases of a move collapse
    /// into [`State::Moving`].
    pub fn reported_state(&self) -> State {
        if self.state.is_moving() {
            State::Moving
        } else {
            self.state
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: {} Position: {} Remaining: {} Homed: {}",
            self.reported_state(),
            self.position.value(),
            self.remaining_steps,
            if self.homed { "YES" } else { "NO" }
        )
    }
}
