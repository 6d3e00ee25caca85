//! The focuser state machine and its façade.
//!
//! [`StateStack`] is the engine; [`Focuser`] binds it to timing
//! parameters and a [`HardwareInterface`](crate::hardware::HardwareInterface).

mod builder;
mod command;
mod driver;
mod stack;
mod state;
mod status;
mod timer;

pub use builder::FocuserBuilder;
pub use command::{interrupts, CommandKind, CommandPacket, Direction, StateArgument};
pub use driver::Focuser;
pub use stack::{StateStack, COMMAND_QUEUE_CAPACITY};
pub use state::State;
pub use status::{Status, StopReason};
pub use timer::TimedEvent;
