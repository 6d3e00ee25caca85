//! # stepper-focuser
//!
//! Non-blocking state machine for a stepper-motor telescope focuser, with an
//! embedded-hal 1.0 hardware layer.
//!
//! ## Features
//!
//! - **Tick driven**: `Focuser::tick(now)` never blocks; every wait is a deadline
//! - **Safe pin sequencing**: DIR settles before the driver is enabled, the
//!   driver settles before the first pulse, HOME overrides any motion
//! - **Logical pins**: the state machine speaks `MotorOn`/`StepActive`; wiring
//!   polarity lives in the hardware layer
//! - **Three hardware variants**: embedded-hal GPIO, a simulated focuser and
//!   a timed mock for exact-timing tests
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_focuser::{CommandPacket, Direction, Focuser, FocuserConfig, Instant};
//! use stepper_focuser::hardware::EmbeddedHardware;
//!
//! let config: FocuserConfig = stepper_focuser::load_config("focuser.toml")?;
//! let hardware = EmbeddedHardware::new(step_pin, dir_pin, enable_pin, home_pin, config.wiring);
//! let mut focuser = Focuser::from_config(hardware, &config)?;
//!
//! focuser.submit(CommandPacket::home(clock.now()))?;
//! loop {
//!     focuser.tick(clock.now());
//!     // service the command channel between ticks
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and the timed mock
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Logs through defmt instead of the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod focuser;
pub mod hardware;

// Re-exports for ergonomic API
pub use config::{validate_config, FocuserConfig, MotionConfig, TimingParameters, WiringConfig};
pub use error::{Error, Result};
pub use focuser::{
    CommandKind, CommandPacket, Direction, Focuser, FocuserBuilder, State, StateArgument, Status,
    StopReason,
};
pub use hardware::{HardwareInterface, Pin, PinIoMode, PinState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Instant, Millis, Steps};
