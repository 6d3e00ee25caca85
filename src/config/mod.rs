//! Configuration module for stepper-focuser.
//!
//! Provides the timing, motion and wiring settings a focuser is built from,
//! loadable from TOML files (with `std` feature) or constructed in code.

mod motion;
mod system;
mod timing;
pub mod units;
mod wiring;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motion::MotionConfig;
pub use system::FocuserConfig;
pub use timing::TimingParameters;
pub use validation::{validate_config, validate_timing};
pub use wiring::WiringConfig;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Instant, Millis, Steps};
