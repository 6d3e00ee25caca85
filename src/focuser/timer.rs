//! Non-blocking deadline timer.

use crate::config::units::{Instant, Millis};

/// A one-shot deadline on the caller's logical clock.
///
/// Nothing here sleeps. A state that needs to wait starts a timer and then
/// simply returns from each tick until [`has_elapsed`](Self::has_elapsed)
/// turns true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimedEvent {
    deadline: Option<Instant>,
}

impl TimedEvent {
    /// An idle timer.
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer to expire `duration` after `now`.
    #[inline]
    pub fn start(&mut self, now: Instant, duration: Millis) {
        self.deadline = Some(now + duration);
    }

    /// Whether an armed timer has reached its deadline.
    ///
    /// An idle timer never elapses.
    #[inline]
    pub fn has_elapsed(&self, now: Instant) -> bool {
        self.deadline.map(|d| now >= d).unwrap_or(false)
    }

    /// Disarm the timer.
    #[inline]
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is armed.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
