//! Timed hardware mock for golden-record tests (std only).

use crate::config::units::Instant;
use crate::error::HardwareError;

use super::modes::PinModes;
use super::pin::{Pin, PinIoMode, PinState};
use super::{check_state, HardwareInterface};

/// Something the firmware did to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    /// A `write`
    Write(PinState),
    /// A `set_mode`
    Mode(Pin, PinIoMode),
}

impl PinEvent {
    /// The pin the event touched.
    pub fn pin(&self) -> Pin {
        match self {
            PinEvent::Write(state) => state.pin(),
            PinEvent::Mode(pin, _) => *pin,
        }
    }
}

/// A pin event stamped with the mock's logical time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedPinEvent {
    /// When it happened
    pub time: Instant,
    /// What happened
    pub event: PinEvent,
}

impl TimedPinEvent {
    /// A write at `time`.
    pub fn write(time: u64, state: PinState) -> Self {
        Self {
            time: Instant::new(time),
            event: PinEvent::Write(state),
        }
    }

    /// A mode change at `time`.
    pub fn mode(time: u64, pin: Pin, mode: PinIoMode) -> Self {
        Self {
            time: Instant::new(time),
            event: PinEvent::Mode(pin, mode),
        }
    }
}

/// Hardware mock with a virtual clock.
///
/// - Time only moves when the test calls [`advance_to`](Self::advance_to)
///   or [`advance`](Self::advance).
/// - Every write and mode change is recorded with the current time so a
///   test can compare the full output against a golden sequence.
/// - Input changes are scripted up front as `(time, state)` pairs and take
///   effect once the clock reaches them. Inputs start released.
#[derive(Debug, Clone)]
pub struct TimedMock {
    time: Instant,
    modes: PinModes,
    script: Vec<(Instant, PinState)>,
    next_input: usize,
    inputs: [PinState; Pin::COUNT],
    outputs: [Option<PinState>; Pin::COUNT],
    events: Vec<TimedPinEvent>,
}

impl TimedMock {
    /// A mock with scripted input changes.
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = (u64, PinState)>,
    {
        let mut script: Vec<(Instant, PinState)> =
            script.into_iter().map(|(t, s)| (Instant::new(t), s)).collect();
        script.sort_by_key(|(t, _)| *t);

        let mut mock = Self {
            time: Instant::ZERO,
            modes: PinModes::new(),
            script,
            next_input: 0,
            inputs: Pin::ALL.map(|pin| PinState::for_pin(pin, false)),
            outputs: [None; Pin::COUNT],
            events: Vec::new(),
        };
        // Apply anything scripted for time zero.
        mock.advance_to(Instant::ZERO);
        mock
    }

    /// A mock whose inputs never change.
    pub fn quiet() -> Self {
        Self::new(core::iter::empty())
    }

    /// Current logical time.
    #[inline]
    pub fn now(&self) -> Instant {
        self.time
    }

    /// Move the clock forward to `now`, applying scripted inputs on the way.
    ///
    /// Moving backwards is ignored.
    pub fn advance_to(&mut self, now: Instant) {
        if now > self.time {
            self.time = now;
        }
        while let Some(&(at, state)) = self.script.get(self.next_input) {
            if at > self.time {
                break;
            }
            self.inputs[state.pin().index()] = state;
            self.next_input += 1;
        }
    }

    /// Move the clock forward by `ticks`.
    pub fn advance(&mut self, ticks: u64) {
        let now = Instant::new(self.time.value() + ticks);
        self.advance_to(now);
    }

    /// Everything recorded so far.
    #[inline]
    pub fn events(&self) -> &[TimedPinEvent] {
        &self.events
    }

    /// Recorded writes only, as `(time, state)`.
    pub fn writes(&self) -> Vec<(u64, PinState)> {
        self.events
            .iter()
            .filter_map(|e| match e.event {
                PinEvent::Write(state) => Some((e.time.value(), state)),
                PinEvent::Mode(..) => None,
            })
            .collect()
    }

    /// Recorded writes to one pin.
    pub fn writes_to(&self, pin: Pin) -> Vec<(u64, PinState)> {
        self.writes().into_iter().filter(|(_, s)| s.pin() == pin).collect()
    }

    /// Forget the recording (the clock and pin levels are kept).
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Last state written to an output, if any.
    #[inline]
    pub fn output(&self, pin: Pin) -> Option<PinState> {
        self.outputs[pin.index()]
    }

    fn record(&mut self, event: PinEvent) {
        self.events.push(TimedPinEvent {
            time: self.time,
            event,
        });
    }
}

impl HardwareInterface for TimedMock {
    fn read(&mut self, pin: Pin) -> Result<PinState, HardwareError> {
        self.modes.check_read(pin)?;
        Ok(self.inputs[pin.index()])
    }

    fn write(&mut self, pin: Pin, state: PinState) -> Result<(), HardwareError> {
        self.modes.check_write(pin)?;
        check_state(pin, state)?;
        self.outputs[pin.index()] = Some(state);
        self.record(PinEvent::Write(state));
        Ok(())
    }

    fn set_mode(&mut self, pin: Pin, mode: PinIoMode) -> Result<(), HardwareError> {
        self.modes.set(pin, mode)?;
        self.record(PinEvent::Mode(pin, mode));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes_with_time() {
        let mut hw = TimedMock::quiet();
        hw.set_mode(Pin::Step, PinIoMode::Output).unwrap();
        hw.write(Pin::Step, PinState::StepInactive).unwrap();
        hw.advance(10);
        hw.write(Pin::Step, PinState::StepActive).unwrap();
        hw.advance(1);
        hw.write(Pin::Step, PinState::StepInactive).unwrap();

        let golden = vec![
            TimedPinEvent::mode(0, Pin::Step, PinIoMode::Output),
            TimedPinEvent::write(0, PinState::StepInactive),
            TimedPinEvent::write(10, PinState::StepActive),
            TimedPinEvent::write(11, PinState::StepInactive),
        ];
        assert_eq!(hw.events(), golden.as_slice());
        assert_eq!(hw.output(Pin::Step), Some(PinState::StepInactive));
    }

    #[test]
    fn test_scripted_inputs_follow_clock() {
        let mut hw = TimedMock::new([(0, PinState::HomeInactive), (10, PinState::HomeActive)]);
        hw.set_mode(Pin::Home, PinIoMode::Input).unwrap();

        assert_eq!(hw.read(Pin::Home).unwrap(), PinState::HomeInactive);
        hw.advance(5);
        assert_eq!(hw.read(Pin::Home).unwrap(), PinState::HomeInactive);
        hw.advance(5);
        assert_eq!(hw.read(Pin::Home).unwrap(), PinState::HomeActive);
    }

    #[test]
    fn test_input_at_time_zero_applied_on_construction() {
        let mut hw = TimedMock::new([(0, PinState::HomeActive)]);
        hw.set_mode(Pin::Home, PinIoMode::Input).unwrap();
        assert_eq!(hw.read(Pin::Home).unwrap(), PinState::HomeActive);
    }

    #[test]
    fn test_mode_violations_are_not_recorded() {
        let mut hw = TimedMock::quiet();
        hw.set_mode(Pin::Home, PinIoMode::Input).unwrap();
        assert!(hw.write(Pin::Home, PinState::HomeActive).is_err());
        assert!(hw.write(Pin::Dir, PinState::DirForward).is_err());
        assert_eq!(hw.writes(), vec![]);
    }
}
