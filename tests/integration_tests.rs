//! Integration tests for stepper-focuser.
//!
//! These tests drive the public `Focuser` API against the timed mock (exact
//! pin timing) and the simulated focuser (emergent mechanics).

#![cfg(feature = "std")]

mod unit;

use stepper_focuser::error::{ArgumentError, CommandError, FaultKind};
use stepper_focuser::hardware::{SimulatedFocuser, TimedMock};
use stepper_focuser::{
    CommandPacket, Direction, Error, Focuser, FocuserBuilder, Instant, Millis, Pin, PinState,
    State, Steps, StopReason, TimingParameters,
};

use PinState::*;

// =============================================================================
// Helpers
// =============================================================================

fn timing() -> TimingParameters {
    TimingParameters::new(2, 1, 3, 1, 1)
}

fn at(t: u64) -> Instant {
    Instant::new(t)
}

/// A focuser on a timed mock, with the power-on writes cleared.
fn mocked<I>(script: I) -> Focuser<TimedMock>
where
    I: IntoIterator<Item = (u64, PinState)>,
{
    let mut focuser = Focuser::new(TimedMock::new(script), timing()).unwrap();
    focuser.hardware_mut().clear_events();
    focuser
}

/// Tick once per time unit over `from..=to`, returning the tick results.
fn run(focuser: &mut Focuser<TimedMock>, from: u64, to: u64) -> Vec<bool> {
    (from..=to)
        .map(|t| {
            focuser.hardware_mut().advance_to(at(t));
            focuser.tick(at(t))
        })
        .collect()
}

/// Tick from `from` until the machine is back in ACCEPT_COMMANDS.
/// Returns the time of the last tick.
fn run_to_idle<H: stepper_focuser::HardwareInterface>(
    focuser: &mut Focuser<H>,
    from: u64,
    advance: impl Fn(&mut Focuser<H>, u64),
) -> u64 {
    for t in from..from + 1_000_000 {
        advance(focuser, t);
        focuser.tick(at(t));
        if t > from && focuser.current_state() == State::AcceptCommands {
            return t;
        }
    }
    panic!("focuser never returned to ACCEPT_COMMANDS");
}

fn mock_clock(focuser: &mut Focuser<TimedMock>, t: u64) {
    focuser.hardware_mut().advance_to(at(t));
}

fn no_clock(_: &mut Focuser<SimulatedFocuser>, _: u64) {}

fn kinds(writes: &[(u64, PinState)]) -> Vec<PinState> {
    writes.iter().map(|(_, s)| *s).collect()
}

fn count(writes: &[(u64, PinState)], state: PinState) -> usize {
    writes.iter().filter(|(_, s)| *s == state).count()
}

// =============================================================================
// Power-on and idle
// =============================================================================

#[test]
fn test_power_on_configuration() {
    let focuser = Focuser::new(TimedMock::quiet(), timing()).unwrap();
    let hw = focuser.hardware();

    assert_eq!(hw.writes(), vec![(0, StepInactive), (0, MotorOff)]);
    assert_eq!(hw.output(Pin::Dir), None);
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

#[test]
fn test_idle_issues_no_writes() {
    let mut focuser = mocked([]);
    let wrote = run(&mut focuser, 0, 500);

    assert!(wrote.iter().all(|w| !w));
    assert!(focuser.hardware().writes().is_empty());
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

// =============================================================================
// Moves
// =============================================================================

#[test]
fn test_golden_move_forward_three() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 3, at(0)))
        .unwrap();

    run(&mut focuser, 0, 12);
    assert_eq!(focuser.current_state(), State::StepperInactiveAndWait);
    assert_eq!(focuser.status().reported_state(), State::Moving);

    assert_eq!(run(&mut focuser, 13, 13), vec![true]);
    assert_eq!(focuser.current_state(), State::AcceptCommands);

    assert_eq!(
        focuser.hardware().writes(),
        vec![
            (0, DirForward),
            (1, MotorOn),
            (4, StepActive),
            (6, StepInactive),
            (7, StepActive),
            (9, StepInactive),
            (10, StepActive),
            (12, StepInactive),
            (13, MotorOff),
        ]
    );
    assert_eq!(focuser.position(), Steps::new(3));
    assert_eq!(focuser.status().last_stop, StopReason::Completed);
}

#[test]
fn test_tick_reports_writes() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 1, at(0)))
        .unwrap();

    let wrote = run(&mut focuser, 0, 8);
    // DIR, MOTOR on, STEP on, STEP off, MOTOR off
    assert_eq!(
        wrote,
        vec![true, true, false, false, true, false, true, true, false]
    );
}

#[test]
fn test_reverse_move_pulses_with_fixed_dir() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Reverse, 7, at(0)))
        .unwrap();
    run_to_idle(&mut focuser, 0, mock_clock);

    let writes = focuser.hardware().writes();
    assert_eq!(count(&writes, StepActive), 7);
    assert_eq!(count(&writes, StepInactive), 7);
    assert_eq!(focuser.hardware().writes_to(Pin::Dir), vec![(0, DirBackward)]);
    // Position of record never goes below home.
    assert_eq!(focuser.position(), Steps::new(0));

    let rises: Vec<u64> = writes
        .iter()
        .filter(|(_, s)| *s == StepActive)
        .map(|(t, _)| *t)
        .collect();
    for pair in rises.windows(2) {
        assert!(pair[1] - pair[0] >= 3, "pulses too close: {:?}", pair);
    }
}

#[test]
fn test_remaining_steps_counts_down() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 3, at(0)))
        .unwrap();

    run(&mut focuser, 0, 5);
    assert_eq!(focuser.remaining_steps(), 3);
    run(&mut focuser, 6, 6);
    assert_eq!(focuser.remaining_steps(), 2);
    run(&mut focuser, 7, 13);
    assert_eq!(focuser.remaining_steps(), 0);
}

#[test]
fn test_commands_wait_out_settle_windows() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 5, at(0)))
        .unwrap();
    run(&mut focuser, 0, 0);
    assert_eq!(focuser.current_state(), State::SetDir);

    // Stop arrives during SET_DIR; the settle windows still run out, then
    // the move ends before its first pulse.
    focuser.submit(CommandPacket::stop(at(0))).unwrap();
    run(&mut focuser, 1, 3);
    assert_eq!(focuser.current_state(), State::StepperActiveAndWait);

    let end = run_to_idle(&mut focuser, 4, mock_clock);
    assert_eq!(end, 5);
    assert_eq!(
        focuser.hardware().writes(),
        vec![(0, DirForward), (1, MotorOn), (5, MotorOff)]
    );
    assert_eq!(focuser.position(), Steps::new(0));
    assert_eq!(focuser.status().last_stop, StopReason::Stopped);
    assert_eq!(focuser.hardware().output(Pin::MotorEnable), Some(MotorOff));
}

// =============================================================================
// Interruption
// =============================================================================

#[test]
fn test_stop_during_steps() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 10, at(0)))
        .unwrap();
    run(&mut focuser, 0, 4);
    focuser.hardware_mut().clear_events();

    focuser.submit(CommandPacket::stop(at(5))).unwrap();
    run(&mut focuser, 5, 7);

    assert_eq!(
        focuser.hardware().writes(),
        vec![(6, StepInactive), (7, MotorOff)]
    );
    assert_eq!(focuser.current_state(), State::AcceptCommands);
    assert_eq!(focuser.position(), Steps::new(1));
    assert_eq!(focuser.remaining_steps(), 0);
    assert_eq!(focuser.status().last_stop, StopReason::Stopped);
}

#[test]
fn test_stop_between_pulses_skips_next_pulse() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 10, at(0)))
        .unwrap();
    run(&mut focuser, 0, 6);
    focuser.hardware_mut().clear_events();

    // STEP went inactive at t6; the pulse due at t7 never happens.
    focuser.submit(CommandPacket::stop(at(7))).unwrap();
    run(&mut focuser, 7, 8);

    assert_eq!(focuser.hardware().writes(), vec![(8, MotorOff)]);
    assert_eq!(focuser.position(), Steps::new(1));
}

#[test]
fn test_new_move_continues_without_power_cycle() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 10, at(0)))
        .unwrap();
    run(&mut focuser, 0, 4);

    focuser
        .submit(CommandPacket::move_by(Direction::Reverse, 2, at(5)))
        .unwrap();
    run(&mut focuser, 5, 14);

    assert_eq!(
        focuser.hardware().writes(),
        vec![
            (0, DirForward),
            (1, MotorOn),
            (4, StepActive),
            (6, StepInactive),
            (7, DirBackward),
            (8, StepActive),
            (10, StepInactive),
            (11, StepActive),
            (13, StepInactive),
            (14, MotorOff),
        ]
    );
    assert_eq!(focuser.position(), Steps::new(0));
    assert_eq!(focuser.status().last_stop, StopReason::Completed);
}

#[test]
fn test_commands_run_in_submission_order() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 1, at(0)))
        .unwrap();
    focuser.submit(CommandPacket::sleep(Millis::ZERO, at(0))).unwrap();

    let end = run_to_idle(&mut focuser, 0, mock_clock);
    run(&mut focuser, end + 1, end + 1);
    assert_eq!(focuser.current_state(), State::Sleep);
    assert_eq!(focuser.position(), Steps::new(1));
}

// =============================================================================
// Home switch
// =============================================================================

#[test]
fn test_home_during_steps_stops() {
    let mut focuser = mocked([(8, HomeActive)]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 10, at(0)))
        .unwrap();
    run(&mut focuser, 0, 7);
    focuser.hardware_mut().clear_events();

    run(&mut focuser, 8, 8);
    assert_eq!(focuser.current_state(), State::StopAtHome);
    assert_eq!(
        focuser.hardware().writes(),
        vec![(8, MotorOff), (8, StepInactive)]
    );
    let status = focuser.status();
    assert_eq!(status.remaining_steps, 0);
    assert_eq!(status.last_stop, StopReason::HomeSwitch);
    assert_eq!(status.position, Steps::new(0));
    assert!(status.homed);

    run(&mut focuser, 9, 30);
    assert_eq!(focuser.current_state(), State::AcceptCommands);
    assert!(focuser.status().fault.is_none());
}

#[test]
fn test_home_overrides_queued_commands() {
    let mut focuser = mocked([(5, HomeActive)]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 10, at(0)))
        .unwrap();
    run(&mut focuser, 0, 4);
    focuser.submit(CommandPacket::stop(at(5))).unwrap();
    run(&mut focuser, 5, 5);

    assert_eq!(focuser.current_state(), State::StopAtHome);
    assert_eq!(focuser.status().last_stop, StopReason::HomeSwitch);
}

#[test]
fn test_home_in_set_dir_faults() {
    let mut focuser = mocked([(1, HomeActive)]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 4, at(0)))
        .unwrap();
    run(&mut focuser, 0, 1);

    assert_eq!(focuser.current_state(), State::Error);
    let fault = focuser.status().fault.unwrap();
    assert_eq!(fault.kind, FaultKind::HomeInconsistent);
    assert_eq!(fault.state, State::SetDir);
    assert_eq!(
        focuser.hardware().writes(),
        vec![(0, DirForward), (1, MotorOff), (1, StepInactive)]
    );
}

#[test]
fn test_home_while_idle_faults() {
    let mut focuser = mocked([(2, HomeActive)]);
    run(&mut focuser, 0, 2);
    assert_eq!(focuser.current_state(), State::AcceptCommands);

    run(&mut focuser, 3, 3);
    assert_eq!(focuser.current_state(), State::Error);
    assert_eq!(
        focuser.status().fault.map(|f| f.state),
        Some(State::AcceptCommands)
    );
    assert_eq!(focuser.status().last_stop, StopReason::Fault);
}

// =============================================================================
// Sleep and error state
// =============================================================================

#[test]
fn test_sleep_wake_round_trip() {
    let mut focuser = mocked([]);
    focuser.submit(CommandPacket::sleep(Millis::ZERO, at(0))).unwrap();
    run(&mut focuser, 0, 0);

    assert_eq!(focuser.current_state(), State::Sleep);
    assert_eq!(
        focuser.hardware().writes(),
        vec![(0, MotorOff), (0, StepInactive)]
    );
    focuser.hardware_mut().clear_events();

    let wrote = run(&mut focuser, 1, 49);
    assert!(wrote.iter().all(|w| !w));
    assert_eq!(focuser.current_state(), State::Sleep);

    // Ignored while asleep.
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 3, at(50)))
        .unwrap();
    focuser.submit(CommandPacket::wake(at(50))).unwrap();
    run(&mut focuser, 50, 60);

    assert_eq!(focuser.current_state(), State::AcceptCommands);
    assert!(focuser.hardware().writes().is_empty());
}

#[test]
fn test_timed_sleep_wakes_itself() {
    let mut focuser = mocked([]);
    focuser.submit(CommandPacket::sleep(Millis::new(10), at(0))).unwrap();

    run(&mut focuser, 0, 9);
    assert_eq!(focuser.current_state(), State::Sleep);
    run(&mut focuser, 10, 10);
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

#[test]
fn test_error_state_accepts_only_reset() {
    let mut focuser = mocked([(2, HomeActive)]);
    run(&mut focuser, 0, 3);
    assert_eq!(focuser.current_state(), State::Error);
    focuser.hardware_mut().clear_events();

    for packet in [
        CommandPacket::move_by(Direction::Forward, 3, at(4)),
        CommandPacket::move_to(10, at(4)),
        CommandPacket::home(at(4)),
        CommandPacket::stop(at(4)),
        CommandPacket::sleep(Millis::ZERO, at(4)),
        CommandPacket::wake(at(4)),
    ] {
        focuser.submit(packet).unwrap();
        let wrote = run(&mut focuser, 4, 4);
        assert_eq!(wrote, vec![false]);
        assert_eq!(focuser.current_state(), State::Error);
    }
    assert!(focuser.hardware().writes().is_empty());

    focuser.submit(CommandPacket::reset(at(5))).unwrap();
    run(&mut focuser, 5, 5);
    assert_eq!(focuser.current_state(), State::AcceptCommands);
    let status = focuser.status();
    assert!(status.fault.is_none());
    assert!(!status.homed);

    // HOME is still closed but it is the new reference level.
    run(&mut focuser, 6, 20);
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

// =============================================================================
// Absolute moves and homing
// =============================================================================

#[test]
fn test_move_to_lower_target_uses_backlash_approach() {
    let mut focuser = FocuserBuilder::new()
        .hardware(TimedMock::quiet())
        .timing(timing())
        .backlash_approach_steps(3)
        .build()
        .unwrap();

    focuser.submit(CommandPacket::move_to(3, at(0))).unwrap();
    let end = run_to_idle(&mut focuser, 0, mock_clock);
    assert_eq!(focuser.position(), Steps::new(3));
    focuser.hardware_mut().clear_events();

    focuser.submit(CommandPacket::move_to(2, at(end + 1))).unwrap();
    run_to_idle(&mut focuser, end + 1, mock_clock);

    assert_eq!(
        kinds(&focuser.hardware().writes()),
        vec![
            DirBackward,
            MotorOn,
            StepActive,
            StepInactive,
            StepActive,
            StepInactive,
            StepActive,
            StepInactive,
            DirForward,
            StepActive,
            StepInactive,
            StepActive,
            StepInactive,
            MotorOff,
        ]
    );
    assert_eq!(focuser.position(), Steps::new(2));
}

#[test]
fn test_move_to_current_position_is_noop() {
    let mut focuser = mocked([]);
    focuser.submit(CommandPacket::move_to(0, at(0))).unwrap();
    let wrote = run(&mut focuser, 0, 10);

    assert!(wrote.iter().all(|w| !w));
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

#[test]
fn test_homing_on_simulator() {
    let sim = SimulatedFocuser::new(Steps::new(250));
    let mut focuser = Focuser::new(sim, timing()).unwrap();
    focuser.submit(CommandPacket::home(at(0))).unwrap();

    let end = run_to_idle(&mut focuser, 0, no_clock);
    let status = focuser.status();
    assert_eq!(focuser.hardware().position(), Steps::new(0));
    assert_eq!(status.position, Steps::new(0));
    assert!(status.homed);
    assert_eq!(status.last_stop, StopReason::HomeSwitch);
    assert!(!focuser.hardware().motor_on());

    // A forward move leaves the switch without tripping it.
    focuser.submit(CommandPacket::move_to(120, at(end + 1))).unwrap();
    run_to_idle(&mut focuser, end + 1, no_clock);
    assert_eq!(focuser.hardware().position(), Steps::new(120));
    assert_eq!(focuser.position(), Steps::new(120));
    assert_eq!(focuser.status().last_stop, StopReason::Completed);
    assert_eq!(focuser.hardware().missed_pulses(), 0);
    assert_eq!(focuser.hardware().dir_changes_mid_pulse(), 0);
}

#[test]
fn test_homing_gives_up_after_budget() {
    let mut focuser = FocuserBuilder::new()
        .hardware(SimulatedFocuser::new(Steps::new(1000)))
        .timing(timing())
        .home_seek_steps(20)
        .build()
        .unwrap();
    focuser.submit(CommandPacket::home(at(0))).unwrap();
    run_to_idle(&mut focuser, 0, no_clock);

    let status = focuser.status();
    assert_eq!(status.last_stop, StopReason::HomeNotFound);
    assert!(!status.homed);
    assert_eq!(focuser.hardware().position(), Steps::new(980));
}

#[test]
fn test_reverse_move_stops_at_home_on_simulator() {
    let sim = SimulatedFocuser::new(Steps::new(5));
    let mut focuser = Focuser::new(sim, timing()).unwrap();
    focuser
        .submit(CommandPacket::move_by(Direction::Reverse, 50, at(0)))
        .unwrap();
    run_to_idle(&mut focuser, 0, no_clock);

    assert_eq!(focuser.hardware().position(), Steps::new(0));
    assert_eq!(focuser.hardware().pulses(), 5);
    assert_eq!(focuser.status().last_stop, StopReason::HomeSwitch);
}

#[test]
fn test_move_to_near_home_passes_switch_and_finishes() {
    let sim = SimulatedFocuser::new(Steps::new(0));
    let mut focuser = Focuser::new(sim, TimingParameters::new(1, 0, 0, 0, 0)).unwrap();

    focuser.submit(CommandPacket::move_to(2000, at(0))).unwrap();
    let end = run_to_idle(&mut focuser, 0, no_clock);
    assert_eq!(focuser.hardware().position(), Steps::new(2000));

    // Approach point clamps to 0, which is where the switch closes.
    focuser.submit(CommandPacket::move_to(200, at(end + 1))).unwrap();
    run_to_idle(&mut focuser, end + 1, no_clock);

    let status = focuser.status();
    assert_eq!(focuser.hardware().position(), Steps::new(200));
    assert_eq!(status.position, Steps::new(200));
    assert!(status.homed);
    assert_eq!(status.last_stop, StopReason::Completed);
    assert!(!focuser.hardware().motor_on());
    assert_eq!(focuser.hardware().dir_changes_mid_pulse(), 0);
}

// =============================================================================
// Submission errors
// =============================================================================

#[test]
fn test_queue_full() {
    let mut focuser = mocked([]);
    for _ in 0..stepper_focuser::focuser::COMMAND_QUEUE_CAPACITY {
        focuser.submit(CommandPacket::stop(at(0))).unwrap();
    }
    assert_eq!(
        focuser.submit(CommandPacket::stop(at(0))),
        Err(Error::Command(CommandError::QueueFull))
    );
}

#[test]
fn test_invalid_argument_rejected() {
    let mut focuser = mocked([]);
    let result = focuser.submit(CommandPacket::move_by(Direction::Forward, -5, at(0)));
    assert_eq!(
        result,
        Err(Error::Command(CommandError::InvalidArgument(
            ArgumentError::NegativeSteps(-5)
        )))
    );

    let wrote = run(&mut focuser, 0, 10);
    assert!(wrote.iter().all(|w| !w));
    assert_eq!(focuser.current_state(), State::AcceptCommands);
}

#[test]
fn test_status_line() {
    let mut focuser = mocked([]);
    focuser
        .submit(CommandPacket::move_by(Direction::Forward, 3, at(0)))
        .unwrap();
    run(&mut focuser, 0, 6);
    assert_eq!(
        focuser.status().to_string(),
        "State: MOVING Position: 1 Remaining: 2 Homed: NO"
    );
}
