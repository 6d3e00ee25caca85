//! The focuser state machine.
//!
//! [`StateStack`] owns the command queue, the state timers and the
//! bookkeeping of the move in progress. Each [`tick`](StateStack::tick)
//! reads HOME, checks the active timer, performs at most one transition
//! and the pin writes that go with it, then returns. Nothing blocks.

use heapless::Deque;

use crate::config::units::{Instant, Millis, Steps};
use crate::config::{MotionConfig, TimingParameters};
use crate::error::{CommandError, Fault, FaultKind, HardwareError, Invariant};
use crate::hardware::{HardwareInterface, Pin, PinState};

use super::command::{interrupts, CommandKind, CommandPacket, Direction, StateArgument};
use super::state::State;
use super::status::{Status, StopReason};
use super::timer::TimedEvent;

/// Maximum number of commands waiting to be processed.
pub const COMMAND_QUEUE_CAPACITY: usize = 8;

type CommandQueue = Deque<CommandPacket, COMMAND_QUEUE_CAPACITY>;

/// One leg of travel in a single direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    direction: Direction,
    steps: u32,
}

impl Segment {
    /// `None` when there is nothing to travel.
    fn new(direction: Direction, steps: u32) -> Option<Self> {
        (steps > 0).then_some(Self { direction, steps })
    }
}

/// The move currently owning the motor.
#[derive(Debug, Clone, Copy)]
struct ActiveMove {
    direction: Direction,
    remaining: u32,
    /// Second leg of a backlash approach.
    follow_up: Option<Segment>,
    homing: bool,
    /// Destination of an absolute move travelling in REVERSE.
    target: Option<i64>,
    /// Set once HOME has been seen released during this leg.
    home_armed: bool,
    /// Why the move was cut short, if it was.
    outcome: Option<StopReason>,
}

impl ActiveMove {
    fn new(first: Segment, follow_up: Option<Segment>) -> Self {
        Self {
            direction: first.direction,
            remaining: first.steps,
            follow_up,
            homing: false,
            target: None,
            home_armed: false,
            outcome: None,
        }
    }

    fn pending_steps(&self) -> u32 {
        self.remaining
            .saturating_add(self.follow_up.map(|s| s.steps).unwrap_or(0))
    }

    fn finished_reason(&self) -> StopReason {
        match self.outcome {
            Some(reason) => reason,
            None if self.homing => StopReason::HomeNotFound,
            None => StopReason::Completed,
        }
    }
}

/// Last value written to each output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outputs {
    step: PinState,
    dir: Option<PinState>,
    motor: PinState,
}

impl Outputs {
    const fn safe() -> Self {
        Self {
            step: PinState::StepInactive,
            dir: None,
            motor: PinState::MotorOff,
        }
    }
}

fn distance(from: i64, to: i64) -> u32 {
    u32::try_from(from.abs_diff(to)).unwrap_or(u32::MAX)
}

/// The focuser state machine engine.
#[derive(Debug, Clone)]
pub struct StateStack {
    state: State,
    queue: CommandQueue,
    timer: TimedEvent,
    debounce: TimedEvent,
    motion: MotionConfig,
    active: Option<ActiveMove>,
    position: Steps,
    homed: bool,
    last_stop: StopReason,
    fault: Option<Fault>,
    outputs: Outputs,
    home: PinState,
    wrote: bool,
}

impl StateStack {
    /// A machine idling in ACCEPT_COMMANDS at position zero.
    pub fn new(motion: MotionConfig) -> Self {
        Self {
            state: State::AcceptCommands,
            queue: Deque::new(),
            timer: TimedEvent::new(),
            debounce: TimedEvent::new(),
            motion,
            active: None,
            position: Steps::new(0),
            homed: false,
            last_stop: StopReason::None,
            fault: None,
            outputs: Outputs::safe(),
            home: PinState::HomeInactive,
            wrote: false,
        }
    }

    /// Put the pins in their safe power-on configuration.
    ///
    /// Sets every pin's mode, drives STEP inactive and the motor off, and
    /// samples HOME as the reference level. DIR is left alone until the
    /// first move.
    pub fn configure<H>(&mut self, hw: &mut H) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        for pin in Pin::ALL {
            hw.set_mode(pin, pin.required_mode())?;
        }
        self.write(hw, PinState::StepInactive)?;
        self.write(hw, PinState::MotorOff)?;
        self.home = hw.read(Pin::Home)?;
        info!("pins configured, home switch {}", self.home.name());
        Ok(())
    }

    /// Queue a command.
    ///
    /// A malformed argument is rejected without touching the queue. A full
    /// queue drops the packet.
    pub fn submit(&mut self, packet: CommandPacket) -> Result<(), CommandError> {
        packet.validate()?;
        self.queue.push_back(packet).map_err(|_| {
            warn!("command queue full, dropping {}", packet.kind.name());
            CommandError::QueueFull
        })
    }

    /// Current engine state.
    #[inline]
    pub fn current_state(&self) -> State {
        self.state
    }

    /// Steps left in the move in progress.
    #[inline]
    pub fn remaining_steps(&self) -> u32 {
        self.active.map(|m| m.pending_steps()).unwrap_or(0)
    }

    /// Position of record.
    #[inline]
    pub fn position(&self) -> Steps {
        self.position
    }

    /// Whether the home switch has set the position.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Commands waiting in the queue.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot for status reporting.
    pub fn status(&self) -> Status {
        Status {
            state: self.state,
            position: self.position,
            remaining_steps: self.remaining_steps(),
            homed: self.homed,
            last_stop: self.last_stop,
            fault: self.fault,
        }
    }

    /// Advance the machine to `now`.
    ///
    /// Returns whether any pin was written. Hardware failures and broken
    /// output invariants are not returned; they park the machine in
    /// ERROR_STATE with the fault recorded in [`status`](Self::status).
    pub fn tick<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> bool
    where
        H: HardwareInterface + ?Sized,
    {
        self.wrote = false;
        match self.step(hw, timing, now) {
            Err(e) => self.fail(hw, FaultKind::Hardware(e)),
            Ok(()) => {
                if let Some(invariant) = self.broken_invariant() {
                    self.fail(hw, FaultKind::InvariantViolation(invariant));
                }
            }
        }
        self.wrote
    }

    fn step<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        match self.state {
            State::AcceptCommands => self.accept_commands(hw, timing, now),
            State::SetDir => self.set_dir(hw, timing, now),
            State::StepperActiveAndWait => self.stepper_active_wait(hw, timing, now),
            State::DoSteps => self.do_steps(hw, timing, now),
            State::StepperInactiveAndWait => self.stepper_inactive_wait(hw, timing, now),
            State::StopAtHome => {
                self.transition(State::AcceptCommands);
                Ok(())
            }
            State::Sleep => self.sleep(hw, now),
            State::Error => self.error(hw),
            // Reporting alias for the motion phases; never occupied.
            State::Moving => Ok(()),
        }
    }

    // ACCEPT_COMMANDS

    fn accept_commands<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let home = hw.read(Pin::Home)?;
        if self.home_held(home, timing.home_debounce, now) {
            self.fail(hw, FaultKind::HomeInconsistent);
            return Ok(());
        }

        let Some(packet) = self.queue.pop_front() else {
            return Ok(());
        };

        if packet.kind.is_motion() {
            match self.plan(&packet) {
                Some(active) => {
                    debug!("{} accepted", packet.kind.name());
                    self.active = Some(active);
                    self.enter_set_dir(hw, timing, now)
                }
                None => {
                    debug!("{} needs no travel", packet.kind.name());
                    Ok(())
                }
            }
        } else if let StateArgument::Duration(duration) = packet.argument {
            self.enter_sleep(hw, duration, now)
        } else {
            debug!("{} ignored in {}", packet.kind.name(), self.state.name());
            Ok(())
        }
    }

    /// Debounce a rising HOME edge seen while idle.
    fn home_held(&mut self, home: PinState, debounce: Millis, now: Instant) -> bool {
        let rising = home == PinState::HomeActive && self.home == PinState::HomeInactive;
        self.home = home;

        if home == PinState::HomeInactive {
            self.debounce.cancel();
            return false;
        }
        if rising {
            self.debounce.start(now, debounce);
        }
        if self.debounce.has_elapsed(now) {
            self.debounce.cancel();
            return true;
        }
        false
    }

    /// Turn a motion command into travel from the current position.
    fn plan(&self, packet: &CommandPacket) -> Option<ActiveMove> {
        match (packet.kind, packet.argument) {
            (CommandKind::Move, StateArgument::Steps { direction, count }) => {
                let steps = u32::try_from(count).ok()?;
                Segment::new(direction, steps).map(|s| ActiveMove::new(s, None))
            }
            (CommandKind::MoveTo, StateArgument::Position(target)) => self.plan_absolute(i64::from(target)),
            (CommandKind::Home, _) => {
                let seek = Segment::new(Direction::Reverse, self.motion.home_seek_steps)?;
                Some(ActiveMove {
                    homing: true,
                    ..ActiveMove::new(seek, None)
                })
            }
            _ => None,
        }
    }

    /// Absolute moves always finish travelling forward. A target below the
    /// current position is approached from `backlash_approach_steps` below
    /// it (clamped at zero), so the gear train ends loaded the same way.
    fn plan_absolute(&self, target: i64) -> Option<ActiveMove> {
        let here = self.position.value();
        if target >= here {
            return Segment::new(Direction::Forward, distance(here, target)).map(|s| ActiveMove::new(s, None));
        }

        let approach = target
            .saturating_sub(i64::from(self.motion.backlash_approach_steps))
            .max(0)
            .min(target);
        let back = Segment::new(Direction::Reverse, distance(here, approach))?;
        let forward = Segment::new(Direction::Forward, distance(approach, target));
        Some(ActiveMove {
            target: Some(target),
            ..ActiveMove::new(back, forward)
        })
    }

    // SET_DIR

    fn enter_set_dir<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let home = hw.read(Pin::Home)?;
        self.home = home;

        let direction = match self.active.as_mut() {
            Some(active) => {
                active.home_armed = home == PinState::HomeInactive;
                active.direction
            }
            None => return Ok(()),
        };

        self.write(hw, direction.pin_state())?;
        self.timer.start(now, timing.dir_settle);
        self.transition(State::SetDir);
        Ok(())
    }

    fn set_dir<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let home = hw.read(Pin::Home)?;
        let rising = home == PinState::HomeActive && self.home == PinState::HomeInactive;
        self.home = home;
        if rising {
            self.fail(hw, FaultKind::HomeInconsistent);
            return Ok(());
        }

        if !self.timer.has_elapsed(now) {
            return Ok(());
        }

        if self.outputs.motor == PinState::MotorOn {
            self.enter_do_steps(hw, timing, now)
        } else {
            self.write(hw, PinState::MotorOn)?;
            self.timer.start(now, timing.motor_settle);
            self.transition(State::StepperActiveAndWait);
            Ok(())
        }
    }

    // STEPPER_ACTIVE_AND_WAIT

    fn stepper_active_wait<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        if self.home_reached(hw)? {
            return self.home_contact(hw, timing, now);
        }
        if self.timer.has_elapsed(now) {
            self.enter_do_steps(hw, timing, now)
        } else {
            Ok(())
        }
    }

    // DO_STEPS

    fn enter_do_steps<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        self.transition(State::DoSteps);
        // Commands that arrived during a settle window.
        self.check_interrupts();
        if self.remaining_in_leg() == 0 {
            self.enter_inactive_wait(timing, now);
            return Ok(());
        }
        self.pulse(hw, timing, now)
    }

    fn pulse<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        self.write(hw, PinState::StepActive)?;
        self.timer.start(now, timing.pulse_width);
        Ok(())
    }

    fn do_steps<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        if self.home_reached(hw)? {
            return self.home_contact(hw, timing, now);
        }
        self.check_interrupts();

        let remaining = self.remaining_in_leg();
        if self.outputs.step == PinState::StepActive {
            // A pulse in flight always runs its full width.
            if !self.timer.has_elapsed(now) {
                return Ok(());
            }
            self.write(hw, PinState::StepInactive)?;
            self.count_step();
            if self.remaining_in_leg() == 0 {
                self.enter_inactive_wait(timing, now);
            } else {
                self.timer.start(now, timing.inter_step);
            }
            Ok(())
        } else if remaining == 0 {
            self.enter_inactive_wait(timing, now);
            Ok(())
        } else if self.timer.has_elapsed(now) {
            self.pulse(hw, timing, now)
        } else {
            Ok(())
        }
    }

    fn remaining_in_leg(&self) -> u32 {
        self.active.map(|m| m.remaining).unwrap_or(0)
    }

    fn count_step(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.remaining = active.remaining.saturating_sub(1);
            // Home is the low end of travel.
            self.position = Steps::new((self.position.value() + active.direction.sign()).max(0));
        }
    }

    // STEPPER_INACTIVE_AND_WAIT

    fn enter_inactive_wait(&mut self, timing: &TimingParameters, now: Instant) {
        self.timer.start(now, timing.inter_step);
        self.transition(State::StepperInactiveAndWait);
    }

    fn stepper_inactive_wait<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        if self.home_reached(hw)? {
            return self.home_contact(hw, timing, now);
        }
        self.check_interrupts();
        if !self.timer.has_elapsed(now) {
            return Ok(());
        }

        // Second leg of the same move: motor stays on.
        if let Some(active) = self.active.as_mut() {
            if let Some(next) = active.follow_up.take() {
                active.direction = next.direction;
                active.remaining = next.steps;
                return self.enter_set_dir(hw, timing, now);
            }
        }

        // A queued motion command continues without power cycling.
        if self.queue.front().map(|p| p.kind.is_motion()).unwrap_or(false) {
            if let Some(packet) = self.queue.pop_front() {
                if let Some(next) = self.plan(&packet) {
                    debug!("{} continues motion", packet.kind.name());
                    self.finish_move();
                    self.active = Some(next);
                    return self.enter_set_dir(hw, timing, now);
                }
            }
        }

        self.finish_move();
        self.write(hw, PinState::MotorOff)?;
        self.transition(State::AcceptCommands);
        Ok(())
    }

    fn finish_move(&mut self) {
        if let Some(active) = self.active.take() {
            self.last_stop = active.finished_reason();
            debug!("move ended: {}", self.last_stop.name());
        }
    }

    /// Scan the queue for a command that preempts the current move.
    ///
    /// A `stop` anywhere in the queue wins and takes the motion commands
    /// queued ahead of it along. Otherwise a queued motion command cuts the
    /// current move short and stays queued to run next.
    fn check_interrupts(&mut self) {
        let state = self.state;
        let stop = self
            .queue
            .iter()
            .position(|p| p.kind == CommandKind::Stop && interrupts(state, p.kind));

        let reason = if let Some(index) = stop {
            self.drain_motion_through(index);
            StopReason::Stopped
        } else if self.queue.iter().any(|p| interrupts(state, p.kind)) {
            StopReason::Superseded
        } else {
            return;
        };

        if let Some(active) = self.active.as_mut() {
            if active.outcome.is_none() || reason == StopReason::Stopped {
                debug!("move interrupted: {}", reason.name());
                active.outcome = Some(reason);
            }
            active.remaining = 0;
            active.follow_up = None;
            active.target = None;
        }
    }

    /// Remove the command at `index` and every motion command before it.
    fn drain_motion_through(&mut self, index: usize) {
        let mut kept = CommandQueue::new();
        let mut i = 0;
        while let Some(packet) = self.queue.pop_front() {
            let consumed = i == index || (i < index && packet.kind.is_motion());
            if !consumed {
                // Same capacity, cannot overflow.
                let _ = kept.push_back(packet);
            }
            i += 1;
        }
        self.queue = kept;
    }

    // STOP_AT_HOME

    fn home_reached<H>(&mut self, hw: &mut H) -> Result<bool, HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let home = hw.read(Pin::Home)?;
        self.home = home;

        let Some(active) = self.active.as_mut() else {
            return Ok(false);
        };
        if home == PinState::HomeInactive {
            active.home_armed = true;
            return Ok(false);
        }
        Ok(active.home_armed || active.direction == Direction::Reverse)
    }

    /// HOME closed under a move. An absolute move still travelling in
    /// REVERSE re-references at home and finishes FORWARD to its target;
    /// everything else stops here.
    fn home_contact<H>(&mut self, hw: &mut H, timing: &TimingParameters, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let resume = self
            .active
            .filter(|m| m.direction == Direction::Reverse && m.outcome.is_none())
            .and_then(|m| m.target)
            .and_then(|target| Segment::new(Direction::Forward, distance(0, target)));
        let Some(leg) = resume else {
            return self.enter_stop_at_home(hw);
        };

        if self.outputs.step == PinState::StepActive {
            self.write(hw, PinState::StepInactive)?;
        }
        self.position = Steps::new(0);
        self.homed = true;
        info!("home switch passed, position zeroed");
        if let Some(active) = self.active.as_mut() {
            active.direction = leg.direction;
            active.remaining = leg.steps;
            active.follow_up = None;
            active.target = None;
        }
        self.enter_set_dir(hw, timing, now)
    }

    fn enter_stop_at_home<H>(&mut self, hw: &mut H) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        self.write(hw, PinState::MotorOff)?;
        if self.outputs.step == PinState::StepActive {
            self.write(hw, PinState::StepInactive)?;
        }
        self.active = None;
        self.timer.cancel();
        self.position = Steps::new(0);
        self.homed = true;
        self.last_stop = StopReason::HomeSwitch;
        info!("home switch reached, position zeroed");
        self.transition(State::StopAtHome);
        Ok(())
    }

    // SLEEP

    fn enter_sleep<H>(&mut self, hw: &mut H, duration: Millis, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        self.write(hw, PinState::MotorOff)?;
        self.write(hw, PinState::StepInactive)?;
        if duration.is_zero() {
            self.timer.cancel();
        } else {
            self.timer.start(now, duration);
        }
        self.transition(State::Sleep);
        Ok(())
    }

    fn sleep<H>(&mut self, hw: &mut H, now: Instant) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let woken = self.take_through(CommandKind::Wake);
        if woken || self.timer.has_elapsed(now) {
            self.timer.cancel();
            self.home = hw.read(Pin::Home)?;
            self.transition(State::AcceptCommands);
        }
        Ok(())
    }

    // ERROR_STATE

    fn error<H>(&mut self, hw: &mut H) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        if self.take_through(CommandKind::Reset) {
            info!("reset, position no longer referenced to home");
            self.fault = None;
            self.homed = false;
            self.debounce.cancel();
            self.home = hw.read(Pin::Home)?;
            self.transition(State::AcceptCommands);
        }
        Ok(())
    }

    /// Consume queued commands up to and including the first `kind`.
    ///
    /// Without a `kind` in the queue, everything queued is discarded.
    fn take_through(&mut self, kind: CommandKind) -> bool {
        while let Some(packet) = self.queue.pop_front() {
            if packet.kind == kind {
                return true;
            }
            debug!("{} ignored in {}", packet.kind.name(), self.state.name());
        }
        false
    }

    // Faults and invariants

    fn fail<H>(&mut self, hw: &mut H, kind: FaultKind)
    where
        H: HardwareInterface + ?Sized,
    {
        warn!("fault in {}, entering error state", self.state.name());
        self.fault = Some(Fault {
            kind,
            state: self.state,
        });
        self.last_stop = StopReason::Fault;
        self.active = None;
        self.timer.cancel();
        self.debounce.cancel();

        if self.write(hw, PinState::MotorOff).is_err() {
            warn!("could not disable motor");
        }
        if self.write(hw, PinState::StepInactive).is_err() {
            warn!("could not release step line");
        }
        self.transition(State::Error);
    }

    fn broken_invariant(&self) -> Option<Invariant> {
        // The error state has already done what it can.
        if self.state == State::Error {
            return None;
        }
        if self.state.requires_motor_off() && self.outputs.motor == PinState::MotorOn {
            return Some(Invariant::MotorOffWhenIdle);
        }
        if self.state != State::DoSteps && self.outputs.step == PinState::StepActive {
            return Some(Invariant::StepInactiveOutsideSteps);
        }
        None
    }

    // Plumbing

    fn write<H>(&mut self, hw: &mut H, state: PinState) -> Result<(), HardwareError>
    where
        H: HardwareInterface + ?Sized,
    {
        let pin = state.pin();
        hw.write(pin, state)?;
        match pin {
            Pin::Step => self.outputs.step = state,
            Pin::Dir => self.outputs.dir = Some(state),
            Pin::MotorEnable => self.outputs.motor = state,
            Pin::Home => {}
        }
        self.wrote = true;
        Ok(())
    }

    fn transition(&mut self, next: State) {
        if next != self.state {
            debug!("{} -> {}", self.state.name(), next.name());
            self.state = next;
        }
    }
}
