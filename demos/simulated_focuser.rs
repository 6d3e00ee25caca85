//! Simulated focuser example.
//!
//! Runs the focuser state machine against a virtual focuser: homes it,
//! racks out, then comes back in to a lower position through the backlash
//! approach. Prints a status line as the machine changes state.
//!
//! No hardware is needed; the logical clock is a loop counter.

use stepper_focuser::{
    hardware::SimulatedFocuser, parse_config, CommandPacket, Direction, Focuser, Instant, State,
    Steps,
};

const CONFIG: &str = r#"
[timing]
pulse_width_ms = 1
dir_settle_ms = 1
motor_settle_ms = 20
inter_step_ms = 1
home_debounce_ms = 10

[motion]
backlash_approach_steps = 100
home_seek_steps = 5000
"#;

fn run<F>(focuser: &mut Focuser<SimulatedFocuser>, now: &mut u64, command: F)
where
    F: FnOnce(Instant) -> CommandPacket,
{
    let packet = command(Instant::new(*now));
    println!("> {}", packet.kind);
    if let Err(e) = focuser.submit(packet) {
        println!("  rejected: {}", e);
        return;
    }

    let mut last = focuser.current_state();
    loop {
        focuser.tick(Instant::new(*now));
        let state = focuser.current_state();
        if state != last {
            println!("  t={:>6}  {}", now, focuser.status());
            last = state;
        }
        *now += 1;
        if state == State::AcceptCommands {
            break;
        }
    }
}

fn main() {
    println!("=== Simulated Focuser Example ===\n");

    let config = parse_config(CONFIG).expect("Invalid configuration");
    let sim = SimulatedFocuser::new(Steps::new(1234)).with_travel_limit(Steps::new(4000));
    let mut focuser = Focuser::from_config(sim, &config).expect("Failed to create focuser");

    let mut now = 0;
    run(&mut focuser, &mut now, CommandPacket::home);
    run(&mut focuser, &mut now, |t| CommandPacket::move_to(800, t));
    run(&mut focuser, &mut now, |t| CommandPacket::move_to(650, t));
    run(&mut focuser, &mut now, |t| CommandPacket::move_by(Direction::Reverse, -1, t));

    let sim = focuser.hardware();
    println!("\nMechanical position: {}", sim.position().value());
    println!("Pulses issued:       {}", sim.pulses());
    println!("Status:              {}", focuser.status());
}
