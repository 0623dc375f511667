//! Desktop simulator for the train control loop.
//!
//! Wires a scripted mock hub to the real loop and walks it through a
//! short scenario: manual start, a red patch of track, automatic resume,
//! a remote speed step, and a manual stop. Useful for watching the
//! state machine behave without owning any of the hardware.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin railbrick-sim              # simulate a technichub
//! cargo run --bin railbrick-sim movehub      # restricted port set
//! RUST_LOG=railbrick=debug cargo run --bin railbrick-sim
//! ```

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use railbrick::config::ControlConfig;
use railbrick::hal::{HostClock, MockHub, MockMotor, MockRemote, MockSensor};
use railbrick::{ButtonSet, Color, Delay, HubKind, PortId, RemoteButton, TrainLoop};

/// Scenario length in ticks (20ms each).
const SCENARIO_TICKS: u32 = 500;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!();
    println!("================================");
    println!("  railbrick simulator");
    println!("================================");
    println!();

    // =========================================================================
    // Hub selection
    // =========================================================================
    let kind_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "technichub".into());
    let kind = HubKind::from_name(&kind_name)
        .ok_or_else(|| anyhow!("unsupported hub type: {kind_name}"))?;
    println!("Hub:    {}", kind.as_str());

    // =========================================================================
    // Scripted hardware
    // =========================================================================
    // Devices sit on C and D so the scenario also works on a movehub,
    // where A and B are never probed.
    let motor = MockMotor::new();
    let sensor = MockSensor::new();
    let remote = MockRemote::new();
    let hub = MockHub::new(kind)
        .with_speed_motor(PortId::C, motor.clone())
        .with_color_sensor(PortId::D, sensor.clone())
        .with_remote(remote.clone());

    let config = ControlConfig::default();
    let mut train = TrainLoop::bootstrap(hub.clone(), HostClock::new(), HostClock::new(), &config);

    println!(
        "Bound:  motor={} sensor={} remote={}",
        train.controller().has_motor(),
        train.sensor_bound(),
        train.remote_bound()
    );
    println!();
    println!("Running scripted scenario ({SCENARIO_TICKS} ticks at 20ms)...");
    println!();

    // =========================================================================
    // Scenario loop
    // =========================================================================
    let mut delay = HostClock::new();
    let mut last_state = train.controller().state();

    for tick in 0..SCENARIO_TICKS {
        match tick {
            // Press and release the hub button: manual start
            50 => hub.set_center(true),
            52 => hub.set_center(false),
            // The train crosses a red patch of track
            150 => sensor.feed_times(Color::Red, 6),
            // Bump the speed from the remote
            300 => remote.press(ButtonSet::from(RemoteButton::LeftPlus)),
            // Manual stop from the remote
            420 => remote.press(ButtonSet::from(RemoteButton::Center)),
            _ => {}
        }

        train.tick();

        let state = train.controller().state();
        if state != last_state {
            println!(
                "[{:>6}ms] {:?} (requested {}%, applied {:?})",
                tick * config.loop_ms,
                state,
                train.controller().requested_percent(),
                train.controller().current_percent(),
            );
            last_state = state;
        }

        delay.delay_ms(config.loop_ms);
    }

    // =========================================================================
    // Summary
    // =========================================================================
    println!();
    println!("Motor speed commands: {:?}", motor.speed_calls());
    println!("Motor stops:          {:?}", motor.stop_mode_calls());
    println!("Hub light history:    {:?}", hub.lights());
    println!("Remote light history: {:?}", remote.lights());

    Ok(())
}
