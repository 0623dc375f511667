//! # railbrick
//!
//! A control loop for a motorized toy train built from modular hub,
//! motor, color-sensor, and remote-control peripherals.
//!
//! ## Features
//!
//! - **Peripheral auto-detection**: scans the hub's ports at startup and
//!   binds the first motor and color sensor found, with variant-specific
//!   port exclusions for hubs that crash when probed
//! - **Run/stop state machine**: independent manual and color-triggered
//!   stop reasons, debounced buttons, hysteresis-filtered sensor input
//! - **Speed translation**: one percent-based target driving either raw
//!   duty cycle or closed-loop speed, depending on what was detected
//! - **Indicator feedback**: train state mirrored onto every reachable
//!   light
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - hub, motor, sensor, remote, and timing abstractions
//! - `detect` - port scanning and remote discovery
//! - `controller` / `speed` - the state machine and motor command path
//! - `inputs` - debounce, hysteresis, and remote button handling
//! - `runner` - the fixed-period loop driver
//! - `hal` - concrete implementations (mocks and host-side timing)
//!
//! ## Example
//!
//! ```rust
//! use railbrick::config::ControlConfig;
//! use railbrick::hal::{MockClock, MockHub, MockMotor};
//! use railbrick::{HubKind, PortId, TrainLoop, TrainState};
//!
//! // A hub with a DC motor on port A, simulated time
//! let motor = MockMotor::new();
//! let hub = MockHub::new(HubKind::TechnicHub).with_dc_motor(PortId::A, motor.clone());
//! let clock = MockClock::new();
//!
//! let mut train = TrainLoop::bootstrap(
//!     hub.clone(),
//!     clock.clone(),
//!     clock.clone(),
//!     &ControlConfig::default(),
//! );
//!
//! // The train boots manually stopped and never starts unattended
//! assert_eq!(train.controller().state(), TrainState::ManualStop);
//!
//! // One hub-button press starts it at the default 50%
//! hub.set_center(true);
//! train.tick();
//! assert_eq!(train.controller().state(), TrainState::Running);
//! assert_eq!(motor.duty_calls(), vec![50]);
//! ```

#![warn(missing_docs)]

/// Configuration for detection and the control loop.
pub mod config;
/// Run/stop state machine and the controller mediating motor access.
pub mod controller;
/// Peripheral detection: port scanning and remote discovery.
pub mod detect;
/// Hardware abstraction layer implementations (mock and host).
pub mod hal;
/// Indicator feedback mapping state to light colors.
pub mod indicator;
/// Input handling: hub button, remote buttons, color hysteresis.
pub mod inputs;
/// The fixed-period main loop driver.
pub mod runner;
/// Speed translation from percent targets to motor commands.
pub mod speed;
/// Core traits for the hardware abstraction layer.
pub mod traits;

// Re-exports for convenience
pub use config::{ControlConfig, ProbePolicy};
pub use controller::{RunState, TrainController, TrainState};
pub use detect::{detect_peripherals, discover_remote, BoundMotor, MotorCapability, Peripherals};
pub use indicator::{show_state, status_color};
pub use inputs::{ColorVerdict, ColorWatch, HubButton, RemoteHandler};
pub use runner::TrainLoop;
pub use speed::SpeedTranslator;
pub use traits::{
    ButtonSet, Clock, Color, ColorSensor, Delay, HubKind, MotorDrive, PortId, RemoteButton,
    RemoteControl, StopMode, TrainHub,
};
