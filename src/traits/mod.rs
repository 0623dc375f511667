//! Trait definitions for the hardware abstraction layer.
//!
//! Everything the control loop touches in the outside world goes through
//! these traits:
//!
//! - [`TrainHub`]: hub identity, per-port device constructors, center
//!   button, status light
//! - [`MotorDrive`]: duty-cycle and closed-loop speed commands
//! - [`ColorSensor`]: color readings
//! - [`RemoteControl`]: wireless button state and indicator light
//! - [`Clock`] / [`Delay`]: monotonic time and blocking sleep
//!
//! Concrete implementations live in [`crate::hal`].

pub mod hardware;

pub use hardware::*;
