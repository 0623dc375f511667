//! Peripheral detection: port scanning and remote discovery.
//!
//! Detection runs once at startup and produces the [`Peripherals`] binding
//! the rest of the system works against. The scanner walks the hub's
//! candidate ports (variant-dependent, see
//! [`HubKind::candidate_ports`](crate::HubKind::candidate_ports)) and tries
//! the device constructors in fixed priority order on each:
//!
//! 1. closed-loop motor (never attempted on `MoveHub`)
//! 2. simple DC motor
//! 3. color sensor
//!
//! Construction failure is how an empty or incompatible port announces
//! itself, so every failure is non-fatal and simply excludes that
//! port/kind combination. The first success per device class wins; the
//! scan stops early once one motor and one sensor are bound.
//!
//! Whether a port that already bound one kind is still probed for the
//! others is configurable via [`ProbePolicy`], since the two firmware
//! generations this replaces disagreed on it.

use tracing::{debug, info, warn};

use crate::config::{ControlConfig, ProbePolicy};
use crate::traits::{MotorDrive, PortId, TrainHub};

/// What command surface a bound motor actually supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotorCapability {
    /// Raw duty-cycle control only.
    SimpleDc,
    /// Closed-loop speed commands with a queryable speed limit.
    SpeedControlled,
}

/// A motor handle together with everything detection learned about it.
///
/// Immutable after detection: the capability class and cached speed limit
/// are decided once and never revisited at runtime.
pub struct BoundMotor<M> {
    /// The live motor handle.
    pub motor: M,
    /// Port the motor was found on.
    pub port: PortId,
    /// Which command surface the motor supports.
    pub capability: MotorCapability,
    /// Cached maximum closed-loop speed magnitude, if the motor is
    /// speed-controlled and the query succeeded. `None` makes the speed
    /// translator fall back to the configured default.
    pub max_speed: Option<i32>,
}

/// The set of peripherals bound at startup.
///
/// At most one motor and one sensor; either may be absent, in which case
/// the corresponding inputs and commands become no-ops for the process
/// lifetime.
pub struct Peripherals<M, S> {
    /// The bound motor, if any port had one.
    pub motor: Option<BoundMotor<M>>,
    /// The bound color sensor, if any port had one.
    pub sensor: Option<S>,
}

impl<M, S> Peripherals<M, S> {
    /// A binding with nothing attached.
    pub fn empty() -> Self {
        Self {
            motor: None,
            sensor: None,
        }
    }
}

/// Scan the hub's candidate ports and bind the first motor and sensor
/// found.
///
/// See the module docs for the probing order. This never fails: a hub
/// with nothing attached yields an empty binding.
pub fn detect_peripherals<H: TrainHub>(
    hub: &mut H,
    config: &ControlConfig,
) -> Peripherals<H::Motor, H::Sensor> {
    let kind = hub.kind();
    let mut found = Peripherals::empty();

    for &port in kind.candidate_ports() {
        let mut port_bound = false;

        if found.motor.is_none() && kind.can_probe_speed_motors() {
            if let Ok(mut motor) = hub.attach_speed_motor(port) {
                let max_speed = match motor.max_speed() {
                    Ok(raw) => Some(raw.abs()),
                    Err(err) => {
                        warn!(%port, ?err, "speed limit query failed, will use default");
                        None
                    }
                };
                debug!(%port, ?max_speed, "bound closed-loop motor");
                found.motor = Some(BoundMotor {
                    motor,
                    port,
                    capability: MotorCapability::SpeedControlled,
                    max_speed,
                });
                port_bound = true;
            }
        }

        if found.motor.is_none() && probe_allowed(config, port_bound) {
            if let Ok(motor) = hub.attach_dc_motor(port) {
                debug!(%port, "bound DC motor");
                found.motor = Some(BoundMotor {
                    motor,
                    port,
                    capability: MotorCapability::SimpleDc,
                    max_speed: None,
                });
                port_bound = true;
            }
        }

        if found.sensor.is_none() && probe_allowed(config, port_bound) {
            if let Ok(sensor) = hub.attach_color_sensor(port) {
                debug!(%port, "bound color sensor");
                found.sensor = Some(sensor);
            }
        }

        if found.motor.is_some() && found.sensor.is_some() {
            break;
        }
    }

    info!(
        hub = kind.as_str(),
        motor = found.motor.is_some(),
        sensor = found.sensor.is_some(),
        "peripheral detection complete"
    );
    found
}

fn probe_allowed(config: &ControlConfig, port_bound: bool) -> bool {
    match config.probe_policy {
        ProbePolicy::IndependentKinds => true,
        ProbePolicy::FirstMatchSkipsPort => !port_bound,
    }
}

/// Scan for a wireless remote with a bounded wait.
///
/// Returns `None` on timeout or any scan error; the loop then treats every
/// remote interaction as a no-op.
pub fn discover_remote<H: TrainHub>(hub: &mut H, config: &ControlConfig) -> Option<H::Remote> {
    match hub.connect_remote(config.remote_name_filter(), config.remote_timeout_ms) {
        Ok(remote) => {
            info!("remote connected");
            Some(remote)
        }
        Err(err) => {
            info!(?err, "no remote found, continuing without one");
            None
        }
    }
}
