//! Hardware abstraction traits for hubs, motors, color sensors, and remotes.
//!
//! This module defines the interfaces that let railbrick drive any hub
//! implementation, from the scripted mocks in [`crate::hal::mock`] to a
//! bridge onto real hardware.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TrainHub`] | Hub identity, per-port device constructors, button, light |
//! | [`MotorDrive`] | Duty-cycle and closed-loop speed commands |
//! | [`ColorSensor`] | Color readings for the stop/resume trigger |
//! | [`RemoteControl`] | Wireless button state and indicator light |
//! | [`Clock`] | Monotonic time source |
//! | [`Delay`] | Blocking sleep for loop pacing |
//!
//! # Failure model
//!
//! Every hardware operation returns a `Result` with a per-trait error type.
//! Device construction failure means nothing usable is attached on that
//! port; runtime command failure is transient. Callers decide the policy
//! (skip the port, retry next tick, fall back), never this layer.

use core::fmt;

/// Hub variant, as reported by the firmware identity query.
///
/// The variant drives two policies: which ports are safe to probe during
/// detection, and whether closed-loop motor construction may be attempted
/// at all (see [`HubKind::candidate_ports`] and
/// [`HubKind::can_probe_speed_motors`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HubKind {
    /// Four-port hub with an internal IMU.
    TechnicHub,
    /// Two-port hub commonly built into train bases.
    CityHub,
    /// Six-port hub with a display matrix.
    PrimeHub,
    /// Two-port compact hub.
    EssentialHub,
    /// Four-port hub with two ports wired to internal motors.
    MoveHub,
}

/// Ports probed on every variant except `MoveHub`.
const FULL_PORT_SET: [PortId; 6] = [
    PortId::A,
    PortId::B,
    PortId::C,
    PortId::D,
    PortId::E,
    PortId::F,
];

/// Ports safe to probe on `MoveHub`. A and B sit on the internal motor
/// bus and probing them can crash the hub firmware.
const MOVE_HUB_PORT_SET: [PortId; 2] = [PortId::C, PortId::D];

impl HubKind {
    /// Returns the variant as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HubKind::TechnicHub => "technichub",
            HubKind::CityHub => "cityhub",
            HubKind::PrimeHub => "primehub",
            HubKind::EssentialHub => "essentialhub",
            HubKind::MoveHub => "movehub",
        }
    }

    /// Parse a hub variant from its firmware identity string.
    ///
    /// Input is trimmed and case-insensitive. Returns `None` for anything
    /// unrecognized; startup treats that as fatal, since no port policy
    /// can be chosen for an unknown hub.
    ///
    /// # Examples
    ///
    /// ```
    /// use railbrick::HubKind;
    ///
    /// assert_eq!(HubKind::from_name("technichub"), Some(HubKind::TechnicHub));
    /// assert_eq!(HubKind::from_name("  CityHub "), Some(HubKind::CityHub));
    /// assert_eq!(HubKind::from_name("gardenhub"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technichub" => Some(HubKind::TechnicHub),
            "cityhub" => Some(HubKind::CityHub),
            "primehub" => Some(HubKind::PrimeHub),
            "essentialhub" => Some(HubKind::EssentialHub),
            "movehub" => Some(HubKind::MoveHub),
            _ => None,
        }
    }

    /// The ports the detector is allowed to probe on this variant.
    ///
    /// Variants with fewer physical ports than the list suggests are fine:
    /// construction on an absent port fails cleanly and the detector moves
    /// on. The only hard exclusion is `MoveHub`, where ports A and B must
    /// never be touched.
    pub const fn candidate_ports(&self) -> &'static [PortId] {
        match self {
            HubKind::MoveHub => &MOVE_HUB_PORT_SET,
            _ => &FULL_PORT_SET,
        }
    }

    /// Whether closed-loop motor construction may be attempted during
    /// detection. `MoveHub` firmware crashes on that probe, so detection
    /// falls back to plain DC motors there.
    pub const fn can_probe_speed_motors(&self) -> bool {
        !matches!(self, HubKind::MoveHub)
    }
}

/// A labeled physical connector on the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortId {
    /// Port A.
    A,
    /// Port B.
    B,
    /// Port C.
    C,
    /// Port D.
    D,
    /// Port E.
    E,
    /// Port F.
    F,
}

impl PortId {
    /// Single-letter label, matching the marking on the hub shell.
    #[inline]
    pub const fn label(&self) -> char {
        match self {
            PortId::A => 'A',
            PortId::B => 'B',
            PortId::C => 'C',
            PortId::D => 'D',
            PortId::E => 'E',
            PortId::F => 'F',
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A detected or commanded color value.
///
/// Used both as sensor output and as an indicator light setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Color {
    /// No color detected, or light off.
    #[default]
    None,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
    /// Orange.
    Orange,
    /// White.
    White,
}

/// How a motor should come to rest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopMode {
    /// Short the windings for passive braking.
    #[default]
    Brake,
    /// Cut power and let the train coast.
    Coast,
    /// Actively hold position (closed-loop motors only).
    Hold,
}

/// A button on the wireless remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RemoteButton {
    /// The green center button.
    Center,
    /// Plus button on the left cluster.
    LeftPlus,
    /// Minus button on the left cluster.
    LeftMinus,
    /// Plus button on the right cluster.
    RightPlus,
    /// Minus button on the right cluster.
    RightMinus,
}

impl RemoteButton {
    const fn bit(self) -> u8 {
        match self {
            RemoteButton::Center => 1 << 0,
            RemoteButton::LeftPlus => 1 << 1,
            RemoteButton::LeftMinus => 1 << 2,
            RemoteButton::RightPlus => 1 << 3,
            RemoteButton::RightMinus => 1 << 4,
        }
    }
}

/// The set of remote buttons reported pressed in one poll.
///
/// A compact bitmask so a reading can be copied around and compared
/// cheaply.
///
/// # Examples
///
/// ```
/// use railbrick::{ButtonSet, RemoteButton};
///
/// let pressed = ButtonSet::EMPTY
///     .with(RemoteButton::Center)
///     .with(RemoteButton::LeftPlus);
///
/// assert!(pressed.contains(RemoteButton::Center));
/// assert!(!pressed.is_only(RemoteButton::Center));
/// assert!(ButtonSet::from(RemoteButton::Center).is_only(RemoteButton::Center));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonSet(u8);

impl ButtonSet {
    /// No buttons pressed.
    pub const EMPTY: ButtonSet = ButtonSet(0);

    /// Returns a copy of the set with `button` added.
    #[must_use]
    pub const fn with(self, button: RemoteButton) -> Self {
        ButtonSet(self.0 | button.bit())
    }

    /// Whether `button` is in the set.
    pub const fn contains(&self, button: RemoteButton) -> bool {
        self.0 & button.bit() != 0
    }

    /// Whether `button` is pressed and nothing else is.
    pub const fn is_only(&self, button: RemoteButton) -> bool {
        self.0 == button.bit()
    }

    /// Whether no buttons are pressed.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<RemoteButton> for ButtonSet {
    fn from(button: RemoteButton) -> Self {
        ButtonSet::EMPTY.with(button)
    }
}

/// Motor command surface shared by both capability classes.
///
/// A simple DC motor only honors [`set_duty`](Self::set_duty) and the stop
/// calls; a closed-loop motor additionally honors
/// [`run_speed`](Self::run_speed) and can report its speed limit. Which
/// commands the controller issues is decided once at detection time, not
/// per call, so implementations for simple motors should just return an
/// error from the closed-loop methods.
pub trait MotorDrive {
    /// Error type for motor operations.
    type Error: fmt::Debug;

    /// Apply a signed duty cycle in percent, -100 to 100.
    fn set_duty(&mut self, percent: i16) -> Result<(), Self::Error>;

    /// Run at a closed-loop speed in raw device units (typically deg/s).
    fn run_speed(&mut self, raw: i32) -> Result<(), Self::Error>;

    /// Stop with an explicit rest behavior.
    fn stop_with_mode(&mut self, mode: StopMode) -> Result<(), Self::Error>;

    /// Stop with the device's own default rest behavior.
    ///
    /// Kept separate from [`stop_with_mode`](Self::stop_with_mode) because
    /// some firmware rejects a mode argument while still honoring a plain
    /// stop; the fallback chain in the speed translator relies on that.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Query the maximum closed-loop speed magnitude in raw units.
    fn max_speed(&mut self) -> Result<i32, Self::Error>;
}

/// Color/distance sensor reduced to the one reading the loop needs.
pub trait ColorSensor {
    /// Error type for sensor operations.
    type Error: fmt::Debug;

    /// Read the currently detected color.
    fn read_color(&mut self) -> Result<Color, Self::Error>;
}

/// Wireless remote: button state plus its own indicator light.
pub trait RemoteControl {
    /// Error type for remote operations.
    type Error: fmt::Debug;

    /// Read the set of currently pressed buttons.
    fn pressed(&mut self) -> Result<ButtonSet, Self::Error>;

    /// Set the remote's indicator light.
    fn set_light(&mut self, color: Color) -> Result<(), Self::Error>;
}

/// The hub itself: identity, device constructors, button, and light.
///
/// Construction methods are the probe primitives of peripheral detection.
/// Each either yields a live device handle for that port or fails because
/// nothing compatible is attached there; failure carries no further
/// meaning and must leave the hub usable.
pub trait TrainHub {
    /// Motor handle type produced by the motor constructors.
    type Motor: MotorDrive;
    /// Sensor handle type produced by the sensor constructor.
    type Sensor: ColorSensor;
    /// Remote handle type produced by discovery.
    type Remote: RemoteControl;
    /// Error type for hub operations.
    type Error: fmt::Debug;

    /// The hub variant, as reported by firmware.
    fn kind(&self) -> HubKind;

    /// Attempt to construct a closed-loop motor on `port`.
    fn attach_speed_motor(&mut self, port: PortId) -> Result<Self::Motor, Self::Error>;

    /// Attempt to construct a simple DC motor on `port`.
    fn attach_dc_motor(&mut self, port: PortId) -> Result<Self::Motor, Self::Error>;

    /// Attempt to construct a color sensor on `port`.
    fn attach_color_sensor(&mut self, port: PortId) -> Result<Self::Sensor, Self::Error>;

    /// Scan for a wireless remote, waiting at most `timeout_ms`.
    ///
    /// `name` optionally restricts the scan to a remote advertising that
    /// name. Implementations must return within the timeout; the caller
    /// treats any error as "no remote" and carries on.
    fn connect_remote(
        &mut self,
        name: Option<&str>,
        timeout_ms: u32,
    ) -> Result<Self::Remote, Self::Error>;

    /// Whether the hub's center button is currently held.
    fn center_pressed(&mut self) -> Result<bool, Self::Error>;

    /// Set the hub's status light.
    fn set_light(&mut self, color: Color) -> Result<(), Self::Error>;
}

/// Monotonic time source in milliseconds.
///
/// Must never go backwards. The epoch is arbitrary; only differences are
/// used.
pub trait Clock {
    /// Current time in milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u64;
}

/// Blocking sleep.
///
/// Used both for end-of-tick pacing and for the deliberate hold-off after
/// an accepted remote action.
pub trait Delay {
    /// Sleep for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_kind_from_name() {
        assert_eq!(HubKind::from_name("technichub"), Some(HubKind::TechnicHub));
        assert_eq!(HubKind::from_name("CITYHUB"), Some(HubKind::CityHub));
        assert_eq!(HubKind::from_name(" primehub\n"), Some(HubKind::PrimeHub));
        assert_eq!(
            HubKind::from_name("essentialhub"),
            Some(HubKind::EssentialHub)
        );
        assert_eq!(HubKind::from_name("movehub"), Some(HubKind::MoveHub));
        assert_eq!(HubKind::from_name(""), None);
        assert_eq!(HubKind::from_name("technichub2"), None);
    }

    #[test]
    fn hub_kind_round_trips_through_name() {
        for kind in [
            HubKind::TechnicHub,
            HubKind::CityHub,
            HubKind::PrimeHub,
            HubKind::EssentialHub,
            HubKind::MoveHub,
        ] {
            assert_eq!(HubKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn move_hub_excludes_internal_motor_ports() {
        let ports = HubKind::MoveHub.candidate_ports();
        assert_eq!(ports, &[PortId::C, PortId::D]);
        assert!(!ports.contains(&PortId::A));
        assert!(!ports.contains(&PortId::B));
    }

    #[test]
    fn other_hubs_probe_full_port_set() {
        for kind in [
            HubKind::TechnicHub,
            HubKind::CityHub,
            HubKind::PrimeHub,
            HubKind::EssentialHub,
        ] {
            assert_eq!(kind.candidate_ports().len(), 6);
            assert!(kind.can_probe_speed_motors());
        }
        assert!(!HubKind::MoveHub.can_probe_speed_motors());
    }

    #[test]
    fn button_set_membership() {
        let set = ButtonSet::EMPTY
            .with(RemoteButton::LeftPlus)
            .with(RemoteButton::LeftMinus);

        assert!(set.contains(RemoteButton::LeftPlus));
        assert!(set.contains(RemoteButton::LeftMinus));
        assert!(!set.contains(RemoteButton::Center));
        assert!(!set.is_empty());
    }

    #[test]
    fn button_set_is_only() {
        let center = ButtonSet::from(RemoteButton::Center);
        assert!(center.is_only(RemoteButton::Center));

        let chord = center.with(RemoteButton::LeftPlus);
        assert!(!chord.is_only(RemoteButton::Center));
        assert!(!ButtonSet::EMPTY.is_only(RemoteButton::Center));
    }

    #[test]
    fn port_labels() {
        assert_eq!(PortId::A.label(), 'A');
        assert_eq!(PortId::F.label(), 'F');
        assert_eq!(format!("{}", PortId::C), "C");
    }

    #[test]
    fn color_defaults_to_none() {
        assert_eq!(Color::default(), Color::None);
    }

    #[test]
    fn stop_mode_defaults_to_brake() {
        assert_eq!(StopMode::default(), StopMode::Brake);
    }
}
