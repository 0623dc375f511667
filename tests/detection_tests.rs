//! Integration tests for port scanning and remote discovery.

use railbrick::config::ControlConfig;
use railbrick::hal::{MockHub, MockMotor, MockRemote, MockSensor};
use railbrick::{
    detect_peripherals, discover_remote, HubKind, MotorCapability, PortId, ProbePolicy,
};

// ============================================================================
// Basic binding
// ============================================================================

#[test]
fn binds_motor_and_sensor_on_separate_ports() {
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_speed_motor(PortId::B, MockMotor::new())
        .with_color_sensor(PortId::D, MockSensor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    let motor = found.motor.expect("motor should bind");
    assert_eq!(motor.port, PortId::B);
    assert_eq!(motor.capability, MotorCapability::SpeedControlled);
    assert_eq!(motor.max_speed, Some(1000));
    assert!(found.sensor.is_some());
}

#[test]
fn empty_hub_binds_nothing() {
    let mut hub = MockHub::new(HubKind::TechnicHub);
    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    assert!(found.motor.is_none());
    assert!(found.sensor.is_none());
}

#[test]
fn dc_only_device_binds_as_simple_dc() {
    let mut hub = MockHub::new(HubKind::CityHub).with_dc_motor(PortId::A, MockMotor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    let motor = found.motor.expect("motor should bind");
    assert_eq!(motor.capability, MotorCapability::SimpleDc);
    assert_eq!(motor.max_speed, None);
}

// ============================================================================
// First-success-wins
// ============================================================================

#[test]
fn first_motor_in_port_order_wins() {
    // A DC device on A, a fancier motor on C: port order decides
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_dc_motor(PortId::A, MockMotor::new())
        .with_speed_motor(PortId::C, MockMotor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    let motor = found.motor.expect("motor should bind");
    assert_eq!(motor.port, PortId::A);
    assert_eq!(motor.capability, MotorCapability::SimpleDc);
}

#[test]
fn scan_stops_once_both_classes_bound() {
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_dc_motor(PortId::A, MockMotor::new())
        .with_color_sensor(PortId::B, MockSensor::new())
        .with_speed_motor(PortId::E, MockMotor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    assert_eq!(found.motor.unwrap().port, PortId::A);
    assert!(found.sensor.is_some());
    assert!(hub.probe_log().iter().all(|(port, _)| *port != PortId::E));
}

// ============================================================================
// MoveHub exclusions
// ============================================================================

#[test]
fn movehub_never_probes_internal_motor_ports() {
    // Devices on A and B must be invisible to a movehub scan
    let mut hub = MockHub::new(HubKind::MoveHub)
        .with_speed_motor(PortId::A, MockMotor::new())
        .with_color_sensor(PortId::B, MockSensor::new())
        .with_dc_motor(PortId::C, MockMotor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    assert_eq!(found.motor.unwrap().port, PortId::C);
    assert!(found.sensor.is_none());
    assert!(hub
        .probe_log()
        .iter()
        .all(|(port, _)| *port != PortId::A && *port != PortId::B));
}

#[test]
fn movehub_never_attempts_closed_loop_probe() {
    let mut hub = MockHub::new(HubKind::MoveHub).with_speed_motor(PortId::C, MockMotor::new());

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    // The motor still binds, but through the DC constructor
    let motor = found.motor.expect("motor should bind");
    assert_eq!(motor.capability, MotorCapability::SimpleDc);
    assert!(hub.probe_log().iter().all(|(_, kind)| *kind != "speed"));
}

// ============================================================================
// Speed limit caching
// ============================================================================

#[test]
fn speed_limit_is_cached_from_the_motor() {
    let motor = MockMotor::new().with_max_speed(Some(1530));
    let mut hub = MockHub::new(HubKind::TechnicHub).with_speed_motor(PortId::A, motor);

    let found = detect_peripherals(&mut hub, &ControlConfig::default());
    assert_eq!(found.motor.unwrap().max_speed, Some(1530));
}

#[test]
fn failed_limit_query_leaves_cache_empty() {
    let motor = MockMotor::new().with_max_speed(None);
    let mut hub = MockHub::new(HubKind::TechnicHub).with_speed_motor(PortId::A, motor);

    let found = detect_peripherals(&mut hub, &ControlConfig::default());

    let bound = found.motor.expect("motor should bind despite failed query");
    assert_eq!(bound.capability, MotorCapability::SpeedControlled);
    assert_eq!(bound.max_speed, None);
}

// ============================================================================
// Probe policy
// ============================================================================

#[test]
fn independent_kinds_finds_sensor_on_a_motor_port() {
    // Both a motor and a sensor answer on port A
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_dc_motor(PortId::A, MockMotor::new())
        .with_color_sensor(PortId::A, MockSensor::new());

    let config = ControlConfig::default().with_probe_policy(ProbePolicy::IndependentKinds);
    let found = detect_peripherals(&mut hub, &config);

    assert_eq!(found.motor.unwrap().port, PortId::A);
    assert!(found.sensor.is_some());
}

#[test]
fn first_match_policy_skips_rest_of_port() {
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_dc_motor(PortId::A, MockMotor::new())
        .with_color_sensor(PortId::A, MockSensor::new());

    let config = ControlConfig::default().with_probe_policy(ProbePolicy::FirstMatchSkipsPort);
    let found = detect_peripherals(&mut hub, &config);

    assert!(found.motor.is_some());
    assert!(found.sensor.is_none());
    assert!(!hub.probe_log().contains(&(PortId::A, "sensor")));
}

#[test]
fn first_match_policy_still_finds_sensor_on_other_port() {
    let mut hub = MockHub::new(HubKind::TechnicHub)
        .with_dc_motor(PortId::A, MockMotor::new())
        .with_color_sensor(PortId::B, MockSensor::new());

    let config = ControlConfig::default().with_probe_policy(ProbePolicy::FirstMatchSkipsPort);
    let found = detect_peripherals(&mut hub, &config);

    assert!(found.motor.is_some());
    assert!(found.sensor.is_some());
}

// ============================================================================
// Remote discovery
// ============================================================================

#[test]
fn remote_binds_when_present() {
    let mut hub = MockHub::new(HubKind::CityHub).with_remote(MockRemote::new());
    assert!(discover_remote(&mut hub, &ControlConfig::default()).is_some());
}

#[test]
fn remote_absence_is_not_fatal() {
    let mut hub = MockHub::new(HubKind::CityHub);
    assert!(discover_remote(&mut hub, &ControlConfig::default()).is_none());
}

#[test]
fn remote_name_filter_rejects_other_remotes() {
    let mut hub = MockHub::new(HubKind::CityHub).with_remote(MockRemote::named("yard"));

    let config = ControlConfig::default().with_remote_name("mainline");
    assert!(discover_remote(&mut hub, &config).is_none());

    let config = ControlConfig::default().with_remote_name("yard");
    assert!(discover_remote(&mut hub, &config).is_some());
}
