//! Mock implementations for testing without hardware.
//!
//! Every trait in [`crate::traits`] has a scripted double here. Devices
//! share their state through `Rc<RefCell<..>>` handles and are `Clone`:
//! keep a clone before handing a device to the hub or the loop, and you
//! can keep feeding inputs and inspecting commands after the original has
//! been moved into a binding.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockHub`] | [`TrainHub`] | Scripted port map, center button, light log |
//! | [`MockMotor`] | [`MotorDrive`] | Records every command, per-call failure injection |
//! | [`MockSensor`] | [`ColorSensor`] | Queued color readings with an idle fallback |
//! | [`MockRemote`] | [`RemoteControl`] | Queued or held button sets, light log |
//! | [`MockClock`] | [`Clock`] + [`Delay`] | Controllable time; delays advance it |
//!
//! # Example
//!
//! ```rust
//! use railbrick::hal::{MockHub, MockMotor, MockSensor};
//! use railbrick::{HubKind, PortId};
//!
//! let motor = MockMotor::new();
//! let sensor = MockSensor::new();
//! let hub = MockHub::new(HubKind::TechnicHub)
//!     .with_dc_motor(PortId::A, motor.clone())
//!     .with_color_sensor(PortId::B, sensor.clone());
//!
//! // The clones stay live for scripting and inspection.
//! assert!(motor.duty_calls().is_empty());
//! assert!(hub.lights().is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::traits::{
    ButtonSet, Clock, Color, ColorSensor, Delay, HubKind, MotorDrive, PortId, RemoteControl,
    StopMode, TrainHub,
};

/// Error type shared by all mocks; the payload says what was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockError(pub &'static str);

// ============================================================================
// Motor
// ============================================================================

/// Everything a [`MockMotor`] has been asked to do.
///
/// Calls are recorded even when failure injection makes them return an
/// error, so tests can assert on attempted fallbacks.
#[derive(Debug)]
pub struct MotorLog {
    /// Duty-cycle commands, in call order.
    pub duty_calls: Vec<i16>,
    /// Closed-loop speed commands, in call order.
    pub speed_calls: Vec<i32>,
    /// Stop commands that carried an explicit mode.
    pub stop_mode_calls: Vec<StopMode>,
    /// Number of plain (default-mode) stop calls.
    pub plain_stop_calls: usize,
    /// Reported speed limit. `None` makes the limit query fail.
    pub max_speed: Option<i32>,
    /// Fail the next and all further duty commands.
    pub fail_duty: bool,
    /// Fail closed-loop speed commands.
    pub fail_speed: bool,
    /// Fail stop commands that carry a mode.
    pub fail_stop_with_mode: bool,
    /// Fail plain stop commands.
    pub fail_plain_stop: bool,
}

impl Default for MotorLog {
    fn default() -> Self {
        Self {
            duty_calls: Vec::new(),
            speed_calls: Vec::new(),
            stop_mode_calls: Vec::new(),
            plain_stop_calls: 0,
            max_speed: Some(1000),
            fail_duty: false,
            fail_speed: false,
            fail_stop_with_mode: false,
            fail_plain_stop: false,
        }
    }
}

/// Mock motor recording every command it receives.
///
/// `Clone` shares the underlying log, so a clone kept by the test remains
/// a window into a motor that detection has moved into a binding.
#[derive(Clone, Debug, Default)]
pub struct MockMotor {
    log: Rc<RefCell<MotorLog>>,
}

impl MockMotor {
    /// New motor with a 1000-unit speed limit and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported speed limit; `None` makes the query fail.
    pub fn with_max_speed(self, max_speed: Option<i32>) -> Self {
        self.log.borrow_mut().max_speed = max_speed;
        self
    }

    /// Shared handle to the full log.
    pub fn log(&self) -> Rc<RefCell<MotorLog>> {
        Rc::clone(&self.log)
    }

    /// Duty-cycle commands received so far.
    pub fn duty_calls(&self) -> Vec<i16> {
        self.log.borrow().duty_calls.clone()
    }

    /// Closed-loop speed commands received so far.
    pub fn speed_calls(&self) -> Vec<i32> {
        self.log.borrow().speed_calls.clone()
    }

    /// Stop commands that carried a mode.
    pub fn stop_mode_calls(&self) -> Vec<StopMode> {
        self.log.borrow().stop_mode_calls.clone()
    }

    /// Number of plain stop calls.
    pub fn plain_stop_calls(&self) -> usize {
        self.log.borrow().plain_stop_calls
    }

    /// Toggle failure of duty commands.
    pub fn set_fail_duty(&self, fail: bool) {
        self.log.borrow_mut().fail_duty = fail;
    }

    /// Toggle failure of closed-loop speed commands.
    pub fn set_fail_speed(&self, fail: bool) {
        self.log.borrow_mut().fail_speed = fail;
    }

    /// Toggle failure of mode-carrying stop commands.
    pub fn set_fail_stop_with_mode(&self, fail: bool) {
        self.log.borrow_mut().fail_stop_with_mode = fail;
    }

    /// Toggle failure of plain stop commands.
    pub fn set_fail_plain_stop(&self, fail: bool) {
        self.log.borrow_mut().fail_plain_stop = fail;
    }
}

impl MotorDrive for MockMotor {
    type Error = MockError;

    fn set_duty(&mut self, percent: i16) -> Result<(), MockError> {
        let mut log = self.log.borrow_mut();
        log.duty_calls.push(percent);
        if log.fail_duty {
            Err(MockError("duty refused"))
        } else {
            Ok(())
        }
    }

    fn run_speed(&mut self, raw: i32) -> Result<(), MockError> {
        let mut log = self.log.borrow_mut();
        log.speed_calls.push(raw);
        if log.fail_speed {
            Err(MockError("speed refused"))
        } else {
            Ok(())
        }
    }

    fn stop_with_mode(&mut self, mode: StopMode) -> Result<(), MockError> {
        let mut log = self.log.borrow_mut();
        log.stop_mode_calls.push(mode);
        if log.fail_stop_with_mode {
            Err(MockError("stop with mode refused"))
        } else {
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<(), MockError> {
        let mut log = self.log.borrow_mut();
        log.plain_stop_calls += 1;
        if log.fail_plain_stop {
            Err(MockError("plain stop refused"))
        } else {
            Ok(())
        }
    }

    fn max_speed(&mut self) -> Result<i32, MockError> {
        self.log
            .borrow()
            .max_speed
            .ok_or(MockError("limit query refused"))
    }
}

// ============================================================================
// Sensor
// ============================================================================

#[derive(Debug)]
struct SensorScript {
    queue: VecDeque<Color>,
    idle: Color,
    fail_reads: bool,
}

/// Mock color sensor fed from a queue.
///
/// An empty queue yields the idle color, so "the track stays clear" needs
/// no scripting. `Clone` shares the queue.
#[derive(Clone, Debug)]
pub struct MockSensor {
    script: Rc<RefCell<SensorScript>>,
}

impl Default for MockSensor {
    fn default() -> Self {
        Self {
            script: Rc::new(RefCell::new(SensorScript {
                queue: VecDeque::new(),
                idle: Color::None,
                fail_reads: false,
            })),
        }
    }
}

impl MockSensor {
    /// New sensor reading `Color::None` until fed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one reading.
    pub fn feed(&self, color: Color) {
        self.script.borrow_mut().queue.push_back(color);
    }

    /// Queue `n` identical readings.
    pub fn feed_times(&self, color: Color, n: usize) {
        let mut script = self.script.borrow_mut();
        for _ in 0..n {
            script.queue.push_back(color);
        }
    }

    /// Set the color returned when the queue is empty.
    pub fn set_idle(&self, color: Color) {
        self.script.borrow_mut().idle = color;
    }

    /// Make every read fail until turned off again.
    pub fn set_fail_reads(&self, fail: bool) {
        self.script.borrow_mut().fail_reads = fail;
    }
}

impl ColorSensor for MockSensor {
    type Error = MockError;

    fn read_color(&mut self) -> Result<Color, MockError> {
        let mut script = self.script.borrow_mut();
        if script.fail_reads {
            return Err(MockError("read refused"));
        }
        let idle = script.idle;
        Ok(script.queue.pop_front().unwrap_or(idle))
    }
}

// ============================================================================
// Remote
// ============================================================================

#[derive(Debug)]
struct RemoteScript {
    queue: VecDeque<ButtonSet>,
    held: ButtonSet,
    light_log: Vec<Color>,
    fail_pressed: bool,
    fail_light: bool,
    name: String,
}

/// Mock wireless remote.
///
/// Button reads drain a queue and fall back to a settable held set, which
/// models both tap sequences and a button held across many ticks. `Clone`
/// shares everything.
#[derive(Clone, Debug)]
pub struct MockRemote {
    script: Rc<RefCell<RemoteScript>>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::named("Handset")
    }
}

impl MockRemote {
    /// New remote advertising the default name.
    pub fn new() -> Self {
        Self::default()
    }

    /// New remote advertising `name`.
    pub fn named(name: &str) -> Self {
        Self {
            script: Rc::new(RefCell::new(RemoteScript {
                queue: VecDeque::new(),
                held: ButtonSet::EMPTY,
                light_log: Vec::new(),
                fail_pressed: false,
                fail_light: false,
                name: name.into(),
            })),
        }
    }

    /// The advertised name.
    pub fn name(&self) -> String {
        self.script.borrow().name.clone()
    }

    /// Queue one button reading.
    pub fn press(&self, set: ButtonSet) {
        self.script.borrow_mut().queue.push_back(set);
    }

    /// Set the reading returned when the queue is empty.
    pub fn set_held(&self, set: ButtonSet) {
        self.script.borrow_mut().held = set;
    }

    /// Colors the remote light has been set to, in order.
    pub fn lights(&self) -> Vec<Color> {
        self.script.borrow().light_log.clone()
    }

    /// Make button reads fail.
    pub fn set_fail_pressed(&self, fail: bool) {
        self.script.borrow_mut().fail_pressed = fail;
    }

    /// Make light commands fail.
    pub fn set_fail_light(&self, fail: bool) {
        self.script.borrow_mut().fail_light = fail;
    }
}

impl RemoteControl for MockRemote {
    type Error = MockError;

    fn pressed(&mut self) -> Result<ButtonSet, MockError> {
        let mut script = self.script.borrow_mut();
        if script.fail_pressed {
            return Err(MockError("button read refused"));
        }
        let held = script.held;
        Ok(script.queue.pop_front().unwrap_or(held))
    }

    fn set_light(&mut self, color: Color) -> Result<(), MockError> {
        let mut script = self.script.borrow_mut();
        if script.fail_light {
            return Err(MockError("light refused"));
        }
        script.light_log.push(color);
        Ok(())
    }
}

// ============================================================================
// Hub
// ============================================================================

#[derive(Clone, Debug)]
enum PortDevice {
    SpeedMotor(MockMotor),
    DcMotor(MockMotor),
    ColorSensor(MockSensor),
}

#[derive(Debug)]
struct HubScript {
    devices: Vec<(PortId, PortDevice)>,
    remote: Option<MockRemote>,
    probe_log: Vec<(PortId, &'static str)>,
    light_log: Vec<Color>,
    fail_light: bool,
}

/// Mock hub with a scripted port map.
///
/// Attach a device to a port with the `with_*` builders; construction
/// calls then succeed exactly where the script says something compatible
/// is plugged in. A speed motor also satisfies the DC constructor, as on
/// real hardware. `Clone` shares all state, so keep a clone to press the
/// center button or read the light log after the hub has been moved into
/// the loop.
#[derive(Clone, Debug)]
pub struct MockHub {
    kind: HubKind,
    center: Rc<Cell<bool>>,
    script: Rc<RefCell<HubScript>>,
}

impl MockHub {
    /// New hub of the given variant with nothing attached.
    pub fn new(kind: HubKind) -> Self {
        Self {
            kind,
            center: Rc::new(Cell::new(false)),
            script: Rc::new(RefCell::new(HubScript {
                devices: Vec::new(),
                remote: None,
                probe_log: Vec::new(),
                light_log: Vec::new(),
                fail_light: false,
            })),
        }
    }

    /// Plug a closed-loop motor into `port`.
    pub fn with_speed_motor(self, port: PortId, motor: MockMotor) -> Self {
        self.script
            .borrow_mut()
            .devices
            .push((port, PortDevice::SpeedMotor(motor)));
        self
    }

    /// Plug a simple DC motor into `port`.
    pub fn with_dc_motor(self, port: PortId, motor: MockMotor) -> Self {
        self.script
            .borrow_mut()
            .devices
            .push((port, PortDevice::DcMotor(motor)));
        self
    }

    /// Plug a color sensor into `port`.
    pub fn with_color_sensor(self, port: PortId, sensor: MockSensor) -> Self {
        self.script
            .borrow_mut()
            .devices
            .push((port, PortDevice::ColorSensor(sensor)));
        self
    }

    /// Make a remote discoverable.
    pub fn with_remote(self, remote: MockRemote) -> Self {
        self.script.borrow_mut().remote = Some(remote);
        self
    }

    /// Press or release the center button.
    pub fn set_center(&self, pressed: bool) {
        self.center.set(pressed);
    }

    /// Colors the hub light has been set to, in order.
    pub fn lights(&self) -> Vec<Color> {
        self.script.borrow().light_log.clone()
    }

    /// Make hub light commands fail.
    pub fn set_fail_light(&self, fail: bool) {
        self.script.borrow_mut().fail_light = fail;
    }

    /// Every construction probe seen so far, as `(port, kind)` with kind
    /// one of `"speed"`, `"dc"`, `"sensor"`.
    pub fn probe_log(&self) -> Vec<(PortId, &'static str)> {
        self.script.borrow().probe_log.clone()
    }

    fn log_probe(&self, port: PortId, probe: &'static str) {
        self.script.borrow_mut().probe_log.push((port, probe));
    }
}

impl TrainHub for MockHub {
    type Motor = MockMotor;
    type Sensor = MockSensor;
    type Remote = MockRemote;
    type Error = MockError;

    fn kind(&self) -> HubKind {
        self.kind
    }

    fn attach_speed_motor(&mut self, port: PortId) -> Result<MockMotor, MockError> {
        self.log_probe(port, "speed");
        self.script
            .borrow()
            .devices
            .iter()
            .filter(|(p, _)| *p == port)
            .find_map(|(_, d)| match d {
                PortDevice::SpeedMotor(m) => Some(m.clone()),
                _ => None,
            })
            .ok_or(MockError("no closed-loop motor on port"))
    }

    fn attach_dc_motor(&mut self, port: PortId) -> Result<MockMotor, MockError> {
        self.log_probe(port, "dc");
        // A closed-loop motor accepts the DC constructor too.
        self.script
            .borrow()
            .devices
            .iter()
            .filter(|(p, _)| *p == port)
            .find_map(|(_, d)| match d {
                PortDevice::SpeedMotor(m) | PortDevice::DcMotor(m) => Some(m.clone()),
                PortDevice::ColorSensor(_) => None,
            })
            .ok_or(MockError("no motor on port"))
    }

    fn attach_color_sensor(&mut self, port: PortId) -> Result<MockSensor, MockError> {
        self.log_probe(port, "sensor");
        self.script
            .borrow()
            .devices
            .iter()
            .filter(|(p, _)| *p == port)
            .find_map(|(_, d)| match d {
                PortDevice::ColorSensor(s) => Some(s.clone()),
                _ => None,
            })
            .ok_or(MockError("no sensor on port"))
    }

    fn connect_remote(
        &mut self,
        name: Option<&str>,
        _timeout_ms: u32,
    ) -> Result<MockRemote, MockError> {
        let script = self.script.borrow();
        match &script.remote {
            Some(remote) => {
                if let Some(wanted) = name {
                    if remote.name() != wanted {
                        return Err(MockError("no remote with that name"));
                    }
                }
                Ok(remote.clone())
            }
            None => Err(MockError("scan timed out")),
        }
    }

    fn center_pressed(&mut self) -> Result<bool, MockError> {
        Ok(self.center.get())
    }

    fn set_light(&mut self, color: Color) -> Result<(), MockError> {
        let mut script = self.script.borrow_mut();
        if script.fail_light {
            return Err(MockError("light refused"));
        }
        script.light_log.push(color);
        Ok(())
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Controllable time source that is also a [`Delay`]: sleeping advances
/// the clock, so a loop paced against it marches through simulated time.
///
/// `Clone` shares the instant, letting a test advance time on a clock the
/// loop owns.
///
/// # Example
///
/// ```rust
/// use railbrick::hal::MockClock;
/// use railbrick::traits::{Clock, Delay};
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
///
/// clock.delay_ms(20);
/// assert_eq!(clock.now_ms(), 120);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    current_ms: Rc<Cell<u64>>,
}

impl MockClock {
    /// New clock starting at 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advance by a duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

impl Delay for MockClock {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RemoteButton;

    #[test]
    fn mock_motor_records_commands() {
        let mut motor = MockMotor::new();
        motor.set_duty(50).unwrap();
        motor.run_speed(500).unwrap();
        motor.stop_with_mode(StopMode::Brake).unwrap();
        motor.stop().unwrap();

        assert_eq!(motor.duty_calls(), vec![50]);
        assert_eq!(motor.speed_calls(), vec![500]);
        assert_eq!(motor.stop_mode_calls(), vec![StopMode::Brake]);
        assert_eq!(motor.plain_stop_calls(), 1);
    }

    #[test]
    fn mock_motor_clone_shares_log() {
        let motor = MockMotor::new();
        let mut alias = motor.clone();
        alias.set_duty(-30).unwrap();
        assert_eq!(motor.duty_calls(), vec![-30]);
    }

    #[test]
    fn mock_motor_failure_injection_still_records() {
        let mut motor = MockMotor::new();
        motor.set_fail_duty(true);
        assert!(motor.set_duty(10).is_err());
        assert_eq!(motor.duty_calls(), vec![10]);
    }

    #[test]
    fn mock_motor_limit_query() {
        let mut motor = MockMotor::new();
        assert_eq!(motor.max_speed().unwrap(), 1000);

        let mut unqueryable = MockMotor::new().with_max_speed(None);
        assert!(unqueryable.max_speed().is_err());
    }

    #[test]
    fn mock_sensor_queue_then_idle() {
        let mut sensor = MockSensor::new();
        sensor.feed(Color::Red);
        sensor.feed_times(Color::Blue, 2);

        assert_eq!(sensor.read_color().unwrap(), Color::Red);
        assert_eq!(sensor.read_color().unwrap(), Color::Blue);
        assert_eq!(sensor.read_color().unwrap(), Color::Blue);
        assert_eq!(sensor.read_color().unwrap(), Color::None);

        sensor.set_idle(Color::Green);
        assert_eq!(sensor.read_color().unwrap(), Color::Green);
    }

    #[test]
    fn mock_remote_queue_then_held() {
        let mut remote = MockRemote::new();
        remote.press(ButtonSet::from(RemoteButton::Center));
        remote.set_held(ButtonSet::from(RemoteButton::LeftPlus));

        assert!(remote.pressed().unwrap().is_only(RemoteButton::Center));
        assert!(remote.pressed().unwrap().is_only(RemoteButton::LeftPlus));
        assert!(remote.pressed().unwrap().is_only(RemoteButton::LeftPlus));
    }

    #[test]
    fn mock_hub_attaches_per_script() {
        let mut hub = MockHub::new(HubKind::TechnicHub)
            .with_speed_motor(PortId::A, MockMotor::new())
            .with_color_sensor(PortId::B, MockSensor::new());

        assert!(hub.attach_speed_motor(PortId::A).is_ok());
        assert!(hub.attach_dc_motor(PortId::A).is_ok());
        assert!(hub.attach_speed_motor(PortId::B).is_err());
        assert!(hub.attach_color_sensor(PortId::B).is_ok());
        assert!(hub.attach_color_sensor(PortId::C).is_err());
    }

    #[test]
    fn mock_hub_records_probes() {
        let mut hub = MockHub::new(HubKind::TechnicHub);
        let _ = hub.attach_speed_motor(PortId::A);
        let _ = hub.attach_color_sensor(PortId::D);

        assert_eq!(
            hub.probe_log(),
            vec![(PortId::A, "speed"), (PortId::D, "sensor")]
        );
    }

    #[test]
    fn mock_hub_remote_name_filter() {
        let mut hub = MockHub::new(HubKind::CityHub).with_remote(MockRemote::named("loco1"));

        assert!(hub.connect_remote(Some("other"), 1000).is_err());
        assert!(hub.connect_remote(Some("loco1"), 1000).is_ok());
        assert!(hub.connect_remote(None, 1000).is_ok());
    }

    #[test]
    fn mock_clock_delay_advances_time() {
        let mut clock = MockClock::new();
        clock.delay_ms(20);
        clock.delay_ms(20);
        assert_eq!(clock.now_ms(), 40);

        let alias = clock.clone();
        alias.advance(60);
        assert_eq!(clock.now_ms(), 100);
    }
}
