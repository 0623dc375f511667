//! The fixed-period main loop tying detection, inputs, and feedback
//! together.
//!
//! One logical task, no preemption: every tick polls the sensor, then the
//! remote, then the hub button, and sleeps out the remainder of the
//! period. The only other suspension points are the deliberate blocking
//! hold-offs inside the remote handler, which stall everything including
//! sensor polling for their duration.
//!
//! Time comes from the monotonic [`Clock`] rather than a tick counter, so
//! the hub-button debounce window spans real elapsed time even across
//! those stalls.

use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::controller::TrainController;
use crate::detect::{detect_peripherals, discover_remote};
use crate::indicator::show_state;
use crate::inputs::{ColorVerdict, ColorWatch, HubButton, RemoteHandler};
use crate::traits::{Clock, Color, ColorSensor, Delay, TrainHub};

/// The whole running system: hub, bindings, handlers, and timing.
///
/// Owns every piece of mutable state; nothing here is shared or locked.
pub struct TrainLoop<H: TrainHub, C: Clock, D: Delay> {
    hub: H,
    remote: Option<H::Remote>,
    sensor: Option<H::Sensor>,
    controller: TrainController<H::Motor>,
    hub_button: HubButton,
    color_watch: ColorWatch,
    remote_handler: RemoteHandler,
    loop_ms: u32,
    clock: C,
    delay: D,
}

impl<H: TrainHub, C: Clock, D: Delay> TrainLoop<H, C, D> {
    /// Detect peripherals, discover the remote, and show the initial
    /// (manually stopped) state.
    ///
    /// Detection runs exactly once; the binding never changes afterwards.
    /// Nothing here is fatal: a hub with no usable peripherals yields a
    /// loop that ticks along doing nothing.
    pub fn bootstrap(mut hub: H, clock: C, delay: D, config: &ControlConfig) -> Self {
        let peripherals = detect_peripherals(&mut hub, config);
        let remote = discover_remote(&mut hub, config);
        let controller = TrainController::new(peripherals.motor, config);

        let mut this = Self {
            hub,
            remote,
            sensor: peripherals.sensor,
            controller,
            hub_button: HubButton::new(config.hub_debounce_ms),
            color_watch: ColorWatch::new(config),
            remote_handler: RemoteHandler::new(config),
            loop_ms: config.loop_ms,
            clock,
            delay,
        };
        this.refresh_indicators();
        this
    }

    /// The controller, for state inspection.
    pub fn controller(&self) -> &TrainController<H::Motor> {
        &self.controller
    }

    /// Whether a remote was discovered at startup.
    pub fn remote_bound(&self) -> bool {
        self.remote.is_some()
    }

    /// Whether a color sensor was bound at startup.
    pub fn sensor_bound(&self) -> bool {
        self.sensor.is_some()
    }

    /// Run one iteration: sensor, remote, hub button, in that order.
    pub fn tick(&mut self) {
        self.poll_sensor();
        self.poll_remote();
        self.poll_hub_button();
    }

    /// Run forever at the configured period.
    pub fn run(&mut self) -> ! {
        info!(loop_ms = self.loop_ms, "control loop started");
        loop {
            self.tick();
            self.delay.delay_ms(self.loop_ms);
        }
    }

    fn poll_sensor(&mut self) {
        let Some(sensor) = self.sensor.as_mut() else {
            return;
        };
        // A failed read counts as a non-trigger sample: the counters must
        // keep advancing, and a dead sensor must not hold the train
        // stopped forever.
        let color = match sensor.read_color() {
            Ok(color) => color,
            Err(err) => {
                debug!(?err, "color read failed, counting as non-trigger");
                Color::None
            }
        };

        match self.color_watch.sample(color) {
            ColorVerdict::TriggerHeld => {
                if self.controller.on_trigger_color() {
                    self.refresh_indicators();
                }
            }
            ColorVerdict::ClearHeld => {
                if self.controller.on_clear_color() {
                    self.refresh_indicators();
                }
            }
            ColorVerdict::Undecided => {}
        }
    }

    fn poll_remote(&mut self) {
        let Some(remote) = self.remote.as_mut() else {
            return;
        };
        let toggled = self
            .remote_handler
            .poll(remote, &mut self.delay, &mut self.controller);
        if toggled {
            self.refresh_indicators();
        }
    }

    fn poll_hub_button(&mut self) {
        let pressed = self.hub.center_pressed().unwrap_or(false);
        let now_ms = self.clock.now_ms();
        if self.hub_button.poll(pressed, now_ms) {
            self.controller.toggle_run();
            self.refresh_indicators();
        }
    }

    fn refresh_indicators(&mut self) {
        let state = self.controller.state();
        show_state(&mut self.hub, self.remote.as_mut(), state);
    }
}
