//! Run/stop state machine and the controller that mediates motor access.
//!
//! Two independent stop reasons gate the motor: the user toggle and the
//! color trigger. Each is owned by exactly one input path and neither ever
//! touches the other, but every motor command consults both. The train is
//! runnable only when both are clear, and it boots manually stopped so it
//! never starts unattended.
//!
//! [`TrainController`] is the single authority over those flags and the
//! requested speed; input handlers call into it and nothing else touches
//! the motor.

use tracing::debug;

use crate::config::ControlConfig;
use crate::detect::BoundMotor;
use crate::speed::SpeedTranslator;
use crate::traits::MotorDrive;

/// The two independent stop flags.
///
/// `stopped_by_button` starts true; `stopped_by_color` starts false.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunState {
    stopped_by_button: bool,
    stopped_by_color: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            stopped_by_button: true,
            stopped_by_color: false,
        }
    }
}

impl RunState {
    /// Whether the motor may run: both stop reasons must be clear.
    pub fn is_runnable(&self) -> bool {
        !self.stopped_by_button && !self.stopped_by_color
    }

    /// Whether the user toggle is holding the train stopped.
    pub fn stopped_by_button(&self) -> bool {
        self.stopped_by_button
    }

    /// Whether the color trigger is holding the train stopped.
    pub fn stopped_by_color(&self) -> bool {
        self.stopped_by_color
    }
}

/// Derived overall state, used for indicator feedback.
///
/// Manual stop shadows sensor stop when both flags are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrainState {
    /// Stopped by the user toggle.
    ManualStop,
    /// Stopped by the color trigger.
    SensorStop,
    /// Both flags clear, motor commanded to the requested speed.
    Running,
}

/// Authoritative run/stop state plus the speed target, mediating every
/// motor command through the [`SpeedTranslator`].
pub struct TrainController<M: MotorDrive> {
    translator: SpeedTranslator<M>,
    run: RunState,
    requested_percent: i16,
    speed_step: i16,
}

impl<M: MotorDrive> TrainController<M> {
    /// Build the controller around the detection result.
    pub fn new(binding: Option<BoundMotor<M>>, config: &ControlConfig) -> Self {
        Self {
            translator: SpeedTranslator::new(binding, config),
            run: RunState::default(),
            requested_percent: config.default_percent.clamp(-100, 100),
            speed_step: config.speed_step,
        }
    }

    /// The derived overall state.
    pub fn state(&self) -> TrainState {
        if self.run.stopped_by_button {
            TrainState::ManualStop
        } else if self.run.stopped_by_color {
            TrainState::SensorStop
        } else {
            TrainState::Running
        }
    }

    /// The current run/stop flags.
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// Signed target speed in percent.
    pub fn requested_percent(&self) -> i16 {
        self.requested_percent
    }

    /// Last percent actually applied to hardware.
    pub fn current_percent(&self) -> Option<i16> {
        self.translator.current_percent()
    }

    /// Whether a motor is bound.
    pub fn has_motor(&self) -> bool {
        self.translator.is_bound()
    }

    /// Flip the user stop flag.
    ///
    /// Clearing it re-applies the requested speed; setting it stops the
    /// motor. Independent of the color flag, which keeps its veto either
    /// way (resuming while the color flag is set leaves the motor stopped
    /// because the translator's gate still holds).
    pub fn toggle_run(&mut self) -> TrainState {
        if self.run.stopped_by_button {
            self.run.stopped_by_button = false;
            let percent = self.requested_percent;
            self.translator.apply(percent, &self.run);
        } else {
            self.translator.stop();
            self.run.stopped_by_button = true;
        }
        let state = self.state();
        debug!(?state, "run toggled");
        state
    }

    /// Engage the color stop. Returns false if already engaged.
    pub fn on_trigger_color(&mut self) -> bool {
        if self.run.stopped_by_color {
            return false;
        }
        self.run.stopped_by_color = true;
        self.translator.stop();
        debug!("color stop engaged");
        true
    }

    /// Release the color stop and re-apply the requested speed. Returns
    /// false if not engaged.
    pub fn on_clear_color(&mut self) -> bool {
        if !self.run.stopped_by_color {
            return false;
        }
        self.run.stopped_by_color = false;
        let percent = self.requested_percent;
        self.translator.apply(percent, &self.run);
        debug!("color stop released");
        true
    }

    /// Adjust the requested speed by one configured step in the given
    /// direction and apply it.
    ///
    /// The apply is gated inside the translator, so stepping the speed
    /// while stopped only updates the stored target for the next resume.
    pub fn step_speed(&mut self, direction: i16) {
        self.nudge_speed(direction.signum() * self.speed_step);
    }

    /// Adjust the requested speed by an explicit delta, clamped to
    /// [-100, 100], and apply it.
    pub fn nudge_speed(&mut self, delta: i16) {
        self.requested_percent = self.requested_percent.saturating_add(delta).clamp(-100, 100);
        let percent = self.requested_percent;
        self.translator.apply(percent, &self.run);
    }
}
