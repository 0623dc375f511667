//! Speed translation from requested percent to motor commands.
//!
//! The controller thinks in signed percent, -100 to 100. What the motor
//! understands depends on its capability class: a simple DC motor takes
//! the percent directly as a duty cycle, a closed-loop motor takes a raw
//! speed scaled against its cached limit. [`SpeedTranslator`] owns the
//! bound motor and performs that translation, gating every write on the
//! run/stop flags and suppressing writes that would not change anything.

use tracing::warn;

use crate::config::ControlConfig;
use crate::controller::RunState;
use crate::detect::{BoundMotor, MotorCapability};
use crate::traits::{MotorDrive, StopMode};

/// Owns the bound motor and translates percent targets into commands.
pub struct SpeedTranslator<M: MotorDrive> {
    binding: Option<BoundMotor<M>>,
    /// Last percent actually applied to hardware. `None` until the first
    /// command, `Some(0)` after any stop.
    current_percent: Option<i16>,
    stop_mode: StopMode,
    default_max_speed: i32,
}

impl<M: MotorDrive> SpeedTranslator<M> {
    /// Wrap the detection result. `binding: None` yields a translator
    /// whose every operation is a no-op.
    pub fn new(binding: Option<BoundMotor<M>>, config: &ControlConfig) -> Self {
        Self {
            binding,
            current_percent: None,
            stop_mode: config.stop_mode,
            default_max_speed: config.default_max_speed,
        }
    }

    /// Whether a motor is bound.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The bound motor's capability class, if any.
    pub fn capability(&self) -> Option<MotorCapability> {
        self.binding.as_ref().map(|b| b.capability)
    }

    /// Last percent actually applied to hardware.
    pub fn current_percent(&self) -> Option<i16> {
        self.current_percent
    }

    /// Command the motor to `percent`, if anything needs doing.
    ///
    /// No-op when no motor is bound, when either stop flag in `gate` is
    /// set, or when `percent` is already applied. Only a successful send
    /// records the new percent, so a transient command failure is retried
    /// by the next call.
    pub fn apply(&mut self, percent: i16, gate: &RunState) {
        let Some(bound) = self.binding.as_mut() else {
            return;
        };
        if !gate.is_runnable() {
            return;
        }
        if self.current_percent == Some(percent) {
            return;
        }

        let sent = match bound.capability {
            MotorCapability::SimpleDc => bound.motor.set_duty(percent),
            MotorCapability::SpeedControlled => {
                let max_speed = bound.max_speed.unwrap_or(self.default_max_speed);
                bound.motor.run_speed(scale_speed(max_speed, percent))
            }
        };

        match sent {
            Ok(()) => self.current_percent = Some(percent),
            Err(err) => warn!(?err, percent, "motor speed command failed"),
        }
    }

    /// Bring the motor to rest.
    ///
    /// Tries the graceful stop first, then the device-default stop, then a
    /// zero duty cycle, swallowing each failure before the next attempt.
    /// The applied percent is recorded as 0 no matter what the hardware
    /// did; from the state machine's point of view a stop never fails.
    pub fn stop(&mut self) {
        if let Some(bound) = self.binding.as_mut() {
            let graceful = bound
                .motor
                .stop_with_mode(self.stop_mode)
                .or_else(|_| bound.motor.stop());
            if graceful.is_err() {
                if let Err(err) = bound.motor.set_duty(0) {
                    warn!(?err, "every stop command failed, motor state unknown");
                }
            }
        }
        self.current_percent = Some(0);
    }
}

/// Scale a percent against a raw speed limit with symmetric rounding.
fn scale_speed(max_speed: i32, percent: i16) -> i32 {
    let product = i64::from(max_speed) * i64::from(percent);
    let rounded = if product >= 0 {
        (product + 50) / 100
    } else {
        (product - 50) / 100
    };
    rounded as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_full_range() {
        assert_eq!(scale_speed(1000, 100), 1000);
        assert_eq!(scale_speed(1000, -100), -1000);
        assert_eq!(scale_speed(1000, 0), 0);
    }

    #[test]
    fn scale_rounds_symmetrically() {
        // 731 * 50 / 100 = 365.5
        assert_eq!(scale_speed(731, 50), 366);
        assert_eq!(scale_speed(731, -50), -366);
        // 1000 * 33 / 100 = 330 exactly
        assert_eq!(scale_speed(1000, 33), 330);
        // 125 * 10 / 100 = 12.5
        assert_eq!(scale_speed(125, 10), 13);
        assert_eq!(scale_speed(125, -10), -13);
    }

    #[test]
    fn scale_rounds_down_below_half() {
        // 1040 * 33 / 100 = 343.2
        assert_eq!(scale_speed(1040, 33), 343);
        assert_eq!(scale_speed(1040, -33), -343);
    }
}
