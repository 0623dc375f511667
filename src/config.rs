//! Configuration for detection and the control loop.
//!
//! Uses `heapless::String` for the one string-valued setting so the
//! aggregate stays allocation-free and `Copy`-adjacent.
//!
//! # Example
//!
//! ```rust
//! use railbrick::config::ControlConfig;
//! use railbrick::{Color, StopMode};
//!
//! // Use defaults
//! let config = ControlConfig::default();
//! assert_eq!(config.trigger_color, Color::Red);
//!
//! // Or customize
//! let config = ControlConfig::default()
//!     .with_speed_step(5)
//!     .with_stop_mode(StopMode::Coast)
//!     .with_remote_name("train-remote");
//! ```

use heapless::String as HString;

use crate::traits::{Color, StopMode};

/// Maximum length of the remote-name filter.
pub const MAX_NAME_LEN: usize = 64;

/// Fixed-capacity string for device names.
pub type NameString = HString<MAX_NAME_LEN>;

/// Create a [`NameString`] from a `&str`, truncating at a character
/// boundary if too long.
pub fn name_string(s: &str) -> NameString {
    let mut hs = NameString::new();
    let take = s.len().min(MAX_NAME_LEN);
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// How detection treats a port once one device kind has bound on it.
///
/// The two historical firmware generations disagreed here, so the order is
/// explicit configuration rather than a guess at hardware intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProbePolicy {
    /// Probe every device kind on every candidate port. This is the only
    /// order that can find a sensor on a port that also accepts a motor
    /// constructor.
    #[default]
    IndependentKinds,
    /// Stop probing a port as soon as any kind binds on it.
    FirstMatchSkipsPort,
}

/// Complete control-loop configuration.
///
/// Every timing window, threshold, and step size the loop uses lives here;
/// the defaults reproduce the stock train behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlConfig {
    /// Main loop period in milliseconds.
    pub loop_ms: u32,
    /// Speed change per button press, in percent.
    pub speed_step: i16,
    /// Target speed percent applied on the first start.
    pub default_percent: i16,
    /// Hub center-button debounce window in milliseconds.
    pub hub_debounce_ms: u64,
    /// Blocking hold-off after a remote run/stop toggle, in milliseconds.
    pub remote_toggle_hold_ms: u32,
    /// Blocking hold-off after a remote speed step, in milliseconds.
    pub remote_step_hold_ms: u32,
    /// Consecutive trigger-color samples required to stop.
    pub stop_samples: u8,
    /// Consecutive non-trigger samples required to resume.
    pub resume_samples: u8,
    /// Sensor color that triggers an automatic stop.
    pub trigger_color: Color,
    /// Rest behavior requested when stopping the motor.
    pub stop_mode: StopMode,
    /// Max closed-loop speed assumed when the motor's own limit cannot be
    /// queried, in raw device units.
    pub default_max_speed: i32,
    /// Per-port probing order during detection.
    pub probe_policy: ProbePolicy,
    /// Restrict remote discovery to a remote advertising this name.
    /// Empty means accept any remote.
    pub remote_name: NameString,
    /// Upper bound on the remote discovery scan, in milliseconds.
    pub remote_timeout_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_ms: 20,
            speed_step: 10,
            default_percent: 50,
            hub_debounce_ms: 250,
            remote_toggle_hold_ms: 250,
            remote_step_hold_ms: 200,
            stop_samples: 3,
            resume_samples: 3,
            trigger_color: Color::Red,
            stop_mode: StopMode::Brake,
            default_max_speed: 1000,
            probe_policy: ProbePolicy::default(),
            remote_name: NameString::new(),
            remote_timeout_ms: 10_000,
        }
    }
}

impl ControlConfig {
    /// Set the main loop period.
    pub fn with_loop_ms(mut self, ms: u32) -> Self {
        self.loop_ms = ms;
        self
    }

    /// Set the speed change per button press.
    pub fn with_speed_step(mut self, step: i16) -> Self {
        self.speed_step = step;
        self
    }

    /// Set the target speed applied on the first start.
    pub fn with_default_percent(mut self, percent: i16) -> Self {
        self.default_percent = percent;
        self
    }

    /// Set the hub button debounce window.
    pub fn with_hub_debounce_ms(mut self, ms: u64) -> Self {
        self.hub_debounce_ms = ms;
        self
    }

    /// Set the stop/resume hysteresis thresholds.
    pub fn with_hysteresis(mut self, stop_samples: u8, resume_samples: u8) -> Self {
        self.stop_samples = stop_samples;
        self.resume_samples = resume_samples;
        self
    }

    /// Set the color that triggers an automatic stop.
    pub fn with_trigger_color(mut self, color: Color) -> Self {
        self.trigger_color = color;
        self
    }

    /// Set the rest behavior used when stopping.
    pub fn with_stop_mode(mut self, mode: StopMode) -> Self {
        self.stop_mode = mode;
        self
    }

    /// Set the fallback max speed for motors whose limit query fails.
    pub fn with_default_max_speed(mut self, raw: i32) -> Self {
        self.default_max_speed = raw;
        self
    }

    /// Set the per-port probing order.
    pub fn with_probe_policy(mut self, policy: ProbePolicy) -> Self {
        self.probe_policy = policy;
        self
    }

    /// Restrict remote discovery to a remote advertising `name`.
    pub fn with_remote_name(mut self, name: &str) -> Self {
        self.remote_name = name_string(name);
        self
    }

    /// Set the remote discovery timeout.
    pub fn with_remote_timeout_ms(mut self, ms: u32) -> Self {
        self.remote_timeout_ms = ms;
        self
    }

    /// The remote-name filter as an `Option`, empty meaning no filter.
    pub fn remote_name_filter(&self) -> Option<&str> {
        if self.remote_name.is_empty() {
            None
        } else {
            Some(self.remote_name.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behavior() {
        let config = ControlConfig::default();
        assert_eq!(config.loop_ms, 20);
        assert_eq!(config.speed_step, 10);
        assert_eq!(config.default_percent, 50);
        assert_eq!(config.hub_debounce_ms, 250);
        assert_eq!(config.stop_samples, 3);
        assert_eq!(config.resume_samples, 3);
        assert_eq!(config.trigger_color, Color::Red);
        assert_eq!(config.stop_mode, StopMode::Brake);
        assert_eq!(config.default_max_speed, 1000);
        assert_eq!(config.probe_policy, ProbePolicy::IndependentKinds);
        assert!(config.remote_name_filter().is_none());
    }

    #[test]
    fn builders_chain() {
        let config = ControlConfig::default()
            .with_loop_ms(10)
            .with_speed_step(5)
            .with_default_percent(30)
            .with_hub_debounce_ms(500)
            .with_hysteresis(2, 4)
            .with_trigger_color(Color::Blue)
            .with_stop_mode(StopMode::Coast)
            .with_default_max_speed(800)
            .with_probe_policy(ProbePolicy::FirstMatchSkipsPort)
            .with_remote_timeout_ms(3000);

        assert_eq!(config.loop_ms, 10);
        assert_eq!(config.speed_step, 5);
        assert_eq!(config.default_percent, 30);
        assert_eq!(config.hub_debounce_ms, 500);
        assert_eq!(config.stop_samples, 2);
        assert_eq!(config.resume_samples, 4);
        assert_eq!(config.trigger_color, Color::Blue);
        assert_eq!(config.stop_mode, StopMode::Coast);
        assert_eq!(config.default_max_speed, 800);
        assert_eq!(config.probe_policy, ProbePolicy::FirstMatchSkipsPort);
        assert_eq!(config.remote_timeout_ms, 3000);
    }

    #[test]
    fn remote_name_filter() {
        let config = ControlConfig::default().with_remote_name("loco1");
        assert_eq!(config.remote_name_filter(), Some("loco1"));
    }

    #[test]
    fn name_string_truncates_at_char_boundary() {
        let long = "x".repeat(MAX_NAME_LEN + 10);
        let hs = name_string(&long);
        assert_eq!(hs.len(), MAX_NAME_LEN);
    }
}
