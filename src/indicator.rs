//! Indicator feedback: one status color on every reachable light.
//!
//! The lights are the only operator-facing channel the train has, so the
//! mapping is deliberately tiny and fixed. A light that fails to set is
//! ignored; there is nowhere else to report that failure anyway.

use crate::controller::TrainState;
use crate::traits::{Color, RemoteControl, TrainHub};

/// The indicator color for a given state.
pub fn status_color(state: TrainState) -> Color {
    match state {
        TrainState::ManualStop => Color::Orange,
        TrainState::SensorStop => Color::Red,
        TrainState::Running => Color::Green,
    }
}

/// Show `state` on the hub light and, when bound, the remote light.
pub fn show_state<H, R>(hub: &mut H, remote: Option<&mut R>, state: TrainState)
where
    H: TrainHub,
    R: RemoteControl,
{
    let color = status_color(state);
    let _ = hub.set_light(color);
    if let Some(remote) = remote {
        let _ = remote.set_light(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_color_per_state() {
        assert_eq!(status_color(TrainState::ManualStop), Color::Orange);
        assert_eq!(status_color(TrainState::SensorStop), Color::Red);
        assert_eq!(status_color(TrainState::Running), Color::Green);
    }
}
