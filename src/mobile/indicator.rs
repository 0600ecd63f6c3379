//! Refresh indicator geometry.
//!
//! Maps the controller's pull state to the numbers a presentation layer
//! needs: where the spinner sits, how far it has turned, how visible it is
//! and how far the content below it is pushed down.

use super::pull_refresh::{PullState, RefreshConfig};

/// Degrees of spinner rotation at full pull progress.
pub const PULL_ROTATION_DEG: f32 = 270.0;
/// Spinner speed while the refresh is in flight.
pub const SPIN_DEG_PER_SEC: f32 = 360.0;
/// Spinner diameter in pixels.
pub const INDICATOR_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStyle {
    /// Vertical offset of the spinner centre from the top of the surface
    pub center_y: f32,
    pub rotation_deg: f32,
    pub opacity: f32,
    /// How far scrolled content is translated down
    pub content_offset: f32,
}

impl IndicatorStyle {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Compute the indicator for `state`. `spin_secs` is the time since the
/// refresh started and only matters while refreshing.
pub fn indicator_style(
    state: &PullState,
    config: &RefreshConfig,
    spin_secs: f32,
) -> IndicatorStyle {
    if state.is_refreshing {
        // The controller parks the pull at the threshold while refreshing
        let offset = state.pull_distance.max(0.0).min(config.activation_threshold);
        return IndicatorStyle {
            center_y: offset * 0.5,
            rotation_deg: (spin_secs.max(0.0) * SPIN_DEG_PER_SEC) % 360.0,
            opacity: 1.0,
            content_offset: offset,
        };
    }

    let offset = state.pull_distance.max(0.0);
    IndicatorStyle {
        center_y: (offset - INDICATOR_SIZE * 0.5).max(0.0) * 0.5 + INDICATOR_SIZE * 0.25,
        rotation_deg: state.pull_progress * PULL_ROTATION_DEG,
        opacity: state.pull_progress.clamp(0.0, 1.0),
        content_offset: offset,
    }
}

/// Exponential approach of `current` to `target` with time constant
/// `secs`; snaps once within half a pixel.
pub fn ease_toward(current: f32, target: f32, dt: f32, secs: f32) -> f32 {
    if secs <= 0.0 || !dt.is_finite() || dt <= 0.0 {
        return target;
    }
    let next = current + (target - current) * (1.0 - (-dt / secs).exp());
    if (next - target).abs() < 0.5 {
        target
    } else {
        next
    }
}
