//! Load-zone evaluation.
//!
//! The trigger decides whether the viewport is close enough to the bottom
//! of the content for a load to be eligible. It is a pure computation over
//! a [`ScrollMetrics`] snapshot; all gating (in-flight loads, content
//! stability) lives in the engine.

use crate::metrics::ScrollMetrics;

/// How the height of the load zone near the bottom is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffsetTrigger {
    /// Load zone height = fraction × viewport height.
    Relative(f32),
    /// Load zone height = fixed pixel distance.
    Absolute(f32),
}

impl OffsetTrigger {
    /// Creates a relative trigger. Negative fractions are clamped to zero.
    pub fn relative(fraction: f32) -> Self {
        Self::Relative(clamp_non_negative(fraction, "relative fraction"))
    }

    /// Creates an absolute trigger. Negative distances are clamped to zero.
    pub fn absolute(distance: f32) -> Self {
        Self::Absolute(clamp_non_negative(distance, "absolute distance"))
    }

    /// Height of the load zone for the given viewport height.
    #[inline]
    pub fn load_zone_height(&self, viewport_height: f32) -> f32 {
        match *self {
            Self::Relative(fraction) => fraction * viewport_height,
            Self::Absolute(distance) => distance,
        }
    }
}

impl Default for OffsetTrigger {
    /// Half a viewport of remaining content.
    fn default() -> Self {
        Self::Relative(0.5)
    }
}

fn clamp_non_negative(value: f32, what: &str) -> f32 {
    if value < 0.0 {
        log::warn!("OffsetTrigger: negative {} {} clamped to 0", what, value);
        0.0
    } else {
        value
    }
}

/// Returns whether the viewport is inside the load zone.
///
/// The boundary is exclusive: a distance exactly equal to the zone height
/// does not qualify. Negative distances (overscroll) do.
#[inline]
pub fn is_in_load_zone(metrics: &ScrollMetrics, trigger: &OffsetTrigger) -> bool {
    metrics.distance_to_bottom() < trigger.load_zone_height(metrics.viewport_height)
}
