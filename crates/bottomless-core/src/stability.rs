//! Content-stability policy.
//!
//! After a load completes, newly appended content may not immediately change
//! the measured content height (async layout, image decoding). Re-triggering
//! before the height moves would loop the loader on the same scroll
//! position, so the gate can require a height change before the next load.

use std::time::Duration;

/// Whether the content height must change before another load may fire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightChangeConfig {
    /// Require the content height to differ from the height recorded at the
    /// last load, with no time bound.
    Always,
    /// Require a height change, but waive the requirement once the timeout
    /// has elapsed. Bounds how long a host that never reports size changes
    /// can starve the loader.
    Until(Duration),
    /// No stability requirement; trigger purely on position.
    Never,
}

impl HeightChangeConfig {
    /// Bounded-wait variant from seconds. The timeout must be positive.
    pub fn until_secs(seconds: f32) -> Self {
        if seconds > 0.0 {
            Self::Until(Duration::from_secs_f32(seconds))
        } else {
            log::warn!(
                "HeightChangeConfig: non-positive timeout {}s, falling back to Always",
                seconds
            );
            Self::Always
        }
    }

    /// Replaces a non-positive `Until` timeout with `Always` semantics.
    /// Called once at attach so the engine never sees a zero timer.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Self::Until(timeout) if timeout.is_zero() => {
                log::warn!("HeightChangeConfig: zero timeout, falling back to Always");
                Self::Always
            }
            other => other,
        }
    }
}

impl Default for HeightChangeConfig {
    fn default() -> Self {
        Self::Always
    }
}

/// Outcome of evaluating the stability policy for one candidate trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StabilityDecision {
    Stable,
    /// Not stable yet. `start_timer` asks the gate to begin the bounded
    /// wait; it is set at most while no timer is already pending.
    Unstable { start_timer: Option<Duration> },
}

/// Evaluates the policy against the current and last-recorded content
/// heights. `timer_pending` reflects whether a bounded-wait timer is
/// already running for this engine.
pub(crate) fn evaluate(
    config: HeightChangeConfig,
    content_height: f32,
    last_known_height: f32,
    timer_pending: bool,
) -> StabilityDecision {
    match config {
        HeightChangeConfig::Never => StabilityDecision::Stable,
        HeightChangeConfig::Always => {
            if content_height != last_known_height {
                StabilityDecision::Stable
            } else {
                StabilityDecision::Unstable { start_timer: None }
            }
        }
        HeightChangeConfig::Until(timeout) => {
            if content_height != last_known_height {
                StabilityDecision::Stable
            } else {
                let start_timer = if timer_pending { None } else { Some(timeout) };
                StabilityDecision::Unstable { start_timer }
            }
        }
    }
}
