//! Event-source adapter contract.
//!
//! The host scrollable view implements [`ScrollSource`] to push scroll and
//! content-size notifications to a registered listener and to expose current
//! geometry on demand. Listener lifetime is explicit: the engine subscribes
//! at attach and unsubscribes at detach; there is no ambient observer
//! registry.

use crate::metrics::ScrollMetrics;

/// Notification kinds a source delivers.
///
/// The gate evaluates both kinds identically; the distinction exists for
/// hosts and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEvent {
    /// The scroll offset changed.
    PositionChanged,
    /// The measured content extent changed.
    ContentSizeChanged,
}

/// Identifier for a registered listener, returned by
/// [`ScrollSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Contract the engine requires from its host view.
///
/// Both event kinds must be delivered on the single UI-update context, and
/// never concurrently to the same listener. `metrics` may be called from
/// inside a listener invocation.
pub trait ScrollSource {
    /// Current scroll geometry.
    fn metrics(&self) -> ScrollMetrics;

    /// Registers a listener for subsequent events.
    fn subscribe(&self, listener: Box<dyn Fn(ScrollEvent)>) -> SubscriptionId;

    /// Removes a previously registered listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
