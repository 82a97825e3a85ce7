//! Scroll geometry snapshots delivered by the host view.

/// Snapshot of a scrollable view's geometry at the moment of an event.
///
/// Owned by the event source and read on demand; the engine never holds on
/// to one beyond a single evaluation. All values are in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Total height of the scrollable content.
    pub content_height: f32,
    /// Height of the visible viewport.
    pub viewport_height: f32,
    /// Current scroll offset from the top of the content.
    pub scroll_offset: f32,
    /// Extra inset below the content (e.g. a loading indicator's footprint).
    pub bottom_inset: f32,
}

impl ScrollMetrics {
    /// Creates a snapshot with no bottom inset.
    pub fn new(content_height: f32, viewport_height: f32, scroll_offset: f32) -> Self {
        Self {
            content_height,
            viewport_height,
            scroll_offset,
            bottom_inset: 0.0,
        }
    }

    /// Distance between the bottom edge of the viewport and the bottom of
    /// the content (inset included).
    ///
    /// Negative when the viewer has overscrolled past the end, which still
    /// counts as being inside any non-empty load zone.
    #[inline]
    pub fn distance_to_bottom(&self) -> f32 {
        (self.content_height + self.bottom_inset) - (self.scroll_offset + self.viewport_height)
    }
}
