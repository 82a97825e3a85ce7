//! Scriptable scroll source.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bottomless_core::{ScrollEvent, ScrollMetrics, ScrollSource, SubscriptionId};

/// A [`ScrollSource`] driven entirely from the test body.
///
/// Mutators emit the matching event to every listener after updating the
/// stored metrics, so an attached engine sees exactly the event order the
/// test scripts.
pub struct FakeScrollView {
    metrics: Cell<ScrollMetrics>,
    listeners: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(ScrollEvent)>)>>,
    next_id: Cell<u64>,
}

impl FakeScrollView {
    pub fn new(metrics: ScrollMetrics) -> Self {
        Self {
            metrics: Cell::new(metrics),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Moves the scroll offset and emits `PositionChanged`.
    pub fn scroll_to(&self, offset: f32) {
        let mut metrics = self.metrics.get();
        metrics.scroll_offset = offset;
        self.metrics.set(metrics);
        self.emit(ScrollEvent::PositionChanged);
    }

    /// Changes the content height and emits `ContentSizeChanged`.
    pub fn set_content_height(&self, height: f32) {
        let mut metrics = self.metrics.get();
        metrics.content_height = height;
        self.metrics.set(metrics);
        self.emit(ScrollEvent::ContentSizeChanged);
    }

    /// Replaces the whole snapshot without emitting anything; pair with
    /// [`emit`](Self::emit) when the test needs an unusual event/geometry
    /// combination.
    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        self.metrics.set(metrics);
    }

    /// Delivers an event to every registered listener.
    pub fn emit(&self, event: ScrollEvent) {
        // Snapshot first: a listener may unsubscribe during dispatch.
        let listeners: Vec<Rc<dyn Fn(ScrollEvent)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of currently registered listeners; detach tests assert this
    /// drops back to zero.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ScrollSource for FakeScrollView {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics.get()
    }

    fn subscribe(&self, listener: Box<dyn Fn(ScrollEvent)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::from(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(entry, _)| *entry != id);
    }
}
