//! Simulated infinite feed.
//!
//! A headless stand-in for the usual demo: a feed view whose content height
//! is item count × row height, a "viewer" dragging toward the bottom every
//! tick, and a load callback that appends a batch after an artificial
//! delay. Run with `RUST_LOG=debug` to watch the gate's decisions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use bottomless_core::{
    attach, completion, LoadMoreConfig, Scheduler, ScrollEvent, ScrollMetrics, ScrollSource,
    SubscriptionId,
};
use bottomless_runtime_std::StdScheduler;

const ROW_HEIGHT: f32 = 48.0;
const VIEWPORT_HEIGHT: f32 = 800.0;
const BATCH_SIZE: usize = 25;
const TARGET_ITEMS: usize = 201;
const SCROLL_STEP: f32 = 120.0;
const LOAD_DELAY: Duration = Duration::from_millis(100);

/// Feed whose geometry derives from its item count.
struct FeedView {
    item_count: Cell<usize>,
    scroll_offset: Cell<f32>,
    listeners: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(ScrollEvent)>)>>,
    next_id: Cell<u64>,
}

impl FeedView {
    fn new(item_count: usize) -> Self {
        Self {
            item_count: Cell::new(item_count),
            scroll_offset: Cell::new(0.0),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    fn item_count(&self) -> usize {
        self.item_count.get()
    }

    fn content_height(&self) -> f32 {
        self.item_count.get() as f32 * ROW_HEIGHT
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_offset.get()
    }

    fn append(&self, count: usize) {
        self.item_count.set(self.item_count.get() + count);
        log::info!(
            "feed-demo: appended {} items, {} total",
            count,
            self.item_count.get()
        );
        self.emit(ScrollEvent::ContentSizeChanged);
    }

    fn scroll_to(&self, offset: f32) {
        self.scroll_offset.set(offset);
        self.emit(ScrollEvent::PositionChanged);
    }

    fn emit(&self, event: ScrollEvent) {
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
}

impl ScrollSource for FeedView {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.content_height(), VIEWPORT_HEIGHT, self.scroll_offset())
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

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scheduler = Rc::new(StdScheduler::new());
    let view = Rc::new(FeedView::new(1));

    let handle = {
        let view = Rc::clone(&view);
        let timer_scheduler = Rc::clone(&scheduler);
        attach(
            Rc::clone(&view),
            scheduler.clone(),
            LoadMoreConfig::default(),
            move || {
                let view = Rc::clone(&view);
                let timer_scheduler = Rc::clone(&timer_scheduler);
                async move {
                    // Artificial fetch latency, then append the batch.
                    let (fetched, done) = completion();
                    timer_scheduler.start_timer(LOAD_DELAY, Box::new(move || done.complete()));
                    fetched.await;
                    view.append(BATCH_SIZE);
                }
            },
        )
    };
    scheduler.run_until_idle();

    // Simulated viewer: drag toward the bottom until enough items loaded.
    while view.item_count() < TARGET_ITEMS {
        let max_offset = (view.content_height() - VIEWPORT_HEIGHT).max(0.0);
        let next = (view.scroll_offset() + SCROLL_STEP).min(max_offset);
        view.scroll_to(next);
        scheduler.pump_for(Duration::from_millis(20));
    }

    handle.detach();
    log::info!(
        "feed-demo: done, {} items / {}px of content",
        view.item_count(),
        view.content_height()
    );
}
