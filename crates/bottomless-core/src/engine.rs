//! The notification gate: decides when the load callback fires.
//!
//! On every source event the gate checks, in order: the in-flight guard
//! (one load at a time, no backlog), load-zone membership, and the
//! content-stability policy. All state lives on the single UI-update
//! context; deferred work (timer fire, load completion) re-enters through
//! `Weak` upgrades and re-validates attachment before mutating anything.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::completion::{completion, DoneSignal};
use crate::platform::{Scheduler, TimerRegistration};
use crate::source::{ScrollSource, SubscriptionId};
use crate::stability::{self, HeightChangeConfig, StabilityDecision};
use crate::trigger::{self, OffsetTrigger};

/// Content height recorded by the bounded-wait timer so the next
/// evaluation treats the content as changed even if it was not.
const HEIGHT_SENTINEL: f32 = 0.0;

type LoadFactory = Box<dyn FnMut() -> Pin<Box<dyn Future<Output = ()>>>>;

/// Trigger and stability configuration for one attachment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadMoreConfig {
    pub trigger: OffsetTrigger,
    pub stability: HeightChangeConfig,
}

struct EngineState {
    attached: bool,
    /// False while a load is in flight. Checked before anything else.
    can_notify: bool,
    /// Content height recorded at the moment the most recent load fired.
    last_known_content_height: f32,
    /// Pending bounded-wait timer, if any. At most one per engine.
    stability_timer: Option<TimerRegistration>,
    subscription: Option<SubscriptionId>,
}

struct Engine {
    source: Rc<dyn ScrollSource>,
    scheduler: Rc<dyn Scheduler>,
    trigger: OffsetTrigger,
    stability: HeightChangeConfig,
    load: RefCell<LoadFactory>,
    state: RefCell<EngineState>,
}

impl Engine {
    fn handle_event(this: &Rc<Self>) {
        {
            let state = this.state.borrow();
            // In-flight guard: a hard precondition, evaluated before any
            // metrics are read.
            if !state.attached || !state.can_notify {
                return;
            }
        }

        let metrics = this.source.metrics();
        if !trigger::is_in_load_zone(&metrics, &this.trigger) {
            return;
        }

        let decision = {
            let state = this.state.borrow();
            stability::evaluate(
                this.stability,
                metrics.content_height,
                state.last_known_content_height,
                state.stability_timer.is_some(),
            )
        };

        match decision {
            StabilityDecision::Unstable { start_timer } => {
                if let Some(timeout) = start_timer {
                    Self::start_stability_timer(this, timeout);
                }
            }
            StabilityDecision::Stable => Self::fire(this, metrics.content_height),
        }
    }

    fn start_stability_timer(this: &Rc<Self>, timeout: Duration) {
        let weak = Rc::downgrade(this);
        let id = this.scheduler.start_timer(
            timeout,
            Box::new(move || {
                if let Some(engine) = weak.upgrade() {
                    engine.on_stability_timeout();
                }
            }),
        );
        this.state.borrow_mut().stability_timer =
            Some(TimerRegistration::new(Rc::clone(&this.scheduler), id));
        log::debug!("bottomless: stability wait started ({:?})", timeout);
    }

    fn on_stability_timeout(&self) {
        let mut state = self.state.borrow_mut();
        if !state.attached {
            return;
        }
        state.stability_timer = None;
        state.last_known_content_height = HEIGHT_SENTINEL;
        log::debug!("bottomless: stability wait elapsed, height requirement waived");
    }

    fn fire(this: &Rc<Self>, content_height: f32) {
        {
            let mut state = this.state.borrow_mut();
            state.can_notify = false;
            state.last_known_content_height = content_height;
            // A fresh load restarts the bounded wait.
            state.stability_timer = None;
        }
        log::debug!("bottomless: load triggered at content height {}", content_height);

        let future = {
            let mut load = this.load.borrow_mut();
            (*load)()
        };
        let weak = Rc::downgrade(this);
        this.scheduler.spawn(Box::pin(async move {
            future.await;
            if let Some(engine) = weak.upgrade() {
                engine.on_load_finished();
            }
        }));
    }

    fn on_load_finished(&self) {
        let mut state = self.state.borrow_mut();
        // Completion after detach must not mutate anything.
        if !state.attached {
            return;
        }
        state.can_notify = true;
        log::debug!("bottomless: load finished");
    }

    fn detach(&self) {
        let subscription = {
            let mut state = self.state.borrow_mut();
            if !state.attached {
                return;
            }
            state.attached = false;
            state.stability_timer = None;
            state.subscription.take()
        };
        if let Some(id) = subscription {
            self.source.unsubscribe(id);
        }
        log::trace!("bottomless: detached");
    }
}

/// Handle to a live attachment.
///
/// Dropping the handle detaches the engine; [`detach`](Self::detach) does
/// the same eagerly and is idempotent.
pub struct EngineHandle {
    engine: Rc<Engine>,
}

impl EngineHandle {
    /// Cancels any pending stability timer, unregisters from the source,
    /// and turns a still-in-flight load completion into a no-op.
    pub fn detach(&self) {
        self.engine.detach();
    }

    /// Whether the engine is still bound to its source.
    pub fn is_attached(&self) -> bool {
        self.engine.state.borrow().attached
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.engine.detach();
    }
}

/// Attaches the engine to a scrollable view with an awaitable load callback.
///
/// The callback is invoked at most once per load cycle; further qualifying
/// events are dropped until its future completes. One evaluation runs
/// immediately, so content shorter than the viewport starts loading without
/// any scroll input.
pub fn attach<S, F, Fut>(
    source: Rc<S>,
    scheduler: Rc<dyn Scheduler>,
    config: LoadMoreConfig,
    mut on_load_more: F,
) -> EngineHandle
where
    S: ScrollSource + 'static,
    F: FnMut() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let load: LoadFactory =
        Box::new(move || Box::pin(on_load_more()) as Pin<Box<dyn Future<Output = ()>>>);
    attach_boxed(source, scheduler, config, load)
}

/// Callback-style variant of [`attach`]: the load reports completion by
/// calling the provided [`DoneSignal`] instead of resolving a future.
pub fn attach_with_done<S, F>(
    source: Rc<S>,
    scheduler: Rc<dyn Scheduler>,
    config: LoadMoreConfig,
    mut on_load_more: F,
) -> EngineHandle
where
    S: ScrollSource + 'static,
    F: FnMut(DoneSignal) + 'static,
{
    let load: LoadFactory = Box::new(move || {
        let (future, done) = completion();
        on_load_more(done);
        Box::pin(future) as Pin<Box<dyn Future<Output = ()>>>
    });
    attach_boxed(source, scheduler, config, load)
}

fn attach_boxed<S>(
    source: Rc<S>,
    scheduler: Rc<dyn Scheduler>,
    config: LoadMoreConfig,
    load: LoadFactory,
) -> EngineHandle
where
    S: ScrollSource + 'static,
{
    let engine = Rc::new(Engine {
        source: source as Rc<dyn ScrollSource>,
        scheduler,
        trigger: config.trigger,
        stability: config.stability.normalized(),
        load: RefCell::new(load),
        state: RefCell::new(EngineState {
            attached: true,
            can_notify: true,
            last_known_content_height: HEIGHT_SENTINEL,
            stability_timer: None,
            subscription: None,
        }),
    });

    let weak: Weak<Engine> = Rc::downgrade(&engine);
    let id = engine.source.subscribe(Box::new(move |_event| {
        if let Some(engine) = weak.upgrade() {
            Engine::handle_event(&engine);
        }
    }));
    engine.state.borrow_mut().subscription = Some(id);
    log::trace!("bottomless: attached");

    // Evaluate current geometry once at bind time.
    Engine::handle_event(&engine);

    EngineHandle { engine }
}
