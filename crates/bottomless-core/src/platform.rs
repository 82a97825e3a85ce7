//! Platform abstraction for scheduling.
//!
//! The engine delegates task spawning and one-shot timers to the host
//! runtime through this trait, so it can run inside any single-threaded UI
//! context: a real frame loop, the bundled std scheduler, or a virtual
//! clock in tests.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

/// Identifier for a scheduled one-shot timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Schedules work on behalf of the engine.
///
/// All callbacks run on the single UI-update context the engine itself is
/// driven from. Implementations must not invoke a spawned future or a timer
/// callback synchronously from inside `spawn`/`start_timer`; both are
/// deferred until the scheduler is next pumped.
pub trait Scheduler {
    /// Polls the task to completion on the UI context.
    fn spawn(&self, task: Pin<Box<dyn Future<Output = ()>>>);

    /// Arms a one-shot timer. The callback fires once on the UI context
    /// after `delay` has elapsed, unless cancelled first.
    fn start_timer(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancels a pending timer. Unknown or already-fired ids are ignored.
    fn cancel_timer(&self, id: TimerId);
}

/// Handle to a pending timer that cancels it when dropped.
///
/// Dropping after the timer has fired is a no-op.
pub struct TimerRegistration {
    scheduler: Rc<dyn Scheduler>,
    id: Option<TimerId>,
}

impl TimerRegistration {
    pub fn new(scheduler: Rc<dyn Scheduler>, id: TimerId) -> Self {
        Self {
            scheduler,
            id: Some(id),
        }
    }

    /// Cancels the timer now instead of at drop time.
    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel_timer(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel_timer(id);
        }
    }
}
