//! Virtual-time scheduler.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bottomless_core::{Scheduler, TimerId};
use futures_task::{waker, ArcWake};

struct TimerEntry {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_timer_id: u64,
    timers: Vec<TimerEntry>,
    tasks: Vec<Pin<Box<dyn Future<Output = ()>>>>,
}

/// A [`Scheduler`] over virtual time.
///
/// Spawned futures are polled by [`run_until_idle`](Self::run_until_idle);
/// timers fire only from [`advance`](Self::advance), in due order, with the
/// virtual clock sitting exactly at each timer's due time while its callback
/// runs. Nothing here ever reads a wall clock.
#[derive(Default)]
pub struct TestScheduler {
    inner: RefCell<Inner>,
}

/// Per-sweep waker: tasks woken mid-sweep just get re-polled on the next
/// sweep, so the flag only needs to exist to satisfy the waker contract.
#[derive(Default)]
struct WakeFlag {
    woken: AtomicBool,
}

impl ArcWake for WakeFlag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
    }
}

impl TestScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Polls spawned tasks until a full sweep makes no progress.
    ///
    /// Call after every interaction that may have unblocked a task (an
    /// emitted scroll event, a released load completion).
    pub fn run_until_idle(&self) {
        loop {
            let mut pending = Vec::new();
            let mut progressed = false;

            // Take the current task set; polls may spawn new tasks, which
            // land in `inner.tasks` for the next sweep.
            let tasks = std::mem::take(&mut self.inner.borrow_mut().tasks);
            for mut task in tasks {
                let wake = waker(Arc::new(WakeFlag::default()));
                let mut cx = Context::from_waker(&wake);
                match task.as_mut().poll(&mut cx) {
                    Poll::Ready(()) => progressed = true,
                    Poll::Pending => pending.push(task),
                }
            }

            let mut inner = self.inner.borrow_mut();
            progressed |= !inner.tasks.is_empty();
            // Newly spawned tasks go behind the survivors of this sweep.
            pending.append(&mut inner.tasks);
            inner.tasks = pending;
            drop(inner);

            if !progressed {
                break;
            }
        }
    }

    /// Advances the virtual clock by `delta`, firing every timer that comes
    /// due on the way, earliest first. Each callback runs with the clock at
    /// its due time and with tasks pumped to idle afterwards.
    pub fn advance(&self, delta: Duration) {
        let target = self.inner.borrow().now + delta;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due_index = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| entry.due)
                    .map(|(index, _)| index);
                match due_index {
                    Some(index) => {
                        let entry = inner.timers.remove(index);
                        inner.now = entry.due;
                        Some(entry.callback)
                    }
                    None => None,
                }
            };
            match next {
                Some(callback) => {
                    callback();
                    self.run_until_idle();
                }
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
        self.run_until_idle();
    }
}

impl Scheduler for TestScheduler {
    fn spawn(&self, task: Pin<Box<dyn Future<Output = ()>>>) {
        self.inner.borrow_mut().tasks.push(task);
    }

    fn start_timer(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_timer_id);
        inner.next_timer_id += 1;
        let due = inner.now + delay;
        inner.timers.push(TimerEntry { id, due, callback });
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        inner.timers.retain(|entry| entry.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn timers_fire_in_due_order() {
        let scheduler = TestScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        scheduler.start_timer(Duration::from_secs(2), Box::new(move || o.borrow_mut().push(2)));
        let o = Rc::clone(&order);
        scheduler.start_timer(Duration::from_secs(1), Box::new(move || o.borrow_mut().push(1)));

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn timers_never_fire_early() {
        let scheduler = TestScheduler::new();
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        scheduler.start_timer(Duration::from_secs(5), Box::new(move || f.set(true)));

        scheduler.advance(Duration::from_millis(4999));
        assert!(!fired.get());
        scheduler.advance(Duration::from_millis(1));
        assert!(fired.get());
    }

    #[test]
    fn cancelled_timer_does_not_fire() {
        let scheduler = TestScheduler::new();
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        let id = scheduler.start_timer(Duration::from_secs(1), Box::new(move || f.set(true)));
        scheduler.cancel_timer(id);

        scheduler.advance(Duration::from_secs(2));
        assert!(!fired.get());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn advance_accumulates_virtual_time() {
        let scheduler = TestScheduler::new();
        scheduler.advance(Duration::from_secs(1));
        scheduler.advance(Duration::from_millis(500));
        assert_eq!(scheduler.now(), Duration::from_millis(1500));
    }

    #[test]
    fn spawned_task_runs_to_completion() {
        let scheduler = TestScheduler::new();
        let done = Rc::new(Cell::new(false));

        let d = Rc::clone(&done);
        scheduler.spawn(Box::pin(async move {
            d.set(true);
        }));

        assert!(!done.get());
        scheduler.run_until_idle();
        assert!(done.get());
    }

    #[test]
    fn task_blocked_on_completion_resumes() {
        let scheduler = TestScheduler::new();
        let (future, signal) = bottomless_core::completion();
        let done = Rc::new(Cell::new(false));

        let d = Rc::clone(&done);
        scheduler.spawn(Box::pin(async move {
            future.await;
            d.set(true);
        }));

        scheduler.run_until_idle();
        assert!(!done.get());

        signal.complete();
        scheduler.run_until_idle();
        assert!(done.get());
    }
}
