//! Single-threaded executor and timer queue.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bottomless_core::{Scheduler, TimerId};
use futures_task::{waker, ArcWake};
use rustc_hash::FxHashMap;
use web_time::Instant;

struct TimerEntry {
    id: TimerId,
    due: Instant,
    callback: Box<dyn FnOnce()>,
}

struct Inner {
    next_task_id: u64,
    next_timer_id: u64,
    tasks: FxHashMap<u64, Pin<Box<dyn Future<Output = ()>>>>,
    timers: Vec<TimerEntry>,
}

/// A [`Scheduler`] pumped from the thread that created it.
///
/// Tasks and timer callbacks only ever run inside
/// [`run_until_idle`](Self::run_until_idle) / [`pump_for`](Self::pump_for),
/// which keeps every engine mutation on the owning thread. Wakers are the
/// one `Send` piece: they just push a task id onto the ready queue.
pub struct StdScheduler {
    inner: RefCell<Inner>,
    ready: Arc<Mutex<VecDeque<u64>>>,
}

struct TaskWaker {
    id: u64,
    ready: Arc<Mutex<VecDeque<u64>>>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self
            .ready
            .lock()
            .expect("ready queue poisoned")
            .push_back(arc_self.id);
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                next_task_id: 0,
                next_timer_id: 0,
                tasks: FxHashMap::default(),
                timers: Vec::new(),
            }),
            ready: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Fires due timers and polls woken tasks until both are quiescent.
    pub fn run_until_idle(&self) {
        loop {
            let fired = self.fire_due_timers();
            let polled = self.poll_ready_tasks();
            if !fired && !polled {
                break;
            }
        }
    }

    /// Pumps for at least `duration` of wall time, sleeping between timer
    /// deadlines. Demo-loop convenience; frame-driven hosts call
    /// [`run_until_idle`](Self::run_until_idle) once per frame instead.
    pub fn pump_for(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            self.run_until_idle();
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wake_at = {
                let inner = self.inner.borrow();
                inner
                    .timers
                    .iter()
                    .map(|entry| entry.due)
                    .min()
                    .map_or(deadline, |due| due.min(deadline))
            };
            let sleep = wake_at.saturating_duration_since(now);
            if !sleep.is_zero() {
                std::thread::sleep(sleep);
            }
        }
    }

    /// Pending (not yet fired or cancelled) timer count.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    fn fire_due_timers(&self) -> bool {
        let mut fired_any = false;
        loop {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let now = Instant::now();
                let due_index = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= now)
                    .min_by_key(|(_, entry)| entry.due)
                    .map(|(index, _)| index);
                due_index.map(|index| inner.timers.remove(index).callback)
            };
            match callback {
                Some(callback) => {
                    callback();
                    fired_any = true;
                }
                None => break,
            }
        }
        fired_any
    }

    fn poll_ready_tasks(&self) -> bool {
        let mut polled_any = false;
        loop {
            let id = self
                .ready
                .lock()
                .expect("ready queue poisoned")
                .pop_front();
            let Some(id) = id else { break };

            // Take the task out of the slab for the duration of the poll;
            // the poll itself may spawn tasks or arm timers.
            let Some(mut task) = self.inner.borrow_mut().tasks.remove(&id) else {
                continue;
            };
            let wake = waker(Arc::new(TaskWaker {
                id,
                ready: Arc::clone(&self.ready),
            }));
            let mut cx = Context::from_waker(&wake);
            match task.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {}
                Poll::Pending => {
                    self.inner.borrow_mut().tasks.insert(id, task);
                }
            }
            polled_any = true;
        }
        polled_any
    }
}

impl Scheduler for StdScheduler {
    fn spawn(&self, task: Pin<Box<dyn Future<Output = ()>>>) {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_task_id;
            inner.next_task_id += 1;
            inner.tasks.insert(id, task);
            id
        };
        self.ready
            .lock()
            .expect("ready queue poisoned")
            .push_back(id);
    }

    fn start_timer(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_timer_id);
        inner.next_timer_id += 1;
        inner.timers.push(TimerEntry {
            id,
            due: Instant::now() + delay,
            callback,
        });
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        inner.timers.retain(|entry| entry.id != id);
    }
}
