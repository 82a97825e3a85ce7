//! Load-callback instrumentation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bottomless_core::DoneSignal;

#[derive(Default)]
struct Inner {
    invocations: usize,
    pending: VecDeque<DoneSignal>,
}

/// Captures every load invocation and holds its completion open until the
/// test releases it, so in-flight-guard behavior can be scripted precisely.
#[derive(Default)]
pub struct PendingLoads {
    inner: RefCell<Inner>,
}

impl PendingLoads {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Callback to pass to `attach_with_done`; records the invocation and
    /// parks the signal.
    pub fn callback(self: &Rc<Self>) -> impl FnMut(DoneSignal) + 'static {
        let this = Rc::clone(self);
        move |done| {
            let mut inner = this.inner.borrow_mut();
            inner.invocations += 1;
            inner.pending.push_back(done);
        }
    }

    /// Total number of times the load callback was invoked.
    pub fn invocations(&self) -> usize {
        self.inner.borrow().invocations
    }

    /// Loads currently held open.
    pub fn in_flight(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Completes the oldest held load. Returns false if none was pending.
    pub fn complete_next(&self) -> bool {
        let done = self.inner.borrow_mut().pending.pop_front();
        match done {
            Some(done) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    /// Completes every held load, oldest first.
    pub fn complete_all(&self) {
        while self.complete_next() {}
    }
}
