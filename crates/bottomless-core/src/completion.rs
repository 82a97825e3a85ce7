//! Single-shot completion signal.
//!
//! Bridges the callback-style load API (`FnMut(DoneSignal)`) into the
//! awaitable form the engine runs internally, so both attach flavors share
//! one code path.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

struct CompletionState {
    done: bool,
    waker: Option<Waker>,
}

/// Future half of the pair; resolves once the signal fires.
pub struct Completion {
    state: Rc<RefCell<CompletionState>>,
}

/// Signal half of the pair. Cloneable; the first `complete` wins and later
/// calls are no-ops. Must be invoked on the UI context.
#[derive(Clone)]
pub struct DoneSignal {
    state: Rc<RefCell<CompletionState>>,
}

/// Creates a connected future/signal pair.
pub fn completion() -> (Completion, DoneSignal) {
    let state = Rc::new(RefCell::new(CompletionState {
        done: false,
        waker: None,
    }));
    (
        Completion {
            state: Rc::clone(&state),
        },
        DoneSignal { state },
    )
}

impl DoneSignal {
    /// Marks the load as finished and wakes the waiting future.
    ///
    /// Idempotent; completing after the future was dropped is a no-op.
    pub fn complete(&self) {
        let mut state = self.state.borrow_mut();
        if state.done {
            return;
        }
        state.done = true;
        if let Some(waker) = state.waker.take() {
            drop(state);
            waker.wake();
        }
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        if state.done {
            Poll::Ready(())
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
