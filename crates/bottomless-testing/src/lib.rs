//! Deterministic testing utilities for the bottomless engine.
//!
//! Timing-dependent engine behavior (the bounded stability wait, load
//! completion ordering) is a classic source of flaky tests, so nothing in
//! here touches a wall clock: [`TestScheduler`] runs timers on virtual time
//! advanced manually from the test body, [`FakeScrollView`] emits scroll
//! events on demand, and [`PendingLoads`] holds load completions open until
//! the test releases them.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use bottomless_core::{attach_with_done, LoadMoreConfig, ScrollMetrics};
//! use bottomless_testing::{FakeScrollView, PendingLoads, TestScheduler};
//!
//! let scheduler = Rc::new(TestScheduler::new());
//! let view = Rc::new(FakeScrollView::new(ScrollMetrics::new(2000.0, 800.0, 0.0)));
//! let loads = PendingLoads::new();
//!
//! let handle = attach_with_done(
//!     Rc::clone(&view),
//!     scheduler.clone(),
//!     LoadMoreConfig::default(),
//!     loads.callback(),
//! );
//!
//! view.scroll_to(1400.0);
//! scheduler.run_until_idle();
//! assert_eq!(loads.invocations(), 1);
//! # drop(handle);
//! ```

mod fake_scroll;
mod pending_loads;
mod test_scheduler;

pub use fake_scroll::FakeScrollView;
pub use pending_loads::PendingLoads;
pub use test_scheduler::TestScheduler;
