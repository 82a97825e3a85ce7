//! Infinite-loading trigger engine for scrollable views.
//!
//! `bottomless` watches a scrollable view's position and content-size
//! events and invokes an asynchronous load-more callback when the viewer
//! approaches the bottom, while guaranteeing at most one load in flight and
//! suppressing re-triggers until newly loaded content has settled into the
//! layout (or a bounded wait has elapsed).
//!
//! The host view is an external collaborator: it implements
//! [`ScrollSource`] to deliver events and expose geometry, and provides a
//! [`Scheduler`] that runs the load future and one-shot timers on the
//! single UI-update context. The engine itself never suspends and never
//! touches a wall clock, which keeps its behavior fully deterministic under
//! a virtual scheduler in tests.
//!
//! ```no_run
//! use std::rc::Rc;
//! use bottomless_core::{attach, LoadMoreConfig};
//! # fn demo(view: Rc<impl bottomless_core::ScrollSource + 'static>,
//! #         scheduler: Rc<dyn bottomless_core::Scheduler>) {
//! let handle = attach(view, scheduler, LoadMoreConfig::default(), || async {
//!     // fetch and append the next batch
//! });
//! // ... later:
//! handle.detach();
//! # }
//! ```

mod completion;
mod engine;
mod metrics;
mod platform;
mod source;
mod stability;
mod trigger;

pub use completion::{completion, Completion, DoneSignal};
pub use engine::{attach, attach_with_done, EngineHandle, LoadMoreConfig};
pub use metrics::ScrollMetrics;
pub use platform::{Scheduler, TimerId, TimerRegistration};
pub use source::{ScrollEvent, ScrollSource, SubscriptionId};
pub use stability::HeightChangeConfig;
pub use trigger::{is_in_load_zone, OffsetTrigger};
