//! Std scheduler for hosts without their own UI runtime.
//!
//! UI frameworks embedding the engine normally pass their own frame-loop
//! scheduler. For plain binaries (and the bundled demo) this crate provides
//! [`StdScheduler`]: a single-threaded executor plus one-shot timer queue
//! pumped from the owning thread.

mod std_scheduler;

pub use std_scheduler::StdScheduler;
