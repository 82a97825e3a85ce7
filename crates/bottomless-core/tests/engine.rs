//! Gate behavior tests over virtual time.
//!
//! Geometry used throughout: viewport 800 with the default relative(0.5)
//! trigger gives a 400px load zone; content starts at 3000 so nothing is in
//! the zone until a test scrolls there.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use bottomless_core::{
    attach, attach_with_done, EngineHandle, HeightChangeConfig, LoadMoreConfig, OffsetTrigger,
    ScrollMetrics,
};
use bottomless_testing::{FakeScrollView, PendingLoads, TestScheduler};

struct Harness {
    scheduler: Rc<TestScheduler>,
    view: Rc<FakeScrollView>,
    loads: Rc<PendingLoads>,
    handle: EngineHandle,
}

fn harness(metrics: ScrollMetrics, config: LoadMoreConfig) -> Harness {
    let scheduler = Rc::new(TestScheduler::new());
    let view = Rc::new(FakeScrollView::new(metrics));
    let loads = PendingLoads::new();
    let handle = attach_with_done(
        Rc::clone(&view),
        scheduler.clone(),
        config,
        loads.callback(),
    );
    scheduler.run_until_idle();
    Harness {
        scheduler,
        view,
        loads,
        handle,
    }
}

fn tall_content() -> ScrollMetrics {
    ScrollMetrics::new(3000.0, 800.0, 0.0)
}

fn config(stability: HeightChangeConfig) -> LoadMoreConfig {
    LoadMoreConfig {
        trigger: OffsetTrigger::default(),
        stability,
    }
}

/// Completes the oldest pending load and pumps the scheduler so the engine
/// observes the completion.
fn finish_load(h: &Harness) {
    assert!(h.loads.complete_next());
    h.scheduler.run_until_idle();
}

#[test]
fn triggers_when_scrolled_into_zone() {
    let h = harness(tall_content(), LoadMoreConfig::default());
    assert_eq!(h.loads.invocations(), 0);

    // distance = 3000 - (1900 + 800) = 300 < 400
    h.view.scroll_to(1900.0);
    assert_eq!(h.loads.invocations(), 1);
}

#[test]
fn does_not_trigger_outside_zone() {
    let h = harness(tall_content(), LoadMoreConfig::default());
    // distance = 3000 - (1000 + 800) = 1200
    h.view.scroll_to(1000.0);
    assert_eq!(h.loads.invocations(), 0);
}

#[test]
fn initial_evaluation_fires_for_short_content() {
    // Content shorter than the viewport is already in the zone at attach;
    // no events are needed to start the first load.
    let h = harness(ScrollMetrics::new(100.0, 800.0, 0.0), LoadMoreConfig::default());
    assert_eq!(h.loads.invocations(), 1);
}

#[test]
fn overscroll_triggers() {
    // distance = 1000 - (700 + 800) = -500, still inside the zone.
    let h = harness(ScrollMetrics::new(1000.0, 800.0, 700.0), LoadMoreConfig::default());
    assert_eq!(h.loads.invocations(), 1);
}

#[test]
fn absolute_trigger_respects_distance() {
    let config = LoadMoreConfig {
        trigger: OffsetTrigger::absolute(100.0),
        stability: HeightChangeConfig::Never,
    };
    let h = harness(ScrollMetrics::new(1050.0, 800.0, 0.0), config);

    // distance = 1050 - (100 + 800) = 150 >= 100
    h.view.scroll_to(100.0);
    assert_eq!(h.loads.invocations(), 0);

    // distance = 1050 - (160 + 800) = 90 < 100
    h.view.scroll_to(160.0);
    assert_eq!(h.loads.invocations(), 1);
}

#[test]
fn at_most_one_load_in_flight() {
    let h = harness(tall_content(), config(HeightChangeConfig::Never));

    h.view.scroll_to(1900.0);
    assert_eq!(h.loads.invocations(), 1);

    // Qualifying events while the load is outstanding are dropped, not
    // queued; even a content-size change does not bypass the guard.
    h.view.scroll_to(1950.0);
    h.view.scroll_to(2100.0);
    h.view.set_content_height(4000.0);
    h.scheduler.run_until_idle();
    assert_eq!(h.loads.invocations(), 1);
    assert_eq!(h.loads.in_flight(), 1);

    finish_load(&h);

    // The guard re-arms only after completion; the dropped events are gone.
    assert_eq!(h.loads.invocations(), 1);
    h.view.scroll_to(3150.0);
    assert_eq!(h.loads.invocations(), 2);
}

#[test]
fn never_policy_triggers_on_every_idle_zone_event() {
    let scheduler = Rc::new(TestScheduler::new());
    let view = Rc::new(FakeScrollView::new(tall_content()));
    let count = Rc::new(Cell::new(0));

    let c = Rc::clone(&count);
    let _handle = attach(
        Rc::clone(&view),
        scheduler.clone(),
        config(HeightChangeConfig::Never),
        move || {
            let c = Rc::clone(&c);
            async move {
                c.set(c.get() + 1);
            }
        },
    );
    scheduler.run_until_idle();

    for expected in 1..=3 {
        view.scroll_to(1900.0 + expected as f32);
        scheduler.run_until_idle();
        assert_eq!(count.get(), expected);
    }
}

#[test]
fn always_policy_requires_height_change() {
    let h = harness(tall_content(), config(HeightChangeConfig::Always));

    h.view.scroll_to(1900.0);
    assert_eq!(h.loads.invocations(), 1);
    finish_load(&h);

    // Same content height: suppressed, no matter how much time passes.
    h.view.scroll_to(1950.0);
    h.scheduler.advance(Duration::from_secs(3600));
    h.view.scroll_to(2000.0);
    assert_eq!(h.loads.invocations(), 1);

    // The appended batch finally lands in the layout. distance =
    // 3100 - (2000 + 800) = 300, still inside the zone.
    h.view.set_content_height(3100.0);
    assert_eq!(h.loads.invocations(), 2);
}

#[test]
fn shrinking_content_counts_as_change() {
    let h = harness(tall_content(), config(HeightChangeConfig::Always));

    h.view.scroll_to(1900.0);
    finish_load(&h);

    // Height moved in either direction satisfies the policy.
    h.view.set_content_height(2900.0);
    assert_eq!(h.loads.invocations(), 2);
}

#[test]
fn until_policy_waives_requirement_after_timeout() {
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::from_secs(2))),
    );

    h.view.scroll_to(1900.0);
    assert_eq!(h.loads.invocations(), 1);
    finish_load(&h);

    // Unchanged height inside the zone: suppressed, bounded wait starts.
    h.view.scroll_to(1950.0);
    assert_eq!(h.loads.invocations(), 1);
    assert_eq!(h.scheduler.pending_timers(), 1);

    h.scheduler.advance(Duration::from_millis(1999));
    h.view.scroll_to(2000.0);
    assert_eq!(h.loads.invocations(), 1);

    // Past the timeout the height requirement is waived; the next event
    // triggers even though the content never changed.
    h.scheduler.advance(Duration::from_millis(1));
    h.view.scroll_to(2010.0);
    assert_eq!(h.loads.invocations(), 2);
}

#[test]
fn until_policy_arms_a_single_timer() {
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::from_secs(5))),
    );

    h.view.scroll_to(1900.0);
    finish_load(&h);

    h.view.scroll_to(1950.0);
    h.view.scroll_to(2000.0);
    h.view.scroll_to(2050.0);
    assert_eq!(h.scheduler.pending_timers(), 1);
}

#[test]
fn no_timer_outside_zone() {
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::from_secs(5))),
    );

    h.view.scroll_to(100.0);
    h.view.scroll_to(200.0);
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn trigger_cancels_pending_timer() {
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::from_secs(5))),
    );

    h.view.scroll_to(1900.0);
    finish_load(&h);

    h.view.scroll_to(1950.0);
    assert_eq!(h.scheduler.pending_timers(), 1);

    // A real height change (still inside the zone) fires the next load;
    // the bounded wait restarts from that load instead of surviving it.
    h.view.set_content_height(3100.0);
    assert_eq!(h.loads.invocations(), 2);
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn detach_cancels_timer_and_ignores_late_completion() {
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::from_secs(5))),
    );

    h.view.scroll_to(1900.0);
    assert_eq!(h.loads.invocations(), 1);
    assert!(h.handle.is_attached());

    h.handle.detach();
    assert!(!h.handle.is_attached());
    assert_eq!(h.view.listener_count(), 0);
    assert_eq!(h.scheduler.pending_timers(), 0);

    // The in-flight load resolving after detach is a no-op, not an error.
    finish_load(&h);

    // Detach is idempotent and the engine stays quiet.
    h.handle.detach();
    h.view.scroll_to(2100.0);
    h.scheduler.run_until_idle();
    assert_eq!(h.loads.invocations(), 1);
}

#[test]
fn dropping_the_handle_detaches() {
    let h = harness(tall_content(), LoadMoreConfig::default());
    assert_eq!(h.view.listener_count(), 1);

    let Harness {
        scheduler,
        view,
        loads,
        handle,
    } = h;
    drop(handle);

    assert_eq!(view.listener_count(), 0);
    view.scroll_to(1900.0);
    scheduler.run_until_idle();
    assert_eq!(loads.invocations(), 0);
}

#[test]
fn empty_content_needs_never_policy_to_bootstrap() {
    // Height 0 at attach matches the recorded-height sentinel, so the
    // height-change policies stay suppressed until a size event arrives;
    // Never triggers purely on position.
    let always = harness(
        ScrollMetrics::new(0.0, 800.0, 0.0),
        config(HeightChangeConfig::Always),
    );
    assert_eq!(always.loads.invocations(), 0);
    always.view.set_content_height(50.0);
    assert_eq!(always.loads.invocations(), 1);

    let never = harness(
        ScrollMetrics::new(0.0, 800.0, 0.0),
        config(HeightChangeConfig::Never),
    );
    assert_eq!(never.loads.invocations(), 1);
}

#[test]
fn zero_timeout_until_degrades_to_always() {
    // until(seconds > 0) is the contract; zero keeps Always semantics
    // instead of arming an instant timer.
    let h = harness(
        tall_content(),
        config(HeightChangeConfig::Until(Duration::ZERO)),
    );

    h.view.scroll_to(1900.0);
    finish_load(&h);

    h.view.scroll_to(1950.0);
    assert_eq!(h.scheduler.pending_timers(), 0);
    h.scheduler.advance(Duration::from_secs(3600));
    h.view.scroll_to(2000.0);
    assert_eq!(h.loads.invocations(), 1);
}
