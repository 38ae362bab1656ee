//! Integration Tests for the Reactive System
//!
//! These tests verify that reactive values, watchers and the scheduler work
//! together correctly through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use quiver_core::config::{ErrorPolicy, TickDriver};
use quiver_core::reactive::ReactiveContext;
use quiver_core::scheduler::{pending_jobs, scheduler_state, SchedulerState};
use quiver_core::{
    dispatch, reactive, reference, run_microtasks, watch, Accessor, Runtime, RuntimeConfig, Store,
};

/// A write to a tracked value re-runs the watcher once after the next drain,
/// even when the value written equals the current one.
#[test]
fn write_reruns_watcher_once() {
    let count = reference(3);
    let runs = Rc::new(Cell::new(0));

    let (count_c, runs_c) = (count.clone(), runs.clone());
    watch(move || {
        let _ = count_c.value();
        runs_c.set(runs_c.get() + 1);
    });
    assert_eq!(runs.get(), 1);

    count.set_value(3);
    assert_eq!(runs.get(), 1);

    run_microtasks();
    assert_eq!(runs.get(), 2);

    // Nothing else is pending
    run_microtasks();
    assert_eq!(runs.get(), 2);
}

/// Many notifications of one watcher in a single burst produce one run.
#[test]
fn burst_of_writes_runs_watcher_once() {
    let a = reference(0);
    let b = reference(0);
    let runs = Rc::new(Cell::new(0));

    let (a_c, b_c, runs_c) = (a.clone(), b.clone(), runs.clone());
    watch(move || {
        let _ = a_c.value() + b_c.value();
        runs_c.set(runs_c.get() + 1);
    });

    dispatch(|| {
        for i in 0..10 {
            a.set_value(i);
            b.set_value(i);
        }
    });

    assert_eq!(runs.get(), 2);
}

/// A watcher that writes a value another watcher reads triggers that
/// watcher within the same flush.
#[test]
fn flush_drains_induced_writes() {
    let source = reference(1);
    let doubled = reference(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let (source_c, doubled_c) = (source.clone(), doubled.clone());
    watch(move || {
        let value = source_c.value();
        doubled_c.set_value(value * 2);
    });

    let (doubled_c, seen_c) = (doubled.clone(), seen.clone());
    watch(move || {
        seen_c.borrow_mut().push(doubled_c.value());
    });

    // The initial write happened before anyone read `doubled`
    assert_eq!(run_microtasks(), 0);
    assert_eq!(*seen.borrow(), vec![2]);

    source.set_value(5);
    let ran = run_microtasks();

    assert_eq!(ran, 1, "one tick drains the whole chain");
    assert_eq!(*seen.borrow(), vec![2, 10]);
    assert_eq!(pending_jobs(), 0);
    assert_eq!(scheduler_state(), SchedulerState::Idle);
}

/// Reading outside of `watch` never registers anything.
#[test]
fn reads_outside_watch_do_not_track() {
    let count = reference(0);
    let state = reactive([("count", 0)]);

    assert!(!ReactiveContext::is_active());
    let _ = count.value();
    let _ = count.read();
    let _ = state.get("count");

    assert_eq!(count.subscriber_count(), 0);
    assert_eq!(state.field("count").unwrap().subscriber_count(), 0);

    count.set_value(1);
    state.set("count", 1);
    assert_eq!(pending_jobs(), 0);
}

/// The re-run sees the last value written in the burst.
#[test]
fn rerun_sees_final_value() {
    let count = reference(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let (count_c, seen_c) = (count.clone(), seen.clone());
    watch(move || seen_c.borrow_mut().push(count_c.value()));

    count.set_value(1);
    count.set_value(2);
    run_microtasks();

    assert_eq!(*seen.borrow(), vec![0, 2]);
}

/// `watch` runs its callback before returning.
#[test]
fn watch_runs_synchronously() {
    let count = reference(0);
    count.set_value(9);
    count.set_value(10);

    let seen = Rc::new(Cell::new(None));
    let (count_c, seen_c) = (count.clone(), seen.clone());
    let watcher = watch(move || seen_c.set(Some(count_c.value())));

    assert_eq!(seen.get(), Some(10));
    assert_eq!(watcher.run_count(), 1);
}

/// Watchers re-run in the order they were queued.
#[test]
fn watchers_run_in_queue_order() {
    let first = reference(0);
    let second = reference(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    let (second_c, log_c) = (second.clone(), log.clone());
    watch(move || {
        let _ = second_c.value();
        log_c.borrow_mut().push("second");
    });
    let (first_c, log_c) = (first.clone(), log.clone());
    watch(move || {
        let _ = first_c.value();
        log_c.borrow_mut().push("first");
    });
    log.borrow_mut().clear();

    dispatch(|| {
        first.set_value(1);
        second.set_value(1);
    });

    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

/// Reactive object fields drive watchers, later fields do not.
#[test]
fn reactive_object_renders_label() {
    let state = reactive([("count", 0)]);
    let label = Rc::new(RefCell::new(String::new()));

    let (state_c, label_c) = (state.clone(), label.clone());
    watch(move || {
        let count = state_c.get("count").unwrap_or_default();
        *label_c.borrow_mut() = format!("hello {count}");
    });
    assert_eq!(*label.borrow(), "hello 0");

    dispatch(|| state.update("count", |c| c + 1));
    assert_eq!(*label.borrow(), "hello 1");

    state.set("late", 7);
    assert!(!state.is_reactive("late"));
    assert_eq!(pending_jobs(), 0);
}

/// Committing to a store re-renders watchers and reaches plugins.
#[test]
fn store_commit_drives_watchers() {
    let committed = Rc::new(RefCell::new(Vec::new()));
    let committed_c = committed.clone();

    let store = Store::builder()
        .state("count", 0i64)
        .mutation("addCount", |state, payload| {
            let step = payload.copied().unwrap_or(1);
            state.update("count", |count| count + step);
        })
        .plugin(move |store| {
            store.subscribe(move |mutation, _| {
                committed_c.borrow_mut().push(mutation.kind.clone());
            });
        })
        .build();

    let label = Rc::new(RefCell::new(String::new()));
    let (state, label_c) = (store.state().clone(), label.clone());
    let watcher = watch(move || {
        *label_c.borrow_mut() = format!("hello {}", state.get("count").unwrap_or_default());
    });

    dispatch(|| {
        store.commit("addCount", Some(1)).unwrap();
        store.commit("addCount", None).unwrap();
    });

    assert_eq!(*label.borrow(), "hello 2");
    assert_eq!(watcher.run_count(), 2);
    assert_eq!(*committed.borrow(), vec!["addCount", "addCount"]);
    assert!(store.commit("missing", None).is_err());
}

/// Isolated failures do not stop other watchers from re-running.
#[test]
fn isolate_policy_keeps_other_watchers_alive() {
    Runtime::configure(RuntimeConfig::default().with_error_policy(ErrorPolicy::Isolate));

    let count = reference(0);
    let seen = Rc::new(Cell::new(0));

    let count_c = count.clone();
    watch(move || {
        if count_c.value() > 0 {
            panic!("render failed");
        }
    });
    let (count_c, seen_c) = (count.clone(), seen.clone());
    watch(move || seen_c.set(count_c.value()));

    dispatch(|| count.set_value(4));

    assert_eq!(seen.get(), 4);
    assert!(!ReactiveContext::is_active());
}

/// With the tokio driver the flush runs as a task on the local set.
#[tokio::test]
async fn tokio_driver_flushes_on_local_set() {
    Runtime::configure(RuntimeConfig::default().with_tick_driver(TickDriver::Tokio));

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let count = reference(0);
            let seen = Rc::new(RefCell::new(Vec::new()));

            let (count_c, seen_c) = (count.clone(), seen.clone());
            watch(move || seen_c.borrow_mut().push(count_c.value()));

            count.set_value(1);
            count.set_value(2);
            assert_eq!(scheduler_state(), SchedulerState::Pending);
            assert_eq!(*seen.borrow(), vec![0]);

            for _ in 0..16 {
                if scheduler_state() == SchedulerState::Idle {
                    break;
                }
                tokio::task::yield_now().await;
            }

            assert_eq!(scheduler_state(), SchedulerState::Idle);
            assert_eq!(*seen.borrow(), vec![0, 2]);
        })
        .await;
}

/// A tick that cannot be spawned leaves the scheduler idle, so the next
/// write inside a local set schedules the flush that drains the queue.
#[tokio::test]
async fn tokio_driver_recovers_after_spawn_outside_local_set() {
    Runtime::configure(RuntimeConfig::default().with_tick_driver(TickDriver::Tokio));

    let count = reference(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let (count_c, seen_c) = (count.clone(), seen.clone());
    watch(move || seen_c.borrow_mut().push(count_c.value()));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| count.set_value(1)));
    assert!(result.is_err());
    assert_eq!(scheduler_state(), SchedulerState::Idle);
    assert_eq!(pending_jobs(), 1);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            count.set_value(2);
            assert_eq!(scheduler_state(), SchedulerState::Pending);

            for _ in 0..16 {
                if scheduler_state() == SchedulerState::Idle {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await;

    assert_eq!(scheduler_state(), SchedulerState::Idle);
    assert_eq!(pending_jobs(), 0);
    assert_eq!(*seen.borrow(), vec![0, 2]);
}

/// A panicking flush on the local set does not take the set down, and the
/// jobs it left behind run on the next tick.
#[tokio::test]
async fn tokio_driver_survives_panicking_flush() {
    Runtime::configure(RuntimeConfig::default().with_tick_driver(TickDriver::Tokio));

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let count = reference(0);
            let seen = Rc::new(RefCell::new(Vec::new()));

            let count_c = count.clone();
            watch(move || {
                if count_c.value() == 1 {
                    panic!("render failed");
                }
            });
            let (count_c, seen_c) = (count.clone(), seen.clone());
            watch(move || seen_c.borrow_mut().push(count_c.value()));

            count.set_value(1);
            for _ in 0..16 {
                if scheduler_state() == SchedulerState::Idle {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert_eq!(scheduler_state(), SchedulerState::Idle);
            assert_eq!(pending_jobs(), 1);
            assert_eq!(*seen.borrow(), vec![0]);

            count.set_value(2);
            for _ in 0..16 {
                if scheduler_state() == SchedulerState::Idle {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert_eq!(scheduler_state(), SchedulerState::Idle);
            assert_eq!(*seen.borrow(), vec![0, 2]);
        })
        .await;
}
