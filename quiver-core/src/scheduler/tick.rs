//! Deferred Ticks
//!
//! A tick defers work until the current synchronous burst has finished. The
//! runtime supports two drivers, chosen by
//! [`RuntimeConfig::tick_driver`](crate::config::RuntimeConfig):
//!
//! - `Manual`: callbacks go onto a thread-local microtask queue. The host
//!   event loop drains it with [`run_microtasks`], or wraps each burst in
//!   [`dispatch`].
//!
//! - `Tokio`: callbacks are spawned with `tokio::task::spawn_local` and run
//!   when the surrounding `LocalSet` next polls its tasks.
//!
//! Both drivers run callbacks in submission order. A panicking callback
//! unwinds out of `run_microtasks` with the manual driver; with the tokio
//! driver it is caught and logged, and the local set keeps running.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, trace};

use crate::config::TickDriver;
use crate::reactive::runtime::with_runtime;
use crate::reactive::Runtime;

use super::panic_message;

/// Defer `callback` until the current synchronous burst completes.
///
/// # Panics
///
/// With the tokio driver, panics if called outside of a
/// `tokio::task::LocalSet`.
pub fn next_tick<F>(callback: F)
where
    F: FnOnce() + 'static,
{
    match Runtime::config().tick_driver {
        TickDriver::Manual => {
            with_runtime(|rt| rt.microtasks.borrow_mut().push_back(Box::new(callback)));
            trace!("microtask queued");
        }
        TickDriver::Tokio => {
            // A panic cannot unwind into the caller of `next_tick` from a
            // spawned task, so it is logged here instead of being swallowed
            // by the detached JoinHandle.
            let _ = tokio::task::spawn_local(async move {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
                    error!(
                        message = panic_message(payload.as_ref()),
                        "tick panicked on local set"
                    );
                }
            });
            trace!("tick spawned on local set");
        }
    }
}

/// Run queued microtasks until none are left.
///
/// Microtasks queued while draining run in the same call. Returns the number
/// of microtasks that ran. A panicking microtask unwinds out of this call and
/// leaves the rest queued.
pub fn run_microtasks() -> usize {
    let mut ran = 0;

    loop {
        let task = with_runtime(|rt| rt.microtasks.borrow_mut().pop_front());
        let Some(task) = task else {
            break;
        };
        task();
        ran += 1;
    }

    ran
}

/// Run `burst` synchronously, then drain the microtask queue.
///
/// This is one turn of an explicit event loop: every write made by `burst`
/// is queued before any watcher re-runs.
pub fn dispatch<R>(burst: impl FnOnce() -> R) -> R {
    let result = burst();
    run_microtasks();
    result
}

/// Number of callbacks waiting on the manual microtask queue.
pub fn pending_microtasks() -> usize {
    with_runtime(|rt| rt.microtasks.borrow().len())
}
