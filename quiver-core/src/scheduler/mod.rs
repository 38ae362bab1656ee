//! Job Scheduler
//!
//! This module batches subscriber re-runs. Writes do not re-run subscribers
//! directly; they queue them, and the queue is flushed once on the next tick.
//!
//! # Overview
//!
//! - [`queue_job`] appends a subscriber unless it is already waiting, and
//!   schedules a single flush when the scheduler was idle.
//! - [`flush_jobs`] runs queued subscribers first-in first-out until the queue
//!   is empty. Jobs queued by running jobs join the same flush, so a flush
//!   only ends at a fixed point.
//! - [`next_tick`] defers a callback until the current synchronous burst
//!   completes, using the configured tick driver.
//!
//! # Guarantees
//!
//! 1. Every write in one synchronous burst is queued before any job runs.
//! 2. A subscriber notified many times in one burst runs once, and sees the
//!    final values.
//! 3. Within a flush, jobs run in the order they were queued.
//! 4. Queued jobs are never cancelled.

mod queue;
mod tick;

pub use queue::{JobQueue, SchedulerState};
pub use tick::{dispatch, next_tick, pending_microtasks, run_microtasks};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, trace};

use crate::config::ErrorPolicy;
use crate::error::{Error, Result};
use crate::reactive::runtime::with_runtime;
use crate::reactive::{Runtime, Subscriber, SubscriberId};

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Jobs that were started.
    pub executed: usize,
    /// Jobs that panicked and were isolated.
    pub failed: usize,
}

/// Queue a subscriber to re-run on the next flush.
///
/// Does nothing if the subscriber is already queued. Schedules a flush only
/// when the scheduler is idle; a flush that is pending or running picks the
/// job up on its own.
pub fn queue_job(job: Subscriber) {
    let id = job.id();

    let (added, schedule) = with_runtime(|rt| {
        let mut queue = rt.queue.borrow_mut();
        let added = queue.push(job);
        (added, queue.state() == SchedulerState::Idle)
    });

    if added {
        trace!(subscriber = id.raw(), "job queued");
    } else {
        trace!(subscriber = id.raw(), "job already queued");
    }

    // Pending is only committed once the tick exists. If `next_tick` panics
    // the scheduler stays idle and the job waits for the next `queue_job`.
    if schedule {
        next_tick(run_scheduled_flush);
        with_runtime(|rt| rt.queue.borrow_mut().set_state(SchedulerState::Pending));
    }
}

fn run_scheduled_flush() {
    if let Err(err) = flush_jobs() {
        error!(%err, "scheduled flush failed");
    }
}

/// Run queued jobs until the queue is empty.
///
/// Usually called from the tick scheduled by [`queue_job`], but safe to call
/// directly to flush synchronously.
///
/// A panicking job either unwinds out of this call, leaving the remaining
/// jobs queued for the next flush, or is caught and counted in
/// [`FlushReport::failed`], depending on the configured
/// [`ErrorPolicy`]. The scheduler is idle again on every exit path.
///
/// # Errors
///
/// Returns [`Error::FlushLimitExceeded`] when `max_flush_jobs` is configured
/// and the flush would start one job more than the limit. The job that hit
/// the limit is discarded without running, along with every job still
/// queued at that point.
pub fn flush_jobs() -> Result<FlushReport> {
    let config = Runtime::config();

    with_runtime(|rt| rt.queue.borrow_mut().set_state(SchedulerState::Flushing));
    let _idle = IdleOnExit;

    let mut report = FlushReport::default();
    debug!(pending = pending_jobs(), "flush started");

    while let Some(job) = with_runtime(|rt| rt.queue.borrow_mut().pop_front()) {
        if let Some(limit) = config.max_flush_jobs {
            if report.executed >= limit {
                let dropped = with_runtime(|rt| rt.queue.borrow_mut().clear()) + 1;
                error!(limit, dropped, "flush limit exceeded, discarding queued jobs");
                return Err(Error::FlushLimitExceeded { limit });
            }
        }

        report.executed += 1;

        match config.error_policy {
            ErrorPolicy::Abort => job.run(),
            ErrorPolicy::Isolate => {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
                    report.failed += 1;
                    error!(
                        subscriber = job.id().raw(),
                        message = panic_message(payload.as_ref()),
                        "job panicked during flush"
                    );
                }
            }
        }
    }

    debug!(executed = report.executed, failed = report.failed, "flush finished");
    Ok(report)
}

/// Returns the scheduler to `Idle` when a flush ends, even by unwinding.
struct IdleOnExit;

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        with_runtime(|rt| rt.queue.borrow_mut().set_state(SchedulerState::Idle));
    }
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Current scheduler state on this thread.
pub fn scheduler_state() -> SchedulerState {
    with_runtime(|rt| rt.queue.borrow().state())
}

/// Number of jobs waiting to run.
pub fn pending_jobs() -> usize {
    with_runtime(|rt| rt.queue.borrow().len())
}

/// Whether the given subscriber is waiting to run.
pub fn is_queued(id: SubscriberId) -> bool {
    with_runtime(|rt| rt.queue.borrow().contains(id))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
