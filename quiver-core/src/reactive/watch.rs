//! Watch Implementation
//!
//! `watch` is the entry point that binds a side effect to reactive state.
//!
//! # How Watchers Work
//!
//! 1. When created, the watcher runs its callback immediately and
//!    synchronously. Every reactive value read during that run registers the
//!    watcher with its Dep.
//!
//! 2. When any of those values is written, the watcher is queued. The queue
//!    is flushed on the next tick, so any number of writes in one synchronous
//!    burst produce a single re-run that sees the final values.
//!
//! 3. Every re-run tracks dependencies from scratch. A value read only in a
//!    branch that is no longer taken is not recorded again, but its Dep keeps
//!    the old registration unless the runtime is configured with
//!    [`DependencyCleanup::Prune`](crate::config::DependencyCleanup::Prune).
//!
//! There is no way to stop a watcher. It lives as long as some Dep holds it.

use std::fmt;

use tracing::debug;

use super::subscriber::{Subscriber, SubscriberId};

/// Handle to a running watcher.
#[derive(Clone)]
pub struct Watcher {
    subscriber: Subscriber,
}

/// Run `callback` now, and again whenever a reactive value it read changes.
///
/// A panic in the initial run propagates to the caller once the tracking
/// context has been cleared.
///
/// # Example
///
/// ```rust,ignore
/// let count = reference(0);
/// let label = Rc::new(RefCell::new(String::new()));
///
/// watch({
///     let count = count.clone();
///     let label = label.clone();
///     move || *label.borrow_mut() = format!("hello {}", count.value())
/// });
/// assert_eq!(*label.borrow(), "hello 0");
///
/// count.set_value(1);
/// run_microtasks();
/// assert_eq!(*label.borrow(), "hello 1");
/// ```
pub fn watch<F>(callback: F) -> Watcher
where
    F: Fn() + 'static,
{
    let subscriber = Subscriber::new(callback);
    debug!(subscriber = subscriber.id().raw(), "watch registered");

    subscriber.run();

    Watcher { subscriber }
}

impl Watcher {
    /// Get the watcher's subscriber ID.
    pub fn id(&self) -> SubscriberId {
        self.subscriber.id()
    }

    /// Number of completed runs, including the initial one.
    pub fn run_count(&self) -> usize {
        self.subscriber.run_count()
    }

    /// Number of distinct reactive values read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.subscriber.dependency_count()
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
