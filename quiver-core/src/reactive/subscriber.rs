//! Subscriber types for the reactive system.
//!
//! A Subscriber is a re-runnable callback that depends on reactive values.
//! Deps hold subscribers, the job queue runs them, and the tracking context
//! points at the one currently executing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::warn;

use crate::config::DependencyCleanup;

use super::context::ReactiveContext;
use super::dep::{Dep, DepId, WeakDep};
use super::runtime::Runtime;

/// Unique identifier for a subscriber.
///
/// Subscriber identity is what Deps and the job queue deduplicate on: the
/// same subscriber registered twice, or queued twice, counts once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct SubscriberInner {
    id: SubscriberId,
    callback: Box<dyn Fn()>,
    run_count: Cell<usize>,
    /// Deps read during the most recent run, keyed by Dep ID.
    sources: RefCell<IndexMap<DepId, WeakDep>>,
}

/// A callback that re-runs when the reactive values it reads change.
///
/// Cloning a `Subscriber` produces another handle to the same callback.
#[derive(Clone)]
pub struct Subscriber {
    inner: Rc<SubscriberInner>,
}

impl Subscriber {
    /// Create a new subscriber around the given callback.
    ///
    /// The callback is not run.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(SubscriberInner {
                id: SubscriberId::new(),
                callback: Box::new(callback),
                run_count: Cell::new(0),
                sources: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Run the callback with this subscriber as the active tracking context.
    ///
    /// Dependencies are collected from scratch. The context is exited even if
    /// the callback panics, and the panic continues to unwind to the caller.
    /// A panicking run keeps the sources of the run before it, so a later
    /// successful run can still prune them.
    pub fn run(&self) {
        let mut previous = RestoreSources {
            subscriber: self,
            sources: Some(self.inner.sources.take()),
        };

        {
            let _ctx = ReactiveContext::enter(self.clone());
            (self.inner.callback)();
        }

        let previous = previous.disarm();
        self.inner.run_count.set(self.inner.run_count.get() + 1);

        if Runtime::config().dependency_cleanup == DependencyCleanup::Prune {
            self.prune(previous);
        }
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Number of distinct Deps read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.sources.borrow().len()
    }

    /// Remember that this subscriber read `dep` during the current run.
    pub(crate) fn record_source(&self, dep: &Dep) {
        self.inner
            .sources
            .borrow_mut()
            .entry(dep.id())
            .or_insert_with(|| dep.downgrade());
    }

    /// Unregister from every Dep in `previous` that the last run did not read.
    fn prune(&self, previous: IndexMap<DepId, WeakDep>) {
        let current = self.inner.sources.borrow();
        let mut pruned = 0usize;

        for (dep_id, weak) in previous {
            if current.contains_key(&dep_id) {
                continue;
            }
            if let Some(dep) = weak.upgrade() {
                dep.unsubscribe(self.inner.id);
                pruned += 1;
            }
        }

        if pruned > 0 {
            warn!(subscriber = self.inner.id.raw(), pruned, "pruned stale dependencies");
        }
    }
}

/// Merges the previous run's sources back if a run unwinds.
struct RestoreSources<'a> {
    subscriber: &'a Subscriber,
    sources: Option<IndexMap<DepId, WeakDep>>,
}

impl RestoreSources<'_> {
    fn disarm(&mut self) -> IndexMap<DepId, WeakDep> {
        self.sources.take().unwrap_or_default()
    }
}

impl Drop for RestoreSources<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.sources.take() {
            let mut sources = self.subscriber.inner.sources.borrow_mut();
            for (dep_id, weak) in previous {
                sources.entry(dep_id).or_insert(weak);
            }
        }
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Subscriber {}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .finish()
    }
}
