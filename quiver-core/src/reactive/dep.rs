//! Dependency Sets
//!
//! A `Dep` is the subscriber registry of a single reactive property. Reading
//! the property calls [`Dep::depend`], writing it calls [`Dep::notify`].
//!
//! Subscribers are kept in insertion order and are unique by ID. Nothing
//! depends on that order for correctness; it just makes notification
//! deterministic.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::scheduler;

use super::context::ReactiveContext;
use super::subscriber::{Subscriber, SubscriberId};

/// Unique identifier for a Dep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(u64);

impl DepId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct DepInner {
    id: DepId,
    subscribers: RefCell<IndexMap<SubscriberId, Subscriber>>,
}

/// Per-property registry of subscribers.
///
/// Cloning a `Dep` produces another handle to the same registry.
#[derive(Clone)]
pub struct Dep {
    inner: Rc<DepInner>,
}

impl Dep {
    /// Create an empty Dep.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DepInner {
                id: DepId::new(),
                subscribers: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Get the Dep's unique ID.
    pub fn id(&self) -> DepId {
        self.inner.id
    }

    /// Register the currently running subscriber, if there is one.
    ///
    /// Outside of a reactive context this does nothing.
    pub fn depend(&self) {
        let Some(subscriber) = ReactiveContext::current_subscriber() else {
            return;
        };

        let inserted = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            if subscribers.contains_key(&subscriber.id()) {
                false
            } else {
                subscribers.insert(subscriber.id(), subscriber.clone());
                true
            }
        };

        if inserted {
            trace!(
                dep = self.inner.id.raw(),
                subscriber = subscriber.id().raw(),
                "subscriber registered"
            );
        }

        subscriber.record_source(self);
    }

    /// Queue every registered subscriber for a re-run.
    pub fn notify(&self) {
        // Snapshot first: queueing must not observe a live borrow.
        let subscribers: SmallVec<[Subscriber; 4]> =
            self.inner.subscribers.borrow().values().cloned().collect();

        trace!(dep = self.inner.id.raw(), count = subscribers.len(), "notify");

        for subscriber in subscribers {
            scheduler::queue_job(subscriber);
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether the given subscriber is registered.
    pub fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.borrow().contains_key(&id)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriberId) {
        self.inner.subscribers.borrow_mut().shift_remove(&id);
    }

    pub(crate) fn downgrade(&self) -> WeakDep {
        WeakDep(Rc::downgrade(&self.inner))
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.inner.id)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Non-owning handle to a Dep, held by subscribers to find their sources.
#[derive(Clone)]
pub(crate) struct WeakDep(Weak<DepInner>);

impl WeakDep {
    pub(crate) fn upgrade(&self) -> Option<Dep> {
        self.0.upgrade().map(|inner| Dep { inner })
    }
}
