//! Reactive Runtime
//!
//! The runtime is the per-thread home of the state shared by every reactive
//! value on that thread: the configuration, the job queue and the manual
//! microtask queue.
//!
//! # Threading
//!
//! Reactivity is single-threaded and cooperative. Each thread gets its own
//! runtime through thread-local storage, so nothing here needs a lock.
//! Reactive values must stay on the thread that created them (they are
//! `!Send`), which keeps one thread's writes from ever reaching another
//! thread's queue.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::debug;

use crate::config::RuntimeConfig;
use crate::scheduler::JobQueue;

use super::context::ReactiveContext;
use super::subscriber::Subscriber;

/// A deferred callback waiting on the manual microtask queue.
pub(crate) type Microtask = Box<dyn FnOnce()>;

/// Per-thread reactive runtime.
pub struct Runtime {
    config: RefCell<RuntimeConfig>,
    pub(crate) queue: RefCell<JobQueue>,
    pub(crate) microtasks: RefCell<VecDeque<Microtask>>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Run `f` with this thread's runtime.
pub(crate) fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&Runtime) -> R,
{
    RUNTIME.with(f)
}

impl Runtime {
    fn new() -> Self {
        Self {
            config: RefCell::new(RuntimeConfig::default()),
            queue: RefCell::new(JobQueue::new()),
            microtasks: RefCell::new(VecDeque::new()),
        }
    }

    /// Install a configuration for the current thread.
    ///
    /// Takes effect for every subsequent read, write and flush. Jobs and
    /// microtasks that are already queued are kept.
    pub fn configure(config: RuntimeConfig) {
        debug!(?config, "runtime configured");
        with_runtime(|rt| *rt.config.borrow_mut() = config);
    }

    /// The configuration of the current thread.
    pub fn config() -> RuntimeConfig {
        with_runtime(|rt| *rt.config.borrow())
    }

    /// Get the subscriber currently being tracked, if any.
    pub fn current_subscriber() -> Option<Subscriber> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a reactive context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}
