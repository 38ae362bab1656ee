//! Runtime Configuration
//!
//! Every thread owns its own reactive runtime, and each runtime carries a
//! [`RuntimeConfig`]. The defaults reproduce the classic behavior of the
//! engine: a manually drained microtask queue, panics that abort the flush,
//! and dependency registrations that are never pruned.
//!
//! Configurations can be built in code or loaded from JSON:
//!
//! ```rust,ignore
//! let config = RuntimeConfig::from_json(r#"{ "error_policy": "isolate" }"#)?;
//! Runtime::configure(config);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How deferred ticks are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickDriver {
    /// Ticks are queued on the thread-local microtask queue and run by
    /// [`run_microtasks`](crate::scheduler::run_microtasks) or
    /// [`dispatch`](crate::scheduler::dispatch).
    #[default]
    Manual,

    /// Ticks are spawned with `tokio::task::spawn_local`. Writes that
    /// notify must then happen inside a `tokio::task::LocalSet`. A write
    /// outside one panics and leaves its job queued for the next tick.
    Tokio,
}

/// What happens when a job panics during a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The panic unwinds out of the flush. Jobs that were still queued stay
    /// queued until the next flush. With the tokio driver the unwind stops
    /// at the spawned tick, which logs it.
    #[default]
    Abort,

    /// The panic is caught and logged, and the flush moves on to the next job.
    Isolate,
}

/// What happens to Dep registrations a subscriber no longer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCleanup {
    /// Registrations accumulate. A subscriber that read a property once keeps
    /// being notified by it even if later runs stop reading it.
    #[default]
    Retain,

    /// After every run, the subscriber unregisters from Deps it read last
    /// time but not this time.
    Prune,
}

/// Configuration of a thread's reactive runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub tick_driver: TickDriver,
    pub error_policy: ErrorPolicy,
    pub dependency_cleanup: DependencyCleanup,
    /// Upper bound on jobs executed by one flush. `None` means unbounded.
    pub max_flush_jobs: Option<usize>,
}

impl RuntimeConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing keys take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn with_tick_driver(mut self, tick_driver: TickDriver) -> Self {
        self.tick_driver = tick_driver;
        self
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    pub fn with_dependency_cleanup(mut self, dependency_cleanup: DependencyCleanup) -> Self {
        self.dependency_cleanup = dependency_cleanup;
        self
    }

    pub fn with_max_flush_jobs(mut self, limit: usize) -> Self {
        self.max_flush_jobs = Some(limit);
        self
    }
}
