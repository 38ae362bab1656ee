//! Quiver Core
//!
//! This crate provides the core runtime for the Quiver reactive state
//! library. It implements:
//!
//! - Dependency tracking: computations discover the reactive values they read
//! - Reactive cells and objects with explicit read/write accessors
//! - A deduplicating job queue flushed once per tick
//! - A small mutation store built on top of the reactive core
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Deps, tracking context, reactive cells/objects and `watch`
//! - `scheduler`: job queue, flush loop and tick drivers
//! - `store`: named mutations over reactive state
//! - `config`: per-thread runtime configuration
//! - `error`: the crate error type
//!
//! All runtime state is thread-local. Reactive values are `!Send` and belong
//! to the thread that created them.
//!
//! # Example
//!
//! ```rust,ignore
//! use quiver_core::{dispatch, reference, watch};
//!
//! let count = reference(0);
//!
//! watch({
//!     let count = count.clone();
//!     move || println!("Count: {}", count.value())
//! });
//! // Prints "Count: 0"
//!
//! dispatch(|| {
//!     count.set_value(1);
//!     count.set_value(2);
//! });
//! // Prints "Count: 2" once
//! ```

pub mod config;
pub mod error;
pub mod reactive;
pub mod scheduler;
pub mod store;

pub use config::RuntimeConfig;
pub use error::{Error, Result};
pub use reactive::{reactive, reference, watch, Accessor, ReactiveObject, Ref, Runtime, Watcher};
pub use scheduler::{dispatch, flush_jobs, next_tick, queue_job, run_microtasks, FlushReport};
pub use store::Store;
