//! Reactive Primitives
//!
//! This module implements the dependency-tracking half of Quiver: reactive
//! cells and objects, the Deps behind them, and the `watch` entry point.
//!
//! # Concepts
//!
//! ## Deps
//!
//! Every reactive property owns a [`Dep`], the set of subscribers that read
//! it. Reading the property inside a tracked computation adds the computation
//! to the set; writing the property queues every member for a re-run.
//!
//! ## Reactive properties
//!
//! A [`Ref`] is a standalone reactive cell. A [`ReactiveObject`] is a map of
//! named fields, each backed by its own `Ref`. Both are read and written
//! through explicit accessors ([`Accessor::read`], [`Accessor::write`]).
//!
//! ## Watchers
//!
//! [`watch`] runs a callback with tracking enabled, so it discovers its own
//! dependencies, and re-runs it after any of them is written.
//!
//! # Implementation Notes
//!
//! Tracking uses a thread-local context stack. When a Dep is read, it checks
//! for a running subscriber and, if there is one, registers it. Re-runs go
//! through the [`scheduler`](crate::scheduler), never straight from a write.

mod cell;
mod context;
mod dep;
mod object;
pub(crate) mod runtime;
mod subscriber;
mod watch;

pub use cell::{reference, Accessor, Ref};
pub use context::ReactiveContext;
pub use dep::{Dep, DepId};
pub use object::{reactive, ReactiveObject};
pub use runtime::Runtime;
pub use subscriber::{Subscriber, SubscriberId};
pub use watch::{watch, Watcher};
