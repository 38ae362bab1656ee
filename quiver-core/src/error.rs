//! Error types for the Quiver runtime.
//!
//! The reactive core itself never fails: reads, writes and dependency
//! registration always succeed. Errors only come from the edges of the
//! system (configuration loading, flush limits and the store layer).
//!
//! Failures inside user callbacks are panics, not `Error` values. See
//! [`ErrorPolicy`](crate::config::ErrorPolicy) for how the scheduler treats
//! them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the Quiver runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration JSON could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single flush ran more jobs than the configured limit.
    ///
    /// The jobs still queued when the limit was hit are discarded.
    #[error("flush exceeded the limit of {limit} jobs")]
    FlushLimitExceeded { limit: usize },

    /// `Store::commit` was called with a mutation name that was never
    /// registered.
    #[error("unknown mutation type: {0}")]
    UnknownMutation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
