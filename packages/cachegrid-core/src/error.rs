//! Core error types.
//!
//! `get`/`delete` on a missing key is a normal negative result, not an
//! error — these variants cover the cases the storage core and engine
//! facade genuinely cannot proceed on.

/// Error returned by `StorageCore`/`Engine` operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The engine has not been started, or has been stopped.
    #[error("cache engine is not running")]
    NotRunning,

    /// An insert could not make enough space to satisfy the configured bounds.
    #[error("Unable to evict items to make space")]
    Refused,

    /// A caller-supplied argument violated a documented constraint.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An unexpected internal condition.
    #[error("internal error: {0}")]
    Internal(String),
}
