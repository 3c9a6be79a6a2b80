use thiserror::Error;

/// Error type for pool configuration and lifecycle misuse.
///
/// Failures produced by individual tasks are not represented here;
/// those are collected and returned by [`Pool::run`](crate::Pool::run).
#[derive(Error, Debug)]
pub enum PoolError {
    /// The requested worker count is not a positive integer.
    #[error("invalid concurrency {0}: a pool needs at least one worker")]
    InvalidConcurrency(u32),

    /// `run` was called a second time on a pool that already ran its batch.
    #[error("pool has already run its batch")]
    AlreadyRan,
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
