#![deny(missing_docs)]

//! A bounded-concurrency batch task executor.
//!
//! This library provides a [`Pool`] that runs a batch of independent,
//! fallible tasks across a fixed number of worker threads. A failing
//! task never aborts the batch; its error is collected and handed back
//! to the caller once every task has been attempted exactly once.

mod error;
mod pool;

pub use error::{PoolError, Result};
pub use pool::{default_pool_size, pool_size, Pool, Task};
