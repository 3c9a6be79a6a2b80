use std::fmt;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam::channel::{self, Receiver};
use log::{debug, error};

use crate::{PoolError, Result};

/// A fallible, zero-argument unit of work submitted to a [`Pool`].
pub type Task<E> = Box<dyn FnOnce() -> std::result::Result<(), E> + Send + 'static>;

/// Returns `multiplier` times the number of logical CPUs.
///
/// Callers that want hardware-proportional sizing compute it here and
/// pass the result to [`Pool::new`]; the pool itself never inspects
/// the host.
pub fn pool_size(multiplier: u32) -> u32 {
    multiplier * num_cpus::get() as u32
}

/// The conventional pool size, eight workers per logical CPU.
pub fn default_pool_size() -> u32 {
    pool_size(8)
}

/// A fixed-fan-out batch executor.
///
/// Tasks are enqueued with [`add_task`](Pool::add_task), then
/// [`run`](Pool::run) launches exactly `concurrency` worker threads,
/// hands every task to whichever worker is idle, and blocks until the
/// whole batch has been attempted. Task failures are collected rather
/// than aborting the batch.
///
/// A pool runs its batch at most once; a second call to `run` returns
/// [`PoolError::AlreadyRan`].
pub struct Pool<E> {
    tasks: Mutex<Vec<Task<E>>>,
    concurrency: u32,
    ran: AtomicBool,
}

impl<E> fmt::Debug for Pool<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("concurrency", &self.concurrency)
            .field("ran", &self.ran)
            .finish_non_exhaustive()
    }
}

impl<E: Send + 'static> Pool<E> {
    /// Creates an empty pool that will run its batch on `concurrency`
    /// worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConcurrency`] if `concurrency` is zero.
    pub fn new(concurrency: u32) -> Result<Self> {
        if concurrency == 0 {
            return Err(PoolError::InvalidConcurrency(concurrency));
        }
        Ok(Pool {
            tasks: Mutex::new(Vec::new()),
            concurrency,
            ran: AtomicBool::new(false),
        })
    }

    /// Appends a task to the pending batch.
    ///
    /// Safe to call from multiple threads. Tasks added after `run` has
    /// started are not part of the running batch and are never executed.
    pub fn add_task(&self, task: Task<E>) {
        self.tasks
            .lock()
            .expect("task list lock poisoned")
            .push(task);
    }

    /// Convenience wrapper around [`add_task`](Pool::add_task) that
    /// boxes the closure for the caller.
    pub fn add<F>(&self, task: F)
    where
        F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
    {
        self.add_task(Box::new(task));
    }

    /// Runs every enqueued task and blocks until the batch is done.
    ///
    /// Exactly `concurrency` workers are launched; each task is claimed
    /// by exactly one worker and invoked exactly once. The returned
    /// vector holds the errors of every failed task, in whatever order
    /// the workers finished.
    ///
    /// A task that never returns will block `run` forever; there is no
    /// timeout or cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyRan`] if this pool already ran its batch.
    pub fn run(&self) -> Result<Vec<E>> {
        if self.ran.swap(true, Ordering::SeqCst) {
            return Err(PoolError::AlreadyRan);
        }

        let tasks = mem::take(&mut *self.tasks.lock().expect("task list lock poisoned"));
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "running batch of {} tasks on {} workers",
            tasks.len(),
            self.concurrency
        );

        let failures = Mutex::new(Vec::new());
        // Rendezvous channel: the feeder blocks until an idle worker
        // claims the task, and excess workers just see it close.
        let (tx, rx) = channel::bounded::<Task<E>>(0);

        crossbeam::scope(|s| {
            for id in 0..self.concurrency {
                let rx = rx.clone();
                let failures = &failures;
                s.builder()
                    .name(format!("pool-worker-{id}"))
                    .spawn(move |_| work(id, rx, failures))
                    .expect("failed to spawn worker thread");
            }
            drop(rx);

            for task in tasks {
                tx.send(task).expect("pool has no active workers");
            }
            // Closing the channel lets workers drain and exit; the
            // scope join below is the completion barrier.
            drop(tx);
        })
        .expect("worker thread panicked");

        Ok(failures.into_inner().expect("failure list lock poisoned"))
    }
}

/// The work loop for a single worker thread.
fn work<E>(id: u32, rx: Receiver<Task<E>>, failures: &Mutex<Vec<E>>) {
    while let Ok(task) = rx.recv() {
        debug!("Worker {id} claimed a task");
        // Catch panics so one bad task doesn't take the batch down
        match catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures
                .lock()
                .expect("failure list lock poisoned")
                .push(e),
            Err(_) => error!("Worker {id}: task panicked, continuing"),
        }
    }
    debug!("Worker {id}: queue closed, shutting down");
}
