//! Deferred work: a sync queue drained once per frame and an async queue
//! drained by a background thread.
//!
//! # Snapshot-and-clear (for beginners)
//!
//! Both queues hold their lock only long enough to swap the pending list for
//! an empty one.  The tasks then run with the lock released, so a task may
//! submit more work (which lands in the next drain) without deadlocking, and
//! a slow task never blocks producers on other threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// A fire-and-forget unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Default sleep between two drains of the async queue.
pub const DEFAULT_ASYNC_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum TaskLoopError {
    #[error("failed to spawn the async task thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("the async task loop is already running")]
    AlreadyRunning,

    #[error("the async task thread panicked")]
    Panicked,
}

/// A FIFO of tasks behind its own lock.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<Vec<Task>>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("pending", &self.len()).finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: Task) {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every task queued so far, in submission order, and returns how
    /// many ran.  Tasks queued while draining wait for the next call.  A task
    /// that panics is logged and counted; the rest of the batch still runs.
    pub fn drain(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        let count = batch.len();
        for task in batch {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                warn!("deferred task panicked, continuing with the rest of the batch");
            }
        }
        count
    }
}

/// Entry point for deferring work.  Cheap to clone; every clone feeds the
/// same two queues.
#[derive(Clone, Default, Debug)]
pub struct TaskScheduler {
    sync: Arc<TaskQueue>,
    background: Arc<TaskQueue>,
    loop_running: Arc<AtomicBool>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` for the next frame, on the frame thread.
    pub fn submit_sync(&self, task: impl FnOnce() + Send + 'static) {
        self.sync.push(Box::new(task));
    }

    /// Queues `task` for the background loop.
    pub fn submit_async(&self, task: impl FnOnce() + Send + 'static) {
        self.background.push(Box::new(task));
    }

    /// Drains the sync queue.  Called once per frame before input processing.
    pub fn perform_sync_tasks(&self) -> usize {
        let ran = self.sync.drain();
        if ran > 0 {
            trace!(ran, "sync tasks performed");
        }
        ran
    }

    /// Drains the async queue on the calling thread.
    pub fn perform_async_tasks(&self) -> usize {
        self.background.drain()
    }

    pub fn pending_sync(&self) -> usize {
        self.sync.len()
    }

    pub fn pending_async(&self) -> usize {
        self.background.len()
    }

    /// Starts the background thread that drains the async queue every
    /// `poll_interval`.
    ///
    /// # Errors
    ///
    /// [`TaskLoopError::AlreadyRunning`] if a loop started from this scheduler
    /// (or a clone) has not been stopped, [`TaskLoopError::Spawn`] if the OS
    /// refuses the thread.
    pub fn start_async_loop(&self, poll_interval: Duration) -> Result<AsyncTaskLoop, TaskLoopError> {
        if self.loop_running.swap(true, Ordering::SeqCst) {
            return Err(TaskLoopError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let queue = Arc::clone(&self.background);
        let spawned = thread::Builder::new()
            .name("inputkit-async-tasks".into())
            .spawn(move || {
                info!(interval_ms = poll_interval.as_millis() as u64, "async task loop started");
                loop {
                    let ran = queue.drain();
                    if ran > 0 {
                        debug!(ran, "async tasks performed");
                    }
                    match stop_rx.recv_timeout(poll_interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("async task loop stopped");
            });

        match spawned {
            Ok(handle) => Ok(AsyncTaskLoop {
                stop_tx: Some(stop_tx),
                handle: Some(handle),
                running: Arc::clone(&self.loop_running),
            }),
            Err(e) => {
                self.loop_running.store(false, Ordering::SeqCst);
                Err(TaskLoopError::Spawn(e))
            }
        }
    }
}

/// Handle to the running background loop.  Dropping it stops the loop.
#[derive(Debug)]
pub struct AsyncTaskLoop {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl AsyncTaskLoop {
    /// Signals the loop and waits for its current iteration to finish.
    /// Tasks still queued afterwards stay in the async queue.
    ///
    /// # Errors
    ///
    /// [`TaskLoopError::Panicked`] if the loop thread itself panicked.
    pub fn stop(mut self) -> Result<(), TaskLoopError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), TaskLoopError> {
        if let Some(tx) = self.stop_tx.take() {
            // The thread may already be gone; a failed send is fine.
            let _ = tx.send(());
        }
        let result = match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| TaskLoopError::Panicked),
            None => Ok(()),
        };
        self.running.store(false, Ordering::SeqCst);
        result
    }
}

impl Drop for AsyncTaskLoop {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
