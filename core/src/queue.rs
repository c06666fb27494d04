use crate::DEFAULT_THREADS;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    tasks: VecDeque<Task>,
    /// Submitted but not yet completed tasks, including tasks queued
    /// by other tasks while they run.
    pending: usize,
    shutdown: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    task_ready: Condvar,
    all_idle: Condvar,
}

/// A fixed-size pool of worker threads pulling from a shared FIFO
/// queue.
///
/// `finish` is a reusable barrier: it blocks until every submitted
/// task, including recursively submitted ones, has completed, and the
/// pool stays usable afterwards. `shutdown` drains the queue, stops
/// the workers, and makes the pool permanently unusable; tasks
/// submitted after shutdown are logged and dropped.
pub struct WorkQueue {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Creates a pool with `threads` workers. A count of zero falls
    /// back to [`DEFAULT_THREADS`] with a warning.
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 {
            tracing::warn!(
                default = DEFAULT_THREADS,
                "invalid thread count, falling back to default"
            );
            DEFAULT_THREADS
        } else {
            threads
        };

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            task_ready: Condvar::new(),
            all_idle: Condvar::new(),
        });

        let workers = (0..threads)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || worker_loop(shared))
            })
            .collect();

        Self {
            shared,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueues a task without blocking the caller.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                tracing::warn!("task submitted after shutdown, dropping");
                return;
            }
            state.pending += 1;
            state.tasks.push_back(Box::new(task));
        }
        self.shared.task_ready.notify_one();
    }

    /// Blocks until all pending work has completed. Safe to call
    /// repeatedly; work may be submitted again afterwards.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.all_idle.wait(&mut state);
        }
    }

    /// Stops the workers after the queue drains and joins them.
    /// Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.task_ready.notify_all();

        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            // A worker that panicked outside a task is already lost;
            // nothing to do with the error here.
            let _ = handle.join();
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<PoolShared>) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                if state.shutdown {
                    return;
                }
                shared.task_ready.wait(&mut state);
            }
        };

        // A fault inside a task must not cost the pool a worker.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            tracing::error!(
                panic = panic_message(payload.as_ref()),
                "task panicked, worker continuing"
            );
        }

        let mut state = shared.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            shared.all_idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
