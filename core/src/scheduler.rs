use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// The default number of worker threads when not specified.
pub const DEFAULT_THREADS: usize = 5;

/// Fixed-size worker pool sharing one FIFO task queue and a reusable
/// completion barrier.
///
/// `submit` appends the task and bumps the pending counter inside one
/// critical section, and workers decrement only after running a dequeued
/// task, so [`WorkQueue::finish`] can never return while submitted work has
/// not run. The barrier is reusable: submitting more work after a returned
/// `finish` simply restarts accumulation.
pub struct WorkQueue {
    inner: Arc<QueueInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    work_available: Condvar,
    all_done: Condvar,
}

struct QueueState {
    items: VecDeque<Task>,
    pending: usize,
    shutdown: bool,
}

impl WorkQueue {
    /// Starts a work queue with the specified number of worker threads, so
    /// they are waiting in the background before any work arrives.
    pub fn new(threads: usize) -> Self {
        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            all_done: Condvar::new(),
        });

        let workers = (0..threads.max(1))
            .map(|_| {
                let inner = inner.clone();
                thread::spawn(move || worker_loop(&inner))
            })
            .collect();

        Self {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.lock().len()
    }

    /// Adds a task to the queue and wakes a waiting worker. Enqueue and the
    /// pending increment happen under the same lock, so the barrier always
    /// sees the task before any worker can dequeue it.
    ///
    /// Tasks submitted after [`WorkQueue::shutdown`] are rejected: logged
    /// and dropped, never run.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.shutdown {
            tracing::warn!("task submitted after shutdown, dropping");
            return;
        }
        state.items.push_back(Box::new(task));
        state.pending += 1;
        self.inner.work_available.notify_one();
    }

    /// Blocks until every submitted task has finished. Reusable across
    /// phases of the same run.
    pub fn finish(&self) {
        let mut state = self.inner.state.lock();
        while state.pending > 0 {
            self.inner.all_done.wait(&mut state);
        }
    }

    /// Waits for pending work, then flags shutdown, wakes all workers so
    /// they observe the flag, and joins them. In-flight tasks are never
    /// interrupted.
    pub fn shutdown(&self) {
        self.finish();
        {
            let mut state = self.inner.state.lock();
            state.shutdown = true;
        }
        self.inner.work_available.notify_all();
        for handle in self.workers.lock().drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Waits until work is available, dequeues one task, and runs it. A task
/// that panics is caught and logged so the pool never ends up short-staffed,
/// and pending is decremented either way so the barrier cannot hang. Exits
/// when shutdown is flagged and the queue is empty.
fn worker_loop(inner: &QueueInner) {
    while let Some(task) = next_task(inner) {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!("task panicked, worker recovering");
        }

        let mut state = inner.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            inner.all_done.notify_all();
        }
    }
}

fn next_task(inner: &QueueInner) -> Option<Task> {
    let mut state = inner.state.lock();
    loop {
        if let Some(task) = state.items.pop_front() {
            return Some(task);
        }
        if state.shutdown {
            return None;
        }
        inner.work_available.wait(&mut state);
    }
}
