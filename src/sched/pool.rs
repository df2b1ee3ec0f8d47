//! Recycling batch worker pool.
//!
//! Jobs run on a bounded set of worker threads that share nothing with the
//! submitting thread: jobs move in through a queue, results move back over
//! a channel. Workers retire after a task quota and are replaced, each
//! batch runs on fresh workers with an optional cooldown in between, and a
//! panicking job surfaces as that item's failure instead of taking the
//! pool down.

use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use super::budget::PoolSettings;
use super::priority::lower_worker_priority;

/// A job that panicked inside the pool.
#[derive(Debug, Clone, thiserror::Error)]
#[error("task {index} panicked: {message}")]
pub struct TaskError {
    /// Index of the input item.
    pub index: usize,
    /// Panic payload, when it carried one.
    pub message: String,
}

enum Message<R> {
    Done(usize, Result<R, TaskError>),
    Retired,
}

type Queue<J> = Arc<Mutex<VecDeque<(usize, J)>>>;

const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `jobs` through a pool of `settings.workers` threads, in batches of
/// `settings.batch_size`, yielding one result per job.
///
/// Nothing runs until the returned stream is polled. `unordered` yields in
/// completion order; otherwise results come back in submission order. Once
/// `cancel` is set the stream stops dispatching, lets in-flight jobs
/// finish, joins its workers and ends early. Dropping the stream performs
/// the same teardown.
pub fn run_batches<J, R, F>(
    jobs: Vec<J>,
    worker_fn: F,
    settings: PoolSettings,
    unordered: bool,
    cancel: Arc<AtomicBool>,
) -> BatchStream<J, R, F>
where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + Sync + 'static,
{
    let batch = if settings.batch_size == 0 {
        jobs.len()
    } else {
        settings.batch_size
    }
    .max(1);

    let mut pending = VecDeque::new();
    let mut chunk = Vec::with_capacity(batch.min(jobs.len()));
    for (index, job) in jobs.into_iter().enumerate() {
        chunk.push((index, job));
        if chunk.len() == batch {
            pending.push_back(std::mem::take(&mut chunk));
        }
    }
    if !chunk.is_empty() {
        pending.push_back(chunk);
    }

    BatchStream {
        worker_fn: Arc::new(worker_fn),
        settings,
        unordered,
        cancel,
        stop: Arc::new(AtomicBool::new(false)),
        pending,
        queue: Arc::new(Mutex::new(VecDeque::new())),
        tx: None,
        rx: None,
        handles: Vec::new(),
        outstanding: 0,
        started: false,
        reorder: BTreeMap::new(),
        next_index: 0,
    }
}

/// Lazy stream of per-item results out of the batch pool.
pub struct BatchStream<J, R, F> {
    worker_fn: Arc<F>,
    settings: PoolSettings,
    unordered: bool,
    cancel: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    pending: VecDeque<Vec<(usize, J)>>,
    queue: Queue<J>,
    tx: Option<Sender<Message<R>>>,
    rx: Option<Receiver<Message<R>>>,
    handles: Vec<JoinHandle<()>>,
    outstanding: usize,
    started: bool,
    reorder: BTreeMap<usize, Result<R, TaskError>>,
    next_index: usize,
}

fn lock_queue<J>(queue: &Queue<J>) -> MutexGuard<'_, VecDeque<(usize, J)>> {
    // A worker that panicked did so inside catch_unwind, never while
    // holding the lock, but recover from poisoning anyway.
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<J, R, F> BatchStream<J, R, F>
where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + Sync + 'static,
{
    fn spawn_worker(&mut self) {
        let queue = Arc::clone(&self.queue);
        let worker_fn = Arc::clone(&self.worker_fn);
        let cancel = Arc::clone(&self.cancel);
        let stop = Arc::clone(&self.stop);
        let quota = self.settings.max_tasks_per_child;
        let Some(tx) = self.tx.clone() else { return };

        self.handles.push(thread::spawn(move || {
            lower_worker_priority();
            let mut completed = 0usize;
            loop {
                if cancel.load(Ordering::Relaxed) || stop.load(Ordering::Relaxed) {
                    break;
                }
                let Some((index, job)) = lock_queue(&queue).pop_front() else {
                    break;
                };
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker_fn(job)))
                    .map_err(|payload| TaskError {
                        index,
                        message: panic_message(payload),
                    });
                if tx.send(Message::Done(index, outcome)).is_err() {
                    break;
                }
                completed += 1;
                if quota > 0 && completed >= quota {
                    let _ = tx.send(Message::Retired);
                    break;
                }
            }
        }));
    }

    fn start_chunk(&mut self) {
        let Some(chunk) = self.pending.pop_front() else {
            return;
        };
        if self.started && !self.settings.cooldown.is_zero() {
            debug!("cooling down {:?} before next batch", self.settings.cooldown);
            thread::sleep(self.settings.cooldown);
        }
        self.started = true;
        self.outstanding = chunk.len();
        lock_queue(&self.queue).extend(chunk);

        let (tx, rx) = channel();
        self.tx = Some(tx);
        self.rx = Some(rx);

        let workers = self.settings.workers.min(self.outstanding).max(1);
        debug!("batch of {} jobs on {} fresh workers", self.outstanding, workers);
        for _ in 0..workers {
            self.spawn_worker();
        }
    }

    fn join_workers(&mut self) {
        self.tx = None;
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        self.rx = None;
    }

    fn teardown(&mut self) {
        self.pending.clear();
        lock_queue(&self.queue).clear();
        self.outstanding = 0;
        self.join_workers();
    }
}

impl<J, R, F> Iterator for BatchStream<J, R, F>
where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + Sync + 'static,
{
    type Item = Result<R, TaskError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.unordered
                && let Some(result) = self.reorder.remove(&self.next_index)
            {
                self.next_index += 1;
                return Some(result);
            }

            if self.cancel.load(Ordering::Relaxed) {
                debug!("cancellation requested, tearing down pool");
                self.teardown();
                return None;
            }

            if self.outstanding == 0 {
                self.join_workers();
                if self.pending.is_empty() {
                    return None;
                }
                self.start_chunk();
            }

            // The stream keeps a sender clone for replacement spawns, so
            // the channel never disconnects on its own. Wake up regularly
            // to notice cancellation that raced with the check above.
            let message = match self.rx.as_ref() {
                Some(rx) => rx.recv_timeout(RESULT_POLL_INTERVAL),
                None => return None,
            };
            match message {
                Ok(Message::Done(index, outcome)) => {
                    self.outstanding -= 1;
                    if self.unordered {
                        return Some(outcome);
                    }
                    self.reorder.insert(index, outcome);
                }
                Ok(Message::Retired) => {
                    let has_work = !lock_queue(&self.queue).is_empty();
                    if has_work
                        && !self.cancel.load(Ordering::Relaxed)
                        && !self.stop.load(Ordering::Relaxed)
                    {
                        debug!("worker hit task quota, spawning replacement");
                        self.spawn_worker();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                // All senders gone: workers exited early. Treat the chunk
                // as finished rather than blocking forever.
                Err(RecvTimeoutError::Disconnected) => {
                    self.outstanding = 0;
                    self.join_workers();
                }
            }
        }
    }
}

impl<J, R, F> Drop for BatchStream<J, R, F> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.pending.clear();
        lock_queue(&self.queue).clear();
        self.tx = None;
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
