/*!
 * Bounded multi-producer/multi-consumer job queue.
 */

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::errors::SchedulerError;

use super::job::Job;

/// Bounded FIFO of jobs awaiting a decoder worker.
///
/// Producers (concurrent `schedule()` callers) use the non-blocking
/// `offer_all`, which admits a request's jobs all-or-nothing and rejects
/// instead of stalling when the queue is saturated. Consumers (decoder
/// workers) block in `take` until a job exists or the queue closes. Jobs
/// are handed out in insertion order and each job is taken exactly once.
#[derive(Debug)]
pub struct JobQueue {
    inner: Mutex<QueueInner>,
    available: Condvar,
    max_jobs: usize,
    max_splits: usize,
}

#[derive(Debug)]
struct QueueInner {
    jobs: VecDeque<Job>,
    pending_splits: usize,
    closed: bool,
}

impl JobQueue {
    /// Create a queue bounded by `max_jobs` pending jobs and `max_splits`
    /// pending splits
    pub fn new(max_jobs: usize, max_splits: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                jobs: VecDeque::new(),
                pending_splits: 0,
                closed: false,
            }),
            available: Condvar::new(),
            max_jobs,
            max_splits,
        }
    }

    /// Admit all jobs of one request, or none.
    ///
    /// Never blocks: a saturated or closed queue yields an immediate
    /// decoder-unavailable rejection and leaves the queue untouched.
    pub fn offer_all(&self, jobs: Vec<Job>) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SchedulerError::DecoderUnavailable(
                "scheduler is closed".to_string(),
            ));
        }
        let split_count: usize = jobs.iter().map(|job| job.splits().len()).sum();
        if inner.jobs.len() + jobs.len() > self.max_jobs
            || inner.pending_splits + split_count > self.max_splits
        {
            return Err(SchedulerError::DecoderUnavailable(format!(
                "translation queue is full ({} pending jobs, {} pending splits)",
                inner.jobs.len(),
                inner.pending_splits
            )));
        }
        inner.pending_splits += split_count;
        inner.jobs.extend(jobs);
        self.available.notify_all();
        Ok(())
    }

    /// Remove and return the next job, blocking until one is available.
    ///
    /// Returns the closure signal if the queue is closed while waiting (or
    /// was already closed and empty).
    pub fn take(&self) -> Result<Job, SchedulerError> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(job) = inner.jobs.pop_front() {
                inner.pending_splits -= job.splits().len();
                return Ok(job);
            }
            if inner.closed {
                return Err(SchedulerError::Closed);
            }
            self.available.wait(&mut inner);
        }
    }

    /// Close the queue: stop admission, wake all blocked consumers and
    /// drain the never-taken jobs so their barriers can be errored.
    pub fn close(&self) -> Vec<Job> {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.pending_splits = 0;
        let drained: Vec<Job> = inner.jobs.drain(..).collect();
        self.available.notify_all();
        drained
    }

    /// Whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Current number of pending jobs
    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Whether no jobs are pending
    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    /// Current number of splits across all pending jobs
    pub fn pending_splits(&self) -> usize {
        self.inner.lock().pending_splits
    }

    /// Maximum number of pending jobs
    pub fn capacity(&self) -> usize {
        self.max_jobs
    }
}
