/*!
 * Per-request completion barrier.
 *
 * A barrier synchronizes the caller of `schedule()` with the completion of
 * every split of that request, regardless of how the splits were grouped
 * into jobs or in which order workers finish them.
 */

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::errors::SchedulerError;

/// Counts split completions for one translation request and releases the
/// waiting caller once every split has been reported done.
///
/// State machine: Pending (completed < total) → Satisfied (terminal).
/// An Errored terminal state is reachable from Pending when the scheduler
/// closes or a worker reports a hard processing failure. Once Satisfied the
/// barrier stays satisfied; late errors are ignored.
#[derive(Debug)]
pub struct CompletionBarrier {
    inner: Mutex<BarrierInner>,
    condvar: Condvar,
}

#[derive(Debug)]
struct BarrierInner {
    /// Per-split completion bitmap, indexed by split index. Keeps
    /// double reports from over-counting.
    done: Vec<bool>,
    completed: usize,
    error: Option<SchedulerError>,
}

impl CompletionBarrier {
    /// Create a barrier expecting `total` split completions.
    ///
    /// # Panics
    ///
    /// Panics if `total` is zero: a barrier over nothing would be born
    /// satisfied and could never represent a real request.
    pub fn new(total: usize) -> Self {
        assert!(total > 0, "a barrier must guard at least one split");
        Self {
            inner: Mutex::new(BarrierInner {
                done: vec![false; total],
                completed: 0,
                error: None,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Total number of splits guarded by this barrier
    pub fn total(&self) -> usize {
        self.inner.lock().done.len()
    }

    /// Number of splits reported complete so far
    pub fn completed(&self) -> usize {
        self.inner.lock().completed
    }

    /// Whether the barrier has reached the Satisfied state
    pub fn is_satisfied(&self) -> bool {
        let inner = self.inner.lock();
        inner.error.is_none() && inner.completed == inner.done.len()
    }

    /// Report one split complete. Idempotent per split index; out-of-range
    /// indices and reports after an error are ignored. Wakes all waiters
    /// when the last split completes.
    pub fn split_completed(&self, index: usize) {
        let mut inner = self.inner.lock();
        if inner.error.is_some() {
            return;
        }
        if index >= inner.done.len() || inner.done[index] {
            return;
        }
        inner.done[index] = true;
        inner.completed += 1;
        if inner.completed == inner.done.len() {
            self.condvar.notify_all();
        }
    }

    /// Move the barrier to the Errored state and wake all waiters.
    ///
    /// No-op if the barrier is already Satisfied or Errored: satisfaction
    /// is permanent and the first error wins.
    pub fn fail(&self, error: SchedulerError) {
        let mut inner = self.inner.lock();
        if inner.error.is_some() || inner.completed == inner.done.len() {
            return;
        }
        inner.error = Some(error);
        self.condvar.notify_all();
    }

    /// Block until the barrier is Satisfied, or return the error if it
    /// reaches the Errored state.
    pub fn wait(&self) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(error) = &inner.error {
                return Err(error.clone());
            }
            if inner.completed == inner.done.len() {
                return Ok(());
            }
            self.condvar.wait(&mut inner);
        }
    }

    /// Block up to `timeout` for satisfaction.
    ///
    /// Returns `Ok(true)` if the barrier was satisfied within the bound and
    /// `Ok(false)` on timeout, in which case the barrier stays Pending and
    /// a later `wait()` can still observe satisfaction. An Errored barrier
    /// returns the error.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool, SchedulerError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(error) = &inner.error {
                return Err(error.clone());
            }
            if inner.completed == inner.done.len() {
                return Ok(true);
            }
            if self.condvar.wait_until(&mut inner, deadline).timed_out() {
                // One last look: the state may have changed right at the deadline
                if let Some(error) = &inner.error {
                    return Err(error.clone());
                }
                return Ok(inner.completed == inner.done.len());
            }
        }
    }
}
