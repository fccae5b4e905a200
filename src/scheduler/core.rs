/*!
 * Core translation scheduler.
 *
 * The scheduler is the single entry and exit point of the dispatch
 * subsystem: it turns arbitrary concurrent translation requests into a
 * bounded stream of decoder jobs, applies admission control so the decoder
 * is never overrun, and issues one completion barrier per request.
 */

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;

use crate::app_config::SchedulerConfig;
use crate::errors::SchedulerError;
use crate::language_utils::LanguageDirection;

use super::barrier::CompletionBarrier;
use super::job::{Job, ScoreEntry};
use super::queue::JobQueue;
use super::split::TranslationSplit;

/// Dead weak refs are pruned from the barrier registry once it grows past
/// this many entries.
const REGISTRY_PRUNE_THRESHOLD: usize = 256;

/// Handle returned to the caller of `schedule()`.
///
/// Bundles the completion barrier of the request with shared references to
/// its splits, so the caller can wait for completion and then read the
/// translations back in request order.
#[derive(Debug)]
pub struct TranslationHandle {
    barrier: Arc<CompletionBarrier>,
    splits: Vec<Arc<TranslationSplit>>,
}

impl TranslationHandle {
    /// The completion barrier of this request
    pub fn barrier(&self) -> &Arc<CompletionBarrier> {
        &self.barrier
    }

    /// The scheduled splits, in request order
    pub fn splits(&self) -> &[Arc<TranslationSplit>] {
        &self.splits
    }

    /// Block until every split of the request has been reported complete
    pub fn wait(&self) -> Result<(), SchedulerError> {
        self.barrier.wait()
    }

    /// Block up to `timeout`; `Ok(false)` means the request is still in
    /// flight and a later wait may still succeed
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool, SchedulerError> {
        self.barrier.wait_timeout(timeout)
    }

    /// Collect the translations in request order. Fails if any split has
    /// not completed yet.
    pub fn translations(&self) -> Result<Vec<String>, SchedulerError> {
        self.splits
            .iter()
            .map(|split| {
                split.translation().map(str::to_string).ok_or_else(|| {
                    SchedulerError::ProcessingFailed(format!(
                        "split {} has no translation",
                        split.index()
                    ))
                })
            })
            .collect()
    }
}

/// Orchestrates request intake, job construction, admission control and
/// worker hand-off.
///
/// The scheduler owns the job queue and a registry of live barriers. Any
/// number of threads may call `schedule()` concurrently while a pool of
/// worker threads calls `take()`; `close()` is the only global
/// cancellation and may race freely with both.
#[derive(Debug)]
pub struct Scheduler {
    queue: JobQueue,
    barriers: Mutex<Vec<Weak<CompletionBarrier>>>,
    max_batch_size: usize,
}

impl Scheduler {
    /// Create a scheduler from its configuration section
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::with_limits(
            config.queue_capacity,
            config.max_pending_splits,
            config.max_batch_size,
        )
    }

    /// Create a scheduler with explicit limits
    pub fn with_limits(queue_capacity: usize, max_pending_splits: usize, max_batch_size: usize) -> Self {
        Self {
            queue: JobQueue::new(queue_capacity, max_pending_splits),
            barriers: Mutex::new(Vec::new()),
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Schedule one translation request.
    ///
    /// Partitions the splits into jobs: a single joint job if any split is
    /// alignment-flagged, otherwise greedy direction-homogeneous batches of
    /// at most `max_batch_size` splits. Admission is all-or-nothing; when
    /// the queue is saturated the call fails fast with a
    /// decoder-unavailable rejection and nothing is enqueued.
    pub fn schedule(
        &self,
        direction: LanguageDirection,
        splits: Vec<TranslationSplit>,
        suggestions: Vec<ScoreEntry>,
    ) -> Result<TranslationHandle, SchedulerError> {
        if splits.is_empty() {
            return Err(SchedulerError::InvalidRequest(
                "request contains no translation splits".to_string(),
            ));
        }

        // The barrier's completion bitmap is keyed by split index, so the
        // indices must cover 0..len exactly; a gap or duplicate would leave
        // the barrier unsatisfiable no matter how many splits complete.
        let mut seen = vec![false; splits.len()];
        for split in &splits {
            if split.index() >= seen.len() || seen[split.index()] {
                return Err(SchedulerError::InvalidRequest(format!(
                    "split indices must cover 0..{} exactly, got index {}",
                    splits.len(),
                    split.index()
                )));
            }
            seen[split.index()] = true;
        }

        let barrier = Arc::new(CompletionBarrier::new(splits.len()));
        let splits: Vec<Arc<TranslationSplit>> =
            splits.into_iter().map(Arc::new).collect();
        for split in &splits {
            split.attach_barrier(Arc::clone(&barrier));
        }

        let suggestions = Arc::new(suggestions);
        let alignment = splits.iter().any(|split| split.is_alignment());
        let jobs: Vec<Job> = if alignment {
            // Joint processing is mandatory: one dispatch unit for the
            // whole request.
            vec![Job::new(direction.clone(), splits.clone(), true, suggestions)]
        } else {
            splits
                .chunks(self.max_batch_size)
                .map(|chunk| {
                    Job::new(
                        direction.clone(),
                        chunk.to_vec(),
                        false,
                        Arc::clone(&suggestions),
                    )
                })
                .collect()
        };
        let job_count = jobs.len();

        // Register before enqueuing so a concurrent close() cannot miss
        // this barrier. On rejection the weak ref dies with the barrier
        // and is pruned later.
        self.register_barrier(&barrier);
        self.queue.offer_all(jobs)?;

        debug!(
            "Scheduled {} split(s) as {} job(s) for {}",
            splits.len(),
            job_count,
            direction
        );
        Ok(TranslationHandle { barrier, splits })
    }

    /// Remove and return the next job, blocking the calling worker until
    /// one is available or the scheduler closes.
    pub fn take(&self) -> Result<Job, SchedulerError> {
        self.queue.take()
    }

    /// Close the scheduler.
    ///
    /// Stops admitting new requests, wakes every worker blocked in
    /// `take()` with the closure signal, and errors every still-pending
    /// barrier so no waiting caller is left blocked. Idempotent and safe
    /// to call concurrently with in-flight `schedule()`/`take()` calls.
    pub fn close(&self) {
        let drained = self.queue.close();
        if !drained.is_empty() {
            debug!("Dropped {} never-taken job(s) on close", drained.len());
        }
        let mut barriers = self.barriers.lock();
        for weak in barriers.drain(..) {
            if let Some(barrier) = weak.upgrade() {
                barrier.fail(SchedulerError::Closed);
            }
        }
    }

    /// Whether the scheduler has been closed
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Number of jobs currently awaiting a worker
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Number of splits across all jobs awaiting a worker
    pub fn pending_splits(&self) -> usize {
        self.queue.pending_splits()
    }

    fn register_barrier(&self, barrier: &Arc<CompletionBarrier>) {
        let mut barriers = self.barriers.lock();
        if barriers.len() >= REGISTRY_PRUNE_THRESHOLD {
            barriers.retain(|weak| weak.strong_count() > 0);
        }
        barriers.push(Arc::downgrade(barrier));
    }
}
