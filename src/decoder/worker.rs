/*!
 * Decoder worker pool.
 *
 * Workers run the pull-based loop of the dispatch subsystem: block in
 * `Scheduler::take()`, run inference on the job's splits, and report each
 * split complete on the owning barrier. A hard decoder failure errors the
 * job's barrier instead of silently dropping the request.
 */

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

use crate::errors::SchedulerError;
use crate::scheduler::{Job, Scheduler};

use super::Decoder;

/// Fixed pool of OS threads draining the scheduler.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` decoder threads pulling from `scheduler`
    pub fn start(scheduler: Arc<Scheduler>, decoder: Arc<dyn Decoder>, workers: usize) -> Self {
        info!(
            "Starting {} decoder worker(s) on engine '{}'",
            workers,
            decoder.name()
        );
        let handles = (0..workers)
            .map(|id| {
                let scheduler = Arc::clone(&scheduler);
                let decoder = Arc::clone(&decoder);
                thread::spawn(move || worker_loop(id, scheduler, decoder))
            })
            .collect();
        Self { handles }
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit. Workers only exit once the scheduler
    /// has been closed.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                error!("Decoder worker panicked");
            }
        }
    }
}

fn worker_loop(id: usize, scheduler: Arc<Scheduler>, decoder: Arc<dyn Decoder>) {
    debug!("Decoder worker {} started", id);
    loop {
        let job = match scheduler.take() {
            Ok(job) => job,
            Err(SchedulerError::Closed) => {
                debug!("Decoder worker {} observed closure, shutting down", id);
                break;
            }
            Err(e) => {
                error!("Decoder worker {} failed to take a job: {}", id, e);
                break;
            }
        };
        process_job(id, decoder.as_ref(), &job);
    }
}

/// Run inference for one job and report per-split completion.
fn process_job(id: usize, decoder: &dyn Decoder, job: &Job) {
    let texts: Vec<&str> = job.splits().iter().map(|split| split.text()).collect();
    match decoder.translate(job.direction(), &texts, job.suggestions()) {
        Ok(translations) if translations.len() == job.splits().len() => {
            for (split, translation) in job.splits().iter().zip(translations) {
                split.complete(translation);
            }
            debug!(
                "Worker {} completed job {} ({} split(s), {})",
                id,
                job.id(),
                job.splits().len(),
                job.direction()
            );
        }
        Ok(translations) => {
            warn!(
                "Worker {}: decoder returned {} translation(s) for {} split(s) in job {}",
                id,
                translations.len(),
                job.splits().len(),
                job.id()
            );
            job.fail(&format!(
                "decoder returned {} translations for {} splits",
                translations.len(),
                job.splits().len()
            ));
        }
        Err(e) => {
            error!("Worker {}: decoding failed for job {}: {}", id, job.id(), e);
            job.fail(&e.to_string());
        }
    }
}
