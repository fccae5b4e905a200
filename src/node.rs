/*!
 * Cluster node controller.
 *
 * Wires the configuration, the scheduler, the decoder and the worker pool
 * together, and exposes the request-intake facade consumed by the REST
 * front end. Shutdown closes the scheduler and joins the workers so no
 * caller or worker is left blocked.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use parking_lot::Mutex;

use crate::app_config::Config;
use crate::decoder::{Decoder, MockDecoder, WorkerPool};
use crate::errors::{NodeError, SchedulerError};
use crate::language_utils::LanguageDirection;
use crate::scheduler::{ScoreEntry, Scheduler, TranslationSplit};
use crate::status::{NodeState, NodeStatus};

/// A single cluster node: scheduler, decoder engine and worker pool.
pub struct ClusterNode {
    config: Config,
    scheduler: Arc<Scheduler>,
    decoder: Arc<dyn Decoder>,
    workers: Mutex<Option<WorkerPool>>,
}

impl ClusterNode {
    /// Create a node from its configuration, using the built-in stand-in
    /// engine (real model loading lives outside this crate)
    pub fn with_config(config: Config) -> Result<Self, NodeError> {
        let decoder: Arc<dyn Decoder> = if config.decoder.mock_delay_ms > 0 {
            Arc::new(MockDecoder::slow(config.decoder.mock_delay_ms))
        } else {
            Arc::new(MockDecoder::working())
        };
        Self::with_decoder(config, decoder)
    }

    /// Create a node with an explicit decoder implementation
    pub fn with_decoder(config: Config, decoder: Arc<dyn Decoder>) -> Result<Self, NodeError> {
        config
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        let scheduler = Arc::new(Scheduler::new(&config.scheduler));
        Ok(Self {
            config,
            scheduler,
            decoder,
            workers: Mutex::new(None),
        })
    }

    /// Spawn the decoder workers. Idempotent: a running pool is kept.
    pub fn start(&self) {
        let mut workers = self.workers.lock();
        if workers.is_some() {
            warn!("Node already started");
            return;
        }
        *workers = Some(WorkerPool::start(
            Arc::clone(&self.scheduler),
            Arc::clone(&self.decoder),
            self.config.decoder.workers,
        ));
        info!(
            "Node started for engine '{}' (queue capacity {})",
            self.config.engine, self.config.scheduler.queue_capacity
        );
    }

    /// The scheduler of this node
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// The node configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one request: schedule its segments as splits, wait for
    /// completion within the configured timeout, and return translations
    /// in input order.
    ///
    /// An alignment request is dispatched as one joint job. Saturation
    /// surfaces as a retryable scheduler rejection; a decoder failure as a
    /// processing error; a missed deadline as a timeout (with the work
    /// still running to completion in the background).
    pub async fn translate(
        &self,
        direction: LanguageDirection,
        segments: Vec<String>,
        alignment: bool,
        suggestions: Vec<ScoreEntry>,
    ) -> Result<Vec<String>, NodeError> {
        let splits: Vec<TranslationSplit> = segments
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                if alignment {
                    TranslationSplit::aligned(index, text)
                } else {
                    TranslationSplit::new(index, text)
                }
            })
            .collect();

        let handle = self.scheduler.schedule(direction, splits, suggestions)?;
        let timeout = Duration::from_secs(self.config.scheduler.request_timeout_secs);

        // The barrier is a blocking primitive; wait off the async runtime.
        let (handle, waited) = tokio::task::spawn_blocking(move || {
            let result = handle.wait_timeout(timeout);
            (handle, result)
        })
        .await
        .map_err(|e| {
            NodeError::Scheduler(SchedulerError::ProcessingFailed(format!(
                "waiter task failed: {e}"
            )))
        })?;

        match waited {
            Ok(true) => Ok(handle.translations()?),
            Ok(false) => Err(NodeError::Timeout(timeout)),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot the node health for status reporting
    pub fn status(&self) -> NodeStatus {
        let state = if self.scheduler.is_closed() {
            NodeState::Stopped
        } else {
            NodeState::Running
        };
        NodeStatus {
            engine: self.config.engine.clone(),
            state,
            queue_depth: self.scheduler.queue_depth(),
            pending_splits: self.scheduler.pending_splits(),
            workers: self
                .workers
                .lock()
                .as_ref()
                .map(WorkerPool::len)
                .unwrap_or(0),
            updated_at: NodeStatus::now(),
        }
    }

    /// Close the scheduler and join the workers. Idempotent.
    pub fn shutdown(&self) {
        self.scheduler.close();
        if let Some(pool) = self.workers.lock().take() {
            pool.join();
        }
        info!("Node stopped");
    }
}

impl Drop for ClusterNode {
    fn drop(&mut self) {
        // Workers block in take() forever unless the scheduler closes
        self.scheduler.close();
        if let Some(pool) = self.workers.lock().take() {
            pool.join();
        }
    }
}
