/*!
 * # nmt-node - Neural machine-translation cluster node
 *
 * A Rust library implementing the dispatch core of a neural MT cluster
 * node: translation requests come in concurrently, are partitioned into
 * decoder jobs under admission control, and are handed to a pool of
 * decoder workers through a bounded queue.
 *
 * ## Features
 *
 * - Fail-fast admission control: a saturated queue rejects immediately
 *   instead of stalling callers
 * - Per-request completion barriers with blocking and bounded waits
 * - Atomic dispatch of alignment jobs (joint translation of a request)
 * - Greedy batching of independent splits for decoder throughput
 * - Pull-based decoder worker pool with clean closure semantics
 * - JSON status file reporting for external supervisors
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `scheduler`: The translation scheduler:
 *   - `scheduler::core`: Intake, batching and admission control
 *   - `scheduler::queue`: Bounded multi-producer/multi-consumer job queue
 *   - `scheduler::barrier`: Per-request completion barrier
 *   - `scheduler::job` / `scheduler::split`: Dispatch data model
 * - `decoder`: Decoder trait, mock engine and worker pool
 * - `node`: Cluster node controller and intake facade
 * - `status`: On-disk status reporting
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the node
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod decoder;
pub mod errors;
pub mod language_utils;
pub mod node;
pub mod scheduler;
pub mod status;

// Re-export main types for easier usage
pub use app_config::Config;
pub use decoder::{Decoder, MockDecoder, WorkerPool};
pub use errors::{DecoderError, NodeError, SchedulerError};
pub use language_utils::LanguageDirection;
pub use node::ClusterNode;
pub use scheduler::{
    CompletionBarrier, Job, JobQueue, ScoreEntry, Scheduler, TranslationHandle, TranslationSplit,
};
pub use status::{NodeState, NodeStatus, StatusWriter};
