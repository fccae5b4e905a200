/*!
 * Translation scheduling subsystem.
 *
 * This module turns concurrent translation requests into a bounded stream
 * of decoder jobs. It is split into several submodules:
 *
 * - `core`: the scheduler itself — intake, batching, admission control
 * - `queue`: bounded multi-producer/multi-consumer job queue
 * - `barrier`: per-request completion barrier
 * - `job`: the dispatch unit handed to decoder workers
 * - `split`: the smallest unit of translatable text
 */

// Re-export main types for easier usage
pub use self::barrier::CompletionBarrier;
pub use self::core::{Scheduler, TranslationHandle};
pub use self::job::{Job, ScoreEntry};
pub use self::queue::JobQueue;
pub use self::split::TranslationSplit;

// Submodules
pub mod barrier;
pub mod core;
pub mod job;
pub mod queue;
pub mod split;
