/*!
 * Neural decoder abstraction and worker pool.
 *
 * The scheduler produces jobs; this module consumes them. `Decoder` is the
 * seam behind which real inference lives (model loading and quality
 * algorithms stay outside this crate), `MockDecoder` is the built-in
 * stand-in engine, and `WorkerPool` runs the pull-based worker loop that
 * drains the scheduler.
 */

use crate::errors::DecoderError;
use crate::language_utils::LanguageDirection;
use crate::scheduler::ScoreEntry;

// Re-export main types for easier usage
pub use self::mock::{MockBehavior, MockDecoder};
pub use self::worker::WorkerPool;

// Submodules
pub mod mock;
pub mod worker;

/// A neural decoder capable of translating a batch of texts in one
/// language direction.
///
/// Implementations must be safe to share across worker threads. The texts
/// of one call always belong to a single job, so an alignment job's splits
/// reach the decoder together.
pub trait Decoder: Send + Sync {
    /// Translate `texts` from `direction.source` to `direction.target`,
    /// tuned by `suggestions`. Must return exactly one translation per
    /// input text, in input order.
    fn translate(
        &self,
        direction: &LanguageDirection,
        texts: &[&str],
        suggestions: &[ScoreEntry],
    ) -> Result<Vec<String>, DecoderError>;

    /// Human-readable engine name for logging
    fn name(&self) -> &str;
}
