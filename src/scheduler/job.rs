/*!
 * Decoder jobs and tuning suggestions.
 */

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::SchedulerError;
use crate::language_utils::LanguageDirection;

use super::split::TranslationSplit;

/// A translation-memory match used as a context hint to tune the decoder
/// for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// Source-side sentence of the memory match
    pub source: String,

    /// Suggested translation of the memory match
    pub translation: String,

    /// Match score in [0, 1]
    pub score: f32,
}

impl ScoreEntry {
    pub fn new(source: impl Into<String>, translation: impl Into<String>, score: f32) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            score,
        }
    }
}

/// The unit handed to a decoder worker: one or more splits sharing a
/// language direction, plus the tuning suggestions of the owning request.
///
/// A job is enqueued once and dequeued by exactly one worker. All splits of
/// a job come from the same request, so they share one completion barrier.
/// An alignment job carries every split of its request and is never
/// partitioned across dispatch units.
#[derive(Debug)]
pub struct Job {
    id: Uuid,
    direction: LanguageDirection,
    splits: Vec<Arc<TranslationSplit>>,
    alignment: bool,
    suggestions: Arc<Vec<ScoreEntry>>,
}

impl Job {
    pub(crate) fn new(
        direction: LanguageDirection,
        splits: Vec<Arc<TranslationSplit>>,
        alignment: bool,
        suggestions: Arc<Vec<ScoreEntry>>,
    ) -> Self {
        debug_assert!(!splits.is_empty(), "a job must carry at least one split");
        Self {
            id: Uuid::new_v4(),
            direction,
            splits,
            alignment,
            suggestions,
        }
    }

    /// Unique job identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Language direction shared by every split of this job
    pub fn direction(&self) -> &LanguageDirection {
        &self.direction
    }

    /// Whether the splits must be translated jointly as one unit
    pub fn is_alignment_job(&self) -> bool {
        self.alignment
    }

    /// The splits carried by this job
    pub fn splits(&self) -> &[Arc<TranslationSplit>] {
        &self.splits
    }

    /// Tuning suggestions supplied when the owning request was scheduled
    pub fn suggestions(&self) -> &[ScoreEntry] {
        &self.suggestions
    }

    /// Report a hard processing failure for this job.
    ///
    /// All splits are considered simultaneously failed: the owning barrier
    /// moves to the Errored state and every waiter is released with a
    /// processing-failure error instead of hanging.
    pub fn fail(&self, reason: &str) {
        if let Some(barrier) = self.splits.first().and_then(|split| split.barrier()) {
            barrier.fail(SchedulerError::ProcessingFailed(reason.to_string()));
        }
    }
}
