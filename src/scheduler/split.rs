/*!
 * Translation splits: the smallest unit of translatable text.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use super::barrier::CompletionBarrier;

/// One atomic piece of source text scheduled for translation.
///
/// A split belongs to exactly one job and exactly one completion barrier.
/// Callers build splits as plain values; the scheduler finalizes them at
/// `schedule()` time by attaching the barrier of the owning request. A
/// worker fills in the translation and marks the split complete exactly
/// once; completion never reverts.
#[derive(Debug)]
pub struct TranslationSplit {
    /// Position within the parent request, used to reassemble results and
    /// to keep alignment jobs ordered
    index: usize,

    /// Source text to translate
    text: String,

    /// Whether this split is part of an alignment job (joint translation
    /// with the rest of the request, never batched independently)
    alignment: bool,

    /// Translated text, written once by the worker
    translation: OnceLock<String>,

    /// Back-reference to the owning barrier, attached by the scheduler
    barrier: OnceLock<Arc<CompletionBarrier>>,

    /// Monotonic completion flag
    completed: AtomicBool,
}

impl TranslationSplit {
    /// Create a new independent split
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            alignment: false,
            translation: OnceLock::new(),
            barrier: OnceLock::new(),
            completed: AtomicBool::new(false),
        }
    }

    /// Create a split that is part of an alignment job
    pub fn aligned(index: usize, text: impl Into<String>) -> Self {
        Self {
            alignment: true,
            ..Self::new(index, text)
        }
    }

    /// Position of this split within its parent request
    pub fn index(&self) -> usize {
        self.index
    }

    /// Source text of this split
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this split must be translated jointly with its siblings
    pub fn is_alignment(&self) -> bool {
        self.alignment
    }

    /// Attach the owning barrier. Called once by the scheduler; later
    /// attempts are ignored.
    pub(crate) fn attach_barrier(&self, barrier: Arc<CompletionBarrier>) {
        let _ = self.barrier.set(barrier);
    }

    /// The barrier owning this split, if the split has been scheduled
    pub fn barrier(&self) -> Option<&Arc<CompletionBarrier>> {
        self.barrier.get()
    }

    /// Record the translation and report completion to the owning barrier.
    ///
    /// Idempotent: only the first call stores a translation and advances
    /// the barrier's completion count.
    pub fn complete(&self, translation: impl Into<String>) {
        let _ = self.translation.set(translation.into());
        if !self.completed.swap(true, Ordering::SeqCst) {
            if let Some(barrier) = self.barrier.get() {
                barrier.split_completed(self.index);
            }
        }
    }

    /// Whether this split has been marked complete
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// The translated text, if the split has completed
    pub fn translation(&self) -> Option<&str> {
        self.translation.get().map(String::as_str)
    }
}
