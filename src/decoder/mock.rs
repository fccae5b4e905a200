/*!
 * Mock decoder implementations for testing and as a stand-in engine.
 *
 * This module provides mock decoders that simulate different behaviors:
 * - `MockDecoder::working()` - Always succeeds with pseudo-translated text
 * - `MockDecoder::intermittent(n)` - Fails every nth job
 * - `MockDecoder::failing()` - Always fails with an error
 * - `MockDecoder::slow(ms)` - Succeeds after a simulated inference delay
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::errors::DecoderError;
use crate::language_utils::LanguageDirection;
use crate::scheduler::ScoreEntry;

use super::Decoder;

/// Behavior mode for the mock decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a pseudo-translation
    Working,
    /// Fails intermittently (every nth call)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds after a simulated inference delay with ±20% jitter
    Slow { delay_ms: u64 },
}

/// Mock decoder simulating a neural engine without loading a model
#[derive(Debug)]
pub struct MockDecoder {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call counter for intermittent failures
    call_count: AtomicUsize,
}

impl MockDecoder {
    /// Create a new mock decoder with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a working mock decoder that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock decoder
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock decoder that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock decoder with a simulated inference delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of translate calls served so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn pseudo_translate(direction: &LanguageDirection, text: &str) -> String {
        format!("[{}] {}", direction.target, text)
    }
}

impl Decoder for MockDecoder {
    fn translate(
        &self,
        direction: &LanguageDirection,
        texts: &[&str],
        _suggestions: &[ScoreEntry],
    ) -> Result<Vec<String>, DecoderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Working => {}
            MockBehavior::Failing => {
                return Err(DecoderError::DecodingFailed(
                    "mock decoder configured to fail".to_string(),
                ));
            }
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && call % fail_every == 0 {
                    return Err(DecoderError::DecodingFailed(format!(
                        "mock decoder intermittent failure on call {call}"
                    )));
                }
            }
            MockBehavior::Slow { delay_ms } => {
                let jitter = if delay_ms >= 5 {
                    rand::rng().random_range(0..=delay_ms / 5)
                } else {
                    0
                };
                thread::sleep(Duration::from_millis(delay_ms + jitter));
            }
        }

        Ok(texts
            .iter()
            .map(|text| Self::pseudo_translate(direction, text))
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
