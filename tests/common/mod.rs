/*!
 * Common test utilities shared across the nmt-node test suite
 */

use nmt_node::app_config::{Config, DecoderConfig, SchedulerConfig, StatusConfig};
use nmt_node::language_utils::LanguageDirection;
use nmt_node::scheduler::TranslationSplit;

/// Initialize logging for tests that want visible output; safe to call
/// more than once
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An English-to-French direction used throughout the tests
pub fn direction() -> LanguageDirection {
    LanguageDirection::unchecked("en", "fr")
}

/// Build `count` independent splits with predictable texts
pub fn splits(count: usize) -> Vec<TranslationSplit> {
    (0..count)
        .map(|index| TranslationSplit::new(index, format!("sentence {index}")))
        .collect()
}

/// Build `count` splits belonging to an alignment job
pub fn aligned_splits(count: usize) -> Vec<TranslationSplit> {
    (0..count)
        .map(|index| TranslationSplit::aligned(index, format!("sentence {index}")))
        .collect()
}

/// A small node configuration suitable for fast tests
pub fn test_config() -> Config {
    Config {
        engine: "test".to_string(),
        scheduler: SchedulerConfig {
            queue_capacity: 16,
            max_pending_splits: 64,
            max_batch_size: 4,
            request_timeout_secs: 5,
        },
        decoder: DecoderConfig {
            workers: 2,
            mock_delay_ms: 0,
        },
        status: StatusConfig {
            file: "test-status.json".to_string(),
            interval_secs: 10,
        },
        log_level: Default::default(),
    }
}
