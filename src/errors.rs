/*!
 * Error types for the nmt-node application.
 *
 * This module contains custom error types for different parts of the node,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the translation scheduler.
///
/// The scheduler hands the same error value to every thread waiting on a
/// barrier, so the type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The decoder cannot accept more work: the pending-job or pending-split
    /// capacity is exhausted, or the scheduler has been closed. Callers may
    /// retry later; nothing was enqueued.
    #[error("Decoder unavailable: {0}")]
    DecoderUnavailable(String),

    /// The scheduler was closed while the operation was in flight. Clean
    /// shutdown path, not an application failure.
    #[error("Scheduler closed")]
    Closed,

    /// A worker reported a hard failure for the job owning this request's
    /// splits. Distinct from a timeout: retrying blindly will not help.
    #[error("Translation processing failed: {0}")]
    ProcessingFailed(String),

    /// The request was malformed (e.g. an empty split list) and was rejected
    /// before anything was enqueued.
    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),
}

/// Errors raised by a decoder implementation during inference.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// The decoder failed to produce a translation
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),

    /// The requested language direction is not supported by the engine
    #[error("Unsupported language direction: {0}")]
    UnsupportedDirection(String),
}

/// Top-level node error type wrapping all other errors.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Error from the translation scheduler
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Error from a decoder
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// The translation did not complete within the configured deadline.
    /// The underlying work keeps running; the caller merely stopped waiting.
    #[error("Translation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Error with the node configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation (status file, config file)
    #[error("File error: {0}")]
    File(String),
}

impl From<std::io::Error> for NodeError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
