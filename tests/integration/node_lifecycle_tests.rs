/*!
 * End-to-end node lifecycle tests: intake facade, worker pool, status
 * reporting and shutdown
 */

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nmt_node::decoder::MockDecoder;
use nmt_node::errors::{NodeError, SchedulerError};
use nmt_node::node::ClusterNode;
use nmt_node::status::{NodeState, StatusWriter};

use crate::common::{direction, init_test_logging, splits, test_config};

/// Test the full path: schedule, decode on a worker, reassemble results
#[tokio::test]
async fn test_translate_withWorkingDecoder_shouldReturnOrderedTranslations() {
    init_test_logging();
    let node = ClusterNode::with_config(test_config()).unwrap();
    node.start();

    let segments = vec![
        "first sentence".to_string(),
        "second sentence".to_string(),
        "third sentence".to_string(),
    ];
    let translations = node
        .translate(direction(), segments, false, Vec::new())
        .await
        .unwrap();

    assert_eq!(
        translations,
        vec![
            "[fr] first sentence",
            "[fr] second sentence",
            "[fr] third sentence"
        ]
    );
    node.shutdown();
}

/// Test that an alignment request reaches the decoder as one unit
#[tokio::test]
async fn test_translate_withAlignmentRequest_shouldDecodeJointly() {
    let decoder = Arc::new(MockDecoder::working());
    let node = ClusterNode::with_decoder(test_config(), decoder.clone()).unwrap();
    node.start();

    let segments = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let translations = node
        .translate(direction(), segments, true, Vec::new())
        .await
        .unwrap();

    assert_eq!(translations.len(), 3);
    // All three splits were served by a single decoder call
    assert_eq!(decoder.call_count(), 1);
    node.shutdown();
}

/// Test that a decoder failure surfaces as a processing error, not a hang
#[tokio::test]
async fn test_translate_withFailingDecoder_shouldSurfaceProcessingFailure() {
    let node =
        ClusterNode::with_decoder(test_config(), Arc::new(MockDecoder::failing())).unwrap();
    node.start();

    let result = node
        .translate(direction(), vec!["hello".to_string()], false, Vec::new())
        .await;
    assert!(matches!(
        result,
        Err(NodeError::Scheduler(SchedulerError::ProcessingFailed(_)))
    ));
    node.shutdown();
}

/// Test that saturation yields an immediate retryable rejection
#[tokio::test]
async fn test_translate_withSaturatedQueue_shouldRejectImmediately() {
    let mut config = test_config();
    config.scheduler.queue_capacity = 1;
    // Workers are never started, so the queued job stays put
    let node = ClusterNode::with_config(config).unwrap();

    node.scheduler()
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();

    let result = node
        .translate(direction(), vec!["hello".to_string()], false, Vec::new())
        .await;
    assert!(matches!(
        result,
        Err(NodeError::Scheduler(SchedulerError::DecoderUnavailable(_)))
    ));
}

/// Test that many concurrent requests all complete
#[tokio::test]
async fn test_translate_withConcurrentRequests_shouldCompleteAll() {
    let mut config = test_config();
    config.decoder.workers = 4;
    let node = Arc::new(ClusterNode::with_config(config).unwrap());
    node.start();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                node.translate(
                    direction(),
                    vec![format!("sentence {i}")],
                    false,
                    Vec::new(),
                )
                .await
            })
        })
        .collect();

    for task in tasks {
        let translations = task.await.unwrap().unwrap();
        assert_eq!(translations.len(), 1);
    }
    node.shutdown();
}

/// Test that a missed deadline reports a timeout while work continues
#[tokio::test]
async fn test_translate_withSlowDecoder_shouldTimeOut() {
    let mut config = test_config();
    config.scheduler.request_timeout_secs = 1;
    let node =
        ClusterNode::with_decoder(config, Arc::new(MockDecoder::slow(2_000))).unwrap();
    node.start();

    let result = node
        .translate(direction(), vec!["slow".to_string()], false, Vec::new())
        .await;
    assert!(matches!(result, Err(NodeError::Timeout(_))));
    node.shutdown();
}

/// Test that shutdown releases blocked waiters instead of hanging them
#[tokio::test]
async fn test_shutdown_withPendingRequest_shouldReleaseWaiters() {
    // No workers started: the job can never complete
    let node = Arc::new(ClusterNode::with_config(test_config()).unwrap());
    let handle = node
        .scheduler()
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();

    let waiter = thread::spawn(move || handle.wait());
    thread::sleep(Duration::from_millis(100));
    node.shutdown();

    let result = waiter.join().unwrap();
    assert_eq!(result, Err(SchedulerError::Closed));
}

/// Test status snapshots across the node lifecycle
#[tokio::test]
async fn test_status_acrossLifecycle_shouldTrackStateAndDepth() {
    let node = ClusterNode::with_config(test_config()).unwrap();

    // Before workers drain anything, queued work is visible
    node.scheduler()
        .schedule(direction(), splits(2), Vec::new())
        .unwrap();
    let status = node.status();
    assert_eq!(status.state, NodeState::Running);
    assert_eq!(status.pending_splits, 2);
    assert_eq!(status.workers, 0);

    node.start();
    assert_eq!(node.status().workers, test_config().decoder.workers);

    node.shutdown();
    let status = node.status();
    assert_eq!(status.state, NodeState::Stopped);
    assert_eq!(status.queue_depth, 0);
}

/// Test writing a node status snapshot to disk
#[tokio::test]
async fn test_status_writer_withNodeSnapshot_shouldPersistJson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");

    let node = ClusterNode::with_config(test_config()).unwrap();
    node.start();
    StatusWriter::new(&path).write(&node.status()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: nmt_node::status::NodeStatus = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.engine, "test");
    assert_eq!(parsed.state, NodeState::Running);
    node.shutdown();
}
