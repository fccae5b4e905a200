/*!
 * Tests for scheduler intake, batching, admission control and closure
 */

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nmt_node::errors::SchedulerError;
use nmt_node::scheduler::{Scheduler, TranslationSplit};

use crate::common::{aligned_splits, direction, splits};

/// Test that a saturated queue rejects immediately and recovers after a take
#[test]
fn test_schedule_atCapacity_shouldRejectThenRecoverAfterTake() {
    // Capacity of 2 jobs, one split per job
    let scheduler = Scheduler::with_limits(2, 100, 1);

    scheduler
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();
    scheduler
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();

    // C+1th call fails fast, nothing is enqueued
    let rejected = scheduler.schedule(direction(), splits(1), Vec::new());
    assert!(matches!(
        rejected,
        Err(SchedulerError::DecoderUnavailable(_))
    ));
    assert_eq!(scheduler.queue_depth(), 2);

    // Taking one job frees capacity for the next request
    scheduler.take().unwrap();
    assert!(
        scheduler
            .schedule(direction(), splits(1), Vec::new())
            .is_ok()
    );
}

/// Test that admission is all-or-nothing for multi-job requests
#[test]
fn test_schedule_withPartialRoom_shouldRejectWholeRequest() {
    // Room for 2 jobs; a 3-split request at batch size 1 needs 3
    let scheduler = Scheduler::with_limits(2, 100, 1);
    let rejected = scheduler.schedule(direction(), splits(3), Vec::new());
    assert!(matches!(
        rejected,
        Err(SchedulerError::DecoderUnavailable(_))
    ));
    assert_eq!(scheduler.queue_depth(), 0);
    assert_eq!(scheduler.pending_splits(), 0);
}

/// Test that the pending-split bound is enforced independently
#[test]
fn test_schedule_overSplitLimit_shouldReject() {
    let scheduler = Scheduler::with_limits(100, 4, 8);
    scheduler
        .schedule(direction(), splits(3), Vec::new())
        .unwrap();
    assert!(
        scheduler
            .schedule(direction(), splits(2), Vec::new())
            .is_err()
    );
    assert_eq!(scheduler.pending_splits(), 3);
}

/// Test that an empty request is rejected before anything is enqueued
#[test]
fn test_schedule_withEmptySplitList_shouldFailWithInvalidRequest() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let result = scheduler.schedule(direction(), Vec::new(), Vec::new());
    assert!(matches!(result, Err(SchedulerError::InvalidRequest(_))));
    assert_eq!(scheduler.queue_depth(), 0);
}

/// Test that one-based split indices are rejected instead of producing a
/// barrier that can never satisfy
#[test]
fn test_schedule_withOneBasedIndices_shouldFailWithInvalidRequest() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let mis_indexed = vec![
        TranslationSplit::new(1, "first"),
        TranslationSplit::new(2, "second"),
    ];
    let result = scheduler.schedule(direction(), mis_indexed, Vec::new());
    assert!(matches!(result, Err(SchedulerError::InvalidRequest(_))));
    assert_eq!(scheduler.queue_depth(), 0);
}

/// Test that duplicate split indices are rejected for the same reason
#[test]
fn test_schedule_withDuplicateIndices_shouldFailWithInvalidRequest() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let duplicated = vec![
        TranslationSplit::new(0, "first"),
        TranslationSplit::new(0, "second"),
    ];
    let result = scheduler.schedule(direction(), duplicated, Vec::new());
    assert!(matches!(result, Err(SchedulerError::InvalidRequest(_))));
    assert_eq!(scheduler.queue_depth(), 0);
}

/// Test that a permuted but complete index set is admitted and satisfiable
#[test]
fn test_schedule_withPermutedIndices_shouldStillSatisfy() {
    let scheduler = Scheduler::with_limits(10, 100, 8);
    let permuted = vec![
        TranslationSplit::new(1, "second"),
        TranslationSplit::new(0, "first"),
    ];
    let handle = scheduler.schedule(direction(), permuted, Vec::new()).unwrap();

    let job = scheduler.take().unwrap();
    for split in job.splits() {
        split.complete(format!("t{}", split.index()));
    }
    assert!(handle.barrier().is_satisfied());
    assert!(handle.wait().is_ok());
}

/// Test that an alignment request is dispatched as exactly one joint job
#[test]
fn test_schedule_withAlignmentRequest_shouldProduceSingleJob() {
    // Batch size 1 would otherwise split the request apart
    let scheduler = Scheduler::with_limits(10, 100, 1);
    scheduler
        .schedule(direction(), aligned_splits(3), Vec::new())
        .unwrap();

    assert_eq!(scheduler.queue_depth(), 1);
    let job = scheduler.take().unwrap();
    assert!(job.is_alignment_job());
    assert_eq!(job.splits().len(), 3);
    assert_eq!(scheduler.queue_depth(), 0);
}

/// Test greedy batching of independent splits
#[test]
fn test_schedule_withIndependentSplits_shouldBatchUpToMaxBatchSize() {
    let scheduler = Scheduler::with_limits(10, 100, 2);
    scheduler
        .schedule(direction(), splits(5), Vec::new())
        .unwrap();

    let mut sizes = Vec::new();
    while scheduler.queue_depth() > 0 {
        let job = scheduler.take().unwrap();
        assert!(!job.is_alignment_job());
        assert!(job.splits().len() <= 2);
        sizes.push(job.splits().len());
    }
    assert_eq!(sizes.iter().sum::<usize>(), 5);
}

/// Test that jobs are handed out in request arrival order
#[test]
fn test_take_shouldHandOutJobsInArrivalOrder() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let first = scheduler
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();
    let second = scheduler
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();

    let job = scheduler.take().unwrap();
    assert!(Arc::ptr_eq(&job.splits()[0], &first.splits()[0]));
    let job = scheduler.take().unwrap();
    assert!(Arc::ptr_eq(&job.splits()[0], &second.splits()[0]));
}

/// Scenario from the dispatch contract: three independent single-split
/// requests, all taken and completed, all barriers satisfied
#[test]
fn test_schedule_threeIndependentRequests_shouldSatisfyAllBarriers() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let handles: Vec<_> = (0..3)
        .map(|_| {
            scheduler
                .schedule(direction(), splits(1), Vec::new())
                .unwrap()
        })
        .collect();

    // Batching granularity is an implementation freedom; only the split
    // total is fixed
    let mut total_splits = 0;
    while scheduler.queue_depth() > 0 {
        let job = scheduler.take().unwrap();
        for split in job.splits() {
            split.complete(format!("translated {}", split.index()));
            total_splits += 1;
        }
    }
    assert_eq!(total_splits, 3);

    for handle in &handles {
        assert!(handle.barrier().is_satisfied());
        assert!(handle.wait().is_ok());
    }
}

/// Scenario from the dispatch contract: a two-split alignment request
/// satisfies its barrier only after both splits complete
#[test]
fn test_alignmentRequest_withPartialCompletion_shouldStayPending() {
    let scheduler = Scheduler::with_limits(10, 100, 8);
    let handle = scheduler
        .schedule(direction(), aligned_splits(2), Vec::new())
        .unwrap();

    let job = scheduler.take().unwrap();
    assert_eq!(job.splits().len(), 2);

    job.splits()[0].complete("premier");
    assert!(!handle.barrier().is_satisfied());

    job.splits()[1].complete("deuxième");
    assert!(handle.barrier().is_satisfied());
    assert_eq!(handle.translations().unwrap(), vec!["premier", "deuxième"]);
}

/// Test that completions arriving out of submission order still satisfy
#[test]
fn test_completion_outOfOrder_shouldStillSatisfyBarrier() {
    let scheduler = Scheduler::with_limits(10, 100, 8);
    let handle = scheduler
        .schedule(direction(), splits(3), Vec::new())
        .unwrap();
    let job = scheduler.take().unwrap();

    for index in [2, 0, 1] {
        assert!(!handle.barrier().is_satisfied());
        job.splits()[index].complete(format!("t{index}"));
    }
    assert!(handle.barrier().is_satisfied());
}

/// Test that double completion reports never over-count
#[test]
fn test_completion_withDuplicateReports_shouldNotWakeEarly() {
    let scheduler = Scheduler::with_limits(10, 100, 8);
    let handle = scheduler
        .schedule(direction(), splits(2), Vec::new())
        .unwrap();
    let job = scheduler.take().unwrap();

    job.splits()[0].complete("once");
    job.splits()[0].complete("twice");
    assert_eq!(handle.barrier().completed(), 1);
    assert!(!handle.barrier().is_satisfied());

    job.splits()[1].complete("done");
    assert!(handle.barrier().is_satisfied());
}

/// Test that a worker-reported failure surfaces distinctly from a timeout
#[test]
fn test_jobFail_shouldErrorBarrierWithProcessingFailure() {
    let scheduler = Scheduler::with_limits(10, 100, 8);
    let handle = scheduler
        .schedule(direction(), splits(2), Vec::new())
        .unwrap();
    let job = scheduler.take().unwrap();

    job.fail("engine ran out of memory");
    let error = handle.wait().unwrap_err();
    assert!(matches!(error, SchedulerError::ProcessingFailed(_)));
}

/// Test that schedule calls after close fail with decoder-unavailable
#[test]
fn test_schedule_afterClose_shouldFailWithDecoderUnavailable() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    scheduler.close();
    let result = scheduler.schedule(direction(), splits(1), Vec::new());
    assert!(matches!(
        result,
        Err(SchedulerError::DecoderUnavailable(_))
    ));
}

/// Test that close wakes blocked workers and blocked waiters within
/// bounded time, with the correct signals
#[test]
fn test_close_withBlockedWorkersAndWaiters_shouldWakeAll() {
    let scheduler = Arc::new(Scheduler::with_limits(10, 100, 8));

    // One request whose job is taken but never completed, so its caller
    // blocks in wait()
    let handle = scheduler
        .schedule(direction(), splits(1), Vec::new())
        .unwrap();
    let _stalled_job = scheduler.take().unwrap();

    let waiter = thread::spawn(move || handle.wait());
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || scheduler.take())
        })
        .collect();

    // Let everyone block, then close
    thread::sleep(Duration::from_millis(100));
    scheduler.close();

    for worker in workers {
        let result = worker.join().unwrap();
        assert!(matches!(result, Err(SchedulerError::Closed)));
    }
    let waited = waiter.join().unwrap();
    assert_eq!(waited, Err(SchedulerError::Closed));
}

/// Test that close errors the barriers of jobs never taken by any worker
#[test]
fn test_close_withQueuedJobs_shouldErrorTheirBarriers() {
    let scheduler = Scheduler::with_limits(10, 100, 4);
    let handle = scheduler
        .schedule(direction(), splits(2), Vec::new())
        .unwrap();

    scheduler.close();
    assert_eq!(handle.wait(), Err(SchedulerError::Closed));
    assert_eq!(scheduler.queue_depth(), 0);
}

/// Test concurrent producers and consumers: no job loss or duplication
#[test]
fn test_concurrentScheduleAndTake_shouldDeliverEverySplitOnce() {
    let scheduler = Arc::new(Scheduler::with_limits(1000, 10_000, 3));
    let producers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                (0..10)
                    .map(|_| {
                        scheduler
                            .schedule(direction(), splits(5), Vec::new())
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let mut completed = 0;
                while let Ok(job) = scheduler.take() {
                    for split in job.splits() {
                        split.complete(format!("t{}", split.index()));
                        completed += 1;
                    }
                }
                completed
            })
        })
        .collect();

    let handles: Vec<_> = producers
        .into_iter()
        .flat_map(|producer| producer.join().unwrap())
        .collect();
    for handle in &handles {
        assert!(handle.wait().is_ok());
    }

    scheduler.close();
    let completed: usize = consumers
        .into_iter()
        .map(|consumer| consumer.join().unwrap())
        .sum();
    // 4 producers x 10 requests x 5 splits, each delivered exactly once
    assert_eq!(completed, 200);
}
