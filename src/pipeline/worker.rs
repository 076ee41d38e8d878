use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::cancel::CancellationToken;
use super::error::PipelineError;
use super::queue::WorkSource;
use super::results::BoundedSortedResults;
use super::types::{ScoredResult, WorkItem};
use crate::scoring::{ScoreError, ScoringStrategy};

/// Progress callback: (completed, total, worker_id)
pub type ProgressFn<'a> = dyn Fn(usize, usize, usize) + Send + Sync + 'a;

/// Per-worker counters collected when the worker exits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker_id: usize,
    /// Items taken from the queue
    pub processed: usize,
    /// Scored above the threshold and stored
    pub accepted: usize,
    /// Scored at or below the threshold
    pub filtered: usize,
    /// Could not be scored (malformed or interrupted)
    pub skipped: usize,
    /// Scored above the threshold but rejected by a full result collection
    pub dropped: usize,
}

/// Outcome of one pool execution
#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolReport {
    pub produced: usize,
    pub workers: Vec<WorkerStats>,
    pub cancelled: bool,
}

impl PoolReport {
    pub fn totals(&self) -> WorkerStats {
        self.workers.iter().fold(WorkerStats::default(), |mut acc, w| {
            acc.processed += w.processed;
            acc.accepted += w.accepted;
            acc.filtered += w.filtered;
            acc.skipped += w.skipped;
            acc.dropped += w.dropped;
            acc
        })
    }
}

/// Cancels the queue if a worker unwinds, so the producer and the remaining
/// workers cannot block on a pool that lost its consumers.
struct CancelOnPanic<'a, Q: WorkSource>(&'a Q);

impl<Q: WorkSource> Drop for CancelOnPanic<'_, Q> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.cancel();
        }
    }
}

/// N worker loops draining a [`WorkSource`] into a [`BoundedSortedResults`]
pub struct WorkerPool<'a, Q: WorkSource> {
    queue: &'a Q,
    results: &'a BoundedSortedResults,
    strategy: &'a dyn ScoringStrategy,
    threshold: f64,
    cancel: CancellationToken,
    progress: Option<&'a ProgressFn<'a>>,
    completed: AtomicUsize,
}

impl<'a, Q: WorkSource> WorkerPool<'a, Q> {
    pub fn new(
        queue: &'a Q,
        results: &'a BoundedSortedResults,
        strategy: &'a dyn ScoringStrategy,
        threshold: f64,
    ) -> Self {
        Self {
            queue,
            results,
            strategy,
            threshold,
            cancel: CancellationToken::new(),
            progress: None,
            completed: AtomicUsize::new(0),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: &'a ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Spawn `workers` scoped worker threads, feed `work_items` from the
    /// calling thread, signal completion, and join every worker.
    pub fn execute(&self, workers: usize, work_items: Vec<WorkItem>) -> Result<PoolReport, PipelineError> {
        if workers == 0 {
            return Err(PipelineError::InvalidCapacity {
                what: "worker pool",
                value: workers,
            });
        }

        let total = work_items.len();
        tracing::debug!(
            "Starting {} workers ({}) for {} items",
            workers,
            self.strategy.name(),
            total
        );

        let outcome = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|worker_id| s.spawn(move |_| self.run_worker(worker_id, total)))
                .collect();

            let produced = self.produce(work_items);

            let mut stats = Vec::with_capacity(workers);
            let mut panicked = 0;
            for handle in handles {
                match handle.join() {
                    Ok(worker) => stats.push(worker),
                    Err(_) => panicked += 1,
                }
            }
            (produced, stats, panicked)
        });

        let (produced, stats, panicked) =
            outcome.map_err(|_| PipelineError::WorkerPanicked(workers))?;
        if panicked > 0 {
            return Err(PipelineError::WorkerPanicked(panicked));
        }

        Ok(PoolReport {
            produced,
            workers: stats,
            cancelled: self.cancel.is_cancelled(),
        })
    }

    /// Producer side: insert every item, then mark the queue complete
    fn produce(&self, work_items: Vec<WorkItem>) -> usize {
        let mut produced = 0;
        for item in work_items {
            if self.cancel.is_cancelled() {
                self.queue.cancel();
                break;
            }
            match self.queue.insert(item) {
                Ok(()) => produced += 1,
                Err(PipelineError::Cancelled) => break,
                Err(err) => {
                    tracing::error!("Producer stopped: {}", err);
                    self.queue.cancel();
                    break;
                }
            }
        }
        self.queue.mark_complete();
        produced
    }

    /// One worker loop: runs until the queue reports no more items
    pub fn run_worker(&self, worker_id: usize, total: usize) -> WorkerStats {
        let _guard = CancelOnPanic(self.queue);
        let mut stats = WorkerStats {
            worker_id,
            ..WorkerStats::default()
        };

        loop {
            if self.cancel.is_cancelled() {
                self.queue.cancel();
                break;
            }
            let Some(item) = self.queue.remove() else {
                break;
            };
            stats.processed += 1;

            match self.strategy.score(&item, &self.cancel) {
                Ok(score) if score > self.threshold => {
                    match self.results.insert(ScoredResult::from_item(&item, score)) {
                        Ok(()) => stats.accepted += 1,
                        Err(_) => stats.dropped += 1,
                    }
                }
                Ok(score) => {
                    tracing::debug!(
                        "[worker-{}] '{}' scored {:.4}, below threshold {}",
                        worker_id,
                        item.id,
                        score,
                        self.threshold
                    );
                    stats.filtered += 1;
                }
                Err(ScoreError::Cancelled) => {
                    tracing::debug!("[worker-{}] interrupted while scoring '{}'", worker_id, item.id);
                    stats.skipped += 1;
                    self.queue.cancel();
                    break;
                }
                Err(err) => {
                    tracing::warn!("[worker-{}] skipping item: {}", worker_id, err);
                    stats.skipped += 1;
                }
            }

            let current = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = self.progress {
                progress(current, total, worker_id);
            }
        }

        tracing::trace!("[worker-{}] exiting: {:?}", worker_id, stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BoundedWorkQueue, ChannelWorkQueue, QueueOrder};
    use crate::scoring::SelfProductSum;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scores an item by parsing its id
    struct IdScore;

    impl ScoringStrategy for IdScore {
        fn name(&self) -> &'static str {
            "id-score"
        }

        fn score(&self, item: &WorkItem, _cancel: &CancellationToken) -> Result<f64, ScoreError> {
            item.id.parse().map_err(|_| ScoreError::Malformed {
                id: item.id.clone(),
                reason: "id is not numeric".to_string(),
            })
        }
    }

    /// Records every item it sees, scores everything 1.0
    struct Recording(Mutex<Vec<String>>);

    impl ScoringStrategy for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn score(&self, item: &WorkItem, _cancel: &CancellationToken) -> Result<f64, ScoreError> {
            self.0.lock().unwrap().push(item.id.clone());
            Ok(1.0)
        }
    }

    fn items(ids: &[&str]) -> Vec<WorkItem> {
        ids.iter().map(|id| WorkItem::new(*id, 1, 0.0)).collect()
    }

    #[test]
    fn test_threshold_filtering_and_order() {
        let queue = BoundedWorkQueue::new(2, QueueOrder::Lifo).unwrap();
        let results = BoundedSortedResults::new(3);
        let pool = WorkerPool::new(&queue, &results, &IdScore, 10.0);

        let report = pool.execute(2, items(&["25", "5", "15"])).unwrap();

        let scores: Vec<f64> = results.snapshot(results.count()).iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![15.0, 25.0]);
        let totals = report.totals();
        assert_eq!(totals.processed, 3);
        assert_eq!(totals.accepted, 2);
        assert_eq!(totals.filtered, 1);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_every_item_delivered_exactly_once() {
        let ids: Vec<String> = (0..200).map(|i| i.to_string()).collect();
        let work: Vec<WorkItem> = ids.iter().map(|id| WorkItem::new(id.as_str(), 1, 0.0)).collect();

        for order in [QueueOrder::Lifo, QueueOrder::Fifo] {
            let queue = BoundedWorkQueue::new(3, order).unwrap();
            let results = BoundedSortedResults::new(work.len());
            let recording = Recording(Mutex::new(Vec::new()));
            let report = WorkerPool::new(&queue, &results, &recording, 0.0)
                .execute(4, work.clone())
                .unwrap();

            let seen = recording.0.into_inner().unwrap();
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for id in &seen {
                *counts.entry(id.as_str()).or_default() += 1;
            }
            assert_eq!(seen.len(), ids.len());
            assert!(ids.iter().all(|id| counts.get(id.as_str()) == Some(&1)));
            assert_eq!(report.produced, ids.len());
            assert_eq!(results.count(), ids.len());
        }
    }

    #[test]
    fn test_channel_queue_delivers_exactly_once() {
        let queue = ChannelWorkQueue::new(2).unwrap();
        let results = BoundedSortedResults::new(50);
        let recording = Recording(Mutex::new(Vec::new()));
        let work: Vec<WorkItem> = (0..50).map(|i| WorkItem::new(i.to_string(), 1, 0.0)).collect();

        WorkerPool::new(&queue, &results, &recording, 0.0)
            .execute(3, work)
            .unwrap();

        let mut seen = recording.0.into_inner().unwrap();
        seen.sort_by_key(|id| id.parse::<usize>().unwrap());
        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let queue = BoundedWorkQueue::new(1, QueueOrder::Fifo).unwrap();
        let results = BoundedSortedResults::new(3);
        let report = WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .execute(2, items(&["oops", "3", "bad", "7"]))
            .unwrap();

        assert_eq!(results.count(), 2);
        assert_eq!(report.totals().skipped, 2);
        assert_eq!(report.totals().processed, 4);
    }

    #[test]
    fn test_oversized_item_is_skipped_not_fatal() {
        let queue = BoundedWorkQueue::new(1, QueueOrder::Fifo).unwrap();
        let results = BoundedSortedResults::new(2);
        let work = vec![WorkItem::new("ok", 2, 1.0), WorkItem::new("huge", 1 << 31, 1.0)];

        let report = WorkerPool::new(&queue, &results, &SelfProductSum, 0.0)
            .execute(2, work)
            .unwrap();

        assert_eq!(report.totals().skipped, 1);
        let kept = results.snapshot(results.count());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "ok");
    }

    /// Panics on the item named "boom", scores everything else 1.0
    struct PanicsOnBoom;

    impl ScoringStrategy for PanicsOnBoom {
        fn name(&self) -> &'static str {
            "panics-on-boom"
        }

        fn score(&self, item: &WorkItem, _cancel: &CancellationToken) -> Result<f64, ScoreError> {
            if item.id == "boom" {
                panic!("strategy failed on '{}'", item.id);
            }
            Ok(1.0)
        }
    }

    #[test]
    fn test_worker_panic_is_reported_without_deadlock() {
        let queue = BoundedWorkQueue::new(1, QueueOrder::Fifo).unwrap();
        let results = BoundedSortedResults::new(16);
        let mut work = items(&["1", "2", "boom"]);
        work.extend(items(&["4", "5", "6", "7", "8", "9", "10", "11", "12"]));

        let err = WorkerPool::new(&queue, &results, &PanicsOnBoom, 0.0)
            .execute(2, work)
            .unwrap_err();

        assert_eq!(err, PipelineError::WorkerPanicked(1));
        assert!(queue.remove().is_none());
    }

    #[test]
    fn test_empty_input_terminates() {
        let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
        let results = BoundedSortedResults::new(0);
        let report = WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .execute(2, Vec::new())
            .unwrap();

        assert_eq!(report.produced, 0);
        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.totals().processed, 0);
    }

    #[test]
    fn test_overflow_counts_as_dropped() {
        let queue = BoundedWorkQueue::new(4, QueueOrder::Fifo).unwrap();
        let results = BoundedSortedResults::new(1);
        let report = WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .execute(2, items(&["1", "2", "3"]))
            .unwrap();

        assert_eq!(results.count(), 1);
        assert_eq!(report.totals().dropped, 2);
        assert_eq!(results.dropped(), 2);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
        let results = BoundedSortedResults::new(1);
        let err = WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .execute(0, items(&["1"]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCapacity { value: 0, .. }));
    }

    #[test]
    fn test_cancelled_run_unblocks_and_reports() {
        let token = CancellationToken::new();
        token.cancel();
        let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
        let results = BoundedSortedResults::new(10);
        let report = WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .with_cancellation(token)
            .execute(2, items(&["1", "2", "3", "4"]))
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.produced, 0);
    }

    #[test]
    fn test_progress_reports_every_item() {
        let queue = BoundedWorkQueue::new(2, QueueOrder::Fifo).unwrap();
        let results = BoundedSortedResults::new(5);
        let calls = AtomicUsize::new(0);
        let progress = |_current: usize, total: usize, _worker: usize| {
            assert_eq!(total, 5);
            calls.fetch_add(1, Ordering::Relaxed);
        };

        WorkerPool::new(&queue, &results, &IdScore, 0.0)
            .with_progress(&progress)
            .execute(2, items(&["1", "2", "3", "4", "5"]))
            .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 5);
    }
}
