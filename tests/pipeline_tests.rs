//! Concurrency properties of the pipeline core

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use scorepipe::pipeline::{
    BoundedSortedResults, BoundedWorkQueue, CancellationToken, ChannelWorkQueue, PipelineError, QueueOrder,
    ScoredResult, WorkItem, WorkSource, WorkerPool,
};
use scorepipe::scoring::{LongestPathSum, ScoreError, ScoringKind, ScoringStrategy, SelfProductSum};

fn drain_with_consumers<Q: WorkSource + 'static>(queue: Arc<Q>, consumers: usize) -> Vec<String> {
    let handles: Vec<_> = (0..consumers)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(item) = queue.remove() {
                    seen.push(item.id);
                }
                seen
            })
        })
        .collect();
    handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_capacity_two_scenario() {
    let queue = Arc::new(BoundedWorkQueue::new(2, QueueOrder::Lifo).unwrap());
    queue.insert(WorkItem::new("A", 2, 1.0)).unwrap();
    queue.insert(WorkItem::new("B", 2, 2.0)).unwrap();

    let third_done = Arc::new(AtomicBool::new(false));
    let producer = {
        let queue = Arc::clone(&queue);
        let third_done = Arc::clone(&third_done);
        thread::spawn(move || {
            queue.insert(WorkItem::new("C", 2, 3.0)).unwrap();
            third_done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!third_done.load(Ordering::SeqCst));

    let first = queue.remove().unwrap();
    producer.join().unwrap();
    queue.mark_complete();

    let mut delivered = vec![first.id];
    delivered.extend(drain_with_consumers(Arc::clone(&queue), 2));
    delivered.sort();
    assert_eq!(delivered, vec!["A", "B", "C"]);
}

#[test]
fn test_concurrent_producer_and_consumers_deliver_exactly_once() {
    for queue_kind in ["monitor", "channel"] {
        let total = 500;
        let consumers = 6;

        let queue: Arc<dyn WorkSource> = match queue_kind {
            "monitor" => Arc::new(BoundedWorkQueue::new(4, QueueOrder::Fifo).unwrap()),
            _ => Arc::new(ChannelWorkQueue::new(4).unwrap()),
        };

        let seen = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..consumers)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    while let Some(item) = queue.remove() {
                        seen.lock().unwrap().push(item.id);
                    }
                })
            })
            .collect();

        for i in 0..total {
            queue.insert(WorkItem::new(i.to_string(), 1, 0.0)).unwrap();
        }
        queue.mark_complete();
        for handle in handles {
            handle.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len(), total, "{queue_kind}: lost or duplicated items");
        assert_eq!(unique.len(), total, "{queue_kind}: duplicated items");
    }
}

#[test]
fn test_remove_on_terminal_empty_queue_does_not_block() {
    let queue = BoundedWorkQueue::new(3, QueueOrder::Fifo).unwrap();
    queue.mark_complete();
    assert!(queue.remove().is_none());

    let channel = ChannelWorkQueue::new(3).unwrap();
    channel.mark_complete();
    assert!(channel.remove().is_none());
}

#[test]
fn test_scores_are_deterministic() {
    let token = CancellationToken::new();
    for size in 1..=4 {
        for seed in [0.0, 1.5, -7.2, 1234.9] {
            let item = WorkItem::new("d", size, seed);
            for strategy in [ScoringKind::SelfProduct, ScoringKind::LongestPath] {
                let strategy = strategy.strategy();
                assert_eq!(
                    strategy.score(&item, &token).unwrap(),
                    strategy.score(&item, &token).unwrap()
                );
            }
        }
    }
}

#[test]
fn test_one_by_one_boundaries() {
    let token = CancellationToken::new();
    let item = WorkItem::new("one", 1, 5.0);

    let product = SelfProductSum.score(&item, &token).unwrap();
    let path = LongestPathSum.score(&item, &token).unwrap();

    // The self-product draws v in [0, 1) and scores v²; the path draws
    // from the same stream scaled by 10 and scores the cell itself
    let v = path / 10.0;
    assert!((product - v * v).abs() < 1e-9);
    assert!((0.0..10.0).contains(&path));
}

struct FixedScores;

impl ScoringStrategy for FixedScores {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn score(&self, item: &WorkItem, _cancel: &CancellationToken) -> Result<f64, ScoreError> {
        Ok(item.seed)
    }
}

#[test]
fn test_threshold_scenario() {
    let items = vec![
        WorkItem::new("five", 1, 5.0),
        WorkItem::new("fifteen", 1, 15.0),
        WorkItem::new("twenty-five", 1, 25.0),
    ];
    let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
    let results = BoundedSortedResults::new(items.len());

    WorkerPool::new(&queue, &results, &FixedScores, 10.0)
        .execute(2, items)
        .unwrap();

    let snapshot = results.snapshot(results.count());
    let scores: Vec<f64> = snapshot.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![15.0, 25.0]);
}

#[test]
fn test_concurrent_inserts_respect_capacity() {
    let results = Arc::new(BoundedSortedResults::new(50));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let results = Arc::clone(&results);
            thread::spawn(move || {
                let mut rejected = 0;
                for i in 0..20 {
                    let result = ScoredResult {
                        id: format!("{t}-{i}"),
                        score: ((t * 37 + i * 11) % 97) as f64,
                        seed: 0.0,
                        matrix_size: 1,
                    };
                    if let Err(err) = results.insert(result) {
                        assert_eq!(err, PipelineError::CapacityExceeded { capacity: 50 });
                        rejected += 1;
                    }
                }
                rejected
            })
        })
        .collect();

    let rejected: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(results.count(), 50);
    assert_eq!(rejected, 160 - 50);
    assert_eq!(results.dropped(), rejected);

    let snapshot = results.snapshot(results.count());
    assert!(snapshot.windows(2).all(|w| w[0].score <= w[1].score));
}

#[test]
fn test_deadline_cancels_long_search() {
    // A 7x7 exhaustive path search takes far longer than the deadline
    let items = vec![WorkItem::new("slow", 7, 1.0)];
    let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
    let results = BoundedSortedResults::new(1);
    let token = CancellationToken::with_deadline(Duration::from_millis(50));

    let report = WorkerPool::new(&queue, &results, &LongestPathSum, 0.0)
        .with_cancellation(token.clone())
        .execute(2, items)
        .unwrap();

    assert!(report.cancelled);
    assert!(token.deadline_passed());
    assert_eq!(results.count(), 0);
}
