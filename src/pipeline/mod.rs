//! Bounded producer/consumer scoring pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ insert ┌──────────────┐ remove ┌─────────────┐ insert ┌──────────────────────┐
//! │ Producer │───────▶│  WorkSource  │───────▶│ WorkerPool  │───────▶│ BoundedSortedResults │
//! │ (Driver) │        │ (bounded)    │        │ N threads   │        │ (ascending by score) │
//! └──────────┘        └──────────────┘        └─────────────┘        └──────────────────────┘
//! ```
//!
//! - [`BoundedWorkQueue`]: `Mutex` + two `Condvar`s, LIFO or FIFO removal.
//! - [`ChannelWorkQueue`]: bounded crossbeam channel with the same contract.
//! - [`BoundedSortedResults`]: fixed-capacity collection kept sorted on every
//!   insert; rejects inserts once full.
//! - [`WorkerPool`]: scoped worker threads; the calling thread is the
//!   producer and marks the queue complete after its last insert.
//!
//! # Liveness
//!
//! The producer must call `mark_complete()` exactly once after its last
//! insert, otherwise workers block forever in `remove()`.
//! [`WorkerPool::execute`] does this for you. A [`CancellationToken`] (with
//! an optional deadline) lets a run abort: the first thread that notices
//! cancellation cancels the queue, which wakes every blocked producer and
//! consumer.
//!
//! # Example
//!
//! ```rust
//! use scorepipe::pipeline::{BoundedSortedResults, BoundedWorkQueue, QueueOrder, WorkItem, WorkerPool};
//! use scorepipe::scoring::SelfProductSum;
//!
//! let items = vec![WorkItem::new("a", 3, 1.0), WorkItem::new("b", 4, 2.0)];
//! let queue = BoundedWorkQueue::new(1, QueueOrder::Lifo).unwrap();
//! let results = BoundedSortedResults::new(items.len());
//!
//! let report = WorkerPool::new(&queue, &results, &SelfProductSum, 0.0)
//!     .execute(2, items)
//!     .unwrap();
//!
//! assert_eq!(report.produced, 2);
//! assert_eq!(results.count(), 2);
//! ```

pub mod cancel;
pub mod channel;
pub mod error;
pub mod progress;
pub mod queue;
pub mod results;
pub mod types;
pub mod worker;

// Re-export main types for easier access
pub use cancel::CancellationToken;
pub use channel::ChannelWorkQueue;
pub use error::PipelineError;
pub use progress::PipelineProgress;
pub use queue::{BoundedWorkQueue, QueueOrder, WorkSource};
pub use results::BoundedSortedResults;
pub use types::{ScoredResult, WorkItem};
pub use worker::{PoolReport, ProgressFn, WorkerPool, WorkerStats};
