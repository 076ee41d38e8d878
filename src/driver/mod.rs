//! Driver: sizes, runs and reports one pipeline execution
//!
//! The driver owns everything around the core: it picks the queue
//! realization and capacities, acts as the single producer, and reads the
//! final snapshot only after every worker has been joined.

pub mod input;
pub mod report;
pub mod sizing;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::PipelineSettings;
use crate::pipeline::{
    BoundedSortedResults, BoundedWorkQueue, CancellationToken, ChannelWorkQueue, PipelineError,
    PipelineProgress, PoolReport, ScoredResult, WorkItem, WorkSource, WorkerPool,
};
use crate::scoring::{ScoringKind, ScoringStrategy};

pub use input::load_work_items;
pub use sizing::PipelineSizing;

/// Which work queue realization to run on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    /// Mutex and condition variables
    #[default]
    Monitor,
    /// Bounded crossbeam channel
    Channel,
}

/// Everything a report needs from a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Final snapshot, ascending by score
    pub results: Vec<ScoredResult>,
    pub pool: PoolReport,
    pub sizing: PipelineSizing,
    pub strategy: ScoringKind,
    pub threshold: f64,
    pub elapsed: Duration,
}

pub struct Driver {
    settings: PipelineSettings,
    requested_workers: Option<usize>,
}

impl Driver {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            requested_workers: None,
        }
    }

    /// Use exactly `workers` workers instead of the input-size policy
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.requested_workers = workers;
        self
    }

    pub fn plan(&self, item_count: usize) -> PipelineSizing {
        PipelineSizing::plan(item_count, &self.settings, self.requested_workers)
    }

    /// Run `items` through the pipeline and return the sorted results
    pub fn run(&self, items: Vec<WorkItem>, progress: Option<&PipelineProgress>) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        let sizing = self.plan(items.len());
        let strategy = self.settings.strategy.strategy();
        let results = BoundedSortedResults::new(sizing.result_capacity);
        let cancel = match self.settings.deadline_secs {
            Some(secs) => CancellationToken::with_deadline(Duration::from_secs(secs)),
            None => CancellationToken::new(),
        };

        tracing::info!(
            "Running {} items with {} workers (queue: {:?}/{:?}, capacity {}, strategy {}, threshold {})",
            items.len(),
            sizing.workers,
            self.settings.queue,
            self.settings.order,
            sizing.queue_capacity,
            self.settings.strategy,
            self.settings.threshold
        );

        let pool = match self.settings.queue {
            QueueKind::Monitor => {
                let queue = BoundedWorkQueue::new(sizing.queue_capacity, self.settings.order)?;
                self.execute_on(&queue, &results, strategy.as_ref(), &cancel, sizing.workers, items, progress)?
            }
            QueueKind::Channel => {
                let queue = ChannelWorkQueue::new(sizing.queue_capacity)?;
                self.execute_on(&queue, &results, strategy.as_ref(), &cancel, sizing.workers, items, progress)?
            }
        };

        if pool.cancelled {
            return Err(match cancel.budget() {
                Some(budget) if cancel.deadline_passed() => PipelineError::DeadlineExceeded(budget),
                _ => PipelineError::Cancelled,
            });
        }

        // Every worker has been joined; the collection is final
        let results = results.snapshot(results.count());
        let elapsed = start.elapsed();
        tracing::info!(
            "Pipeline finished in {:.2}s: {} of {} items kept",
            elapsed.as_secs_f64(),
            results.len(),
            pool.produced
        );

        Ok(RunSummary {
            results,
            pool,
            sizing,
            strategy: self.settings.strategy,
            threshold: self.settings.threshold,
            elapsed,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_on<Q: WorkSource>(
        &self,
        queue: &Q,
        results: &BoundedSortedResults,
        strategy: &dyn ScoringStrategy,
        cancel: &CancellationToken,
        workers: usize,
        items: Vec<WorkItem>,
        progress: Option<&PipelineProgress>,
    ) -> Result<PoolReport, PipelineError> {
        let report_progress = move |completed: usize, total: usize, worker_id: usize| {
            if let Some(progress) = progress {
                progress.update(completed, total, worker_id);
            }
        };

        WorkerPool::new(queue, results, strategy, self.settings.threshold)
            .with_cancellation(cancel.clone())
            .with_progress(&report_progress)
            .execute(workers, items)
    }
}
