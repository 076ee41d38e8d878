use serde::Serialize;

use crate::config::PipelineSettings;

/// Queue, pool and result capacities for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineSizing {
    pub queue_capacity: usize,
    pub workers: usize,
    pub result_capacity: usize,
}

impl PipelineSizing {
    /// Size a run of `item_count` items.
    ///
    /// - queue: half the input, at least one slot
    /// - workers: a quarter of the input, at least `min_workers`, at most
    ///   `max_threads` (CPU cores when 0); `requested_workers` replaces the
    ///   computed count
    /// - results: one slot per input item, the most that can pass the filter
    pub fn plan(item_count: usize, settings: &PipelineSettings, requested_workers: Option<usize>) -> Self {
        let workers = match requested_workers {
            Some(requested) => requested.max(1),
            None => {
                let wanted = std::cmp::max(settings.min_workers, item_count / 4);
                let cap = if settings.max_threads > 0 {
                    settings.max_threads
                } else {
                    std::cmp::max(num_cpus::get(), settings.min_workers)
                };
                std::cmp::min(wanted, cap).max(1)
            }
        };

        Self {
            queue_capacity: std::cmp::max(1, item_count / 2),
            workers,
            result_capacity: item_count,
        }
    }
}
