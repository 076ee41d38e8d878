use thiserror::Error;

/// Errors raised by the pipeline's synchronization primitives and worker pool
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// A queue or pool was constructed with a size it cannot operate at
    #[error("invalid capacity for {what}: {value}")]
    InvalidCapacity { what: &'static str, value: usize },

    /// The sorted result collection is full and rejected an insert
    #[error("result collection is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    /// `insert` was called after the producer signalled completion
    #[error("work queue already marked complete")]
    QueueCompleted,

    /// The run was cancelled while an operation was blocked
    #[error("pipeline run cancelled")]
    Cancelled,

    /// The run's deadline passed before all items were scored
    #[error("pipeline deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),

    /// One or more worker threads panicked
    #[error("{0} worker thread(s) panicked")]
    WorkerPanicked(usize),
}
