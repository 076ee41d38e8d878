//! Bounded blocking work queue (monitor realization)
//!
//! A fixed-capacity mailbox for [`WorkItem`]s guarded by one `Mutex` and two
//! condition variables:
//!
//! | Operation         | Blocks while                  | Wakes            |
//! |-------------------|-------------------------------|------------------|
//! | `insert()`        | full and not cancelled        | `not_empty`      |
//! | `remove()`        | empty, not complete/cancelled | `not_full`       |
//! | `mark_complete()` | never                         | every waiter     |
//! | `cancel()`        | never                         | every waiter     |
//!
//! Every wait sits in a predicate loop, so spurious wakeups are harmless.
//! Storage and flags live in one `QueueState` behind the lock; the item count
//! is the storage length, so the two can never disagree.
//!
//! The removal policy is selected at construction ([`QueueOrder`]). Result
//! ordering downstream does not depend on it because results are re-sorted by
//! score.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::types::WorkItem;

/// Blocking producer/consumer contract shared by the queue realizations
pub trait WorkSource: Send + Sync {
    /// Block until there is room, then enqueue `item`
    fn insert(&self, item: WorkItem) -> Result<(), PipelineError>;

    /// Block until an item is available; `None` once drained and complete,
    /// or once cancelled
    fn remove(&self) -> Option<WorkItem>;

    /// Signal that no further items will be inserted. Idempotent.
    fn mark_complete(&self);

    /// Abort the run: wake every blocked producer and consumer
    fn cancel(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// Which end of the queue `remove()` takes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueueOrder {
    /// Most recently inserted first
    #[default]
    Lifo,
    /// Oldest first
    Fifo,
}

#[derive(Debug)]
struct QueueState {
    items: VecDeque<WorkItem>,
    complete: bool,
    cancelled: bool,
}

/// Fixed-capacity blocking queue with a terminal "no more input" signal
#[derive(Debug)]
pub struct BoundedWorkQueue {
    capacity: usize,
    order: QueueOrder,
    state: Mutex<QueueState>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl BoundedWorkQueue {
    /// Create a queue holding at most `capacity` items.
    ///
    /// A zero capacity would block the producer forever, so it is rejected.
    pub fn new(capacity: usize, order: QueueOrder) -> Result<Self, PipelineError> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity {
                what: "work queue",
                value: capacity,
            });
        }

        Ok(Self {
            capacity,
            order,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                complete: false,
                cancelled: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// Lock state, recovering from poisoning.
    ///
    /// No code path panics while holding the lock, so the state is consistent
    /// even if some other panic poisoned the mutex.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn wait<'a>(&self, cv: &Condvar, guard: MutexGuard<'a, QueueState>) -> MutexGuard<'a, QueueState> {
        cv.wait(guard)
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl WorkSource for BoundedWorkQueue {
    fn insert(&self, item: WorkItem) -> Result<(), PipelineError> {
        let mut state = self.lock();
        if state.complete {
            return Err(PipelineError::QueueCompleted);
        }
        while state.items.len() >= self.capacity && !state.cancelled {
            state = self.wait(&self.not_full, state);
        }

        if state.cancelled {
            return Err(PipelineError::Cancelled);
        }
        if state.complete {
            return Err(PipelineError::QueueCompleted);
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_all();
        Ok(())
    }

    fn remove(&self) -> Option<WorkItem> {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return None;
            }
            let next = match self.order {
                QueueOrder::Lifo => state.items.pop_back(),
                QueueOrder::Fifo => state.items.pop_front(),
            };
            if let Some(item) = next {
                drop(state);
                self.not_full.notify_all();
                return Some(item);
            }
            if state.complete {
                return None;
            }
            state = self.wait(&self.not_empty, state);
        }
    }

    fn mark_complete(&self) {
        let mut state = self.lock();
        if state.complete {
            return;
        }
        state.complete = true;
        drop(state);
        self.not_empty.notify_all();
    }

    fn cancel(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        drop(state);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    fn len(&self) -> usize {
        self.lock().items.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
