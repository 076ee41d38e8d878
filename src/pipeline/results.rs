//! Fixed-capacity, score-ordered result monitor
//!
//! Workers insert concurrently; every insert places the result at its
//! ascending position under the lock, so any snapshot is fully sorted.
//! Inserting is O(k) in the current size: a binary search for the slot plus
//! the shift. Ties keep arrival order.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};

use super::error::PipelineError;
use super::types::ScoredResult;

#[derive(Debug, Default)]
struct ResultsState {
    entries: Vec<ScoredResult>,
    dropped: usize,
}

#[derive(Debug)]
pub struct BoundedSortedResults {
    capacity: usize,
    state: Mutex<ResultsState>,
}

impl BoundedSortedResults {
    /// Capacity 0 is valid: it is what an empty input sizes to.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(ResultsState {
                entries: Vec::with_capacity(capacity),
                dropped: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResultsState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert `result` at its sorted position.
    ///
    /// When full the result is rejected and existing entries are untouched.
    /// The first rejection is logged; later ones are only counted.
    pub fn insert(&self, result: ScoredResult) -> Result<(), PipelineError> {
        let mut state = self.lock();
        if state.entries.len() >= self.capacity {
            state.dropped += 1;
            if state.dropped == 1 {
                tracing::warn!(
                    "Result collection full (capacity {}), dropping '{}' and any later results",
                    self.capacity,
                    result.id
                );
            }
            return Err(PipelineError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let slot = state
            .entries
            .partition_point(|existing| existing.score.total_cmp(&result.score) != Ordering::Greater);
        state.entries.insert(slot, result);
        Ok(())
    }

    /// Copy of the first `n` entries (fewer if the collection is shorter)
    pub fn snapshot(&self, n: usize) -> Vec<ScoredResult> {
        let state = self.lock();
        let take = n.min(state.entries.len());
        state.entries[..take].to_vec()
    }

    pub fn count(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of inserts rejected because the collection was full
    pub fn dropped(&self) -> usize {
        self.lock().dropped
    }

    /// Consume the collection, returning every entry in ascending order
    pub fn into_sorted(self) -> Vec<ScoredResult> {
        self.state
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entries
    }
}
