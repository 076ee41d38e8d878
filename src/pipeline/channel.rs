//! Channel realization of the bounded work queue
//!
//! A bounded crossbeam MPMC channel replaces the monitor. Completion drops the
//! only sender, which disconnects the channel once it drains; cancellation
//! drops the sender of a second zero-sized channel that every blocking call
//! selects on.

use std::sync::Mutex;

use crossbeam::channel::{Receiver, Sender, bounded, select};

use super::error::PipelineError;
use super::queue::WorkSource;
use super::types::WorkItem;

#[derive(Debug)]
pub struct ChannelWorkQueue {
    capacity: usize,
    work_tx: Mutex<Option<Sender<WorkItem>>>,
    work_rx: Receiver<WorkItem>,
    cancel_tx: Mutex<Option<Sender<()>>>,
    cancel_rx: Receiver<()>,
}

impl ChannelWorkQueue {
    pub fn new(capacity: usize) -> Result<Self, PipelineError> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity {
                what: "work channel",
                value: capacity,
            });
        }

        let (work_tx, work_rx) = bounded(capacity);
        let (cancel_tx, cancel_rx) = bounded(0);
        Ok(Self {
            capacity,
            work_tx: Mutex::new(Some(work_tx)),
            work_rx,
            cancel_tx: Mutex::new(Some(cancel_tx)),
            cancel_rx,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_none()
    }
}

impl WorkSource for ChannelWorkQueue {
    fn insert(&self, item: WorkItem) -> Result<(), PipelineError> {
        // Clone the sender so the lock is not held while blocked on a full channel
        let work_tx = self
            .work_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or(PipelineError::QueueCompleted)?;

        if self.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        select! {
            send(work_tx, item) -> sent => sent.map_err(|_| PipelineError::Cancelled),
            recv(self.cancel_rx) -> _ => Err(PipelineError::Cancelled),
        }
    }

    fn remove(&self) -> Option<WorkItem> {
        if self.is_cancelled() {
            return None;
        }

        select! {
            recv(self.work_rx) -> item => item.ok(),
            recv(self.cancel_rx) -> _ => None,
        }
    }

    fn mark_complete(&self) {
        self.work_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
    }

    fn cancel(&self) {
        self.cancel_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
    }

    fn len(&self) -> usize {
        self.work_rx.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
