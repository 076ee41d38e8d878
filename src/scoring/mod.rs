//! Scoring strategies applied by pipeline workers
//!
//! Each strategy turns a [`WorkItem`] into a score by generating the item's
//! deterministic matrix and reducing it. Strategies are stateless and shared
//! by reference across all workers.

pub mod longest_path;
pub mod matrix;
pub mod self_product;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::{CancellationToken, WorkItem};

pub use longest_path::LongestPathSum;
pub use matrix::Matrix;
pub use self_product::SelfProductSum;

/// Why a single item could not be scored. Contained within the worker loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("malformed work item '{id}': {reason}")]
    Malformed { id: String, reason: String },

    #[error("scoring cancelled")]
    Cancelled,
}

/// Pluggable score computation
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score `item`. Long-running strategies poll `cancel` and bail out with
    /// [`ScoreError::Cancelled`].
    fn score(&self, item: &WorkItem, cancel: &CancellationToken) -> Result<f64, ScoreError>;
}

/// Strategy selector used by configuration and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringKind {
    /// Sum of all entries of Mᵀ × M
    #[default]
    SelfProduct,
    /// Maximum sum over simple 4-directional grid paths
    LongestPath,
}

impl ScoringKind {
    pub fn strategy(self) -> Box<dyn ScoringStrategy> {
        match self {
            ScoringKind::SelfProduct => Box::new(SelfProductSum),
            ScoringKind::LongestPath => Box::new(LongestPathSum),
        }
    }
}

impl ScoringKind {
    /// Score column heading in text reports
    pub fn report_column(self) -> &'static str {
        match self {
            ScoringKind::SelfProduct => "MatrixSum",
            ScoringKind::LongestPath => "PathSum",
        }
    }
}

impl std::fmt::Display for ScoringKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.strategy().name())
    }
}
