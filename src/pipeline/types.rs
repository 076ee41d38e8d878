use serde::{Deserialize, Serialize};

/// One unit of input work: the matrix to generate and score
///
/// `matrix_size` is signed so that malformed records survive loading and are
/// rejected by the worker that picks them up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "MatrixSize", alias = "matrix_size", alias = "size")]
    pub matrix_size: i64,
    #[serde(rename = "Seed", alias = "seed")]
    pub seed: f64,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, matrix_size: i64, seed: f64) -> Self {
        Self {
            id: id.into(),
            matrix_size,
            seed,
        }
    }
}

/// A work item that passed the score filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub id: String,
    pub score: f64,
    pub seed: f64,
    pub matrix_size: i64,
}

impl ScoredResult {
    pub fn from_item(item: &WorkItem, score: f64) -> Self {
        Self {
            id: item.id.clone(),
            score,
            seed: item.seed,
            matrix_size: item.matrix_size,
        }
    }
}
