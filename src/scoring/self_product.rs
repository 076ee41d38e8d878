use super::{Matrix, ScoreError, ScoringStrategy};
use crate::pipeline::{CancellationToken, WorkItem};

/// Entries are drawn from `[0, 1)`
pub const SELF_PRODUCT_SCALE: f64 = 1.0;

/// Sum of every entry of `Mᵀ × M`
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfProductSum;

pub fn self_product_sum(matrix: &Matrix) -> f64 {
    matrix.transpose().multiply(matrix).sum()
}

impl ScoringStrategy for SelfProductSum {
    fn name(&self) -> &'static str {
        "self-product"
    }

    fn score(&self, item: &WorkItem, _cancel: &CancellationToken) -> Result<f64, ScoreError> {
        let matrix = Matrix::for_item(item, SELF_PRODUCT_SCALE)?;
        Ok(self_product_sum(&matrix))
    }
}
