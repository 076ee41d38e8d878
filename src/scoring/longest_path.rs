//! Longest simple path over a matrix viewed as a 4-connected grid
//!
//! Exhaustive backtracking: a cell is marked visited on entry and unmarked on
//! exit, so every simple path from every start is explored. Worst case is
//! exponential in the cell count, which is why the search polls the
//! cancellation token.

use super::{Matrix, ScoreError, ScoringStrategy};
use crate::pipeline::{CancellationToken, WorkItem};

/// Entries are drawn from `[0, 10)`
pub const LONGEST_PATH_SCALE: f64 = 10.0;

/// Expansions between cancellation checks (power of two)
const CANCEL_CHECK_INTERVAL: u64 = 1024;

const NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, Copy, Default)]
pub struct LongestPathSum;

struct PathSearch<'a> {
    matrix: &'a Matrix,
    visited: Vec<bool>,
    cancel: &'a CancellationToken,
    expansions: u64,
}

impl PathSearch<'_> {
    /// Best sum of a simple path starting at (row, col), including that cell
    fn best_from(&mut self, row: usize, col: usize) -> Result<f64, ScoreError> {
        self.expansions += 1;
        if self.expansions & (CANCEL_CHECK_INTERVAL - 1) == 0 && self.cancel.is_cancelled() {
            return Err(ScoreError::Cancelled);
        }

        let n = self.matrix.size();
        let idx = row * n + col;
        self.visited[idx] = true;

        let mut best_tail = 0.0_f64;
        for (dr, dc) in NEIGHBORS {
            let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
                continue;
            };
            if r >= n || c >= n || self.visited[r * n + c] {
                continue;
            }
            match self.best_from(r, c) {
                Ok(tail) => best_tail = best_tail.max(tail),
                Err(err) => {
                    self.visited[idx] = false;
                    return Err(err);
                }
            }
        }

        self.visited[idx] = false;
        Ok(self.matrix.get(row, col) + best_tail)
    }
}

/// Maximum over all start cells of the best simple-path sum
pub fn longest_path_sum(matrix: &Matrix, cancel: &CancellationToken) -> Result<f64, ScoreError> {
    let n = matrix.size();
    let mut search = PathSearch {
        matrix,
        visited: vec![false; n * n],
        cancel,
        expansions: 0,
    };

    let mut best = f64::NEG_INFINITY;
    for row in 0..n {
        for col in 0..n {
            if cancel.is_cancelled() {
                return Err(ScoreError::Cancelled);
            }
            best = best.max(search.best_from(row, col)?);
        }
    }

    tracing::trace!("Longest path search on {n}x{n} took {} expansions", search.expansions);
    Ok(best)
}

impl ScoringStrategy for LongestPathSum {
    fn name(&self) -> &'static str {
        "longest-path"
    }

    fn score(&self, item: &WorkItem, cancel: &CancellationToken) -> Result<f64, ScoreError> {
        let matrix = Matrix::for_item(item, LONGEST_PATH_SCALE)?;
        longest_path_sum(&matrix, cancel)
    }
}
