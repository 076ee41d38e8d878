use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ScoreError;
use crate::pipeline::WorkItem;

/// Largest cell count a work item may request (a 4096×4096 matrix, 128 MiB
/// of `f64`). Larger sizes are malformed rather than an allocation failure.
pub const MAX_CELLS: usize = 1 << 24;

/// Square, row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    cells: Vec<f64>,
}

impl Matrix {
    /// Deterministically fill a `size`×`size` matrix from `seed`.
    ///
    /// The generator is `StdRng::seed_from_u64(floor(seed))` and entries are
    /// drawn uniformly in `[0, scale)`, row-major. `StdRng` output is stable
    /// for a pinned `rand` release, which is the reproducibility unit here.
    pub fn generate(size: usize, seed: f64, scale: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed_to_u64(seed));
        let cells = (0..size * size)
            .map(|_| rng.random::<f64>() * scale)
            .collect();
        Self { size, cells }
    }

    /// Build the matrix for `item`, rejecting records that cannot describe one
    pub fn for_item(item: &WorkItem, scale: f64) -> Result<Self, ScoreError> {
        let size = validated_size(item)?;
        Ok(Self::generate(size, item.seed, scale))
    }

    pub fn from_cells(size: usize, cells: Vec<f64>) -> Option<Self> {
        (size.checked_mul(size)? == cells.len()).then_some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn transpose(&self) -> Self {
        let n = self.size;
        let mut cells = vec![0.0; n * n];
        for row in 0..n {
            for col in 0..n {
                cells[col * n + row] = self.cells[row * n + col];
            }
        }
        Self { size: n, cells }
    }

    /// Standard product `self × other`; both must have the same size
    pub fn multiply(&self, other: &Matrix) -> Self {
        debug_assert_eq!(self.size, other.size);
        let n = self.size;
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            for k in 0..n {
                let lhs = self.cells[i * n + k];
                for j in 0..n {
                    cells[i * n + j] += lhs * other.cells[k * n + j];
                }
            }
        }
        Self { size: n, cells }
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }
}

fn seed_to_u64(seed: f64) -> u64 {
    // Two's-complement reinterpretation keeps negative seeds distinct
    seed.floor() as i64 as u64
}

fn validated_size(item: &WorkItem) -> Result<usize, ScoreError> {
    let malformed = |reason: String| ScoreError::Malformed {
        id: item.id.clone(),
        reason,
    };

    if item.matrix_size <= 0 {
        return Err(malformed(format!(
            "matrix size must be positive, got {}",
            item.matrix_size
        )));
    }
    if !item.seed.is_finite() {
        return Err(malformed(format!("seed must be finite, got {}", item.seed)));
    }

    let size = usize::try_from(item.matrix_size)
        .map_err(|_| malformed(format!("matrix size {} does not fit in memory", item.matrix_size)))?;
    match size.checked_mul(size) {
        Some(cells) if cells <= MAX_CELLS => Ok(size),
        _ => Err(malformed(format!(
            "matrix size {size} exceeds the limit of {MAX_CELLS} cells"
        ))),
    }
}
