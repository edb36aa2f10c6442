//! Symmetric segment distance matrix and its pairwise construction.

use std::ops::Index;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::align::segment_similarity;
use crate::config::{DistanceMatrixConfig, DistanceStrategy};
use crate::error::PathError;
use crate::induced::{InducedSegments, induced_segments_for_range};
use crate::score_matrix::ScoreMatrixWorkspace;
use crate::segment::Segment;
use crate::ssm::SelfSimilarity;

/// Symmetric distance matrix stored as a lower triangle including the diagonal.
///
/// For `n` segments, stores `n*(n+1)/2` distances at `row*(row+1)/2 + col`
/// with `row >= col`. Access is symmetric: `get(i, j) == get(j, i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Wrap pre-computed lower-triangular data, diagonal included.
    pub(crate) fn from_raw(n: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n * (n + 1) / 2);
        Self { n, data }
    }

    #[inline]
    fn offset(i: usize, j: usize) -> usize {
        let (row, col) = if i >= j { (i, j) } else { (j, i) };
        row * (row + 1) / 2 + col
    }

    /// Return the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the distance between segment `i` and segment `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        self.data[Self::offset(i, j)]
    }

    /// Iterate over all stored pairs `(i, j, distance)` with `i >= j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n).flat_map(move |i| (0..=i).map(move |j| (i, j, self.data[Self::offset(i, j)])))
    }

    /// Return all distances from segment `i`, indexed by the other segment.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }

    /// Return the full `n x n` matrix as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.row(i)).collect()
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for matrix of size {}", self.n);
        &self.data[Self::offset(i, j)]
    }
}

/// Compute every unordered pair (diagonal included) in parallel.
///
/// Under the overlap strategy each segment's induced segments are derived
/// once up front, each rayon worker reusing its own score-matrix workspace.
#[instrument(skip(config, ssm, segments), fields(n = segments.len(), strategy = %config.strategy))]
pub(crate) fn build_distance_matrix<S>(
    config: &DistanceMatrixConfig,
    ssm: &S,
    segments: &[Segment],
) -> Result<DistanceMatrix, PathError>
where
    S: SelfSimilarity + Sync + ?Sized,
{
    let n = segments.len();
    for segment in segments {
        segment.validate()?;
    }

    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();

    let data: Vec<f64> = match config.strategy {
        DistanceStrategy::Alignment => {
            let kappa = config.kappa;
            pairs
                .par_iter()
                .map(|&(i, j)| {
                    let (a, b) = (&segments[i], &segments[j]);
                    let weight = if a.group == b.group { kappa } else { 1.0 };
                    Ok((1.0 - segment_similarity(ssm, a, b)?) * weight)
                })
                .collect::<Result<_, PathError>>()?
        }
        DistanceStrategy::Overlap => {
            let score_matrix = config.score_matrix;
            // Workspaces grow to the widest query a worker sees.
            let induced: Vec<InducedSegments> = segments
                .par_iter()
                .map_init(
                    ScoreMatrixWorkspace::new,
                    |workspace, segment| {
                        let query = segment.query_range(ssm)?;
                        induced_segments_for_range(ssm, query, &score_matrix, workspace)
                    },
                )
                .collect::<Result<_, PathError>>()?;
            debug!(
                n_induced = induced.iter().map(InducedSegments::len).sum::<usize>(),
                "induced segments precomputed"
            );
            pairs
                .par_iter()
                .map(|&(i, j)| induced[i].overlap_distance(&induced[j]))
                .collect()
        }
    };

    Ok(DistanceMatrix::from_raw(n, data))
}
