//! Accumulated score matrix of a query range against the full timeline.

use tracing::{debug, instrument};

use crate::config::ScoreMatrixConfig;
use crate::error::PathError;
use crate::segment::QueryRange;
use crate::ssm::SelfSimilarity;

/// Caller-owned, reusable storage for an accumulated score matrix.
///
/// Sizing is explicit: call [`prepare`][Self::prepare] (or
/// [`prepare_for`][Self::prepare_for]) before each query whose dimensions
/// differ from the previous one. [`ScoreMatrixConfig::compute`] never
/// reallocates and rejects a workspace of the wrong size.
#[derive(Debug, Clone, Default)]
pub struct ScoreMatrixWorkspace {
    cells: Vec<f64>,
    height: usize,
    width: usize,
}

impl ScoreMatrixWorkspace {
    /// Create an empty workspace. It must be prepared before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty workspace with room for any query on a timeline of
    /// `sample_amount` samples, so later [`prepare`][Self::prepare] calls
    /// never allocate.
    #[must_use]
    pub fn with_capacity_for(sample_amount: usize) -> Self {
        Self {
            cells: Vec::with_capacity(sample_amount * sample_amount),
            height: 0,
            width: 0,
        }
    }

    /// Create a workspace sized for `query` on `ssm`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::QueryOutOfRange`] if the query lies past the timeline.
    pub fn for_query<S>(ssm: &S, query: QueryRange) -> Result<Self, PathError>
    where
        S: SelfSimilarity + ?Sized,
    {
        let mut workspace = Self::new();
        workspace.prepare_for(ssm, query)?;
        Ok(workspace)
    }

    /// Resize to `height * width` cells, all set to negative infinity.
    ///
    /// Reuses the existing allocation when it is large enough.
    pub fn prepare(&mut self, height: usize, width: usize) {
        self.cells.clear();
        self.cells.resize(height * width, f64::NEG_INFINITY);
        self.height = height;
        self.width = width;
    }

    /// Resize for `query` on `ssm`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::QueryOutOfRange`] if the query lies past the timeline.
    pub fn prepare_for<S>(&mut self, ssm: &S, query: QueryRange) -> Result<(), PathError>
    where
        S: SelfSimilarity + ?Sized,
    {
        query.check_within(ssm)?;
        self.prepare(ssm.sample_amount(), query.width());
        Ok(())
    }

    /// Return the prepared `(height, width)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Return the number of cells the workspace can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }
}

/// Accumulated score matrix `D`, borrowed from a [`ScoreMatrixWorkspace`].
///
/// `height` equals the sample amount of the SSM and `width` equals
/// `query.width()`. Column 0 is the elevator; column `x >= 1` corresponds to
/// timeline column `query.start() + x - 1`. Unreached cells hold negative
/// infinity.
#[derive(Debug, Clone, Copy)]
pub struct AccumulatedScoreMatrix<'a> {
    cells: &'a [f64],
    width: usize,
    height: usize,
    score: f64,
    query: QueryRange,
}

impl<'a> AccumulatedScoreMatrix<'a> {
    /// Wrap precomputed cells. The score is derived from the last row.
    #[cfg(test)]
    pub(crate) fn from_parts(cells: &'a [f64], width: usize, height: usize, query: QueryRange) -> Self {
        let last = (height - 1) * width;
        Self {
            cells,
            width,
            height,
            score: cells[last].max(cells[last + width - 1]),
            query,
        }
    }

    /// Return the number of columns, including the elevator.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the best final score, `max(D[last][0], D[last][width - 1])`.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Return the query this matrix was computed for.
    #[must_use]
    pub fn query(&self) -> QueryRange {
        self.query
    }

    /// Return `D[y][x]`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[must_use]
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(x < self.width, "column {x} out of bounds for width {}", self.width);
        self.cells[y * self.width + x]
    }

    /// Return row `y` as a slice.
    #[must_use]
    pub fn row(&self, y: usize) -> &'a [f64] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Return all cells, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.cells
    }
}

impl ScoreMatrixConfig {
    /// Fill `workspace` with the accumulated score matrix of `query`.
    ///
    /// Single row-major pass in O(height * width). Every cell is written, so
    /// a workspace reused across queries of the same size never leaks values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PathError::QueryOutOfRange`] | `query.end() > ssm.sample_amount()` |
    /// | [`PathError::WorkspaceMismatch`] | `workspace` is not prepared for this query |
    #[instrument(skip(self, ssm, workspace), fields(start = query.start(), end = query.end()))]
    pub fn compute<'w, S>(
        &self,
        ssm: &S,
        query: QueryRange,
        workspace: &'w mut ScoreMatrixWorkspace,
    ) -> Result<AccumulatedScoreMatrix<'w>, PathError>
    where
        S: SelfSimilarity + ?Sized,
    {
        query.check_within(ssm)?;
        let height = ssm.sample_amount();
        let width = query.width();
        if workspace.dims() != (height, width) || workspace.cells.len() != height * width {
            return Err(PathError::WorkspaceMismatch {
                expected_height: height,
                expected_width: width,
                got_height: workspace.height,
                got_width: workspace.width,
            });
        }

        let start = query.start();
        let val = |x: usize, y: usize| ssm.value_normalized(start + x - 1, y);
        let d = workspace.cells.as_mut_slice();

        d[0] = 0.0;
        d[1] = self.penalize(val(1, 0));
        d[2..width].fill(f64::NEG_INFINITY);

        for y in 1..height {
            let row = y * width;
            let prev = row - width;

            // Elevator: carry the best of column 0 or wrap from the last column.
            d[row] = d[prev].max(d[prev + width - 1]);
            d[row + 1] = d[row] + self.penalize(val(1, y));

            for x in 2..width {
                let down = if y >= 2 {
                    self.scale_knight(d[prev - width + x - 1])
                } else {
                    f64::NEG_INFINITY
                };
                let right = self.scale_knight(d[prev + x - 2]);
                let diag = d[prev + x - 1];
                d[row + x] = self.penalize(val(x, y)) + diag.max(right).max(down);
            }
        }

        let last = (height - 1) * width;
        let score = d[last].max(d[last + width - 1]);
        debug!(height, width, score, "accumulated score matrix computed");

        Ok(AccumulatedScoreMatrix {
            cells: &workspace.cells,
            width,
            height,
            score,
            query,
        })
    }
}
