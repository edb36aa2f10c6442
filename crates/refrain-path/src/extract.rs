//! Backward extraction of the optimal path family from a score matrix.

use tracing::{debug, instrument};

use crate::config::ScoreMatrixConfig;
use crate::error::PathError;
use crate::path::{Path, PathFamily, PathPoint};
use crate::score::brightness_scores;
use crate::score_matrix::{AccumulatedScoreMatrix, ScoreMatrixWorkspace};
use crate::segment::QueryRange;
use crate::ssm::SelfSimilarity;

impl AccumulatedScoreMatrix<'_> {
    /// Backtrack the optimal path family, starting at the bottom row.
    ///
    /// Moves are evaluated in this precedence:
    ///
    /// 1. Top row: step left.
    /// 2. Elevator column: wrap to the previous row's last column when it
    ///    scores strictly higher (closing the current path), otherwise step up.
    /// 3. Column 1: step into the elevator.
    /// 4. Interior: move to the best of `(x-1, y-1)`, `(x-2, y-1)` when
    ///    `x > 2`, `(x-1, y-2)` when `y > 2`, ties going to the earlier one,
    ///    and record the cell moved to.
    ///
    /// Every step lowers `y * (width + 1) + x`, so the walk terminates.
    ///
    /// Paths with no points are never added, including the one still open
    /// when the walk reaches the origin. The family is empty when the best
    /// final score sits in the elevator and no wrap occurs.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::UnreachableCell`] if every interior candidate is
    /// negative infinity. Matrices produced by
    /// [`ScoreMatrixConfig::compute`] never trigger this.
    #[instrument(skip(self), fields(width = self.width(), height = self.height()))]
    pub fn path_family(&self) -> Result<PathFamily, PathError> {
        let width = self.width();
        let mut paths = Vec::new();
        let mut path = Path::default();

        let mut y = self.height() - 1;
        let mut x = if self.get(width - 1, y) >= self.get(0, y) {
            path.push(PathPoint { x: width - 2, y });
            width - 1
        } else {
            0
        };

        // (x, y) candidates, reused across steps.
        let mut candidates = [(0usize, 0usize); 3];

        while y > 0 || x > 0 {
            if y == 0 {
                x -= 1;
            } else if x == 0 {
                if self.get(width - 1, y - 1) > self.get(0, y - 1) {
                    y -= 1;
                    x = width - 1;
                    let closed = std::mem::replace(
                        &mut path,
                        Path::new(vec![PathPoint { x: width - 2, y }]),
                    );
                    if !closed.is_empty() {
                        paths.push(closed);
                    }
                } else {
                    y -= 1;
                }
            } else if x == 1 {
                x = 0;
            } else {
                let mut n = 0;
                candidates[n] = (x - 1, y - 1);
                n += 1;
                if x > 2 {
                    candidates[n] = (x - 2, y - 1);
                    n += 1;
                }
                if y > 2 {
                    candidates[n] = (x - 1, y - 2);
                    n += 1;
                }

                let mut best = None;
                let mut max = f64::NEG_INFINITY;
                for &(cx, cy) in &candidates[..n] {
                    let value = self.get(cx, cy);
                    if value > max {
                        max = value;
                        best = Some((cx, cy));
                    }
                }
                let Some((bx, by)) = best else {
                    return Err(PathError::UnreachableCell { x, y });
                };
                x = bx;
                y = by;
                path.push(PathPoint { x: x - 1, y });
            }
        }

        if !path.is_empty() {
            paths.push(path);
        }
        debug!(n_paths = paths.len(), "path family extracted");
        Ok(PathFamily::new(paths))
    }
}

/// Result of [`extract_path_family`].
#[derive(Debug, Clone)]
pub struct PathFamilyExtraction {
    /// Paths in discovery order.
    pub family: PathFamily,
    /// Brightness score per path, same order as `family`.
    pub path_scores: Vec<f64>,
    /// Best final score of the accumulated score matrix.
    pub score: f64,
    /// Width of the accumulated score matrix.
    pub width: usize,
}

/// Compute the score matrix of `query`, extract its path family, and score
/// every path by brightness.
///
/// `workspace` is prepared for the query before use.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::QueryOutOfRange`] | `query.end() > ssm.sample_amount()` |
/// | [`PathError::UnreachableCell`] | Backtracking got stuck |
pub fn extract_path_family<S>(
    ssm: &S,
    query: QueryRange,
    config: &ScoreMatrixConfig,
    workspace: &mut ScoreMatrixWorkspace,
) -> Result<PathFamilyExtraction, PathError>
where
    S: SelfSimilarity + ?Sized,
{
    workspace.prepare_for(ssm, query)?;
    let matrix = config.compute(ssm, query, workspace)?;
    let family = matrix.path_family()?;
    let path_scores = brightness_scores(ssm, &family, query.start());
    Ok(PathFamilyExtraction {
        family,
        path_scores,
        score: matrix.score(),
        width: matrix.width(),
    })
}
