//! Debug rendering of a query's score matrix and path family.

use tracing::instrument;

use crate::config::ScoreMatrixConfig;
use crate::error::PathError;
use crate::grid::Grid;
use crate::score_matrix::ScoreMatrixWorkspace;
use crate::segment::QueryRange;
use crate::ssm::SelfSimilarity;

/// Render a `sample_amount x sample_amount` byte image of a query.
///
/// With `length = query.width()`, columns are laid out in four bands:
///
/// | Columns | Content |
/// |---|---|
/// | `0..length` | raw SSM values from column `query.start()` |
/// | `length..2*length` | accumulated scores scaled to `0..=255` (negatives as 0) |
/// | `2*length..3*length` | path mask, 255 on path points |
/// | `3*length..4*length` | raw SSM values with path points cleared |
///
/// Columns past the fourth band, and SSM lookups past the timeline, stay 0.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::QueryOutOfRange`] | `query.end() > ssm.sample_amount()` |
/// | [`PathError::UnreachableCell`] | Backtracking got stuck |
#[instrument(skip(ssm, config), fields(start = query.start(), end = query.end()))]
pub fn visualization_matrix<S>(
    ssm: &S,
    query: QueryRange,
    config: &ScoreMatrixConfig,
) -> Result<Grid<u8>, PathError>
where
    S: SelfSimilarity + ?Sized,
{
    let mut workspace = ScoreMatrixWorkspace::for_query(ssm, query)?;
    let matrix = config.compute(ssm, query, &mut workspace)?;
    let family = matrix.path_family()?;

    let n = ssm.sample_amount();
    let start = query.start();
    let length = query.width();
    let max_score = matrix.as_slice().iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let raw = |col: usize, row: usize| {
        if col < n { to_byte(ssm.value(col, row)) } else { 0 }
    };

    let mut grid = Grid::new(n, n);
    grid.fill(|x, y| {
        if x >= 4 * length {
            0
        } else if x >= 3 * length {
            raw(start + x - 3 * length, y)
        } else if x >= 2 * length {
            0
        } else if x >= length {
            if max_score > 0.0 {
                to_byte(matrix.get(x - length, y).max(0.0) / max_score * 255.0)
            } else {
                0
            }
        } else {
            raw(start + x, y)
        }
    });

    for path in &family {
        for point in path {
            grid.set(2 * length + point.x, point.y, 255);
            grid.set(3 * length + point.x, point.y, 0);
        }
    }
    Ok(grid)
}

fn to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
