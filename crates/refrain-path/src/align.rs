//! Length-normalized alignment similarity between two segments.

use tracing::{instrument, trace};

use crate::error::PathError;
use crate::segment::Segment;
use crate::ssm::SelfSimilarity;

/// Similarity of two segments from an alignment through their SSM block.
///
/// Rows follow segment `a`, columns segment `b`. The grid has no elevator
/// and floors non-positive similarities at zero. Moves are the diagonal step
/// and both knight steps `(y-1, x-2)` / `(y-2, x-1)`; predecessors outside the
/// grid are negative infinity. Returns `terminal score / path length`, where
/// the path is traced greedily back from the terminal cell (ties go to the
/// vertical knight, then the horizontal knight, then the diagonal), or 0 when
/// the terminal score is not positive.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::InvalidSegment`] | A segment has invalid times |
/// | [`PathError::SegmentOutOfRange`] | A segment's last sample lies past the timeline |
/// | [`PathError::UnreachableCell`] | Traceback got stuck |
#[instrument(skip(ssm))]
pub fn segment_similarity<S>(ssm: &S, a: &Segment, b: &Segment) -> Result<f64, PathError>
where
    S: SelfSimilarity + ?Sized,
{
    let duration = ssm.sample_duration();
    let sample_amount = ssm.sample_amount();
    let (start_a, end_a) = a.sample_range(duration)?;
    let (start_b, end_b) = b.sample_range(duration)?;
    for (start_sample, end_sample) in [(start_a, end_a), (start_b, end_b)] {
        if end_sample >= sample_amount {
            return Err(PathError::SegmentOutOfRange {
                start_sample,
                end_sample,
                sample_amount,
            });
        }
    }

    let height = end_a - start_a + 1;
    let width = end_b - start_b + 1;
    let mut d = vec![f64::NEG_INFINITY; height * width];
    let at = |d: &[f64], x: Option<usize>, y: Option<usize>| match (x, y) {
        (Some(x), Some(y)) => d[y * width + x],
        _ => f64::NEG_INFINITY,
    };
    let floor = |v: f64| if v > 0.0 { v } else { 0.0 };

    for y in 0..height {
        for x in 0..width {
            let value = floor(ssm.value_normalized(start_b + x, start_a + y));
            if x == 0 && y == 0 {
                d[0] = value;
                continue;
            }
            let down = at(&d, x.checked_sub(1), y.checked_sub(2));
            let right = at(&d, x.checked_sub(2), y.checked_sub(1));
            let diag = at(&d, x.checked_sub(1), y.checked_sub(1));
            d[y * width + x] = value + down.max(right).max(diag);
        }
    }

    let score = d[height * width - 1];
    if score.is_nan() || score <= 0.0 {
        trace!(score, "no positive alignment");
        return Ok(0.0);
    }

    let (mut x, mut y) = (width - 1, height - 1);
    let mut path_length = 1usize;
    while x > 0 || y > 0 {
        let down = at(&d, x.checked_sub(1), y.checked_sub(2));
        let right = at(&d, x.checked_sub(2), y.checked_sub(1));
        let diag = at(&d, x.checked_sub(1), y.checked_sub(1));
        if down == f64::NEG_INFINITY && right == f64::NEG_INFINITY && diag == f64::NEG_INFINITY {
            return Err(PathError::UnreachableCell { x, y });
        }
        if down >= right && down >= diag {
            x -= 1;
            y -= 2;
        } else if right >= diag {
            x -= 2;
            y -= 1;
        } else {
            x -= 1;
            y -= 1;
        }
        path_length += 1;
    }

    let similarity = score / path_length as f64;
    trace!(score, path_length, similarity, "segments aligned");
    Ok(similarity)
}
