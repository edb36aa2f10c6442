//! Induced segments of a path family and the interval-overlap distance.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ScoreMatrixConfig;
use crate::error::PathError;
use crate::path::PathFamily;
use crate::score_matrix::ScoreMatrixWorkspace;
use crate::segment::{QueryRange, Segment};
use crate::ssm::SelfSimilarity;

/// Timeline interval `start..end` (in samples) covered by one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InducedSegment {
    /// Row of the path's chronological start.
    pub start: usize,
    /// Row of the path's chronological end.
    pub end: usize,
}

impl InducedSegment {
    /// 1-D Jaccard similarity, `overlap / union`, or `None` when disjoint.
    ///
    /// Intervals that only touch (`a.end == b.start`) count as disjoint.
    #[must_use]
    pub fn jaccard(&self, other: &Self) -> Option<f64> {
        if self.end <= other.start || other.end <= self.start {
            return None;
        }
        let union = self.end.max(other.end) - self.start.min(other.start);
        let overlap = self.end.min(other.end) - self.start.max(other.start);
        Some(overlap as f64 / union as f64)
    }
}

/// Induced segments of a path family, one per path, in family order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InducedSegments(Vec<InducedSegment>);

impl InducedSegments {
    /// Wrap a list of intervals.
    #[must_use]
    pub fn new(segments: Vec<InducedSegment>) -> Self {
        Self(segments)
    }

    /// Return the intervals.
    #[must_use]
    pub fn as_slice(&self) -> &[InducedSegment] {
        &self.0
    }

    /// Return the number of intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there are no intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `1 - max Jaccard similarity` over all cross pairs.
    ///
    /// 0 when some pair coincides exactly, 1 when every pair is disjoint
    /// (including when either side is empty). Symmetric.
    #[must_use]
    pub fn overlap_distance(&self, other: &Self) -> f64 {
        let max_similarity = self
            .0
            .iter()
            .flat_map(|a| other.0.iter().filter_map(move |b| a.jaccard(b)))
            .fold(0.0_f64, f64::max);
        1.0 - max_similarity
    }
}

impl PathFamily {
    /// Derive `(start, end)` per path as `(last point's y, first point's y)`.
    #[must_use]
    pub fn induced_segments(&self) -> InducedSegments {
        InducedSegments(
            self.iter()
                .filter_map(|path| {
                    let start = path.start()?;
                    let end = path.end()?;
                    Some(InducedSegment {
                        start: start.y,
                        end: end.y,
                    })
                })
                .collect(),
        )
    }
}

/// Extract the path family of `query` and return its induced segments.
///
/// `workspace` is prepared for the query before use.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::QueryOutOfRange`] | `query.end() > ssm.sample_amount()` |
/// | [`PathError::UnreachableCell`] | Backtracking got stuck |
pub fn induced_segments_for_range<S>(
    ssm: &S,
    query: QueryRange,
    config: &ScoreMatrixConfig,
    workspace: &mut ScoreMatrixWorkspace,
) -> Result<InducedSegments, PathError>
where
    S: SelfSimilarity + ?Sized,
{
    workspace.prepare_for(ssm, query)?;
    let matrix = config.compute(ssm, query, workspace)?;
    Ok(matrix.path_family()?.induced_segments())
}

/// Overlap distance between the induced segments of two time segments.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::InvalidSegment`] | A segment has invalid times |
/// | [`PathError::EmptyQuery`] | A segment spans less than one sample step |
/// | [`PathError::QueryOutOfRange`] | A segment lies past the timeline |
#[instrument(skip(ssm, config))]
pub fn segment_overlap_distance<S>(
    ssm: &S,
    a: &Segment,
    b: &Segment,
    config: &ScoreMatrixConfig,
) -> Result<f64, PathError>
where
    S: SelfSimilarity + ?Sized,
{
    let mut workspace = ScoreMatrixWorkspace::new();
    let induced_a = induced_segments_for_range(ssm, a.query_range(ssm)?, config, &mut workspace)?;
    let induced_b = induced_segments_for_range(ssm, b.query_range(ssm)?, config, &mut workspace)?;
    Ok(induced_a.overlap_distance(&induced_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssm::DenseSsm;

    fn set(pairs: &[(usize, usize)]) -> InducedSegments {
        InducedSegments::new(
            pairs
                .iter()
                .map(|&(start, end)| InducedSegment { start, end })
                .collect(),
        )
    }

    #[test]
    fn disjoint_sets_are_distance_one() {
        let a = set(&[(0, 5)]);
        let b = set(&[(10, 15)]);
        assert_eq!(a.overlap_distance(&b), 1.0);
    }

    #[test]
    fn touching_intervals_are_disjoint() {
        assert_eq!(set(&[(0, 5)]).overlap_distance(&set(&[(5, 9)])), 1.0);
    }

    #[test]
    fn identical_sets_are_distance_zero() {
        let a = set(&[(0, 10)]);
        assert_eq!(a.overlap_distance(&a.clone()), 0.0);
    }

    #[test]
    fn partial_overlap_uses_best_pair() {
        // (0,10) vs (5,15): 5 / 15. (20,30) vs (22,30): 8 / 10.
        let a = set(&[(0, 10), (20, 30)]);
        let b = set(&[(5, 15), (22, 30)]);
        assert!((a.overlap_distance(&b) - 0.2).abs() < 1e-12);
        assert_eq!(a.overlap_distance(&b), b.overlap_distance(&a));
    }

    #[test]
    fn empty_set_is_distance_one() {
        assert_eq!(set(&[]).overlap_distance(&set(&[(0, 4)])), 1.0);
    }

    #[test]
    fn induced_segments_follow_reverse_storage() {
        let ssm = DenseSsm::new(vec![1.0; 16], 1.0).unwrap();
        let query = QueryRange::new(0, 3).unwrap();
        let mut ws = ScoreMatrixWorkspace::new();
        let induced =
            induced_segments_for_range(&ssm, query, &ScoreMatrixConfig::default(), &mut ws).unwrap();
        assert_eq!(induced, set(&[(2, 3), (0, 1)]));
    }

    #[test]
    fn segment_overlap_distance_to_itself_is_zero() {
        let ssm = DenseSsm::new(vec![1.0; 16], 1.0).unwrap();
        let s = Segment::new(0.0, 3.0, 0).unwrap();
        let d = segment_overlap_distance(&ssm, &s, &s, &ScoreMatrixConfig::default()).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn workspace_grows_to_the_widest_query_only() {
        let n = 32;
        let ssm = DenseSsm::from_fn(n, 1.0, |c, r| if c.abs_diff(r) % 8 == 0 { 1.0 } else { 0.1 })
            .unwrap();
        let config = ScoreMatrixConfig::default();
        let mut ws = ScoreMatrixWorkspace::new();
        for (start, end) in [(0, 2), (8, 13), (16, 18)] {
            let query = QueryRange::new(start, end).unwrap();
            induced_segments_for_range(&ssm, query, &config, &mut ws).unwrap();
            assert_eq!(ws.dims(), (n, query.width()));
        }
        assert!(ws.capacity() >= n * 6);
        assert!(ws.capacity() < n * n, "capacity {} covers the whole SSM", ws.capacity());
    }
}
