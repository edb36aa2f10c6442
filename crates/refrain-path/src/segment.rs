//! Query ranges in samples and labeled segments in seconds.

use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::ssm::SelfSimilarity;

/// A validated sample range `start..end` queried against the full timeline.
///
/// The accumulated score matrix for this range has `end - start + 1` columns:
/// one per query sample plus the leading elevator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    start: usize,
    end: usize,
}

impl QueryRange {
    /// Create a new query range.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::EmptyQuery`] if `end <= start`.
    pub fn new(start: usize, end: usize) -> Result<Self, PathError> {
        if end <= start {
            return Err(PathError::EmptyQuery { start, end });
        }
        Ok(Self { start, end })
    }

    /// Return the first sample of the range.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Return the end sample of the range.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Return the number of query samples, `end - start`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; a valid range holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Return the score-matrix width, `end - start + 1`.
    #[must_use]
    pub fn width(&self) -> usize {
        self.len() + 1
    }

    /// Check that the range lies on the timeline of `ssm`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::QueryOutOfRange`] if `end > ssm.sample_amount()`.
    pub fn check_within<S: SelfSimilarity + ?Sized>(&self, ssm: &S) -> Result<(), PathError> {
        let sample_amount = ssm.sample_amount();
        if self.end > sample_amount {
            return Err(PathError::QueryOutOfRange {
                end: self.end,
                sample_amount,
            });
        }
        Ok(())
    }
}

/// A labeled time interval on the original timeline, in seconds.
///
/// `group` only matters for distance weighting: segments sharing a group are
/// discounted by `kappa` under the alignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Group label.
    pub group: usize,
}

impl Segment {
    /// Create a new segment.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidSegment`] if either time is non-finite or
    /// negative, or if `end < start`.
    pub fn new(start: f64, end: f64, group: usize) -> Result<Self, PathError> {
        let segment = Self { start, end, group };
        segment.validate()?;
        Ok(segment)
    }

    /// Check the invariants enforced by [`Segment::new`].
    ///
    /// Needed for segments built through serde or struct literals.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidSegment`] on violation.
    pub fn validate(&self) -> Result<(), PathError> {
        let ok = self.start.is_finite()
            && self.end.is_finite()
            && self.start >= 0.0
            && self.end >= self.start;
        if !ok {
            return Err(PathError::InvalidSegment {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Return `(start_sample, end_sample)` as `floor(time / sample_duration)`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidSegment`] if the segment is invalid.
    pub fn sample_range(&self, sample_duration: f64) -> Result<(usize, usize), PathError> {
        self.validate()?;
        let start = (self.start / sample_duration).floor() as usize;
        let end = (self.end / sample_duration).floor() as usize;
        Ok((start, end))
    }

    /// Return the query range covered by this segment on `ssm`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PathError::InvalidSegment`] | Segment times are invalid |
    /// | [`PathError::EmptyQuery`] | Segment covers less than one sample step |
    /// | [`PathError::QueryOutOfRange`] | End sample lies past the timeline |
    pub fn query_range<S: SelfSimilarity + ?Sized>(&self, ssm: &S) -> Result<QueryRange, PathError> {
        let (start, end) = self.sample_range(ssm.sample_duration())?;
        let query = QueryRange::new(start, end)?;
        query.check_within(ssm)?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssm::DenseSsm;

    #[test]
    fn query_rejects_empty() {
        assert!(matches!(
            QueryRange::new(3, 3),
            Err(PathError::EmptyQuery { start: 3, end: 3 })
        ));
        assert!(QueryRange::new(4, 2).is_err());
    }

    #[test]
    fn query_width_includes_elevator() {
        let q = QueryRange::new(2, 6).unwrap();
        assert_eq!(q.len(), 4);
        assert_eq!(q.width(), 5);
        assert!(!q.is_empty());
    }

    #[test]
    fn query_out_of_range() {
        let ssm = DenseSsm::new(vec![1.0; 16], 1.0).unwrap();
        assert!(QueryRange::new(0, 4).unwrap().check_within(&ssm).is_ok());
        assert!(matches!(
            QueryRange::new(0, 5).unwrap().check_within(&ssm),
            Err(PathError::QueryOutOfRange {
                end: 5,
                sample_amount: 4
            })
        ));
    }

    #[test]
    fn segment_rejects_reversed_and_negative() {
        assert!(Segment::new(2.0, 1.0, 0).is_err());
        assert!(Segment::new(-1.0, 1.0, 0).is_err());
        assert!(Segment::new(0.0, f64::NAN, 0).is_err());
        assert!(Segment::new(1.0, 1.0, 0).is_ok());
    }

    #[test]
    fn sample_range_floors() {
        let s = Segment::new(0.74, 2.26, 1).unwrap();
        assert_eq!(s.sample_range(0.5).unwrap(), (1, 4));
    }

    #[test]
    fn query_range_from_segment() {
        let ssm = DenseSsm::new(vec![1.0; 36], 0.5).unwrap();
        let q = Segment::new(0.5, 2.0, 0).unwrap().query_range(&ssm).unwrap();
        assert_eq!((q.start(), q.end()), (1, 4));

        let too_short = Segment::new(0.5, 0.7, 0).unwrap();
        assert!(matches!(
            too_short.query_range(&ssm),
            Err(PathError::EmptyQuery { .. })
        ));
    }
}
