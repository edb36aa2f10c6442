//! Configuration builders for score-matrix computation and distance matrices.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::matrix::{DistanceMatrix, build_distance_matrix};
use crate::segment::Segment;
use crate::ssm::SelfSimilarity;

/// Tuning constants of the accumulated score matrix recurrence.
///
/// Construct via [`ScoreMatrixConfig::default`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `penalty`           | -2.0    |
/// | `knight_move_ratio` | 1.0     |
/// | `knight_move_tweak` | 1.0     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMatrixConfig {
    pub(crate) penalty: f64,
    pub(crate) knight_move_ratio: f64,
    pub(crate) knight_move_tweak: f64,
}

impl Default for ScoreMatrixConfig {
    fn default() -> Self {
        Self {
            penalty: -2.0,
            knight_move_ratio: 1.0,
            knight_move_tweak: 1.0,
        }
    }
}

impl ScoreMatrixConfig {
    /// Set the score assigned to cells with non-positive similarity.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidConfig`] if `penalty` is positive or non-finite.
    pub fn with_penalty(mut self, penalty: f64) -> Result<Self, PathError> {
        if !(penalty.is_finite() && penalty <= 0.0) {
            return Err(PathError::InvalidConfig {
                name: "penalty",
                value: penalty,
            });
        }
        self.penalty = penalty;
        Ok(self)
    }

    /// Set the multiplier applied to negative knight-move predecessors.
    ///
    /// Values above 1 make knight moves through penalized regions more
    /// expensive than diagonal moves.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidConfig`] if the ratio is not positive and finite.
    pub fn with_knight_move_ratio(mut self, ratio: f64) -> Result<Self, PathError> {
        self.knight_move_ratio = positive("knight_move_ratio", ratio)?;
        Ok(self)
    }

    /// Set the multiplier applied to non-negative knight-move predecessors.
    ///
    /// Values below 1 favour diagonal moves while accumulating score.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidConfig`] if the tweak is not positive and finite.
    pub fn with_knight_move_tweak(mut self, tweak: f64) -> Result<Self, PathError> {
        self.knight_move_tweak = positive("knight_move_tweak", tweak)?;
        Ok(self)
    }

    /// Return the penalty for non-positive similarities.
    #[must_use]
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Return the negative knight-move multiplier.
    #[must_use]
    pub fn knight_move_ratio(&self) -> f64 {
        self.knight_move_ratio
    }

    /// Return the non-negative knight-move multiplier.
    #[must_use]
    pub fn knight_move_tweak(&self) -> f64 {
        self.knight_move_tweak
    }

    /// Map a similarity to its cell score: the value itself when positive,
    /// the penalty otherwise.
    #[inline]
    pub(crate) fn penalize(&self, value: f64) -> f64 {
        if value > 0.0 { value } else { self.penalty }
    }

    /// Scale a knight-move predecessor score.
    #[inline]
    pub(crate) fn scale_knight(&self, value: f64) -> f64 {
        if value < 0.0 {
            value * self.knight_move_ratio
        } else {
            value * self.knight_move_tweak
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, PathError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(PathError::InvalidConfig { name, value });
    }
    Ok(value)
}

/// How the distance between two segments is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceStrategy {
    /// `1 - alignment similarity`, discounted by `kappa` within a group. Tag `"DTW"`.
    #[default]
    Alignment,
    /// Interval-overlap distance between the segments' induced segments. Tag `"overlap"`.
    Overlap,
}

impl FromStr for DistanceStrategy {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DTW" | "dtw" => Ok(Self::Alignment),
            "overlap" => Ok(Self::Overlap),
            other => Err(PathError::UnknownStrategy {
                kind: "distance",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DistanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alignment => f.write_str("DTW"),
            Self::Overlap => f.write_str("overlap"),
        }
    }
}

/// Configuration for pairwise segment distance matrices.
///
/// # Defaults
///
/// | Parameter      | Default                        |
/// |----------------|--------------------------------|
/// | `kappa`        | 0.7                            |
/// | `score_matrix` | [`ScoreMatrixConfig::default`] |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceMatrixConfig {
    pub(crate) strategy: DistanceStrategy,
    pub(crate) kappa: f64,
    pub(crate) score_matrix: ScoreMatrixConfig,
}

impl DistanceMatrixConfig {
    /// Create a configuration for the given strategy with default parameters.
    #[must_use]
    pub fn new(strategy: DistanceStrategy) -> Self {
        Self {
            strategy,
            kappa: 0.7,
            score_matrix: ScoreMatrixConfig::default(),
        }
    }

    /// Set the same-group discount factor.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidConfig`] if `kappa` is negative or non-finite.
    pub fn with_kappa(mut self, kappa: f64) -> Result<Self, PathError> {
        if !(kappa.is_finite() && kappa >= 0.0) {
            return Err(PathError::InvalidConfig {
                name: "kappa",
                value: kappa,
            });
        }
        self.kappa = kappa;
        Ok(self)
    }

    /// Set the score-matrix tuning used to derive induced segments.
    #[must_use]
    pub fn with_score_matrix(mut self, score_matrix: ScoreMatrixConfig) -> Self {
        self.score_matrix = score_matrix;
        self
    }

    /// Return the distance strategy.
    #[must_use]
    pub fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    /// Return the same-group discount factor.
    #[must_use]
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Return the score-matrix tuning.
    #[must_use]
    pub fn score_matrix(&self) -> ScoreMatrixConfig {
        self.score_matrix
    }

    /// Compute the symmetric distance matrix over `segments`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PathError::InvalidSegment`] | A segment has invalid times |
    /// | [`PathError::EmptyQuery`] | Overlap strategy and a segment spans less than one sample step |
    /// | [`PathError::QueryOutOfRange`] / [`PathError::SegmentOutOfRange`] | A segment lies past the timeline |
    pub fn build<S>(&self, ssm: &S, segments: &[Segment]) -> Result<DistanceMatrix, PathError>
    where
        S: SelfSimilarity + Sync + ?Sized,
    {
        build_distance_matrix(self, ssm, segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ScoreMatrixConfig::default();
        assert_eq!(c.penalty(), -2.0);
        assert_eq!(c.knight_move_ratio(), 1.0);
        assert_eq!(c.knight_move_tweak(), 1.0);

        let d = DistanceMatrixConfig::new(DistanceStrategy::Overlap);
        assert_eq!(d.kappa(), 0.7);
        assert_eq!(d.strategy(), DistanceStrategy::Overlap);
    }

    #[test]
    fn penalize_floors_non_positive() {
        let c = ScoreMatrixConfig::default();
        assert_eq!(c.penalize(0.4), 0.4);
        assert_eq!(c.penalize(0.0), -2.0);
        assert_eq!(c.penalize(-0.3), -2.0);
    }

    #[test]
    fn knight_scaling_by_sign() {
        let c = ScoreMatrixConfig::default()
            .with_knight_move_ratio(1.5)
            .unwrap()
            .with_knight_move_tweak(0.5)
            .unwrap();
        assert_eq!(c.scale_knight(-2.0), -3.0);
        assert_eq!(c.scale_knight(4.0), 2.0);
        assert_eq!(c.scale_knight(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_invalid_values() {
        let c = ScoreMatrixConfig::default();
        assert!(c.with_penalty(1.0).is_err());
        assert!(c.with_penalty(f64::NAN).is_err());
        assert!(c.with_knight_move_ratio(0.0).is_err());
        assert!(c.with_knight_move_tweak(-1.0).is_err());
        let d = DistanceMatrixConfig::new(DistanceStrategy::Alignment);
        assert!(matches!(
            d.with_kappa(-0.1),
            Err(PathError::InvalidConfig { name: "kappa", .. })
        ));
    }

    #[test]
    fn parses_strategy_tags() {
        assert_eq!("DTW".parse::<DistanceStrategy>().unwrap(), DistanceStrategy::Alignment);
        assert_eq!("overlap".parse::<DistanceStrategy>().unwrap(), DistanceStrategy::Overlap);
        assert!(matches!(
            "cosine".parse::<DistanceStrategy>(),
            Err(PathError::UnknownStrategy { kind: "distance", .. })
        ));
        assert_eq!(DistanceStrategy::Overlap.to_string(), "overlap");
    }
}
