//! Per-path scoring of a path family.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::path::{Path, PathFamily};
use crate::score_matrix::AccumulatedScoreMatrix;
use crate::ssm::SelfSimilarity;

/// How a single path is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathScoring {
    /// `(D[end] - D[start]) / width`, looked up at the stored path coordinates.
    Accumulated,
    /// Mean normalized SSM value along the path.
    #[default]
    Brightness,
}

impl PathScoring {
    /// Score every path of `family`, preserving order.
    #[must_use]
    pub fn score_family<S>(
        self,
        ssm: &S,
        matrix: &AccumulatedScoreMatrix<'_>,
        family: &PathFamily,
    ) -> Vec<f64>
    where
        S: SelfSimilarity + ?Sized,
    {
        match self {
            Self::Accumulated => accumulated_scores(matrix, family),
            Self::Brightness => brightness_scores(ssm, family, matrix.query().start()),
        }
    }
}

impl FromStr for PathScoring {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accumulated" | "score" => Ok(Self::Accumulated),
            "brightness" => Ok(Self::Brightness),
            other => Err(PathError::UnknownStrategy {
                kind: "path scoring",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PathScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulated => f.write_str("accumulated"),
            Self::Brightness => f.write_str("brightness"),
        }
    }
}

/// Score each path by the accumulated-score gain between its endpoints,
/// divided by the matrix width.
#[must_use]
pub fn accumulated_scores(matrix: &AccumulatedScoreMatrix<'_>, family: &PathFamily) -> Vec<f64> {
    let width = matrix.width() as f64;
    family
        .iter()
        .map(|path| {
            path.end().zip(path.start()).map_or(0.0, |(end, start)| {
                (matrix.get(end.x, end.y) - matrix.get(start.x, start.y)) / width
            })
        })
        .collect()
}

/// Score each path by the mean normalized SSM value at its points, with
/// columns offset by the query start.
#[must_use]
pub fn brightness_scores<S>(ssm: &S, family: &PathFamily, start: usize) -> Vec<f64>
where
    S: SelfSimilarity + ?Sized,
{
    family.iter().map(|path| brightness(ssm, path, start)).collect()
}

fn brightness<S: SelfSimilarity + ?Sized>(ssm: &S, path: &Path, start: usize) -> f64 {
    if path.is_empty() {
        return 0.0;
    }
    let sum: f64 = path
        .into_iter()
        .map(|point| ssm.value_normalized(start + point.x, point.y))
        .sum();
    sum / path.len() as f64
}
