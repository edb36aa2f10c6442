//! Boundary to the path-family fitness collaborator.
//!
//! Fitness formulas live outside this crate. This module names the
//! strategies, defines what a collaborator receives and returns, and wires a
//! query through extraction and fitness evaluation.

use std::fmt;
use std::str::FromStr;

use tracing::{instrument, warn};

use crate::config::ScoreMatrixConfig;
use crate::error::PathError;
use crate::extract::extract_path_family;
use crate::path::PathFamily;
use crate::score_matrix::ScoreMatrixWorkspace;
use crate::segment::QueryRange;
use crate::ssm::SelfSimilarity;

/// Fitness variant requested from the collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FitnessStrategy {
    /// Tag `"classic"`.
    #[default]
    Classic,
    /// Tag `"fine"`.
    Fine,
    /// Tag `"pruned"`.
    Pruned,
    /// Tag `"custom"`.
    Custom,
    /// Tag `"customPruned"`.
    CustomPruned,
}

impl FitnessStrategy {
    /// Parse a tag, falling back to [`FitnessStrategy::Classic`] with a
    /// warning when it is not recognized.
    #[must_use]
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(name, "unknown fitness strategy, falling back to classic");
            Self::Classic
        })
    }
}

impl FromStr for FitnessStrategy {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(Self::Classic),
            "fine" => Ok(Self::Fine),
            "pruned" => Ok(Self::Pruned),
            "custom" => Ok(Self::Custom),
            "customPruned" => Ok(Self::CustomPruned),
            other => Err(PathError::UnknownStrategy {
                kind: "fitness",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FitnessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Classic => "classic",
            Self::Fine => "fine",
            Self::Pruned => "pruned",
            Self::Custom => "custom",
            Self::CustomPruned => "customPruned",
        };
        f.write_str(tag)
    }
}

/// Everything a fitness collaborator is given for one query.
#[derive(Debug, Clone, Copy)]
pub struct FitnessInput<'a> {
    /// Extracted paths in discovery order.
    pub family: &'a PathFamily,
    /// Score per path, same order as `family`.
    pub path_scores: &'a [f64],
    /// Best final score of the accumulated score matrix.
    pub raw_score: f64,
    /// Number of samples on the timeline.
    pub sample_amount: usize,
    /// Width of the accumulated score matrix.
    pub width: usize,
}

/// What a fitness collaborator reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessReport {
    /// Combined fitness.
    pub fitness: f64,
    /// Raw score normalized by the collaborator.
    pub normalized_score: f64,
    /// Timeline coverage of the family.
    pub coverage: f64,
    /// Coverage normalized by the collaborator.
    pub normalized_coverage: f64,
    /// Path family length as measured by the collaborator.
    pub path_family_length: f64,
    /// Paths kept after pruning (the full family when no pruning applies).
    pub pruned_family: PathFamily,
    /// Scores of the kept paths, same order as `pruned_family`.
    pub pruned_scores: Vec<f64>,
}

/// A fitness collaborator.
pub trait FamilyFitness {
    /// Evaluate `input` under `strategy`.
    fn evaluate(&self, strategy: FitnessStrategy, input: &FitnessInput<'_>) -> FitnessReport;
}

/// Fitness summary of one query, with the kept paths in absolute
/// timeline coordinates `[column, row]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFamilyInfo {
    /// Best final score of the accumulated score matrix.
    pub score: f64,
    /// Brightness score of every extracted path.
    pub path_scores: Vec<f64>,
    /// See [`FitnessReport::normalized_score`].
    pub normalized_score: f64,
    /// See [`FitnessReport::coverage`].
    pub coverage: f64,
    /// See [`FitnessReport::normalized_coverage`].
    pub normalized_coverage: f64,
    /// See [`FitnessReport::fitness`].
    pub fitness: f64,
    /// Kept paths, end-to-start, as `[query.start() + x, y]`.
    pub path_family: Vec<Vec<[usize; 2]>>,
}

/// Extract the path family of `query`, score it by brightness, and evaluate
/// it with `fitness`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PathError::QueryOutOfRange`] | `query.end() > ssm.sample_amount()` |
/// | [`PathError::UnreachableCell`] | Backtracking got stuck |
#[instrument(skip(ssm, fitness, config, workspace), fields(start = query.start(), end = query.end()))]
pub fn segment_path_family_info<S, F>(
    ssm: &S,
    query: QueryRange,
    strategy: FitnessStrategy,
    fitness: &F,
    config: &ScoreMatrixConfig,
    workspace: &mut ScoreMatrixWorkspace,
) -> Result<PathFamilyInfo, PathError>
where
    S: SelfSimilarity + ?Sized,
    F: FamilyFitness + ?Sized,
{
    let extraction = extract_path_family(ssm, query, config, workspace)?;
    let input = FitnessInput {
        family: &extraction.family,
        path_scores: &extraction.path_scores,
        raw_score: extraction.score,
        sample_amount: ssm.sample_amount(),
        width: extraction.width,
    };
    let report = fitness.evaluate(strategy, &input);

    let start = query.start();
    let path_family = report
        .pruned_family
        .iter()
        .map(|path| path.into_iter().map(|p| [start + p.x, p.y]).collect())
        .collect();

    Ok(PathFamilyInfo {
        score: extraction.score,
        path_scores: extraction.path_scores,
        normalized_score: report.normalized_score,
        coverage: report.coverage,
        normalized_coverage: report.normalized_coverage,
        fitness: report.fitness,
        path_family,
    })
}
