//! JSON result writer for path families and distance matrices.

use std::fs;
use std::path::{Path, PathBuf};

use refrain_path::{
    DistanceMatrix, DistanceMatrixConfig, InducedSegment, PathFamily, PathScoring, QueryRange,
    Segment,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RunName;

/// A path family ready to be written, with its per-path scores.
#[derive(Debug, Clone, Copy)]
pub struct FamilyRecord<'a> {
    /// Query the family was extracted for.
    pub query: QueryRange,
    /// Extracted paths.
    pub family: &'a PathFamily,
    /// Score per path, same order as `family`.
    pub path_scores: &'a [f64],
    /// How `path_scores` were computed.
    pub scoring: PathScoring,
    /// Best final score of the accumulated score matrix.
    pub score: f64,
}

/// Writes path-family and distance-matrix results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_family.json` and `{run}_distances.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Write a path family to `{run}_family.json`.
    ///
    /// Points are written chronologically as absolute `[column, row]` sample
    /// coordinates.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(n_paths = record.family.len()))]
    pub fn write_path_family(&self, record: &FamilyRecord<'_>) -> Result<PathBuf, IoError> {
        let start = record.query.start();
        let paths = record
            .family
            .iter()
            .zip(record.path_scores)
            .map(|(path, &score)| PathEntry {
                score,
                points: path.chronological().map(|p| [start + p.x, p.y]).collect(),
            })
            .collect();

        let artifact = FamilyArtifact {
            run: self.run.as_str(),
            start,
            end: record.query.end(),
            scoring: record.scoring.to_string(),
            score: record.score,
            paths,
            induced_segments: record.family.induced_segments().as_slice().to_vec(),
        };

        let path = self.write_json("family", &artifact)?;
        info!(path = %path.display(), "path family written");
        Ok(path)
    }

    /// Write a distance matrix to `{run}_distances.json` as full rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(n = matrix.len()))]
    pub fn write_distance_matrix(
        &self,
        config: &DistanceMatrixConfig,
        segments: &[Segment],
        matrix: &DistanceMatrix,
    ) -> Result<PathBuf, IoError> {
        let artifact = DistanceArtifact {
            run: self.run.as_str(),
            strategy: config.strategy().to_string(),
            kappa: config.kappa(),
            segments,
            distances: matrix.to_rows(),
        };

        let path = self.write_json("distances", &artifact)?;
        info!(path = %path.display(), "distance matrix written");
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, kind: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{kind}.json", self.run.as_str()));
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct FamilyArtifact<'a> {
    run: &'a str,
    start: usize,
    end: usize,
    scoring: String,
    score: f64,
    paths: Vec<PathEntry>,
    induced_segments: Vec<InducedSegment>,
}

#[derive(Serialize)]
struct PathEntry {
    score: f64,
    points: Vec<[usize; 2]>,
}

#[derive(Serialize)]
struct DistanceArtifact<'a> {
    run: &'a str,
    strategy: String,
    kappa: f64,
    segments: &'a [Segment],
    distances: Vec<Vec<f64>>,
}
