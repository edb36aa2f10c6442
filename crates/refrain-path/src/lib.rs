//! Path-family extraction over self-similarity matrices.
//!
//! Pure math library with zero I/O. Aligns a query range of a music
//! timeline against the whole timeline through an accumulated score matrix
//! with an elevator column and knight moves, backtracks the optimal path
//! family, scores its paths, and derives induced segments. On top of that it
//! computes segment-to-segment distances (alignment similarity or
//! induced-segment overlap) and symmetric distance matrices in parallel.

mod align;
mod config;
mod error;
mod extract;
mod fitness;
mod grid;
mod induced;
mod matrix;
mod path;
mod score;
mod score_matrix;
mod segment;
mod ssm;
mod visualize;

pub use align::segment_similarity;
pub use config::{DistanceMatrixConfig, DistanceStrategy, ScoreMatrixConfig};
pub use error::{PathError, SsmError};
pub use extract::{PathFamilyExtraction, extract_path_family};
pub use fitness::{
    FamilyFitness, FitnessInput, FitnessReport, FitnessStrategy, PathFamilyInfo,
    segment_path_family_info,
};
pub use grid::Grid;
pub use induced::{InducedSegment, InducedSegments, induced_segments_for_range, segment_overlap_distance};
pub use matrix::DistanceMatrix;
pub use path::{Path, PathFamily, PathPoint};
pub use score::{PathScoring, accumulated_scores, brightness_scores};
pub use score_matrix::{AccumulatedScoreMatrix, ScoreMatrixWorkspace};
pub use segment::{QueryRange, Segment};
pub use ssm::{DenseSsm, SelfSimilarity};
pub use visualize::visualization_matrix;
