use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use refrain_io::{FamilyRecord, ResultWriter, RunName, SegmentReader, SsmReader};
use refrain_path::{
    DenseSsm, DistanceMatrixConfig, DistanceStrategy, PathScoring, QueryRange, ScoreMatrixConfig,
    ScoreMatrixWorkspace, Segment, SelfSimilarity, segment_overlap_distance, segment_similarity,
};

#[derive(Parser)]
#[command(name = "refrain")]
#[command(about = "Repetition paths and segment distances from self-similarity matrices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input SSM and its time resolution.
#[derive(Args, Debug, Clone)]
struct SsmArgs {
    /// Path to the headerless square SSM CSV file
    #[arg(long)]
    ssm: PathBuf,

    /// Duration of one SSM sample in seconds
    #[arg(long, default_value_t = 1.0)]
    sample_duration: f64,
}

/// Shared tuning parameters for the accumulated score matrix.
#[derive(Args, Debug, Clone)]
struct ScoreArgs {
    /// Score added for non-positive similarities (must be <= 0)
    #[arg(long, default_value_t = -2.0, allow_negative_numbers = true)]
    penalty: f64,

    /// Multiplier for knight-move predecessors with negative scores
    #[arg(long, default_value_t = 1.0)]
    knight_move_ratio: f64,

    /// Multiplier for knight-move predecessors with non-negative scores
    #[arg(long, default_value_t = 1.0)]
    knight_move_tweak: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the path family of one query range against the whole timeline
    Family {
        #[command(flatten)]
        input: SsmArgs,

        /// First sample of the query range
        #[arg(long)]
        start: usize,

        /// End sample of the query range (exclusive)
        #[arg(long)]
        end: usize,

        /// Path scoring: "brightness" or "accumulated"
        #[arg(long, default_value = "brightness")]
        scoring: String,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        tuning: ScoreArgs,
    },

    /// Compute the pairwise distance matrix of labeled segments
    Distances {
        #[command(flatten)]
        input: SsmArgs,

        /// Path to the segments CSV file (header: start,end,group)
        #[arg(long)]
        segments: PathBuf,

        /// Distance strategy: "DTW" or "overlap"
        #[arg(long, default_value = "DTW")]
        strategy: String,

        /// Discount for segments sharing a group (DTW strategy only)
        #[arg(long, default_value_t = 0.7)]
        kappa: f64,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        tuning: ScoreArgs,
    },

    /// Compare two segments by alignment similarity and overlap distance
    Compare {
        #[command(flatten)]
        input: SsmArgs,

        /// First segment as START:END in seconds
        #[arg(long)]
        a: String,

        /// Second segment as START:END in seconds
        #[arg(long)]
        b: String,

        #[command(flatten)]
        tuning: ScoreArgs,
    },
}

// --- Stdout output structs ---

#[derive(Serialize)]
struct FamilyOutput {
    run: String,
    start: usize,
    end: usize,
    scoring: String,
    score: f64,
    n_paths: usize,
    path_scores: Vec<f64>,
}

#[derive(Serialize)]
struct DistancesOutput {
    run: String,
    strategy: String,
    n_segments: usize,
    mean_distance: Option<f64>,
}

#[derive(Serialize)]
struct CompareOutput {
    a: Segment,
    b: Segment,
    similarity: f64,
    overlap_distance: f64,
}

impl ScoreArgs {
    fn to_config(&self) -> Result<ScoreMatrixConfig> {
        Ok(ScoreMatrixConfig::default()
            .with_penalty(self.penalty)?
            .with_knight_move_ratio(self.knight_move_ratio)?
            .with_knight_move_tweak(self.knight_move_tweak)?)
    }
}

fn read_ssm(input: &SsmArgs) -> Result<DenseSsm> {
    let ssm = SsmReader::new(&input.ssm)
        .with_sample_duration(input.sample_duration)
        .read()
        .context("failed to read SSM CSV")?;
    info!(sample_amount = ssm.sample_amount(), "SSM loaded");
    Ok(ssm)
}

fn parse_segment(s: &str) -> Result<Segment> {
    let Some((start, end)) = s.split_once(':') else {
        anyhow::bail!("invalid segment: {s} (expected START:END in seconds)");
    };
    let start: f64 = start
        .trim()
        .parse()
        .with_context(|| format!("invalid segment start in {s}"))?;
    let end: f64 = end
        .trim()
        .parse()
        .with_context(|| format!("invalid segment end in {s}"))?;
    Ok(Segment::new(start, end, 0)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Family {
            input,
            start,
            end,
            scoring,
            run,
            output_dir,
            tuning,
        } => {
            let run_name = RunName::new(run.clone())?;
            let scoring: PathScoring = scoring.parse()?;
            let config = tuning.to_config()?;
            let ssm = read_ssm(&input)?;

            let query = QueryRange::new(start, end)?;
            let mut workspace = ScoreMatrixWorkspace::for_query(&ssm, query)?;
            let matrix = config
                .compute(&ssm, query, &mut workspace)
                .context("score matrix computation failed")?;
            let family = matrix
                .path_family()
                .context("path family extraction failed")?;
            let path_scores = scoring.score_family(&ssm, &matrix, &family);
            info!(n_paths = family.len(), score = matrix.score(), "path family extracted");

            let writer = ResultWriter::new(&output_dir, run_name)?;
            writer.write_path_family(&FamilyRecord {
                query,
                family: &family,
                path_scores: &path_scores,
                scoring,
                score: matrix.score(),
            })?;

            let output = FamilyOutput {
                run,
                start,
                end,
                scoring: scoring.to_string(),
                score: matrix.score(),
                n_paths: family.len(),
                path_scores,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Distances {
            input,
            segments,
            strategy,
            kappa,
            run,
            output_dir,
            tuning,
        } => {
            let run_name = RunName::new(run.clone())?;
            let strategy: DistanceStrategy = strategy.parse()?;
            let config = DistanceMatrixConfig::new(strategy)
                .with_kappa(kappa)?
                .with_score_matrix(tuning.to_config()?);

            let ssm = read_ssm(&input)?;
            let segments = SegmentReader::new(&segments)
                .read()
                .context("failed to read segments CSV")?;

            let matrix = config
                .build(&ssm, &segments)
                .context("distance matrix computation failed")?;

            let writer = ResultWriter::new(&output_dir, run_name)?;
            writer.write_distance_matrix(&config, &segments, &matrix)?;

            let off_diagonal: Vec<f64> = matrix
                .iter()
                .filter(|&(i, j, _)| i != j)
                .map(|(_, _, d)| d)
                .collect();
            let mean_distance = (!off_diagonal.is_empty())
                .then(|| off_diagonal.iter().sum::<f64>() / off_diagonal.len() as f64);

            let output = DistancesOutput {
                run,
                strategy: strategy.to_string(),
                n_segments: matrix.len(),
                mean_distance,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Compare { input, a, b, tuning } => {
            let config = tuning.to_config()?;
            let a = parse_segment(&a)?;
            let b = parse_segment(&b)?;
            let ssm = read_ssm(&input)?;

            let similarity = segment_similarity(&ssm, &a, &b).context("segment alignment failed")?;
            let overlap_distance = segment_overlap_distance(&ssm, &a, &b, &config)
                .context("overlap distance computation failed")?;

            let output = CompareOutput {
                a,
                b,
                similarity,
                overlap_distance,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
