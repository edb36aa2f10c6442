//! Error types for SSM construction and path-family queries.

/// Errors from building a self-similarity matrix.
#[derive(Debug, thiserror::Error)]
pub enum SsmError {
    /// Returned when the matrix has no samples.
    #[error("self-similarity matrix must contain at least one sample")]
    Empty,

    /// Returned when the value count is not a perfect square of the sample amount.
    #[error("expected {expected} values for a {sample_amount}x{sample_amount} matrix, got {got}")]
    NotSquare {
        /// Number of samples per side.
        sample_amount: usize,
        /// Number of values required.
        expected: usize,
        /// Number of values provided.
        got: usize,
    },

    /// Returned when a value is NaN or infinite.
    #[error("non-finite similarity value at column {col}, row {row}")]
    NonFiniteValue {
        /// Column of the offending value.
        col: usize,
        /// Row of the offending value.
        row: usize,
    },

    /// Returned when the sample duration is not a positive finite number.
    #[error("sample duration must be positive and finite, got {duration}")]
    InvalidSampleDuration {
        /// The rejected duration in seconds.
        duration: f64,
    },

    /// Returned when the raw scale is not a positive finite number.
    #[error("raw scale must be positive and finite, got {scale}")]
    InvalidRawScale {
        /// The rejected scale.
        scale: f64,
    },
}

/// Errors from score-matrix computation, backtracking, and segment comparison.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Returned when a query range has `end <= start`.
    #[error("query range must satisfy start < end, got start={start}, end={end}")]
    EmptyQuery {
        /// First sample of the query.
        start: usize,
        /// Last sample of the query.
        end: usize,
    },

    /// Returned when a query range extends past the end of the timeline.
    #[error("query end {end} exceeds sample amount {sample_amount}")]
    QueryOutOfRange {
        /// Last sample of the query.
        end: usize,
        /// Number of samples in the SSM.
        sample_amount: usize,
    },

    /// Returned when a reused workspace is not sized for the current query.
    #[error(
        "workspace sized {got_height}x{got_width}, query needs {expected_height}x{expected_width}"
    )]
    WorkspaceMismatch {
        /// Rows required by the query.
        expected_height: usize,
        /// Columns required by the query.
        expected_width: usize,
        /// Rows the workspace was prepared for.
        got_height: usize,
        /// Columns the workspace was prepared for.
        got_width: usize,
    },

    /// Returned when a segment has non-finite, negative, or reversed times.
    #[error("invalid segment [{start}, {end}]")]
    InvalidSegment {
        /// Segment start in seconds.
        start: f64,
        /// Segment end in seconds.
        end: f64,
    },

    /// Returned when a segment maps to samples beyond the SSM.
    #[error("segment samples {start_sample}..={end_sample} exceed sample amount {sample_amount}")]
    SegmentOutOfRange {
        /// First sample covered by the segment.
        start_sample: usize,
        /// Last sample covered by the segment.
        end_sample: usize,
        /// Number of samples in the SSM.
        sample_amount: usize,
    },

    /// Returned when backtracking reaches a cell whose predecessors are all unreached.
    #[error("no reachable predecessor for cell x={x}, y={y}")]
    UnreachableCell {
        /// Column of the stuck cell.
        x: usize,
        /// Row of the stuck cell.
        y: usize,
    },

    /// Returned when a configuration value is out of its allowed domain.
    #[error("invalid {name}: {value}")]
    InvalidConfig {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Returned when a strategy tag does not name a known strategy.
    #[error("unknown {kind} strategy: {name}")]
    UnknownStrategy {
        /// Which strategy family was being parsed.
        kind: &'static str,
        /// The unrecognized tag.
        name: String,
    },
}
