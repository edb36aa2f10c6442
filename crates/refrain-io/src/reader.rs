//! CSV readers for self-similarity matrices and labeled segments.

use std::fs::File;
use std::path::{Path, PathBuf};

use refrain_path::{DenseSsm, Segment, SelfSimilarity};
use tracing::{debug, info, instrument};

use crate::IoError;

fn open(path: &Path) -> Result<File, IoError> {
    File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })
}

fn csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

/// Reads a self-similarity matrix from a headerless CSV file.
///
/// Expected CSV format:
/// - No header row
/// - One row per sample, one column per sample, normalized values
/// - As many rows as columns
///
/// # Defaults
///
/// | Setting | Default |
/// |---|---|
/// | `sample_duration` | 1.0 s |
/// | `raw_scale` | [`DenseSsm::DEFAULT_RAW_SCALE`] |
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero rows |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the first row |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::Ssm`] | Rows and columns differ, or the duration or scale is invalid |
pub struct SsmReader {
    path: PathBuf,
    sample_duration: f64,
    raw_scale: f64,
}

impl SsmReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sample_duration: 1.0,
            raw_scale: DenseSsm::DEFAULT_RAW_SCALE,
        }
    }

    /// Set the duration of one sample in seconds.
    #[must_use]
    pub fn with_sample_duration(mut self, sample_duration: f64) -> Self {
        self.sample_duration = sample_duration;
        self
    }

    /// Set the multiplier from normalized to raw values.
    #[must_use]
    pub fn with_raw_scale(mut self, raw_scale: f64) -> Self {
        self.raw_scale = raw_scale;
        self
    }

    /// Read and validate the CSV file, returning a [`DenseSsm`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<DenseSsm, IoError> {
        let file = open(&self.path)?;

        // flexible(true) so ragged rows reach our InconsistentRowLength check.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut expected = 0;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            if row_index == 0 {
                expected = record.len();
                debug!(expected, "first SSM row read");
            } else if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(expected);
            for (col_index, raw) in record.iter().enumerate() {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    })?;
                row.push(value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let ssm = DenseSsm::from_rows(rows, self.sample_duration)?.with_raw_scale(self.raw_scale)?;
        info!(
            sample_amount = ssm.sample_amount(),
            sample_duration = self.sample_duration,
            "SSM loaded"
        );
        Ok(ssm)
    }
}

/// Reads labeled segments from a CSV file.
///
/// Expected CSV format:
/// - Header row `start,end,group`
/// - `start` and `end` in seconds, `group` a non-negative integer
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record or unparseable field |
/// | [`IoError::InvalidSegment`] | Times are negative, non-finite, or reversed |
///
/// An empty file yields an empty list.
pub struct SegmentReader {
    path: PathBuf,
}

impl SegmentReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Segment>, IoError> {
        let file = open(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut segments = Vec::new();
        for (row_index, result) in rdr.deserialize::<Segment>().enumerate() {
            let segment = result.map_err(|e| csv_error(&self.path, e))?;
            segment.validate().map_err(|e| IoError::InvalidSegment {
                path: self.path.clone(),
                row_index,
                source: e,
            })?;
            segments.push(segment);
        }

        info!(n_segments = segments.len(), "segments loaded");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_ssm() {
        let f = write_csv("1.0,0.5,0.0\n0.5,1.0,0.25\n0.0,0.25,1.0\n");
        let ssm = SsmReader::new(f.path())
            .with_sample_duration(0.5)
            .read()
            .unwrap();
        assert_eq!(ssm.sample_amount(), 3);
        assert_eq!(ssm.sample_duration(), 0.5);
        assert_eq!(ssm.value_normalized(2, 1), 0.25);
        assert_eq!(ssm.value(1, 0), 127.5);
    }

    #[test]
    fn raw_scale_applies() {
        let f = write_csv("1, 0.5\n0.5, 1\n");
        let ssm = SsmReader::new(f.path()).with_raw_scale(2.0).read().unwrap();
        assert_eq!(ssm.value(0, 1), 1.0);
    }

    #[test]
    fn error_file_not_found() {
        let result = SsmReader::new(Path::new("/nonexistent/ssm.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_ssm() {
        let f = write_csv("");
        let result = SsmReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_ragged_ssm() {
        let f = write_csv("1.0,0.5\n0.5\n");
        let result = SsmReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength {
                row_index: 1,
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn error_non_square_ssm() {
        let f = write_csv("1.0,0.5,0.1\n0.5,1.0,0.2\n");
        let result = SsmReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::Ssm(_))));
    }

    #[test]
    fn error_non_finite_cell() {
        let f = write_csv("1.0,NaN\n0.5,1.0\n");
        let result = SsmReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue {
                row_index: 0,
                col_index: 1,
                ..
            })
        ));
        let f = write_csv("1.0,abc\n0.5,1.0\n");
        assert!(matches!(
            SsmReader::new(f.path()).read(),
            Err(IoError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn error_invalid_duration() {
        let f = write_csv("1.0\n");
        let result = SsmReader::new(f.path()).with_sample_duration(0.0).read();
        assert!(matches!(result, Err(IoError::Ssm(_))));
    }

    #[test]
    fn read_segments() {
        let f = write_csv("start,end,group\n0.0,4.5,0\n 5.0 , 9.0 , 1\n");
        let segments = SegmentReader::new(f.path()).read().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], Segment::new(5.0, 9.0, 1).unwrap());
    }

    #[test]
    fn segments_header_only_is_empty() {
        let f = write_csv("start,end,group\n");
        assert!(SegmentReader::new(f.path()).read().unwrap().is_empty());
    }

    #[test]
    fn error_reversed_segment() {
        let f = write_csv("start,end,group\n0.0,1.0,0\n4.0,2.0,0\n");
        let result = SegmentReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InvalidSegment { row_index: 1, .. })
        ));
    }

    #[test]
    fn error_unparseable_segment() {
        let f = write_csv("start,end,group\n0.0,one,0\n");
        let result = SegmentReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::CsvParse { .. })));
    }
}
