//! Self-similarity matrix access with validation guarantees.

use crate::error::SsmError;

/// Read access to a self-similarity matrix over a sampled timeline.
///
/// Values are addressed as `(col, row)`, both sample indices on the full
/// timeline. Implementations must be immutable for the duration of a query.
pub trait SelfSimilarity {
    /// Number of samples on the timeline (rows and columns of the matrix).
    fn sample_amount(&self) -> usize;

    /// Duration of one sample in seconds.
    fn sample_duration(&self) -> f64;

    /// Normalized similarity, typically in `[0, 1]`.
    fn value_normalized(&self, col: usize, row: usize) -> f64;

    /// Raw similarity as stored by the producer of the matrix.
    fn value(&self, col: usize, row: usize) -> f64;

    /// Extent of the matrix diagonal.
    fn size(&self) -> usize {
        self.sample_amount()
    }
}

/// Owned, validated square SSM. Guaranteed non-empty with all finite values.
///
/// Stores normalized values row-major. Raw values are derived by multiplying
/// with `raw_scale` (255 by default, matching 8-bit producers).
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSsm {
    values: Vec<f64>,
    sample_amount: usize,
    sample_duration: f64,
    raw_scale: f64,
}

impl DenseSsm {
    /// Default multiplier from normalized to raw values.
    pub const DEFAULT_RAW_SCALE: f64 = 255.0;

    /// Create a new SSM from row-major normalized values.
    ///
    /// The sample amount is inferred from `values.len()`, which must be a
    /// perfect square.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SsmError::Empty`] | `values` is empty |
    /// | [`SsmError::NotSquare`] | `values.len()` is not a perfect square |
    /// | [`SsmError::NonFiniteValue`] | Any value is NaN or infinite |
    /// | [`SsmError::InvalidSampleDuration`] | `sample_duration` is not positive and finite |
    pub fn new(values: Vec<f64>, sample_duration: f64) -> Result<Self, SsmError> {
        if values.is_empty() {
            return Err(SsmError::Empty);
        }
        let sample_amount = values.len().isqrt();
        if sample_amount * sample_amount != values.len() {
            return Err(SsmError::NotSquare {
                sample_amount,
                expected: sample_amount * sample_amount,
                got: values.len(),
            });
        }
        Self::from_rows_validated(values, sample_amount, sample_duration)
    }

    /// Create a new SSM from a list of rows.
    ///
    /// # Errors
    ///
    /// Same as [`DenseSsm::new`]; [`SsmError::NotSquare`] is returned when any
    /// row length differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<f64>>, sample_duration: f64) -> Result<Self, SsmError> {
        let sample_amount = rows.len();
        if sample_amount == 0 {
            return Err(SsmError::Empty);
        }
        let got: usize = rows.iter().map(Vec::len).sum();
        if rows.iter().any(|r| r.len() != sample_amount) {
            return Err(SsmError::NotSquare {
                sample_amount,
                expected: sample_amount * sample_amount,
                got,
            });
        }
        let values = rows.into_iter().flatten().collect();
        Self::from_rows_validated(values, sample_amount, sample_duration)
    }

    /// Build an SSM from a generator called for every `(col, row)`.
    ///
    /// # Errors
    ///
    /// Same as [`DenseSsm::new`].
    pub fn from_fn<F>(sample_amount: usize, sample_duration: f64, mut f: F) -> Result<Self, SsmError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(sample_amount * sample_amount);
        for row in 0..sample_amount {
            for col in 0..sample_amount {
                values.push(f(col, row));
            }
        }
        Self::new(values, sample_duration)
    }

    fn from_rows_validated(
        values: Vec<f64>,
        sample_amount: usize,
        sample_duration: f64,
    ) -> Result<Self, SsmError> {
        if !(sample_duration.is_finite() && sample_duration > 0.0) {
            return Err(SsmError::InvalidSampleDuration {
                duration: sample_duration,
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SsmError::NonFiniteValue {
                col: index % sample_amount,
                row: index / sample_amount,
            });
        }
        Ok(Self {
            values,
            sample_amount,
            sample_duration,
            raw_scale: Self::DEFAULT_RAW_SCALE,
        })
    }

    /// Set the multiplier used to derive raw values.
    ///
    /// # Errors
    ///
    /// Returns [`SsmError::InvalidRawScale`] if `raw_scale` is not positive and finite.
    pub fn with_raw_scale(mut self, raw_scale: f64) -> Result<Self, SsmError> {
        if !(raw_scale.is_finite() && raw_scale > 0.0) {
            return Err(SsmError::InvalidRawScale { scale: raw_scale });
        }
        self.raw_scale = raw_scale;
        Ok(self)
    }

    /// Return the raw scale.
    #[must_use]
    pub fn raw_scale(&self) -> f64 {
        self.raw_scale
    }

    /// Return the normalized values, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl SelfSimilarity for DenseSsm {
    fn sample_amount(&self) -> usize {
        self.sample_amount
    }

    fn sample_duration(&self) -> f64 {
        self.sample_duration
    }

    fn value_normalized(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.sample_amount + col]
    }

    fn value(&self, col: usize, row: usize) -> f64 {
        self.value_normalized(col, row) * self.raw_scale
    }
}
