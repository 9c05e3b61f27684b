//! NaN-aware minimum/maximum scan over floating point data
//!
//! Works on any iterator so it can walk a strided ndarray column without
//! copying it into a slice first.

use num_traits::float::Float;
use thiserror::Error;

/// Error types for MinMaxScan operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MinMaxError {
    #[error("NaN value encountered at index {0}")]
    NaNEncountered(usize),
    #[error("No data provided (empty input)")]
    NoData,
}

/// Minimum and maximum of a sequence, remembering the first NaN position
#[derive(Debug, Clone)]
pub struct MinMaxScan<T: Float> {
    bounds: Option<(T, T)>,
    nan_index: Option<usize>,
}

impl<T: Float> MinMaxScan<T> {
    /// Scan any sequence of values, e.g. `array.column(0).iter().copied()`
    ///
    /// # Example
    /// ```
    /// use layout_math::min_max_scan::MinMaxScan;
    ///
    /// let scanner = MinMaxScan::scan([1.0, 5.0, 3.0, 2.0]);
    /// assert_eq!(scanner.min_max().unwrap(), (1.0, 5.0));
    /// ```
    pub fn scan<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut bounds: Option<(T, T)> = None;
        let mut nan_index = None;

        for (index, value) in values.into_iter().enumerate() {
            if value.is_nan() {
                if nan_index.is_none() {
                    nan_index = Some(index);
                }
                continue;
            }

            bounds = Some(match bounds {
                None => (value, value),
                Some((min, max)) => (min.min(value), max.max(value)),
            });
        }

        Self { bounds, nan_index }
    }

    /// Both extremes as (min, max)
    pub fn min_max(&self) -> Result<(T, T), MinMaxError> {
        if let Some(index) = self.nan_index {
            return Err(MinMaxError::NaNEncountered(index));
        }
        self.bounds.ok_or(MinMaxError::NoData)
    }
}
