//! Min-max rescaling of 2D positions into pixel-grid units

use ndarray::{Array2, ArrayView2, Axis};
use thiserror::Error;

use crate::grid::PixelGrid;
use crate::min_max_scan::{MinMaxError, MinMaxScan};

/// Errors from coordinate scaling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScalingError {
    #[error("points must have shape [n_points, 2], got {0} columns")]
    WrongDimension(usize),
    #[error("no points to scale")]
    Empty,
    #[error("NaN coordinate at point {index}")]
    NaN { index: usize },
}

impl From<MinMaxError> for ScalingError {
    fn from(err: MinMaxError) -> Self {
        match err {
            MinMaxError::NaNEncountered(index) => ScalingError::NaN { index },
            MinMaxError::NoData => ScalingError::Empty,
        }
    }
}

/// Rescale each axis of `points` onto `[0, dim]`.
///
/// Column 0 is mapped onto `[0, grid.height]` and column 1 onto
/// `[0, grid.width]`, so a scaled point reads as fractional (row, col).
/// An axis with a single distinct value maps every point to 0 on that axis.
///
/// # Errors
/// * `WrongDimension` - `points` does not have two columns
/// * `Empty` - no points
/// * `NaN` - a coordinate is NaN
pub fn scale_coordinates(
    points: ArrayView2<f64>,
    grid: PixelGrid,
) -> Result<Array2<f64>, ScalingError> {
    if points.ncols() != 2 {
        return Err(ScalingError::WrongDimension(points.ncols()));
    }
    if points.nrows() == 0 {
        return Err(ScalingError::Empty);
    }

    let dims = [grid.height as f64, grid.width as f64];
    let mut scaled = Array2::zeros(points.raw_dim());

    for (axis, (column, mut out)) in points
        .axis_iter(Axis(1))
        .zip(scaled.axis_iter_mut(Axis(1)))
        .enumerate()
    {
        let (min, max) = MinMaxScan::scan(column.iter().copied()).min_max()?;
        let range = max - min;
        if range <= 0.0 {
            log::debug!("Axis {axis} has zero range, placing all points at 0");
            continue;
        }
        let factor = dims[axis] / range;
        out.zip_mut_with(&column, |o, &v| *o = (v - min) * factor);
    }

    Ok(scaled)
}
