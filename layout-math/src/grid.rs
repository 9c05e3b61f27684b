//! Pixel grid dimensions and pixel index conventions
//!
//! Every algorithm in this crate that enumerates pixels goes through
//! [`PixelGrid::index_of`] and [`PixelGrid::coord_of`], so pixel centroids
//! and assignment solutions share one row-major convention:
//! `index = row * width + col`.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel location in matrix order (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelCoord {
    /// Row index, `0 <= row < height`
    pub row: usize,
    /// Column index, `0 <= col < width`
    pub col: usize,
}

impl PixelCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for PixelCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Image grid dimensions
///
/// Stored as (height, width) to line up with ndarray `[row, col]` indexing.
/// Deserializes from either a single integer (square grid) or a
/// `{ height, width }` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "GridRepr", into = "GridRepr")]
pub struct PixelGrid {
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GridRepr {
    Square(usize),
    Rect { height: usize, width: usize },
}

impl From<GridRepr> for PixelGrid {
    fn from(repr: GridRepr) -> Self {
        match repr {
            GridRepr::Square(side) => PixelGrid::square(side),
            GridRepr::Rect { height, width } => PixelGrid::new(height, width),
        }
    }
}

impl From<PixelGrid> for GridRepr {
    fn from(grid: PixelGrid) -> Self {
        GridRepr::Rect {
            height: grid.height,
            width: grid.width,
        }
    }
}

impl PixelGrid {
    /// Create a grid with the given number of rows and columns
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Create a square grid
    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Convert to tuple (height, width)
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Check if a pixel is within bounds
    pub fn contains(&self, coord: PixelCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Flat row-major index of a pixel
    pub fn index_of(&self, coord: PixelCoord) -> usize {
        coord.row * self.width + coord.col
    }

    /// Inverse of [`PixelGrid::index_of`]
    pub fn coord_of(&self, index: usize) -> PixelCoord {
        PixelCoord::new(index / self.width, index % self.width)
    }

    /// Centroid of every pixel, shape `[pixel_count, 2]`
    ///
    /// Row `k` holds `(row + 0.5, col + 0.5)` for the pixel with
    /// `index_of == k`.
    pub fn centroids(&self) -> Array2<f64> {
        let mut centroids = Array2::zeros((self.pixel_count(), 2));
        for row in 0..self.height {
            for col in 0..self.width {
                let k = self.index_of(PixelCoord::new(row, col));
                centroids[[k, 0]] = row as f64 + 0.5;
                centroids[[k, 1]] = col as f64 + 0.5;
            }
        }
        centroids
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        Self::square(224)
    }
}

impl From<usize> for PixelGrid {
    fn from(side: usize) -> Self {
        Self::square(side)
    }
}

impl From<(usize, usize)> for PixelGrid {
    fn from((height, width): (usize, usize)) -> Self {
        Self::new(height, width)
    }
}

impl From<PixelGrid> for (usize, usize) {
    fn from(grid: PixelGrid) -> Self {
        grid.to_tuple()
    }
}

impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}
