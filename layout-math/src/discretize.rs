//! Discretization of continuous feature positions into pixel coordinates
//!
//! Three interchangeable strategies:
//!
//! * **Bin** - floor the scaled coordinate; many features may share a pixel
//! * **Assignment** - exact minimum total squared distance, one feature (or
//!   cluster) per pixel
//! * **Heuristic** - greedy cheapest-pair assignment, one feature (or
//!   cluster) per pixel, for feature counts the exact solver cannot handle
//!
//! Assignment strategies cluster the features first when there are more
//! features than slots.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::assignment::{AssignmentError, AssignmentSolver, GreedySolver, HungarianSolver};
use crate::cluster::{reduce_for_assignment, BisectingKMeans, ClusterError, Clusterer};
use crate::grid::{PixelCoord, PixelGrid};
use crate::scaling::{scale_coordinates, ScalingError};

/// Errors from discretization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscretizeError {
    #[error("unknown discretization '{0}', expected one of 'bin', 'assignment', 'lsa', 'ags'")]
    UnknownDiscretization(String),
    #[error("pixel grid {0} has no pixels")]
    EmptyGrid(PixelGrid),
    #[error(transparent)]
    Scaling(#[from] ScalingError),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}

/// Strategy selector for mapping positions to pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discretization {
    /// Floor/clamp binning, many-to-one
    #[default]
    Bin,
    /// Exact linear sum assignment
    #[serde(alias = "lsa")]
    Assignment,
    /// Greedy assignment
    #[serde(alias = "ags")]
    Heuristic,
}

impl FromStr for Discretization {
    type Err = DiscretizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bin" => Ok(Discretization::Bin),
            "assignment" | "lsa" => Ok(Discretization::Assignment),
            "ags" | "heuristic" => Ok(Discretization::Heuristic),
            other => Err(DiscretizeError::UnknownDiscretization(other.to_string())),
        }
    }
}

impl fmt::Display for Discretization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Discretization::Bin => "bin",
            Discretization::Assignment => "assignment",
            Discretization::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

/// Floor scaled positions into pixel bins.
///
/// Positions on the far edge of the grid (exactly `height` or `width` after
/// scaling) fall into the last bin.
pub fn coordinate_binning(
    positions: ArrayView2<f64>,
    grid: PixelGrid,
) -> Result<Vec<PixelCoord>, DiscretizeError> {
    if grid.is_empty() {
        return Err(DiscretizeError::EmptyGrid(grid));
    }
    let scaled = scale_coordinates(positions, grid)?;
    let bin = |v: f64, dim: usize| (v.floor().max(0.0) as usize).min(dim - 1);
    Ok(scaled
        .rows()
        .into_iter()
        .map(|p| PixelCoord::new(bin(p[0], grid.height), bin(p[1], grid.width)))
        .collect())
}

/// Assign positions (or their clusters) to distinct pixels.
///
/// # Arguments
/// * `positions` - Feature positions, shape `[n_features, 2]`
/// * `grid` - Target pixel grid
/// * `capacity` - Maximum number of distinct assignment rows
/// * `clusterer` - Used when `n_features > capacity`
/// * `solver` - Solves the squared-distance cost matrix
pub fn assign_coordinates(
    positions: ArrayView2<f64>,
    grid: PixelGrid,
    capacity: usize,
    clusterer: &dyn Clusterer,
    solver: &dyn AssignmentSolver,
) -> Result<Vec<PixelCoord>, DiscretizeError> {
    if grid.is_empty() {
        return Err(DiscretizeError::EmptyGrid(grid));
    }
    let scaled = scale_coordinates(positions, grid)?;
    let centroids = grid.centroids();
    let reduced = reduce_for_assignment(scaled.view(), centroids.view(), capacity, clusterer)?;

    let cost = reduced.distances.mapv(|d| d * d);
    let solution = solver.solve(cost.view())?;

    // solution[label] is a row-major pixel index, same order as centroids()
    Ok(reduced
        .labels
        .iter()
        .map(|&label| grid.coord_of(solution[label]))
        .collect())
}

/// Exact assignment with one slot per pixel
pub fn optimal_assignment(
    positions: ArrayView2<f64>,
    grid: PixelGrid,
    clusterer: &dyn Clusterer,
) -> Result<Vec<PixelCoord>, DiscretizeError> {
    assign_coordinates(positions, grid, grid.pixel_count(), clusterer, &HungarianSolver)
}

/// Greedy assignment keeping one pixel spare
///
/// A 1×1 grid still gets a single slot.
pub fn heuristic_assignment(
    positions: ArrayView2<f64>,
    grid: PixelGrid,
    clusterer: &dyn Clusterer,
    seed: u64,
) -> Result<Vec<PixelCoord>, DiscretizeError> {
    let capacity = grid.pixel_count().saturating_sub(1).max(1);
    assign_coordinates(positions, grid, capacity, clusterer, &GreedySolver::new(seed))
}

/// A discretization strategy with the seed used by its randomised parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Discretizer {
    pub method: Discretization,
    pub seed: u64,
}

impl Discretizer {
    pub fn new(method: Discretization, seed: u64) -> Self {
        Self { method, seed }
    }

    /// Map every position to a pixel of `grid`
    pub fn discretize(
        &self,
        positions: ArrayView2<f64>,
        grid: PixelGrid,
    ) -> Result<Vec<PixelCoord>, DiscretizeError> {
        let clusterer = BisectingKMeans::new(self.seed);
        match self.method {
            Discretization::Bin => coordinate_binning(positions, grid),
            Discretization::Assignment => optimal_assignment(positions, grid, &clusterer),
            Discretization::Heuristic => {
                heuristic_assignment(positions, grid, &clusterer, self.seed)
            }
        }
    }
}
