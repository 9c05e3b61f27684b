//! layout-math - Algorithms for placing features on a pixel grid
//!
//! This crate provides the stateless geometry and optimisation steps used to
//! turn a 2D embedding of dataset features into pixel coordinates:
//!
//! - **Alignment** - convex hull and minimum-area bounding rectangle
//! - **Scaling** - per-axis min-max rescale into grid units
//! - **Clustering** - bisecting k-means reduction to a slot budget
//! - **Assignment** - exact (Hungarian) and greedy bipartite matching
//! - **Discretization** - binning or assignment into a feature→pixel table
//!
//! # Example
//!
//! ```
//! use layout_math::{align_points, Discretization, Discretizer, PixelGrid};
//! use ndarray::array;
//!
//! let positions = array![[0.0, 0.0], [1.0, 0.5], [2.0, 2.0], [0.5, 1.5]];
//! let (oriented, _rect) = align_points(positions.view());
//!
//! let grid = PixelGrid::square(4);
//! let coords = Discretizer::new(Discretization::Assignment, 0)
//!     .discretize(oriented.view(), grid)
//!     .unwrap();
//! assert!(coords.iter().all(|c| grid.contains(*c)));
//! ```

pub mod assignment;
pub mod bounding_rect;
pub mod cluster;
pub mod discretize;
pub mod distance;
pub mod grid;
pub mod hull;
pub mod matrix2;
pub mod min_max_scan;
pub mod scaling;

// Re-export commonly used types
pub use assignment::{AssignmentError, AssignmentSolver, GreedySolver, HungarianSolver};
pub use bounding_rect::{align_points, minimum_bounding_rectangle, BoundingRectangle};
pub use cluster::{reduce_for_assignment, BisectingKMeans, ClusterError, Clusterer, Clustering};
pub use discretize::{
    coordinate_binning, heuristic_assignment, optimal_assignment, DiscretizeError,
    Discretization, Discretizer,
};
pub use distance::euclidean_cdist;
pub use grid::{PixelCoord, PixelGrid};
pub use hull::convex_hull;
pub use matrix2::rotation_matrix;
pub use scaling::{scale_coordinates, ScalingError};
