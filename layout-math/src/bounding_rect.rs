//! Minimum-area bounding rectangle and point-set alignment
//!
//! The minimum-area enclosing rectangle of a convex polygon has one side
//! collinear with a hull edge, so only the hull edge angles (mod 90°) need
//! to be tested. Rotating the full point set by the winning angle makes the
//! rectangle axis-aligned, which minimizes unused image area once the points
//! are scaled onto a pixel grid.

use nalgebra::{Matrix2, Vector2};
use ndarray::{Array2, ArrayView2};
use std::f64::consts::FRAC_PI_2;

use crate::hull::convex_hull;
use crate::matrix2::{rotate_points, rotation_matrix, to_vector2_points};

/// Angles closer than this are treated as the same candidate rotation
const ANGLE_EPSILON: f64 = 1e-12;

/// Result of the minimum bounding rectangle search
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingRectangle {
    /// Rotation that makes the rectangle axis-aligned (apply as `R × p`)
    pub rotation: Matrix2<f64>,
    /// Hull edge angle the rotation undoes, in `[0, π/2)`
    pub angle: f64,
    /// Rectangle corners in the original (unrotated) frame
    pub corners: [Vector2<f64>; 4],
    /// Rectangle area
    pub area: f64,
}

impl BoundingRectangle {
    fn identity_at(point: Vector2<f64>) -> Self {
        Self {
            rotation: Matrix2::identity(),
            angle: 0.0,
            corners: [point; 4],
            area: 0.0,
        }
    }
}

/// Axis-aligned extent of `points` after rotation: (min_x, max_x, min_y, max_y)
fn rotated_extent(points: &[Vector2<f64>], rotation: &Matrix2<f64>) -> (f64, f64, f64, f64) {
    let mut extent = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for p in points {
        let r = rotation * p;
        extent.0 = extent.0.min(r.x);
        extent.1 = extent.1.max(r.x);
        extent.2 = extent.2.min(r.y);
        extent.3 = extent.3.max(r.y);
    }
    extent
}

/// Sorted, deduplicated hull edge angles reduced modulo π/2
fn edge_angles(hull: &[Vector2<f64>]) -> Vec<f64> {
    let n = hull.len();
    let mut angles: Vec<f64> = (0..n)
        .map(|i| {
            let edge = hull[(i + 1) % n] - hull[i];
            edge.y.atan2(edge.x).rem_euclid(FRAC_PI_2)
        })
        .collect();
    angles.sort_by(|a, b| a.total_cmp(b));
    angles.dedup_by(|a, b| (*a - *b).abs() < ANGLE_EPSILON);
    angles
}

/// Find the smallest-area rectangle enclosing a convex hull.
///
/// Ties keep the first minimum in ascending angle order. Hulls with fewer
/// than two vertices yield the identity rotation and a zero-area rectangle.
pub fn minimum_bounding_rectangle(hull: &[Vector2<f64>]) -> BoundingRectangle {
    match hull.len() {
        0 => return BoundingRectangle::identity_at(Vector2::zeros()),
        1 => return BoundingRectangle::identity_at(hull[0]),
        _ => {}
    }

    let mut best: Option<(f64, f64, Matrix2<f64>, (f64, f64, f64, f64))> = None;
    for angle in edge_angles(hull) {
        let rotation = rotation_matrix(-angle);
        let extent = rotated_extent(hull, &rotation);
        let area = (extent.1 - extent.0) * (extent.3 - extent.2);
        if best.as_ref().map_or(true, |(best_area, ..)| area < *best_area) {
            best = Some((area, angle, rotation, extent));
        }
    }

    // A hull with two or more vertices always yields at least one angle
    let Some((area, angle, rotation, (min_x, max_x, min_y, max_y))) = best else {
        return BoundingRectangle::identity_at(hull[0]);
    };

    let back = rotation.transpose();
    let corners = [
        back * Vector2::new(max_x, min_y),
        back * Vector2::new(min_x, min_y),
        back * Vector2::new(min_x, max_y),
        back * Vector2::new(max_x, max_y),
    ];

    BoundingRectangle {
        rotation,
        angle,
        corners,
        area,
    }
}

/// Rotate every point so the minimum bounding rectangle of the set is
/// axis-aligned.
///
/// # Arguments
/// * `points` - Feature positions, shape `[n_points, 2]`
///
/// # Returns
/// The rotated points (same order and count) and the rectangle found on
/// the original points.
pub fn align_points(points: ArrayView2<f64>) -> (Array2<f64>, BoundingRectangle) {
    let vectors = to_vector2_points(points);
    let hull = convex_hull(&vectors);
    let rectangle = minimum_bounding_rectangle(&hull);
    log::debug!(
        "Aligned {} points: hull has {} vertices, rectangle area {:.4e} at {:.4} rad",
        vectors.len(),
        hull.len(),
        rectangle.area,
        rectangle.angle
    );
    let oriented = rotate_points(points, &rectangle.rotation);
    (oriented, rectangle)
}
