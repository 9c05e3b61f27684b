//! 2x2 rotation utilities and conversions between point layouts
//!
//! Public APIs take `ndarray::Array2<f64>` with shape `[n_points, 2]`;
//! geometry internals work on `nalgebra::Vector2<f64>`.

use nalgebra::{Matrix2, Vector2};
use ndarray::{Array2, ArrayView2};

/// Create a 2x2 rotation matrix
///
/// # Arguments
/// * `angle_rad` - Rotation angle in radians (counter-clockwise)
pub fn rotation_matrix(angle_rad: f64) -> Matrix2<f64> {
    let c = angle_rad.cos();
    let s = angle_rad.sin();
    Matrix2::new(c, -s, s, c)
}

/// Convert `[n_points, 2]` rows into nalgebra vectors
pub fn to_vector2_points(points: ArrayView2<f64>) -> Vec<Vector2<f64>> {
    points
        .rows()
        .into_iter()
        .map(|row| Vector2::new(row[0], row[1]))
        .collect()
}

/// Convert nalgebra vectors back into a `[n_points, 2]` array
pub fn from_vector2_points(points: &[Vector2<f64>]) -> Array2<f64> {
    let mut out = Array2::zeros((points.len(), 2));
    for (i, p) in points.iter().enumerate() {
        out[[i, 0]] = p.x;
        out[[i, 1]] = p.y;
    }
    out
}

/// Apply `p' = R × p` to every row of `points`
pub fn rotate_points(points: ArrayView2<f64>, rotation: &Matrix2<f64>) -> Array2<f64> {
    let rotated: Vec<Vector2<f64>> = to_vector2_points(points)
        .iter()
        .map(|p| rotation * p)
        .collect();
    from_vector2_points(&rotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation_90_degrees() {
        let matrix = rotation_matrix(PI / 2.0);
        let output = matrix * Vector2::new(1.0, 0.0);

        assert_relative_eq!(output.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(output.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let r = rotation_matrix(0.37);
        let product = r * r.transpose();
        assert_relative_eq!(product, Matrix2::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_points_preserves_order() {
        let points = array![[1.0, 0.0], [0.0, 2.0], [-3.0, 0.0]];
        let rotated = rotate_points(points.view(), &rotation_matrix(-PI / 2.0));

        assert_relative_eq!(rotated[[0, 0]], 0.0, epsilon = 1e-10);
        assert_relative_eq!(rotated[[0, 1]], -1.0, epsilon = 1e-10);
        assert_relative_eq!(rotated[[1, 0]], 2.0, epsilon = 1e-10);
        assert_relative_eq!(rotated[[2, 1]], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_layout_conversion_roundtrip() {
        let points = array![[0.5, -1.5], [2.0, 3.0]];
        let vecs = to_vector2_points(points.view());
        assert_eq!(vecs[1], Vector2::new(2.0, 3.0));
        assert_eq!(from_vector2_points(&vecs), points);
    }
}
