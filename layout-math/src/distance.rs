//! Pairwise distance matrices between 2D point sets

use ndarray::{Array2, ArrayView2};

/// Squared Euclidean distance between two rows of length 2
fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Pairwise squared Euclidean distances, shape `[a.nrows(), b.nrows()]`
///
/// Both inputs must have shape `[n, 2]`.
pub fn squared_euclidean_cdist(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let b_rows: Vec<[f64; 2]> = b.rows().into_iter().map(|r| [r[0], r[1]]).collect();
    let mut dist = Array2::zeros((a.nrows(), b.nrows()));
    for (i, row) in a.rows().into_iter().enumerate() {
        let p = [row[0], row[1]];
        for (j, q) in b_rows.iter().enumerate() {
            dist[[i, j]] = squared_distance(&p, q);
        }
    }
    dist
}

/// Pairwise Euclidean distances, shape `[a.nrows(), b.nrows()]`
pub fn euclidean_cdist(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    squared_euclidean_cdist(a, b).mapv_into(f64::sqrt)
}
