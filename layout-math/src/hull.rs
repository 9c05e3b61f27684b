//! Convex hull of a 2D point set (Andrew's monotone chain)

use nalgebra::Vector2;

/// Z component of `(a - o) × (b - o)`; positive for a counter-clockwise turn
fn cross(o: &Vector2<f64>, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let oa = a - o;
    let ob = b - o;
    oa.x * ob.y - oa.y * ob.x
}

/// Append `p` to a monotone chain, dropping points that no longer turn left
fn push_chain(chain: &mut Vec<Vector2<f64>>, p: Vector2<f64>) {
    while chain.len() >= 2 && cross(&chain[chain.len() - 2], &chain[chain.len() - 1], &p) <= 0.0 {
        chain.pop();
    }
    chain.push(p);
}

/// Compute the convex hull of a point set.
///
/// Vertices are returned in counter-clockwise order starting from the
/// lowest-x (then lowest-y) point. Duplicate and collinear points are
/// removed, so degenerate inputs shrink instead of failing:
///
/// * no points → empty hull
/// * all points identical → one vertex
/// * all points collinear → the two extreme vertices
///
/// # Performance
/// O(n log n) for the sort, O(n) for the chain construction.
pub fn convex_hull(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower = Vec::with_capacity(sorted.len());
    for p in &sorted {
        push_chain(&mut lower, *p);
    }

    let mut upper = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        push_chain(&mut upper, *p);
    }

    // Each chain ends where the other begins
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
