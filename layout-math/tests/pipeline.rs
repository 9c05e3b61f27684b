//! Alignment → scaling → discretization on random point clouds

use layout_math::{
    align_points, scale_coordinates, Discretization, Discretizer, PixelCoord, PixelGrid,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn random_cloud(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Elongated, tilted cloud so alignment has something to do
    let mut pts = Array2::zeros((n, 2));
    for i in 0..n {
        let t: f64 = rng.gen_range(-10.0..10.0);
        let s: f64 = rng.gen_range(-1.0..1.0);
        pts[[i, 0]] = t * 0.8 - s * 0.6;
        pts[[i, 1]] = t * 0.6 + s * 0.8;
    }
    pts
}

#[test]
fn test_all_strategies_stay_in_bounds() {
    let grids = [PixelGrid::square(5), PixelGrid::new(3, 7), PixelGrid::new(8, 2)];
    for (seed, n) in [(1, 4), (2, 12), (3, 40)] {
        let cloud = random_cloud(n, seed);
        let (oriented, _) = align_points(cloud.view());
        for grid in grids {
            for method in [
                Discretization::Bin,
                Discretization::Assignment,
                Discretization::Heuristic,
            ] {
                let coords = Discretizer::new(method, seed)
                    .discretize(oriented.view(), grid)
                    .unwrap();
                assert_eq!(coords.len(), n);
                assert!(
                    coords.iter().all(|c| grid.contains(*c)),
                    "{method} produced an out-of-grid pixel on {grid}"
                );
            }
        }
    }
}

#[test]
fn test_alignment_reduces_wasted_area() {
    let cloud = random_cloud(200, 9);
    let (oriented, rect) = align_points(cloud.view());

    let extent = |a: &Array2<f64>| {
        let span = |c: usize| {
            let col = a.column(c);
            col.fold(f64::NEG_INFINITY, |m, &v| m.max(v)) - col.fold(f64::INFINITY, |m, &v| m.min(v))
        };
        span(0) * span(1)
    };

    assert!(extent(&oriented) <= extent(&cloud) + 1e-9);
    assert!((extent(&oriented) - rect.area).abs() < 1e-6);
}

#[test]
fn test_binning_repeatable() {
    let cloud = random_cloud(64, 4);
    let grid = PixelGrid::square(6);
    let run = || {
        let (oriented, _) = align_points(cloud.view());
        Discretizer::new(Discretization::Bin, 0)
            .discretize(oriented.view(), grid)
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_exact_assignment_bijection_eight_on_four_by_four() {
    let cloud = random_cloud(8, 21);
    let grid = PixelGrid::square(4);
    let (oriented, _) = align_points(cloud.view());
    let coords = Discretizer::new(Discretization::Assignment, 0)
        .discretize(oriented.view(), grid)
        .unwrap();

    let unique: HashSet<PixelCoord> = coords.iter().copied().collect();
    assert_eq!(unique.len(), 8);
}

#[test]
fn test_scaled_points_fill_grid_extent() {
    let cloud = random_cloud(30, 5);
    let grid = PixelGrid::new(10, 20);
    let scaled = scale_coordinates(cloud.view(), grid).unwrap();

    let max_row = scaled.column(0).fold(0.0f64, |m, &v| m.max(v));
    let max_col = scaled.column(1).fold(0.0f64, |m, &v| m.max(v));
    assert!((max_row - 10.0).abs() < 1e-9);
    assert!((max_col - 20.0).abs() < 1e-9);
}
