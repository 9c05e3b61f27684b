//! Feature clustering for oversized assignment problems
//!
//! When there are more features than assignment slots, features are grouped
//! into exactly `capacity` clusters and the cluster centroids are assigned
//! instead. Every feature then inherits its cluster's pixel.
//!
//! The default clusterer is bisecting k-means: start from a single cluster
//! and repeatedly split the cluster with the largest inertia using 2-means
//! until the requested count is reached.

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::distance::euclidean_cdist;

/// Errors from clustering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("cannot form {k} clusters from {n_points} points")]
    InvalidClusterCount { k: usize, n_points: usize },
    #[error("clusterer returned {actual} labels for {expected} points")]
    LabelCount { expected: usize, actual: usize },
}

/// Hard partition of a point set
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster label per input point, each in `0..k`
    pub labels: Vec<usize>,
    /// Cluster centroids, shape `[k, 2]`
    pub centroids: Array2<f64>,
}

/// Partition N points into exactly k labelled groups
pub trait Clusterer {
    fn cluster(&self, points: ArrayView2<f64>, k: usize) -> Result<Clustering, ClusterError>;
}

/// Bisecting k-means with largest-inertia splitting
#[derive(Debug, Clone)]
pub struct BisectingKMeans {
    /// Seed for the 2-means initialisation
    pub seed: u64,
    /// Maximum Lloyd iterations per split
    pub max_iter: usize,
}

impl BisectingKMeans {
    pub fn new(seed: u64) -> Self {
        Self { seed, max_iter: 300 }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Default for BisectingKMeans {
    fn default() -> Self {
        Self::new(0)
    }
}

fn point(points: &ArrayView2<f64>, i: usize) -> [f64; 2] {
    [points[[i, 0]], points[[i, 1]]]
}

fn sq_dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn mean_of(points: &ArrayView2<f64>, members: &[usize]) -> [f64; 2] {
    let mut sum = [0.0, 0.0];
    for &i in members {
        sum[0] += points[[i, 0]];
        sum[1] += points[[i, 1]];
    }
    let n = members.len().max(1) as f64;
    [sum[0] / n, sum[1] / n]
}

fn inertia(points: &ArrayView2<f64>, members: &[usize]) -> f64 {
    let c = mean_of(points, members);
    members.iter().map(|&i| sq_dist(point(points, i), c)).sum()
}

impl BisectingKMeans {
    /// Split one cluster in two with Lloyd iterations.
    ///
    /// Seeds are a random member and the member farthest from it. Returns
    /// `None` when every member sits on the same location.
    fn two_means(
        &self,
        points: &ArrayView2<f64>,
        members: &[usize],
        rng: &mut StdRng,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        let first = point(points, members[rng.gen_range(0..members.len())]);
        let (far_idx, far_dist) = members
            .iter()
            .map(|&i| (i, sq_dist(point(points, i), first)))
            .fold((members[0], 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if far_dist <= 0.0 {
            return None;
        }

        let mut centers = [first, point(points, far_idx)];
        let mut assignment: Vec<bool> = vec![false; members.len()];

        for iteration in 0..self.max_iter {
            let mut changed = false;
            for (slot, &i) in members.iter().enumerate() {
                let p = point(points, i);
                let to_second = sq_dist(p, centers[1]) < sq_dist(p, centers[0]);
                if to_second != assignment[slot] {
                    assignment[slot] = to_second;
                    changed = true;
                }
            }
            if iteration > 0 && !changed {
                break;
            }

            let (left, right) = partition(members, &assignment);
            if left.is_empty() || right.is_empty() {
                break;
            }
            centers = [mean_of(points, &left), mean_of(points, &right)];
        }

        let (left, right) = partition(members, &assignment);
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some((left, right))
    }
}

fn partition(members: &[usize], to_second: &[bool]) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (&i, &second) in members.iter().zip(to_second) {
        if second {
            right.push(i);
        } else {
            left.push(i);
        }
    }
    (left, right)
}

impl Clusterer for BisectingKMeans {
    fn cluster(&self, points: ArrayView2<f64>, k: usize) -> Result<Clustering, ClusterError> {
        let n_points = points.nrows();
        if k == 0 || k > n_points {
            return Err(ClusterError::InvalidClusterCount { k, n_points });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut clusters: Vec<Vec<usize>> = vec![(0..n_points).collect()];
        let mut inertias = vec![inertia(&points, &clusters[0])];

        while clusters.len() < k {
            // k <= n_points guarantees some cluster still has two members
            let Some(target) = (0..clusters.len())
                .filter(|&c| clusters[c].len() >= 2)
                .max_by(|&a, &b| {
                    inertias[a]
                        .total_cmp(&inertias[b])
                        .then(clusters[a].len().cmp(&clusters[b].len()))
                        .then(b.cmp(&a))
                })
            else {
                break;
            };

            let members = std::mem::take(&mut clusters[target]);
            let (left, right) = match self.two_means(&points, &members, &mut rng) {
                Some(split) => split,
                None => {
                    let mut left = members;
                    let right = left.split_off(left.len() / 2);
                    (left, right)
                }
            };

            inertias[target] = inertia(&points, &left);
            inertias.push(inertia(&points, &right));
            clusters[target] = left;
            clusters.push(right);
        }

        let mut labels = vec![0; n_points];
        let mut centroids = Array2::zeros((clusters.len(), 2));
        for (label, members) in clusters.iter().enumerate() {
            let c = mean_of(&points, members);
            centroids[[label, 0]] = c[0];
            centroids[[label, 1]] = c[1];
            for &i in members {
                labels[i] = label;
            }
        }

        log::debug!("Bisecting k-means formed {} clusters from {n_points} points", clusters.len());
        Ok(Clustering { labels, centroids })
    }
}

/// Assignment inputs after optional clustering
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedPoints {
    /// Row of `distances` each original point is represented by
    pub labels: Vec<usize>,
    /// Euclidean distances from each representative point to each pixel centroid
    pub distances: Array2<f64>,
}

/// Prepare an assignment problem that fits within `capacity` slots.
///
/// With at most `capacity` points, labels are the identity and distances
/// are measured from the points themselves. Otherwise the points are
/// clustered into `capacity` groups and distances are measured from the
/// cluster centroids.
pub fn reduce_for_assignment(
    scaled: ArrayView2<f64>,
    pixel_centroids: ArrayView2<f64>,
    capacity: usize,
    clusterer: &dyn Clusterer,
) -> Result<ReducedPoints, ClusterError> {
    let n_points = scaled.nrows();
    if n_points <= capacity {
        return Ok(ReducedPoints {
            labels: (0..n_points).collect(),
            distances: euclidean_cdist(scaled, pixel_centroids),
        });
    }

    log::info!("Clustering {n_points} features into {capacity} groups for assignment");
    let clustering = clusterer.cluster(scaled, capacity)?;
    if clustering.labels.len() != n_points {
        return Err(ClusterError::LabelCount {
            expected: n_points,
            actual: clustering.labels.len(),
        });
    }
    Ok(ReducedPoints {
        labels: clustering.labels,
        distances: euclidean_cdist(clustering.centroids.view(), pixel_centroids),
    })
}
