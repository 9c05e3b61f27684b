//! Feature projection to 2D
//!
//! A [`Projector`] receives the dataset transposed, one row per feature and
//! one column per sample, and returns one 2D point per feature. Any
//! embedding method can be plugged in; [`Pca`] and [`FixedProjector`] are
//! provided for convenience and testing.

use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};
use thiserror::Error;

/// Errors raised by projectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("need at least {required} features to project, got {actual}")]
    TooFewFeatures { required: usize, actual: usize },

    #[error("fixed embedding has {embedded} points but the data has {features} features")]
    EmbeddingSize { embedded: usize, features: usize },

    #[error("feature {feature} has a non-finite value for sample {sample}")]
    NonFinite { feature: usize, sample: usize },

    #[error("SVD did not converge")]
    SvdFailed,

    #[error("projection failed: {0}")]
    Other(String),
}

/// Capability: map a `[n_features, n_samples]` matrix to `[n_features, 2]`
pub trait Projector: Send {
    fn fit_transform(&mut self, features: ArrayView2<f64>) -> Result<Array2<f64>, ProjectionError>;

    /// Short name used in log messages
    fn name(&self) -> &str {
        "projector"
    }
}

impl<P: Projector + ?Sized> Projector for Box<P> {
    fn fit_transform(&mut self, features: ArrayView2<f64>) -> Result<Array2<f64>, ProjectionError> {
        (**self).fit_transform(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Iteration cap for the SVD; converged decompositions need far fewer
const SVD_MAX_ITER: usize = 1000;

/// Principal component analysis onto the two leading components
///
/// Features are the observations; samples are the variables. Component
/// signs are fixed so the largest-magnitude loading of each component is
/// positive, making the output deterministic for a given input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pca;

impl Projector for Pca {
    fn fit_transform(&mut self, features: ArrayView2<f64>) -> Result<Array2<f64>, ProjectionError> {
        let (n_features, n_samples) = features.dim();
        if n_features < 2 {
            return Err(ProjectionError::TooFewFeatures {
                required: 2,
                actual: n_features,
            });
        }

        let non_finite = features.indexed_iter().find(|(_, v)| !v.is_finite());
        if let Some(((feature, sample), _)) = non_finite {
            return Err(ProjectionError::NonFinite { feature, sample });
        }

        let mut centered = DMatrix::from_fn(n_features, n_samples, |i, j| features[[i, j]]);
        for mut column in centered.column_iter_mut() {
            let mean = column.mean();
            column.add_scalar_mut(-mean);
        }

        let svd = centered
            .try_svd(true, false, f64::EPSILON, SVD_MAX_ITER)
            .ok_or(ProjectionError::SvdFailed)?;
        let u = svd.u.ok_or(ProjectionError::SvdFailed)?;
        let singular = svd.singular_values;

        let mut order: Vec<usize> = (0..singular.len()).collect();
        order.sort_by(|&a, &b| singular[b].total_cmp(&singular[a]));

        let mut projected = Array2::zeros((n_features, 2));
        for (component, &k) in order.iter().take(2).enumerate() {
            let loading = u.column(k);
            let sign = loading
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .map_or(1.0, |v| if v < 0.0 { -1.0 } else { 1.0 });
            for i in 0..n_features {
                projected[[i, component]] = sign * loading[i] * singular[k];
            }
        }
        Ok(projected)
    }

    fn name(&self) -> &str {
        "pca"
    }
}

/// Returns a precomputed embedding, e.g. from an external tool
#[derive(Debug, Clone)]
pub struct FixedProjector {
    positions: Array2<f64>,
}

impl FixedProjector {
    /// `positions` must have shape `[n_features, 2]`
    pub fn new(positions: Array2<f64>) -> Self {
        Self { positions }
    }
}

impl Projector for FixedProjector {
    fn fit_transform(&mut self, features: ArrayView2<f64>) -> Result<Array2<f64>, ProjectionError> {
        if self.positions.nrows() != features.nrows() {
            return Err(ProjectionError::EmbeddingSize {
                embedded: self.positions.nrows(),
                features: features.nrows(),
            });
        }
        Ok(self.positions.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
