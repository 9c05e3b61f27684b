//! Common utilities for tabular-image tests

#![allow(dead_code)]

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tabular_image::{ProjectionError, Projector};

/// Uniform samples in `[0, 1)`, shape `[n_samples, n_features]`
pub fn random_samples(n_samples: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n_samples, n_features), |_| rng.gen::<f64>())
}

/// Random 2D embedding with one point per feature
pub fn random_embedding(n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n_features, 2), |_| rng.gen_range(-5.0..5.0))
}

/// Projector returning a fixed embedding and counting how often it runs
#[derive(Debug, Clone)]
pub struct CountingProjector {
    embedding: Array2<f64>,
    calls: Arc<AtomicUsize>,
}

impl CountingProjector {
    pub fn new(embedding: Array2<f64>) -> Self {
        Self {
            embedding,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn random(n_features: usize, seed: u64) -> Self {
        Self::new(random_embedding(n_features, seed))
    }

    /// Shared handle to the call counter
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Projector for CountingProjector {
    fn fit_transform(&mut self, features: ArrayView2<f64>) -> Result<Array2<f64>, ProjectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if features.nrows() != self.embedding.nrows() {
            return Err(ProjectionError::EmbeddingSize {
                embedded: self.embedding.nrows(),
                features: features.nrows(),
            });
        }
        Ok(self.embedding.clone())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
