//! Multi-representation collation
//!
//! A [`MultiRepTransformer`] owns one [`ImageTransformer`] per configured
//! projector. Every representation turns each sample into an image, and the
//! `representations × samples` images are fused into one batch under a
//! [`Collation`] ordering. The returned index maps every fused image back to
//! the sample it came from, so per-image model scores can be folded back to
//! per-sample scores with [`prediction_reduction`].
//!
//! Representations share no state, so fitting runs them in parallel on
//! the rayon pool.

use layout_math::Discretization;
use ndarray::{concatenate, Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::CollatorConfig;
use crate::error::TransformError;
use crate::image::{ImageBatch, ImageFormat};
use crate::projection::Projector;
use crate::transformer::ImageTransformer;

/// Ordering of fused images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collation {
    /// All samples of representation 1, then representation 2, ...
    #[default]
    #[serde(rename = "manifold", alias = "representation")]
    Representation,
    /// All representations of sample 1, then sample 2, ...
    Sample,
    /// Seeded permutation of the representation-major layout, redrawn on
    /// every call
    Random,
}

impl FromStr for Collation {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manifold" | "representation" => Ok(Collation::Representation),
            "sample" => Ok(Collation::Sample),
            "random" => Ok(Collation::Random),
            other => Err(TransformError::UnknownCollation(other.to_string())),
        }
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Collation::Representation => "manifold",
            Collation::Sample => "sample",
            Collation::Random => "random",
        })
    }
}

/// How per-image scores of one sample are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

impl FromStr for Reduction {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            other => Err(TransformError::UnknownReduction(other.to_string())),
        }
    }
}

/// One projector plus an optional discretization override
pub struct RepresentationConfig {
    pub projector: Box<dyn Projector>,
    pub discretization: Option<Discretization>,
}

impl RepresentationConfig {
    pub fn new(projector: impl Projector + 'static) -> Self {
        Self {
            projector: Box::new(projector),
            discretization: None,
        }
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = Some(discretization);
        self
    }
}

/// Per-call output options for [`MultiRepTransformer::transform`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollateOptions {
    pub format: ImageFormat,
    pub empty_value: f64,
    pub collate: Collation,
}

impl Default for CollateOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Rgb,
            empty_value: 0.0,
            collate: Collation::Representation,
        }
    }
}

/// Fused images and the originating sample of each
#[derive(Debug, Clone, PartialEq)]
pub struct CollatedImages {
    pub images: ImageBatch,
    pub index: Vec<usize>,
}

/// An ordered set of independently fitted representations
#[derive(Debug)]
pub struct MultiRepTransformer {
    config: CollatorConfig,
    transformers: Vec<ImageTransformer>,
    data: Option<Array2<f64>>,
    /// Random collations drawn since the last fit
    shuffles: AtomicU64,
}

fn build_transformers(
    config: &CollatorConfig,
    representations: Vec<RepresentationConfig>,
) -> Vec<ImageTransformer> {
    representations
        .into_iter()
        .map(|rep| {
            ImageTransformer::new(rep.projector, config.transformer_config(rep.discretization))
        })
        .collect()
}

/// Fit every transformer, or none of them.
fn fit_all(
    transformers: &mut [ImageTransformer],
    x: ArrayView2<f64>,
) -> Result<(), TransformError> {
    let layouts = transformers
        .par_iter_mut()
        .map(|transformer| transformer.compute_layout(x))
        .collect::<Result<Vec<_>, _>>()?;
    for (transformer, layout) in transformers.iter_mut().zip(layouts) {
        transformer.install_layout(layout);
    }
    Ok(())
}

/// Fused-batch positions in output order.
///
/// Position `rep * n_samples + sample` addresses the representation-major
/// stack.
fn collation_order(
    collate: Collation,
    n_reps: usize,
    n_samples: usize,
    seed: u64,
) -> Vec<usize> {
    match collate {
        Collation::Representation => (0..n_reps * n_samples).collect(),
        Collation::Sample => (0..n_samples)
            .flat_map(|sample| (0..n_reps).map(move |rep| rep * n_samples + sample))
            .collect(),
        Collation::Random => {
            let mut order: Vec<usize> = (0..n_reps * n_samples).collect();
            order.shuffle(&mut StdRng::seed_from_u64(seed));
            order
        }
    }
}

impl MultiRepTransformer {
    pub fn new(representations: Vec<RepresentationConfig>, config: CollatorConfig) -> Self {
        Self {
            transformers: build_transformers(&config, representations),
            config,
            data: None,
            shuffles: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CollatorConfig {
        &self.config
    }

    /// Output options taken from the collator configuration
    pub fn default_options(&self) -> CollateOptions {
        CollateOptions {
            format: self.config.image_format,
            empty_value: self.config.empty_value,
            collate: self.config.collate,
        }
    }

    /// Number of representations
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn representations(&self) -> &[ImageTransformer] {
        &self.transformers
    }

    pub fn is_fitted(&self) -> bool {
        self.data.is_some()
    }

    /// Fit every representation on `x` and keep a copy of it for
    /// [`extend_fit`](Self::extend_fit).
    ///
    /// If any representation fails, every representation and the retained
    /// data stay as they were.
    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<(), TransformError> {
        if self.transformers.is_empty() {
            return Err(TransformError::EmptyInput("representations"));
        }
        fit_all(&mut self.transformers, x)?;
        self.data = Some(x.to_owned());
        *self.shuffles.get_mut() = 0;
        log::info!(
            "Fit {} representations on {} samples",
            self.transformers.len(),
            x.nrows()
        );
        Ok(())
    }

    /// Fit additional representations on the retained data and append them.
    ///
    /// Existing representations are left untouched.
    pub fn extend_fit(
        &mut self,
        representations: Vec<RepresentationConfig>,
    ) -> Result<(), TransformError> {
        let data = self.data.as_ref().ok_or(TransformError::NotFitted)?;
        let mut added = build_transformers(&self.config, representations);
        fit_all(&mut added, data.view())?;
        log::info!(
            "Extended collator with {} representations ({} total)",
            added.len(),
            self.transformers.len() + added.len()
        );
        self.transformers.append(&mut added);
        Ok(())
    }

    /// Images from every representation, fused under `options.collate`
    pub fn transform(
        &self,
        x: ArrayView2<f64>,
        options: &CollateOptions,
    ) -> Result<CollatedImages, TransformError> {
        if !self.is_fitted() {
            return Err(TransformError::NotFitted);
        }
        let n_samples = x.nrows();

        let per_rep = self
            .transformers
            .iter()
            .map(|t| t.scalar_images(x, options.empty_value))
            .collect::<Result<Vec<Array3<f64>>, _>>()?;
        let views: Vec<ArrayView3<f64>> = per_rep.iter().map(|a| a.view()).collect();
        let stacked = concatenate(Axis(0), &views)?;

        // Each random collation draws a fresh permutation, reproducible from the seed
        let seed = match options.collate {
            Collation::Random => self
                .config
                .seed
                .wrapping_add(self.shuffles.fetch_add(1, Ordering::Relaxed)),
            _ => self.config.seed,
        };
        let order = collation_order(options.collate, self.transformers.len(), n_samples, seed);
        let images = stacked.select(Axis(0), &order);
        let index = order.iter().map(|&p| p % n_samples).collect();

        log::debug!(
            "Collated {} images by {} from {} representations",
            order.len(),
            options.collate,
            self.transformers.len()
        );

        Ok(CollatedImages {
            images: ImageBatch::encode(images, options.format),
            index,
        })
    }

    pub fn fit_transform(
        &mut self,
        x: ArrayView2<f64>,
        options: &CollateOptions,
    ) -> Result<CollatedImages, TransformError> {
        self.fit(x)?;
        self.transform(x, options)
    }
}

/// Fold per-image scores back to one score per sample.
///
/// # Arguments
/// * `scores` - One score per fused image
/// * `index` - Originating sample of each image, as returned by
///   [`MultiRepTransformer::transform`]
/// * `reduction` - Mean or sum over the images of a sample
///
/// # Returns
/// One value per distinct sample index, in ascending index order.
pub fn prediction_reduction(
    scores: ArrayView1<f64>,
    index: &[usize],
    reduction: Reduction,
) -> Result<Array1<f64>, TransformError> {
    if scores.len() != index.len() {
        return Err(TransformError::IndexLengthMismatch {
            scores: scores.len(),
            index: index.len(),
        });
    }

    let mut totals: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
    for (&score, &sample) in scores.iter().zip(index) {
        let entry = totals.entry(sample).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    Ok(totals
        .into_values()
        .map(|(sum, count)| match reduction {
            Reduction::Mean => sum / count as f64,
            Reduction::Sum => sum,
        })
        .collect())
}
