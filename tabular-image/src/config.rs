use layout_math::{Discretization, Discretizer, PixelGrid};
use serde::{Deserialize, Serialize};

use crate::collator::Collation;
use crate::image::ImageFormat;

/// Configuration for a single-representation image transformer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    /// Image size; a single integer means a square grid
    pub pixels: PixelGrid,
    /// Strategy for mapping feature positions to pixels
    pub discretization: Discretization,
    /// Seed for clustering and greedy tie-breaking
    pub seed: u64,
}

impl TransformerConfig {
    pub fn new(pixels: impl Into<PixelGrid>, discretization: Discretization) -> Self {
        Self {
            pixels: pixels.into(),
            discretization,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn discretizer(&self) -> Discretizer {
        Discretizer::new(self.discretization, self.seed)
    }
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            pixels: PixelGrid::default(),
            discretization: Discretization::Bin,
            seed: 0,
        }
    }
}

/// Configuration for the multi-representation collator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollatorConfig {
    /// Image size shared by every representation
    pub pixels: PixelGrid,
    /// Discretization for representations that do not name their own
    pub discretization: Discretization,
    /// Seed for clustering, greedy tie-breaking and random collation
    pub seed: u64,
    /// Default output encoding
    pub image_format: ImageFormat,
    /// Value for pixels with no feature mapped to them
    pub empty_value: f64,
    /// Default ordering of fused images
    pub collate: Collation,
}

impl CollatorConfig {
    /// Transformer configuration for one representation
    pub fn transformer_config(&self, discretization: Option<Discretization>) -> TransformerConfig {
        TransformerConfig {
            pixels: self.pixels,
            discretization: discretization.unwrap_or(self.discretization),
            seed: self.seed,
        }
    }
}

impl Default for CollatorConfig {
    fn default() -> Self {
        Self {
            pixels: PixelGrid::default(),
            discretization: Discretization::Bin,
            seed: 0,
            image_format: ImageFormat::Rgb,
            empty_value: 0.0,
            collate: Collation::Representation,
        }
    }
}
