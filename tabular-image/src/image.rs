//! Image batch encodings
//!
//! Transformers build scalar images of shape `(N, H, W)` and re-encode them
//! on request:
//!
//! - **Scalar** - `(N, H, W)`
//! - **Rgb** - `(N, H, W, 3)`, values replicated across channels
//! - **ChannelFirst** - `(N, 3, H, W)`, the layout expected by most
//!   convolutional network frameworks
//!
//! # Coordinate System
//!
//! Arrays use matrix indexing `[row, col]` with `(height, width)` dimensions,
//! matching [`layout_math::PixelCoord`].

use ndarray::{Array3, Array4, ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;

/// Output encoding selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Scalar,
    #[default]
    Rgb,
    #[serde(rename = "pytorch", alias = "channel_first")]
    ChannelFirst,
}

impl FromStr for ImageFormat {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(ImageFormat::Scalar),
            "rgb" => Ok(ImageFormat::Rgb),
            "pytorch" | "channel_first" => Ok(ImageFormat::ChannelFirst),
            other => Err(TransformError::UnknownImageFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Scalar => "scalar",
            ImageFormat::Rgb => "rgb",
            ImageFormat::ChannelFirst => "pytorch",
        })
    }
}

/// A batch of images in one encoding
#[derive(Debug, Clone, PartialEq)]
pub enum ImageBatch {
    /// `(N, H, W)`
    Scalar(Array3<f64>),
    /// `(N, H, W, 3)`
    Rgb(Array4<f64>),
    /// `(N, 3, H, W)`
    ChannelFirst(Array4<f64>),
}

/// Replicate `(N, H, W)` into `(N, H, W, 3)`
pub fn mat_to_rgb(images: &Array3<f64>) -> Array4<f64> {
    let (n, h, w) = images.dim();
    Array4::from_shape_fn((n, h, w, 3), |(i, r, c, _)| images[[i, r, c]])
}

/// Replicate `(N, H, W)` into `(N, 3, H, W)`
pub fn mat_to_channel_first(images: &Array3<f64>) -> Array4<f64> {
    let (n, h, w) = images.dim();
    Array4::from_shape_fn((n, 3, h, w), |(i, _, r, c)| images[[i, r, c]])
}

impl ImageBatch {
    /// Encode scalar images in the requested format
    pub fn encode(images: Array3<f64>, format: ImageFormat) -> Self {
        match format {
            ImageFormat::Scalar => ImageBatch::Scalar(images),
            ImageFormat::Rgb => ImageBatch::Rgb(mat_to_rgb(&images)),
            ImageFormat::ChannelFirst => ImageBatch::ChannelFirst(mat_to_channel_first(&images)),
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            ImageBatch::Scalar(_) => ImageFormat::Scalar,
            ImageBatch::Rgb(_) => ImageFormat::Rgb,
            ImageBatch::ChannelFirst(_) => ImageFormat::ChannelFirst,
        }
    }

    /// Number of images in the batch
    pub fn len(&self) -> usize {
        self.view().shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> Vec<usize> {
        self.view().shape().to_vec()
    }

    /// Dynamic-dimension view of the underlying array
    pub fn view(&self) -> ArrayViewD<'_, f64> {
        match self {
            ImageBatch::Scalar(a) => a.view().into_dyn(),
            ImageBatch::Rgb(a) | ImageBatch::ChannelFirst(a) => a.view().into_dyn(),
        }
    }

    pub fn into_dyn(self) -> ArrayD<f64> {
        match self {
            ImageBatch::Scalar(a) => a.into_dyn(),
            ImageBatch::Rgb(a) | ImageBatch::ChannelFirst(a) => a.into_dyn(),
        }
    }
}
