//! tabular-image - Turn tabular samples into images
//!
//! Every feature (column) of a dataset is given a stable pixel on a fixed
//! grid; every sample (row) then becomes an image whose pixels hold the mean
//! of the features mapped there.
//!
//! - [`ImageTransformer`] learns the mapping for one 2D projection
//! - [`MultiRepTransformer`] fuses several projections into one batch
//!
//! # Example
//!
//! ```
//! use layout_math::{Discretization, PixelGrid};
//! use ndarray::array;
//! use tabular_image::{FixedProjector, ImageFormat, ImageTransformer, TransformerConfig};
//!
//! let embedding = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
//! let mut transformer = ImageTransformer::new(
//!     Box::new(FixedProjector::new(embedding)),
//!     TransformerConfig::new(PixelGrid::square(4), Discretization::Assignment),
//! );
//!
//! let x = array![[0.1, 0.2, 0.3, 0.4], [0.5, 0.6, 0.7, 0.8]];
//! let images = transformer.fit_transform(x.view(), ImageFormat::Scalar, 0.0).unwrap();
//! assert_eq!(images.shape(), vec![2, 4, 4]);
//! ```

pub mod collator;
pub mod config;
pub mod error;
pub mod image;
pub mod projection;
pub mod transformer;

pub use collator::{
    prediction_reduction, CollateOptions, CollatedImages, Collation, MultiRepTransformer,
    Reduction, RepresentationConfig,
};
pub use config::{CollatorConfig, TransformerConfig};
pub use error::TransformError;
pub use image::{ImageBatch, ImageFormat};
pub use projection::{FixedProjector, Pca, ProjectionError, Projector};
pub use transformer::{ImageTransformer, TransformOptions};
