//! Single-representation tabular-to-image transformer
//!
//! Fitting projects every feature to a 2D point, rotates the point set to
//! its minimum bounding rectangle and discretizes the oriented positions
//! onto the pixel grid. The oriented positions are cached so that
//! [`ImageTransformer::set_pixels`] can recompute the mapping for a new grid
//! without running the projector again.
//!
//! Each sample then becomes an image whose pixel values are the mean of the
//! features mapped to that pixel.

use layout_math::{align_points, BoundingRectangle, PixelCoord, PixelGrid};
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView2, ArrayViewD, Ix2, Ix3, Ix4};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::TransformerConfig;
use crate::error::TransformError;
use crate::image::{ImageBatch, ImageFormat};
use crate::projection::Projector;

/// Output encoding and fill value for [`ImageTransformer::transform_with`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub format: ImageFormat,
    /// Value for pixels with no feature mapped to them
    pub empty_value: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Rgb,
            empty_value: 0.0,
        }
    }
}

/// State produced by a successful fit
#[derive(Debug, Clone)]
pub(crate) struct FittedLayout {
    oriented: Array2<f64>,
    rectangle: BoundingRectangle,
    coords: Vec<PixelCoord>,
}

/// Maps the features of a tabular dataset onto a fixed pixel grid
pub struct ImageTransformer {
    projector: Box<dyn Projector>,
    config: TransformerConfig,
    fitted: Option<FittedLayout>,
}

impl fmt::Debug for ImageTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageTransformer")
            .field("projector", &self.projector.name())
            .field("config", &self.config)
            .field("n_features", &self.fitted.as_ref().map(|l| l.coords.len()))
            .finish()
    }
}

impl ImageTransformer {
    pub fn new(projector: Box<dyn Projector>, config: TransformerConfig) -> Self {
        Self {
            projector,
            config,
            fitted: None,
        }
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    pub fn projector_name(&self) -> &str {
        self.projector.name()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Current pixel grid
    pub fn pixels(&self) -> PixelGrid {
        self.config.pixels
    }

    fn layout(&self) -> Result<&FittedLayout, TransformError> {
        self.fitted.as_ref().ok_or(TransformError::NotFitted)
    }

    /// Number of features seen at fit time
    pub fn n_features(&self) -> Result<usize, TransformError> {
        Ok(self.layout()?.coords.len())
    }

    /// Pixel assigned to each feature, in feature order
    pub fn coords(&self) -> Result<&[PixelCoord], TransformError> {
        Ok(&self.layout()?.coords)
    }

    /// Projected feature positions after alignment, shape `[n_features, 2]`
    pub fn oriented_positions(&self) -> Result<ArrayView2<'_, f64>, TransformError> {
        Ok(self.layout()?.oriented.view())
    }

    pub fn bounding_rectangle(&self) -> Result<&BoundingRectangle, TransformError> {
        Ok(&self.layout()?.rectangle)
    }

    /// Learn the feature-to-pixel mapping.
    ///
    /// # Arguments
    /// * `x` - Data of shape `[n_samples, n_features]`
    ///
    /// On failure any previous mapping is kept.
    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<(), TransformError> {
        let layout = self.compute_layout(x)?;
        self.install_layout(layout);
        Ok(())
    }

    /// Run the projector and discretizer without touching the stored mapping
    pub(crate) fn compute_layout(
        &mut self,
        x: ArrayView2<f64>,
    ) -> Result<FittedLayout, TransformError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(TransformError::EmptyInput("samples"));
        }
        if n_features == 0 {
            return Err(TransformError::EmptyInput("features"));
        }

        let positions = self.projector.fit_transform(x.t())?;
        if positions.dim() != (n_features, 2) {
            return Err(TransformError::ProjectionShape {
                n_features,
                actual: positions.shape().to_vec(),
            });
        }

        let (oriented, rectangle) = align_points(positions.view());
        let coords = self
            .config
            .discretizer()
            .discretize(oriented.view(), self.config.pixels)?;

        log::info!(
            "Fit {} features from {} samples with {} onto {} grid ({})",
            n_features,
            n_samples,
            self.projector.name(),
            self.config.pixels,
            self.config.discretization
        );

        Ok(FittedLayout {
            oriented,
            rectangle,
            coords,
        })
    }

    pub(crate) fn install_layout(&mut self, layout: FittedLayout) {
        self.fitted = Some(layout);
    }

    /// Change the grid, recomputing the mapping from cached positions.
    ///
    /// On failure the previous grid and mapping are kept.
    pub fn set_pixels(&mut self, pixels: impl Into<PixelGrid>) -> Result<(), TransformError> {
        let pixels = pixels.into();
        if let Some(layout) = self.fitted.as_mut() {
            let coords = self
                .config
                .discretizer()
                .discretize(layout.oriented.view(), pixels)?;
            log::info!(
                "Remapped {} features from {} to {} grid",
                coords.len(),
                self.config.pixels,
                pixels
            );
            layout.coords = coords;
        }
        self.config.pixels = pixels;
        Ok(())
    }

    /// Features grouped by the pixel they were mapped to
    fn pixel_groups(layout: &FittedLayout) -> BTreeMap<PixelCoord, Vec<usize>> {
        let mut groups: BTreeMap<PixelCoord, Vec<usize>> = BTreeMap::new();
        for (feature, coord) in layout.coords.iter().enumerate() {
            groups.entry(*coord).or_default().push(feature);
        }
        groups
    }

    /// Scalar images `(n_samples, H, W)`
    pub(crate) fn scalar_images(
        &self,
        x: ArrayView2<f64>,
        empty_value: f64,
    ) -> Result<Array3<f64>, TransformError> {
        let layout = self.layout()?;
        let expected = layout.coords.len();
        if x.ncols() != expected {
            return Err(TransformError::FeatureCountMismatch {
                expected,
                actual: x.ncols(),
            });
        }

        let (height, width) = self.config.pixels.to_tuple();
        let mut images = Array3::from_elem((x.nrows(), height, width), empty_value);
        for (coord, features) in Self::pixel_groups(layout) {
            let count = features.len() as f64;
            for (sample, row) in x.rows().into_iter().enumerate() {
                let sum: f64 = features.iter().map(|&f| row[f]).sum();
                images[[sample, coord.row, coord.col]] = sum / count;
            }
        }
        Ok(images)
    }

    /// Convert samples to images.
    ///
    /// # Arguments
    /// * `x` - Data of shape `[n_samples, n_features]`
    /// * `format` - Output encoding
    /// * `empty_value` - Value for pixels with no feature
    pub fn transform(
        &self,
        x: ArrayView2<f64>,
        format: ImageFormat,
        empty_value: f64,
    ) -> Result<ImageBatch, TransformError> {
        let images = self.scalar_images(x, empty_value)?;
        Ok(ImageBatch::encode(images, format))
    }

    pub fn transform_with(
        &self,
        x: ArrayView2<f64>,
        options: &TransformOptions,
    ) -> Result<ImageBatch, TransformError> {
        self.transform(x, options.format, options.empty_value)
    }

    pub fn fit_transform(
        &mut self,
        x: ArrayView2<f64>,
        format: ImageFormat,
        empty_value: f64,
    ) -> Result<ImageBatch, TransformError> {
        self.fit(x)?;
        self.transform(x, format, empty_value)
    }

    /// Read feature values back out of images.
    ///
    /// Accepted layouts, tried in order:
    /// `(H, W)` → `(F)`, `(B, H, W)` → `(B, F)`, `(H, W, C)` → `(F, C)`,
    /// `(B, H, W, C)` → `(B, F, C)`, `(B, C, H, W)` → `(B, C, F)`.
    ///
    /// Features sharing a pixel all receive that pixel's value.
    pub fn inverse_transform(&self, img: ArrayViewD<f64>) -> Result<ArrayD<f64>, TransformError> {
        let coords = &self.layout()?.coords;
        let (h, w) = self.config.pixels.to_tuple();
        let n = coords.len();
        let shape = img.shape().to_vec();

        let values = match shape[..] {
            [hh, ww] if (hh, ww) == (h, w) => {
                let img = img.into_dimensionality::<Ix2>()?;
                Array1::from_shape_fn(n, |f| img[[coords[f].row, coords[f].col]]).into_dyn()
            }
            [b, hh, ww] if (hh, ww) == (h, w) => {
                let img = img.into_dimensionality::<Ix3>()?;
                Array2::from_shape_fn((b, n), |(s, f)| img[[s, coords[f].row, coords[f].col]])
                    .into_dyn()
            }
            [hh, ww, c] if (hh, ww) == (h, w) => {
                let img = img.into_dimensionality::<Ix3>()?;
                Array2::from_shape_fn((n, c), |(f, ch)| img[[coords[f].row, coords[f].col, ch]])
                    .into_dyn()
            }
            [b, hh, ww, c] if (hh, ww) == (h, w) => {
                let img = img.into_dimensionality::<Ix4>()?;
                Array3::from_shape_fn((b, n, c), |(s, f, ch)| {
                    img[[s, coords[f].row, coords[f].col, ch]]
                })
                .into_dyn()
            }
            [b, c, hh, ww] if (hh, ww) == (h, w) => {
                let img = img.into_dimensionality::<Ix4>()?;
                Array3::from_shape_fn((b, c, n), |(s, ch, f)| {
                    img[[s, ch, coords[f].row, coords[f].col]]
                })
                .into_dyn()
            }
            _ => {
                return Err(TransformError::ImageShapeMismatch {
                    height: h,
                    width: w,
                    actual: img.shape().to_vec(),
                })
            }
        };
        Ok(values)
    }

    /// Number of features mapped to each pixel, shape `(H, W)`
    pub fn feature_density_matrix(&self) -> Result<Array2<usize>, TransformError> {
        let layout = self.layout()?;
        let mut density = Array2::zeros(self.config.pixels.to_tuple());
        for coord in &layout.coords {
            density[[coord.row, coord.col]] += 1;
        }
        Ok(density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::FixedProjector;
    use layout_math::Discretization;
    use ndarray::{array, Array4};

    /// Four features on the corners of a unit square map one-to-one onto a 2×2 grid
    fn corner_transformer() -> ImageTransformer {
        let embedding = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        ImageTransformer::new(
            Box::new(FixedProjector::new(embedding)),
            TransformerConfig::new(PixelGrid::square(2), Discretization::Bin),
        )
    }

    fn samples() -> Array2<f64> {
        array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]
    }

    #[test]
    fn test_not_fitted() {
        let t = corner_transformer();
        assert!(!t.is_fitted());
        assert!(matches!(
            t.transform(samples().view(), ImageFormat::Scalar, 0.0),
            Err(TransformError::NotFitted)
        ));
        assert!(matches!(t.coords(), Err(TransformError::NotFitted)));
        assert!(matches!(
            t.feature_density_matrix(),
            Err(TransformError::NotFitted)
        ));
    }

    #[test]
    fn test_corner_layout() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        assert_eq!(
            t.coords().unwrap(),
            &[
                PixelCoord::new(0, 0),
                PixelCoord::new(0, 1),
                PixelCoord::new(1, 0),
                PixelCoord::new(1, 1)
            ]
        );
        assert_eq!(t.n_features().unwrap(), 4);
    }

    #[test]
    fn test_scalar_round_trip() {
        let mut t = corner_transformer();
        let x = samples();
        let batch = t.fit_transform(x.view(), ImageFormat::Scalar, 0.0).unwrap();
        let ImageBatch::Scalar(images) = &batch else {
            panic!("expected scalar batch");
        };
        assert_eq!(images.index_axis(ndarray::Axis(0), 0), array![[1.0, 2.0], [3.0, 4.0]]);

        let recovered = t.inverse_transform(batch.view()).unwrap();
        assert_eq!(recovered.shape(), &[2, 4]);
        assert_eq!(recovered, x.into_dyn());
    }

    #[test]
    fn test_shared_pixel_takes_mean_and_fill() {
        // Square hull keeps the identity rotation; features 0 and 1 share (0, 0)
        let embedding = array![[0.0, 0.0], [0.1, 0.1], [1.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
        let mut t = ImageTransformer::new(
            Box::new(FixedProjector::new(embedding)),
            TransformerConfig::new(PixelGrid::square(3), Discretization::Bin),
        );
        let x = array![[2.0, 4.0, 9.0, 5.0, 6.0]];
        t.fit(x.view()).unwrap();
        let batch = t.transform(x.view(), ImageFormat::Scalar, -1.0).unwrap();
        let ImageBatch::Scalar(images) = batch else {
            panic!("expected scalar batch");
        };
        assert_eq!(images[[0, 0, 0]], 3.0);
        assert_eq!(images[[0, 2, 2]], 9.0);
        assert_eq!(images[[0, 0, 2]], 5.0);
        assert_eq!(images[[0, 2, 0]], 6.0);
        assert_eq!(images[[0, 1, 1]], -1.0);

        let density = t.feature_density_matrix().unwrap();
        assert_eq!(density, array![[2, 0, 1], [0, 0, 0], [1, 0, 1]]);
        assert_eq!(density.sum(), 5);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        let wrong = Array2::<f64>::zeros((1, 3));
        let err = t.transform(wrong.view(), ImageFormat::Rgb, 0.0).unwrap_err();
        assert!(matches!(
            err,
            TransformError::FeatureCountMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_projection_shape_checked() {
        let mut t = ImageTransformer::new(
            Box::new(FixedProjector::new(Array2::zeros((4, 3)))),
            TransformerConfig::new(PixelGrid::square(2), Discretization::Bin),
        );
        let err = t.fit(samples().view()).unwrap_err();
        assert!(matches!(err, TransformError::ProjectionShape { n_features: 4, .. }));
        assert!(!t.is_fitted());
    }

    #[test]
    fn test_failed_refit_keeps_layout() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        let before = t.coords().unwrap().to_vec();

        let wider = Array2::<f64>::zeros((2, 5));
        assert!(matches!(
            t.fit(wider.view()),
            Err(TransformError::Projection(_))
        ));
        assert_eq!(t.n_features().unwrap(), 4);
        assert_eq!(t.coords().unwrap(), before.as_slice());
    }

    #[test]
    fn test_empty_input() {
        let mut t = corner_transformer();
        let err = t.fit(Array2::<f64>::zeros((0, 4)).view()).unwrap_err();
        assert!(matches!(err, TransformError::EmptyInput("samples")));
    }

    #[test]
    fn test_inverse_layouts() {
        let mut t = corner_transformer();
        let x = samples();
        t.fit(x.view()).unwrap();

        let single = array![[1.0, 2.0], [3.0, 4.0]];
        let out = t.inverse_transform(single.view().into_dyn()).unwrap();
        assert_eq!(out, array![1.0, 2.0, 3.0, 4.0].into_dyn());

        let rgb = t.transform(x.view(), ImageFormat::Rgb, 0.0).unwrap();
        let out = t.inverse_transform(rgb.view()).unwrap();
        assert_eq!(out.shape(), &[2, 4, 3]);
        assert_eq!(out[&[1usize, 2, 1][..]], 7.0);

        let one_rgb = rgb.view().index_axis_move(ndarray::Axis(0), 0);
        let out = t.inverse_transform(one_rgb).unwrap();
        assert_eq!(out.shape(), &[4, 3]);
        assert_eq!(out[&[3usize, 0][..]], 4.0);

        let cf = t.transform(x.view(), ImageFormat::ChannelFirst, 0.0).unwrap();
        let out = t.inverse_transform(cf.view()).unwrap();
        assert_eq!(out.shape(), &[2, 3, 4]);
        assert_eq!(out[&[0usize, 2, 1][..]], 2.0);
    }

    #[test]
    fn test_inverse_bad_shape() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        let bad = Array4::<f64>::zeros((1, 3, 3, 3));
        let err = t.inverse_transform(bad.view().into_dyn()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ImageShapeMismatch { height: 2, width: 2, ref actual } if actual == &[1, 3, 3, 3]
        ));
        assert!(err.to_string().contains("(B, 2, 2, C)"));
    }

    #[test]
    fn test_set_pixels_before_fit() {
        let mut t = corner_transformer();
        t.set_pixels(PixelGrid::new(3, 5)).unwrap();
        assert_eq!(t.pixels(), PixelGrid::new(3, 5));
        assert!(!t.is_fitted());
    }

    #[test]
    fn test_set_pixels_failure_keeps_layout() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        let before = t.coords().unwrap().to_vec();
        assert!(t.set_pixels(PixelGrid::new(0, 4)).is_err());
        assert_eq!(t.pixels(), PixelGrid::square(2));
        assert_eq!(t.coords().unwrap(), before.as_slice());
    }

    #[test]
    fn test_transform_with_defaults_to_rgb() {
        let mut t = corner_transformer();
        t.fit(samples().view()).unwrap();
        let batch = t
            .transform_with(samples().view(), &TransformOptions::default())
            .unwrap();
        assert_eq!(batch.format(), ImageFormat::Rgb);
        assert_eq!(batch.shape(), vec![2, 2, 2, 3]);
    }
}
