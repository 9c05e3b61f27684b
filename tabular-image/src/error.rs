use layout_math::DiscretizeError;
use thiserror::Error;

use crate::projection::ProjectionError;

/// Errors produced by image transformers and the collator.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Unrecognised discretization key.
    #[error("discretization '{0}' not valid, expected 'bin', 'assignment', 'lsa' or 'ags'")]
    UnknownDiscretization(String),

    /// Unrecognised image encoding.
    #[error("'{0}' not accepted for image format, expected 'scalar', 'rgb' or 'pytorch'")]
    UnknownImageFormat(String),

    /// Unrecognised collation ordering.
    #[error("collate method '{0}' not valid, expected 'manifold', 'sample' or 'random'")]
    UnknownCollation(String),

    /// Unrecognised prediction reduction.
    #[error("reduction method '{0}' not valid, expected 'mean' or 'sum'")]
    UnknownReduction(String),

    /// Input feature count differs from the count seen at fit time.
    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch {
        /// Features at fit time.
        expected: usize,
        /// Features in the offending input.
        actual: usize,
    },

    /// Image passed to `inverse_transform` matches no known layout.
    #[error(
        "expected dimensions of (B, {height}, {width}, C) where B and C are optional, but got {actual:?}"
    )]
    ImageShapeMismatch {
        /// Grid height.
        height: usize,
        /// Grid width.
        width: usize,
        /// Shape received.
        actual: Vec<usize>,
    },

    /// Projector output does not hold one 2D point per feature.
    #[error("projector returned shape {actual:?}, expected [{n_features}, 2]")]
    ProjectionShape {
        /// Number of features projected.
        n_features: usize,
        /// Shape received.
        actual: Vec<usize>,
    },

    /// Score and index arrays differ in length.
    #[error("{scores} scores but {index} index entries")]
    IndexLengthMismatch {
        /// Length of the scores.
        scores: usize,
        /// Length of the index.
        index: usize,
    },

    /// Input with no samples, features or representations.
    #[error("input has no {0}")]
    EmptyInput(&'static str),

    /// Operation requires a fitted transformer.
    #[error("transformer has not been fit")]
    NotFitted,

    #[error(transparent)]
    Discretize(DiscretizeError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl From<DiscretizeError> for TransformError {
    fn from(err: DiscretizeError) -> Self {
        match err {
            DiscretizeError::UnknownDiscretization(key) => TransformError::UnknownDiscretization(key),
            other => TransformError::Discretize(other),
        }
    }
}
