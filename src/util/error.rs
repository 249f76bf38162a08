//! Error types for partscore.

use std::fmt;
use thiserror::Error;

/// Result alias for partscore operations.
pub type PartScoreResult<T> = std::result::Result<T, PartScoreError>;

/// Spatial axis of a deformation coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal (column) displacement.
    X,
    /// Vertical (row) displacement.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Broad class of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call was rejected before any computation started.
    Precondition,
    /// An output buffer could not be allocated.
    ResourceExhausted,
    /// Reading or writing an image file failed.
    Io,
}

/// Errors that can occur when running partscore algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PartScoreError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width, height or channel count is zero or overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than one row of samples.
    #[error("invalid stride {stride} for row length {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer does not hold the declared extent.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the grid.
    #[error(
        "roi {width}x{height} at ({x}, {y}) is outside the {img_width}x{img_height} grid"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template is not strictly smaller than the image on both axes.
    #[error(
        "template {tpl_width}x{tpl_height} must be smaller than image {img_width}x{img_height}"
    )]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Image and template channel counts differ.
    #[error("channel mismatch: image has {image}, template has {template}")]
    ChannelMismatch { image: usize, template: usize },
    /// The operation only accepts a specific channel count.
    #[error("unsupported channel count {got}, expected {expected}")]
    UnsupportedChannels { expected: usize, got: usize },
    /// Quadratic deformation coefficient would make the penalty concave.
    #[error("negative quadratic coefficient on axis {axis}: {value}")]
    NegativeQuadratic { axis: Axis, value: f64 },
    /// A deformation coefficient is NaN or infinite.
    #[error("non-finite coefficient {name}: {value}")]
    NonFiniteCoefficient { name: &'static str, value: f64 },
    /// A cost sample is NaN; infinities are allowed.
    #[error("cost at ({x}, {y}) is NaN")]
    NanCost { x: usize, y: usize },
    /// Caller-provided buffers do not match the input length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    /// An output field could not be allocated.
    #[error("allocation of {elements} elements failed")]
    AllocationFailed { elements: usize },
    /// Image decoding or encoding failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}

impl PartScoreError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PartScoreError::AllocationFailed { .. } => ErrorKind::ResourceExhausted,
            PartScoreError::ImageIo { .. } => ErrorKind::Io,
            _ => ErrorKind::Precondition,
        }
    }
}
