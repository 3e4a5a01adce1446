//! Error types for pctmatch.

use thiserror::Error;

/// Result alias for pctmatch operations.
pub type PctMatchResult<T> = std::result::Result<T, PctMatchError>;

/// Errors that can occur while loading templates, fetching frames or
/// running the detection pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PctMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Channel count is not 1 (grayscale) or 3 (color).
    #[error("unsupported channel count: {channels}")]
    UnsupportedChannels { channels: usize },
    /// The backing buffer is shorter than the declared shape requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The row stride is shorter than one row of pixels.
    #[error("invalid stride {stride} for row length {row_len}")]
    InvalidStride { row_len: usize, stride: usize },
    /// Two images that must agree on channel count do not.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },
    /// A template mask does not have the shape of its image.
    #[error(
        "mask shape {mask_width}x{mask_height} does not match image {img_width}x{img_height}"
    )]
    MaskMismatch {
        mask_width: usize,
        mask_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The template does not fit inside the searched region.
    #[error("template {tpl_width}x{tpl_height} exceeds search region {img_width}x{img_height}")]
    TemplateExceedsImage {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A row band lies outside the frame.
    #[error("roi rows {y_min}..={y_max} out of bounds for frame height {height}")]
    RoiOutOfBounds {
        y_min: usize,
        y_max: usize,
        height: usize,
    },
    /// The template cannot produce a meaningful correlation score.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// The template asset could not be read or decoded.
    #[error("failed to load template {path}: {reason}")]
    TemplateLoad { path: String, reason: String },
    /// The frame source has no frame at the requested index.
    #[error("end of stream: frame {frame} requested, source has {frame_count}")]
    EndOfStream { frame: usize, frame_count: usize },
    /// The frame source failed to decode a frame.
    #[error("failed to decode frame {frame}: {reason}")]
    Decode { frame: usize, reason: String },
    /// No calibration sample exceeded the confidence threshold.
    #[error("calibration failed: none of {samples} samples exceeded confidence {threshold}")]
    CalibrationFailed { samples: usize, threshold: f32 },
    /// Processing was interrupted by a stop request.
    #[error("stopped by request")]
    Stopped,
}
