//! Error types for mapposter-canvas2d.

use thiserror::Error;

/// Result type alias using Canvas2dError.
pub type Canvas2dResult<T> = Result<T, Canvas2dError>;

/// Errors that can occur while drawing on or encoding a canvas.
#[derive(Debug, Error)]
pub enum Canvas2dError {
    /// Invalid canvas dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// Image data did not match its declared dimensions.
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngError(String),

    /// Text rendering error.
    #[error("Text rendering error: {0}")]
    TextError(String),
}

impl From<png::EncodingError> for Canvas2dError {
    fn from(err: png::EncodingError) -> Self {
        Canvas2dError::PngError(err.to_string())
    }
}
