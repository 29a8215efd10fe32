//! Repeating image patterns for fills.

use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::CanvasImageDataRef;
use tiny_skia::{FilterQuality, Pixmap, Shader, SpreadMode, Transform};

/// Maximum pattern tile size (4096x4096).
const MAX_PATTERN_SIZE: u32 = 4096;

/// A tile that repeats in both directions when used as a fill style.
#[derive(Debug, Clone)]
pub struct CanvasPattern {
    pixmap: Pixmap,
}

impl CanvasPattern {
    /// Create a pattern from non-premultiplied RGBA tile data.
    pub fn new(image: &CanvasImageDataRef<'_>) -> Canvas2dResult<Self> {
        if image.width == 0 || image.height == 0 {
            return Err(Canvas2dError::InvalidImageData(
                "Pattern dimensions must be non-zero".to_string(),
            ));
        }
        if image.width > MAX_PATTERN_SIZE || image.height > MAX_PATTERN_SIZE {
            return Err(Canvas2dError::InvalidImageData(format!(
                "Pattern size {}x{} exceeds maximum {}x{}",
                image.width, image.height, MAX_PATTERN_SIZE, MAX_PATTERN_SIZE
            )));
        }
        let pixmap = image.to_pixmap().ok_or_else(|| {
            Canvas2dError::InvalidImageData(format!(
                "Data length {} does not match {}x{} RGBA image",
                image.data.len(),
                image.width,
                image.height
            ))
        })?;
        Ok(Self { pixmap })
    }

    /// Get the tile width.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Get the tile height.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Build a repeating shader. The tile is laid out in user space, so it
    /// scales with the current transform.
    pub(crate) fn shader(&self, transform: Transform, opacity: f32) -> Shader<'_> {
        tiny_skia::Pattern::new(
            self.pixmap.as_ref(),
            SpreadMode::Repeat,
            FilterQuality::Bilinear,
            opacity,
            transform,
        )
    }
}
