//! Style types and enums for drawing operations.

use crate::pattern::CanvasPattern;
use std::sync::Arc;

/// Fill style for drawing operations.
#[derive(Debug, Clone)]
pub enum FillStyle {
    /// Solid color fill.
    Color(tiny_skia::Color),
    /// Repeating image pattern (used for background textures).
    Pattern(Arc<CanvasPattern>),
}

impl Default for FillStyle {
    fn default() -> Self {
        // Default is opaque black
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

/// Text alignment relative to the anchor x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the left of the anchor point.
    #[default]
    Left,
    /// Align text to the right of the anchor point.
    Right,
    /// Center text on the anchor point.
    Center,
}

/// Vertical anchor for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// The anchor y is the top of the line box.
    Top,
    /// The anchor y is the middle of the line box.
    Middle,
    /// The anchor y is the alphabetic baseline.
    #[default]
    Alphabetic,
    /// The anchor y is the bottom of the line box.
    Bottom,
}
