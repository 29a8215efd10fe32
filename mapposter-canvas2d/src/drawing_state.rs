//! Drawing state that can be saved and restored.

use crate::geometry::ShadowParams;
use crate::style::{FillStyle, LineJoin, TextAlign, TextBaseline};
use crate::text::FontSpec;
use tiny_skia::Transform;

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current stroke style.
    pub stroke_style: FillStyle,
    /// Current line width.
    pub line_width: f32,
    /// Current line join style.
    pub line_join: LineJoin,
    /// Current miter limit.
    pub miter_limit: f32,
    /// Current font.
    pub font: FontSpec,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current text baseline.
    pub text_baseline: TextBaseline,
    /// Letter spacing for text rendering (in pixels).
    pub letter_spacing: f32,
    /// Current global alpha.
    pub global_alpha: f32,
    /// Current transform matrix.
    pub transform: Transform,
    /// Clipping path (if any), already in device space.
    pub clip_path: Option<tiny_skia::Path>,
    /// Shadow cast by subsequent fills (if any).
    pub shadow: Option<ShadowParams>,
    /// Whether image smoothing is enabled.
    pub image_smoothing_enabled: bool,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            font: FontSpec::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            letter_spacing: 0.0,
            global_alpha: 1.0,
            transform: Transform::identity(),
            clip_path: None,
            shadow: None,
            image_smoothing_enabled: true,
        }
    }
}
