//! Off-screen drawing context.

mod drawing;
mod image_ops;
mod path_ops;
mod shadow;
mod text_rendering;
mod transform;

use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_config::{font_config_to_fontdb, FontConfig, ResolvedFontConfig};
use crate::geometry::{CanvasColor, ShadowParams};
use crate::pattern::CanvasPattern;
use crate::style::{FillStyle, LineJoin};
use cosmic_text::{FontSystem, SwashCache};
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Maximum surface dimension (same as Chrome).
pub(crate) const MAX_DIMENSION: u32 = 32767;

/// An off-screen 2D drawing surface.
///
/// Each surface owns its pixel buffer and font system. Surfaces are never
/// shared: callers create one per render and drop it once the pixels have
/// been read back.
pub struct Canvas2dContext {
    /// Width of the surface in pixels.
    pub(crate) width: u32,
    /// Height of the surface in pixels.
    pub(crate) height: u32,
    /// Pixel buffer.
    pub(crate) pixmap: Pixmap,
    /// Font system for text rendering.
    pub(crate) font_system: FontSystem,
    /// Swash cache for glyph outlines.
    pub(crate) swash_cache: SwashCache,
    /// Current drawing state.
    pub(crate) state: DrawingState,
    /// Stack of saved drawing states.
    state_stack: Vec<DrawingState>,
    /// Current path builder (device-space coordinates).
    pub(crate) path_builder: tiny_skia::PathBuilder,
    /// Current path position.
    pub(crate) current_x: f32,
    pub(crate) current_y: f32,
    /// Subpath start position (for close_path).
    pub(crate) subpath_start_x: f32,
    pub(crate) subpath_start_y: f32,
    /// Whether the path has a current point.
    pub(crate) has_current_point: bool,
    /// Whether font hinting is enabled for text rendering.
    pub(crate) hinting_enabled: bool,
}

impl std::fmt::Debug for Canvas2dContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas2dContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("saved_states", &self.state_stack.len())
            .finish()
    }
}

impl Canvas2dContext {
    /// Create a new surface with the specified dimensions.
    ///
    /// Uses `FontConfig::default()`, which scans system fonts. Prefer
    /// [`Canvas2dContext::with_resolved`] when creating many surfaces.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        let config = FontConfig::default();
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled)
    }

    /// Create a new surface with the specified dimensions and font configuration.
    pub fn with_config(width: u32, height: u32, config: FontConfig) -> Canvas2dResult<Self> {
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled)
    }

    /// Create a new surface using a pre-resolved font configuration.
    ///
    /// The cached font database is cloned rather than rebuilt, avoiding a
    /// repeated system font scan.
    pub fn with_resolved(
        width: u32,
        height: u32,
        resolved: &ResolvedFontConfig,
    ) -> Canvas2dResult<Self> {
        Self::new_internal(width, height, resolved.fontdb.clone(), resolved.hinting_enabled)
    }

    fn new_internal(
        width: u32,
        height: u32,
        font_db: fontdb::Database,
        hinting_enabled: bool,
    ) -> Canvas2dResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Canvas2dError::InvalidDimensions { width, height });
        }

        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;

        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), font_db);
        let swash_cache = SwashCache::new();

        log::debug!(target: "canvas", "new surface {}x{}", width, height);

        Ok(Self {
            width,
            height,
            pixmap,
            font_system,
            swash_cache,
            state: DrawingState::default(),
            state_stack: Vec::new(),
            path_builder: tiny_skia::PathBuilder::new(),
            current_x: 0.0,
            current_y: 0.0,
            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
            has_current_point: false,
            hinting_enabled,
        })
    }

    /// Get surface width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get surface height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Save the current drawing state.
    pub fn save(&mut self) {
        log::debug!(target: "canvas", "save");
        self.state_stack.push(self.state.clone());
    }

    /// Restore the previously saved drawing state.
    pub fn restore(&mut self) {
        log::debug!(target: "canvas", "restore");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    // --- Style setters ---

    /// Set the fill style from a CSS color string.
    pub fn set_fill_style(&mut self, style: &str) -> Canvas2dResult<()> {
        let color = parse_color(style)?;
        self.state.fill_style = FillStyle::Color(color);
        Ok(())
    }

    /// Set the fill style from a CanvasColor.
    pub fn set_fill_style_color(&mut self, color: CanvasColor) {
        self.state.fill_style = FillStyle::Color(color.into());
    }

    /// Set the fill style to a repeating pattern.
    pub fn set_fill_style_pattern(&mut self, pattern: Arc<CanvasPattern>) {
        self.state.fill_style = FillStyle::Pattern(pattern);
    }

    /// Set the stroke style from a CSS color string.
    pub fn set_stroke_style(&mut self, style: &str) -> Canvas2dResult<()> {
        let color = parse_color(style)?;
        self.state.stroke_style = FillStyle::Color(color);
        Ok(())
    }

    /// Set the stroke style from a CanvasColor.
    pub fn set_stroke_style_color(&mut self, color: CanvasColor) {
        self.state.stroke_style = FillStyle::Color(color.into());
    }

    /// Set the line width. Non-finite or non-positive values are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    /// Set the line join style.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    /// Set the global alpha. Values outside [0.0, 1.0] are ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    /// Set the shadow cast by subsequent fills, or `None` to disable it.
    pub fn set_shadow(&mut self, shadow: Option<ShadowParams>) {
        self.state.shadow = shadow.filter(|s| s.is_visible() && s.blur.is_finite() && s.blur >= 0.0);
    }

    /// Set whether image smoothing is enabled.
    pub fn set_image_smoothing_enabled(&mut self, enabled: bool) {
        self.state.image_smoothing_enabled = enabled;
    }

    /// Get the filter quality for image rendering based on smoothing settings.
    pub(crate) fn get_image_filter_quality(&self) -> tiny_skia::FilterQuality {
        if self.state.image_smoothing_enabled {
            tiny_skia::FilterQuality::Bilinear
        } else {
            tiny_skia::FilterQuality::Nearest
        }
    }
}

/// Parse a CSS color string into a tiny_skia::Color.
pub(crate) fn parse_color(s: &str) -> Canvas2dResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s)
        .map_err(|e| Canvas2dError::ColorParseError(format!("{}: {}", s, e)))?;

    let [r, g, b, a] = parsed.to_array();
    Ok(tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK))
}
