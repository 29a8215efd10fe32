//! Off-screen 2D drawing surface for map poster rendering.
//!
//! This crate provides the small slice of the Canvas 2D API that poster
//! composition needs, without a browser:
//! - `tiny-skia` for path filling, stroking, clipping and image drawing
//! - `cosmic-text` for text shaping and glyph outlines
//! - `fontdb` for font database management (shared with the font providers)
//!
//! Shadows (used for frame glow and pin depth) are rendered into a scratch
//! pixmap, blurred, and composited beneath the shape that cast them.
//!
//! # Example
//!
//! ```rust,ignore
//! use mapposter_canvas2d::{Canvas2dContext, RectParams};
//!
//! let mut ctx = Canvas2dContext::new(400, 300)?;
//! ctx.set_fill_style("#ff0000")?;
//! ctx.fill_rect(&RectParams { x: 10.0, y: 10.0, width: 100.0, height: 50.0 });
//! let png_data = ctx.to_png(None)?;
//! ```

mod blur;
mod context;
mod drawing_state;
mod error;
mod font_config;
mod geometry;
mod pattern;
mod style;
mod text;

// Re-export public API
pub use context::Canvas2dContext;
pub use drawing_state::DrawingState;
pub use error::{Canvas2dError, Canvas2dResult};
pub use font_config::{CustomFont, FontConfig, GenericFamilyMap, ResolvedFontConfig};
pub use geometry::{
    CanvasColor, CanvasImageDataRef, CubicBezierParams, QuadraticBezierParams, RectParams,
    ShadowParams,
};
pub use pattern::CanvasPattern;
pub use style::{FillStyle, LineJoin, TextAlign, TextBaseline};
pub use text::FontSpec;
