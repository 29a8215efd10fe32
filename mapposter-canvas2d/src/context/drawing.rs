//! Fill, stroke, clip, and paint helper operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::{CanvasColor, RectParams};
use crate::style::FillStyle;
use tiny_skia::Transform;

impl Canvas2dContext {
    // --- Clipping ---

    /// Restrict subsequent drawing to the current path (non-zero winding).
    ///
    /// Like the browser API, a new clip replaces rather than intersects the
    /// previous one; use save/restore to scope it.
    pub fn clip(&mut self) {
        log::debug!(target: "canvas", "clip");
        let path = std::mem::replace(&mut self.path_builder, tiny_skia::PathBuilder::new()).finish();
        self.has_current_point = false;

        if let Some(path) = path {
            self.state.clip_path = Some(path);
        }
    }

    /// Whether a clip region is active.
    pub fn has_clip(&self) -> bool {
        self.state.clip_path.is_some()
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    ///
    /// If a shadow is set, it is composited beneath the fill.
    pub fn fill(&mut self) {
        log::debug!(target: "canvas", "fill");
        // Clone the path builder so we don't consume it - stroke() may follow
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };

        let clip_mask = self.create_clip_mask();
        if let Some(shadow) = self.state.shadow {
            self.draw_shadow(&path, &shadow, clip_mask.as_ref());
        }
        // Path coordinates are already in device space (pre-transformed)
        self.with_fill_paint(|ctx, paint| {
            ctx.pixmap.fill_path(
                &path,
                paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                clip_mask.as_ref(),
            );
        });
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        log::debug!(target: "canvas", "stroke");
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };

        // Path coordinates are pre-transformed but stroke width is in user space
        let stroke = tiny_skia::Stroke {
            width: self.state.line_width * self.transform_scale(),
            line_cap: tiny_skia::LineCap::Butt,
            line_join: self.state.line_join.into(),
            miter_limit: self.state.miter_limit,
            dash: None,
        };

        let clip_mask = self.create_clip_mask();
        self.with_stroke_paint(|ctx, paint| {
            ctx.pixmap.stroke_path(
                &path,
                paint,
                &stroke,
                Transform::identity(),
                clip_mask.as_ref(),
            );
        });
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        self.begin_path();
        self.rect(params);
        self.fill();
        self.begin_path();
    }

    /// Flood the whole surface with a color, ignoring transform, clip and shadow.
    pub fn fill_surface(&mut self, color: CanvasColor) {
        log::debug!(target: "canvas", "fillSurface {:?}", color);
        self.pixmap.fill(color.into());
    }

    // --- Private paint helpers ---

    pub(crate) fn create_clip_mask(&self) -> Option<tiny_skia::Mask> {
        self.state.clip_path.as_ref().and_then(|clip_path| {
            let mut mask = tiny_skia::Mask::new(self.width, self.height)?;
            mask.fill_path(
                clip_path,
                tiny_skia::FillRule::Winding,
                true,
                Transform::identity(),
            );
            Some(mask)
        })
    }

    pub(crate) fn with_fill_paint<R>(
        &mut self,
        draw: impl for<'a> FnOnce(&mut Self, &tiny_skia::Paint<'a>) -> R,
    ) -> R {
        let style = self.state.fill_style.clone();
        self.with_paint_from_style(style, draw)
    }

    pub(crate) fn with_stroke_paint<R>(
        &mut self,
        draw: impl for<'a> FnOnce(&mut Self, &tiny_skia::Paint<'a>) -> R,
    ) -> R {
        let style = self.state.stroke_style.clone();
        self.with_paint_from_style(style, draw)
    }

    pub(crate) fn with_paint_from_style<R>(
        &mut self,
        style: FillStyle,
        draw: impl for<'a> FnOnce(&mut Self, &tiny_skia::Paint<'a>) -> R,
    ) -> R {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };

        match style {
            FillStyle::Color(mut color) => {
                if self.state.global_alpha < 1.0 {
                    color.set_alpha((color.alpha() * self.state.global_alpha).clamp(0.0, 1.0));
                }
                paint.set_color(color);
                draw(self, &paint)
            }
            FillStyle::Pattern(pattern) => {
                paint.shader = pattern.shader(self.state.transform, self.state.global_alpha);
                draw(self, &paint)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::tests::test_context;
    use crate::geometry::{CanvasColor, CanvasImageDataRef, RectParams, ShadowParams};
    use crate::pattern::CanvasPattern;
    use std::sync::Arc;

    fn pixel(data: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * width + x) * 4;
        [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
    }

    #[test]
    fn test_fill_rect_pixels() {
        let mut ctx = test_context(100, 100);
        ctx.set_fill_style("#ff0000").unwrap();
        ctx.fill_rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        });

        let data = ctx.get_image_data();
        assert_eq!(pixel(&data, 100, 30, 30), [255, 0, 0, 255]);
        assert_eq!(pixel(&data, 100, 5, 5)[3], 0);
    }

    #[test]
    fn test_clip_restricts_fill() {
        let mut ctx = test_context(100, 100);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 100.0,
        });
        ctx.clip();
        assert!(ctx.has_clip());

        ctx.set_fill_style("#0000ff").unwrap();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });

        let data = ctx.get_image_data();
        assert_eq!(pixel(&data, 100, 25, 50), [0, 0, 255, 255]);
        assert_eq!(pixel(&data, 100, 75, 50)[3], 0);
    }

    #[test]
    fn test_clip_is_scoped_by_save_restore() {
        let mut ctx = test_context(40, 40);
        ctx.save();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        ctx.clip();
        ctx.restore();
        assert!(!ctx.has_clip());
    }

    #[test]
    fn test_stroked_outline_leaves_center_empty() {
        let mut ctx = test_context(100, 100);
        ctx.set_stroke_style("#0000ff").unwrap();
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 20.0,
            y: 20.0,
            width: 60.0,
            height: 60.0,
        });
        ctx.stroke();

        let data = ctx.get_image_data();
        assert!(pixel(&data, 100, 50, 20)[2] > 200);
        assert_eq!(pixel(&data, 100, 50, 50)[3], 0);
    }

    #[test]
    fn test_shadow_is_drawn_outside_shape() {
        let mut ctx = test_context(100, 100);
        ctx.set_shadow(Some(ShadowParams {
            color: CanvasColor::from_rgba8(0, 0, 0, 255),
            blur: 10.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }));
        ctx.set_fill_style("#ffffff").unwrap();
        ctx.fill_rect(&RectParams {
            x: 30.0,
            y: 30.0,
            width: 40.0,
            height: 40.0,
        });

        let data = ctx.get_image_data();
        // Shape itself is painted over its shadow
        assert_eq!(pixel(&data, 100, 50, 50), [255, 255, 255, 255]);
        // The blurred shadow bleeds past the edge
        assert!(pixel(&data, 100, 26, 50)[3] > 0);
        // And fades out far away
        assert_eq!(pixel(&data, 100, 2, 2)[3], 0);
    }

    #[test]
    fn test_pattern_fill_covers_rect() {
        let tile = [40u8, 80, 120, 255].repeat(4 * 4);
        let pattern = CanvasPattern::new(&CanvasImageDataRef {
            data: &tile,
            width: 4,
            height: 4,
        })
        .unwrap();

        let mut ctx = test_context(16, 16);
        ctx.set_fill_style_pattern(Arc::new(pattern));
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 8.0,
        });
        let data = ctx.get_image_data();
        assert_eq!(pixel(&data, 16, 9, 3), [40, 80, 120, 255]);
        assert_eq!(pixel(&data, 16, 9, 12)[3], 0);
    }
}
