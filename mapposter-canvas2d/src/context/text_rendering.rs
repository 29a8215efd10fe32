//! Text measurement and rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::style::{TextAlign, TextBaseline};
use crate::text::{
    buffer_metrics, calculate_text_x_offset, calculate_text_y_offset, has_faces, shape_text, FontSpec,
};
use cosmic_text::Command;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Set the font used by subsequent text operations.
    ///
    /// Specs with a non-finite or non-positive size are ignored.
    pub fn set_font(&mut self, font: FontSpec) {
        if font.size_px.is_finite() && font.size_px > 0.0 {
            self.state.font = font;
        }
    }

    /// Get the current font.
    pub fn font(&self) -> &FontSpec {
        &self.state.font
    }

    /// Set the text alignment.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    /// Set the text baseline.
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    /// Set letter spacing in pixels. Non-finite values are ignored.
    pub fn set_letter_spacing(&mut self, spacing: f32) {
        if spacing.is_finite() {
            self.state.letter_spacing = spacing;
        }
    }

    /// Get the letter spacing in pixels.
    pub fn letter_spacing(&self) -> f32 {
        self.state.letter_spacing
    }

    /// Fill text at the specified position.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText {:?} {} {}", text, x, y);
        self.render_text(text, x, y, None);
    }

    /// Fill text, compressing it horizontally when wider than `max_width`.
    pub fn fill_text_max_width(&mut self, text: &str, x: f32, y: f32, max_width: f32) {
        log::debug!(target: "canvas", "fillText {:?} {} {} max={}", text, x, y, max_width);
        self.render_text(text, x, y, Some(max_width));
    }

    /// Render text as vector glyph outlines.
    fn render_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>) {
        if let Some(mw) = max_width {
            if mw <= 0.0 || mw.is_nan() {
                return;
            }
        }

        if !has_faces(&self.font_system) {
            log::warn!(target: "canvas", "no font faces loaded, skipping text {:?}", text);
            return;
        }

        let font = self.state.font.clone();
        let buffer = shape_text(
            &mut self.font_system,
            text,
            &font,
            self.state.letter_spacing,
            self.hinting_enabled,
        );
        let metrics = buffer_metrics(&buffer, &font);

        let scale_x = match max_width {
            Some(mw) if mw.is_finite() && metrics.width > mw => {
                let scale = mw / metrics.width;
                if scale < 0.001 {
                    return;
                }
                scale
            }
            _ => 1.0,
        };

        // Alignment uses the unscaled width; the scale below is anchored at x
        let base_x = x + calculate_text_x_offset(metrics.width, self.state.text_align);
        let base_y = y + calculate_text_y_offset(metrics.ascent, metrics.descent, self.state.text_baseline);

        let text_transform = if scale_x != 1.0 {
            Transform::from_translate(x, 0.0)
                .pre_scale(scale_x, 1.0)
                .pre_translate(-x, 0.0)
                .post_concat(self.state.transform)
        } else {
            self.state.transform
        };

        // Layout runs place the first baseline at line_y; shift it onto base_y
        let first_line_y = buffer.layout_runs().next().map(|run| run.line_y).unwrap_or(0.0);

        let clip_mask = self.create_clip_mask();
        self.with_fill_paint(|ctx, paint| {
            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    let physical_glyph = glyph.physical((0.0, 0.0), 1.0);
                    let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                    let glyph_y =
                        base_y + (run.line_y - first_line_y) + glyph.y - glyph.font_size * glyph.y_offset;

                    let Some(commands) = ctx
                        .swash_cache
                        .get_outline_commands(&mut ctx.font_system, physical_glyph.cache_key)
                    else {
                        continue;
                    };

                    // Font outlines are y-up; the surface is y-down
                    let mut path_builder = tiny_skia::PathBuilder::new();
                    for cmd in commands {
                        match cmd {
                            Command::MoveTo(p) => path_builder.move_to(p.x, -p.y),
                            Command::LineTo(p) => path_builder.line_to(p.x, -p.y),
                            Command::QuadTo(ctrl, end) => {
                                path_builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                            }
                            Command::CurveTo(c1, c2, end) => {
                                path_builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                            }
                            Command::Close => path_builder.close(),
                        }
                    }

                    if let Some(path) = path_builder.finish() {
                        let glyph_transform =
                            Transform::from_translate(glyph_x, glyph_y).post_concat(text_transform);
                        ctx.pixmap.fill_path(
                            &path,
                            paint,
                            tiny_skia::FillRule::Winding,
                            glyph_transform,
                            clip_mask.as_ref(),
                        );
                    }
                }
            }
        });
    }
}
