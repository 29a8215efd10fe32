//! Rasterize a [`Scene`] onto a canvas surface.

use crate::basemap::BasemapImage;
use crate::frame::FrameGeometry;
use crate::path::{PathSegment, Rect};
use crate::scene::{DrawOp, Scene, TextAnchor, TextRun};
use crate::texture::TILE_SIZE;
use mapposter_canvas2d::{
    Canvas2dContext, Canvas2dResult, CanvasImageDataRef, CanvasPattern, CubicBezierParams,
    FontSpec, LineJoin, QuadraticBezierParams, RectParams, ShadowParams, TextAlign, TextBaseline,
};
use std::sync::Arc;

fn rect_params(rect: &Rect) -> RectParams {
    RectParams {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

/// Replace the current path with `path`.
pub fn trace_path(ctx: &mut Canvas2dContext, path: &[PathSegment]) {
    ctx.begin_path();
    for segment in path {
        match *segment {
            PathSegment::MoveTo { x, y } => ctx.move_to(x, y),
            PathSegment::LineTo { x, y } => ctx.line_to(x, y),
            PathSegment::QuadTo { cx, cy, x, y } => ctx.quadratic_curve_to(&QuadraticBezierParams {
                cpx: cx,
                cpy: cy,
                x,
                y,
            }),
            PathSegment::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => ctx.bezier_curve_to(&CubicBezierParams {
                cp1x: c1x,
                cp1y: c1y,
                cp2x: c2x,
                cp2y: c2y,
                x,
                y,
            }),
            PathSegment::Close => ctx.close_path(),
        }
    }
}

/// Restrict subsequent drawing to the frame's interior. Callers wrap this in
/// `save`/`restore` to scope the clip.
pub fn clip_to_frame(ctx: &mut Canvas2dContext, frame: &FrameGeometry) {
    trace_path(ctx, &frame.clip_path());
    ctx.clip();
}

/// Restrict subsequent drawing to an arbitrary box using the frame's shape.
pub fn clip_to_box(ctx: &mut Canvas2dContext, frame: &FrameGeometry, rect: &Rect) {
    trace_path(ctx, &frame.clip_path_for(rect));
    ctx.clip();
}

/// Paint every op of `scene` at `scale` surface pixels per design unit.
///
/// `basemaps` holds one entry per basemap op, in paint order. A missing
/// entry paints the theme's land color instead.
pub fn render_scene(
    ctx: &mut Canvas2dContext,
    scene: &Scene,
    scale: f32,
    basemaps: &[Option<BasemapImage>],
) -> Canvas2dResult<()> {
    ctx.save();
    ctx.reset_transform();
    ctx.scale(scale, scale);

    let mut basemap_index = 0;
    for op in &scene.ops {
        match op {
            DrawOp::FillRect { rect, color } => {
                ctx.set_fill_style_color(color.to_canvas());
                ctx.fill_rect(&rect_params(rect));
            }
            DrawOp::Texture {
                rect,
                texture,
                opacity,
            } => {
                let tile = texture.tile();
                let pattern = CanvasPattern::new(&CanvasImageDataRef {
                    data: &tile,
                    width: TILE_SIZE,
                    height: TILE_SIZE,
                })?;
                ctx.save();
                ctx.set_global_alpha(*opacity);
                ctx.set_fill_style_pattern(Arc::new(pattern));
                ctx.fill_rect(&rect_params(rect));
                ctx.restore();
            }
            DrawOp::FillPath {
                path,
                color,
                shadow,
            } => {
                ctx.save();
                ctx.set_shadow(shadow.map(|s| ShadowParams {
                    color: s.color.to_canvas(),
                    blur: s.blur,
                    offset_x: s.offset_x,
                    offset_y: s.offset_y,
                }));
                ctx.set_fill_style_color(color.to_canvas());
                trace_path(ctx, path);
                ctx.fill();
                ctx.restore();
            }
            DrawOp::StrokePath { path, color, width } => {
                ctx.save();
                ctx.set_stroke_style_color(color.to_canvas());
                ctx.set_line_width(*width);
                ctx.set_line_join(LineJoin::Round);
                trace_path(ctx, path);
                ctx.stroke();
                ctx.restore();
            }
            DrawOp::Basemap {
                request,
                dest,
                clip,
            } => {
                ctx.save();
                trace_path(ctx, clip);
                ctx.clip();
                match basemaps.get(basemap_index).and_then(Option::as_ref) {
                    Some(image) => ctx.draw_image_data_scaled(
                        &image.as_image_data(),
                        dest.x,
                        dest.y,
                        dest.width,
                        dest.height,
                    )?,
                    None => {
                        log::debug!(target: "render", "no basemap bitmap for op {}", basemap_index);
                        ctx.set_fill_style_color(request.theme.land.to_canvas());
                        ctx.fill_rect(&rect_params(dest));
                    }
                }
                ctx.restore();
                basemap_index += 1;
            }
            DrawOp::Text(run) => draw_text_run(ctx, run),
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_text_run(ctx: &mut Canvas2dContext, run: &TextRun) {
    ctx.set_font(FontSpec {
        family: run.font_family.clone(),
        size_px: run.font_size,
        weight: run.font_weight,
        italic: false,
    });
    ctx.set_letter_spacing(run.letter_spacing);
    ctx.set_text_align(TextAlign::Center);
    ctx.set_text_baseline(match run.anchor {
        TextAnchor::Top => TextBaseline::Top,
        TextAnchor::Baseline => TextBaseline::Alphabetic,
    });
    ctx.set_fill_style_color(run.color.to_canvas());
    match run.max_width {
        Some(max_width) => ctx.fill_text_max_width(&run.text, run.x, run.y, max_width),
        None => ctx.fill_text(&run.text, run.x, run.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;
    use crate::frame::{frame_geometry, FrameShape};
    use crate::path::rect_path;
    use crate::scene::{DESIGN_HEIGHT, DESIGN_WIDTH};
    use crate::styles::resolve_style;
    use crate::scene::BasemapRequest;
    use mapposter_canvas2d::FontConfig;

    fn surface(width: u32, height: u32) -> Canvas2dContext {
        let resolved = FontConfig {
            load_system_fonts: false,
            ..Default::default()
        }
        .resolve();
        Canvas2dContext::with_resolved(width, height, &resolved).unwrap()
    }

    fn pixel(ctx: &Canvas2dContext, x: u32, y: u32) -> [u8; 4] {
        let data = ctx.get_image_data();
        let i = ((y * ctx.width() + x) * 4) as usize;
        [data[i], data[i + 1], data[i + 2], data[i + 3]]
    }

    fn scene(ops: Vec<DrawOp>) -> Scene {
        Scene {
            title: "test".to_string(),
            width: DESIGN_WIDTH,
            height: DESIGN_HEIGHT,
            background: HexColor::WHITE,
            ops,
        }
    }

    #[test]
    fn test_clip_to_circle_frame() {
        let frame = frame_geometry(FrameShape::Circle, false);
        let mut ctx = surface(DESIGN_WIDTH, DESIGN_HEIGHT);
        ctx.save();
        clip_to_frame(&mut ctx, &frame);
        ctx.set_fill_style_color(HexColor::rgb(255, 0, 0).to_canvas());
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: DESIGN_WIDTH as f32,
            height: DESIGN_HEIGHT as f32,
        });
        ctx.restore();

        let (cx, cy) = frame.center();
        assert_eq!(pixel(&ctx, cx as u32, cy as u32), [255, 0, 0, 255]);
        // Bounding box corner lies outside the circle
        assert_eq!(pixel(&ctx, frame.x() as u32 + 2, frame.y() as u32 + 2)[3], 0);
    }

    #[test]
    fn test_clip_to_box_accepts_any_rect() {
        let frame = frame_geometry(FrameShape::Square, false);
        let mut ctx = surface(100, 100);
        ctx.save();
        clip_to_box(&mut ctx, &frame, &Rect::new(10.0, 10.0, 30.0, 30.0));
        ctx.set_fill_style_color(HexColor::BLACK.to_canvas());
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        ctx.restore();
        assert_eq!(pixel(&ctx, 25, 25)[3], 255);
        assert_eq!(pixel(&ctx, 60, 60)[3], 0);
    }

    #[test]
    fn test_render_scales_design_units() {
        let s = scene(vec![DrawOp::FillRect {
            rect: Rect::new(100.0, 100.0, 100.0, 100.0),
            color: HexColor::rgb(0, 0, 255),
        }]);
        let mut ctx = surface(400, 500);
        render_scene(&mut ctx, &s, 0.5, &[]).unwrap();
        assert_eq!(pixel(&ctx, 75, 75), [0, 0, 255, 255]);
        assert_eq!(pixel(&ctx, 45, 45)[3], 0);
        assert_eq!(pixel(&ctx, 105, 105)[3], 0);
    }

    #[test]
    fn test_missing_basemap_paints_land() {
        let style = resolve_style("ocean");
        let dest = Rect::new(0.0, 0.0, 50.0, 50.0);
        let s = scene(vec![DrawOp::Basemap {
            request: BasemapRequest {
                lat: 0.0,
                lng: 0.0,
                zoom: 10.0,
                style_id: "ocean".to_string(),
                theme: style.basemap,
            },
            dest,
            clip: rect_path(&dest),
        }]);
        let mut ctx = surface(100, 100);
        render_scene(&mut ctx, &s, 1.0, &[None]).unwrap();
        let land = style.basemap.land;
        assert_eq!(pixel(&ctx, 25, 25), [land.r, land.g, land.b, 255]);
        assert_eq!(pixel(&ctx, 75, 75)[3], 0);
    }

    #[test]
    fn test_basemap_bitmap_is_clipped() {
        let style = resolve_style("minimal");
        let dest = Rect::new(0.0, 0.0, 40.0, 40.0);
        let clip = rect_path(&Rect::new(0.0, 0.0, 20.0, 40.0));
        let s = scene(vec![DrawOp::Basemap {
            request: BasemapRequest {
                lat: 0.0,
                lng: 0.0,
                zoom: 10.0,
                style_id: "minimal".to_string(),
                theme: style.basemap,
            },
            dest,
            clip,
        }]);
        let image = BasemapImage {
            width: 4,
            height: 4,
            rgba: [0u8, 128, 0, 255].repeat(16),
        };
        let mut ctx = surface(40, 40);
        render_scene(&mut ctx, &s, 1.0, &[Some(image)]).unwrap();
        assert_eq!(pixel(&ctx, 10, 20), [0, 128, 0, 255]);
        assert_eq!(pixel(&ctx, 30, 20)[3], 0);
    }

    #[test]
    fn test_text_without_fonts_does_not_fail() {
        let s = scene(vec![DrawOp::Text(TextRun {
            text: "Lisbon".to_string(),
            x: 50.0,
            y: 10.0,
            anchor: TextAnchor::Top,
            font_family: "Playfair Display".to_string(),
            font_size: 20.0,
            font_weight: 700,
            letter_spacing: 1.0,
            color: HexColor::BLACK,
            max_width: Some(80.0),
        })]);
        let mut ctx = surface(100, 50);
        assert!(render_scene(&mut ctx, &s, 1.0, &[]).is_ok());
    }
}
