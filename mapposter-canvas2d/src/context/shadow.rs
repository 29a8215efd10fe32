//! Blurred drop shadows beneath filled shapes.

use super::Canvas2dContext;
use crate::blur::apply_gaussian_blur;
use crate::geometry::ShadowParams;
use tiny_skia::{FilterQuality, Paint, Path, Pixmap, PixmapPaint, Transform};

/// Largest factor the shadow scratch surface is downsampled by.
const MAX_SHADOW_DOWNSCALE: f32 = 16.0;

impl Canvas2dContext {
    /// Composite the shadow of `path` onto the surface.
    ///
    /// `path` is in device space. Blur and offsets are in user space and
    /// follow the current transform scale. The shadow is rasterized into a
    /// scratch surface covering only the blurred footprint, downsampled for
    /// large radii, then scaled back up when composited.
    pub(crate) fn draw_shadow(
        &mut self,
        path: &Path,
        shadow: &ShadowParams,
        clip_mask: Option<&tiny_skia::Mask>,
    ) {
        let scale = self.transform_scale();
        let sigma = (shadow.blur / 2.0) * scale;
        let offset_x = shadow.offset_x * scale;
        let offset_y = shadow.offset_y * scale;
        let pad = (sigma * 3.0).ceil();

        let bounds = path.bounds();
        let left = (bounds.left() + offset_x - pad).floor().max(0.0);
        let top = (bounds.top() + offset_y - pad).floor().max(0.0);
        let right = (bounds.right() + offset_x + pad).ceil().min(self.width as f32);
        let bottom = (bounds.bottom() + offset_y + pad).ceil().min(self.height as f32);
        if right <= left || bottom <= top {
            return;
        }

        let downscale = (sigma / 4.0).clamp(1.0, MAX_SHADOW_DOWNSCALE);
        let scratch_w = ((right - left) / downscale).ceil().max(1.0) as u32;
        let scratch_h = ((bottom - top) / downscale).ceil().max(1.0) as u32;
        let Some(mut scratch) = Pixmap::new(scratch_w, scratch_h) else {
            return;
        };
        log::debug!(
            target: "canvas",
            "shadow sigma={:.1} region={}x{} scratch={}x{}",
            sigma,
            right - left,
            bottom - top,
            scratch_w,
            scratch_h
        );

        let color = shadow.color.with_alpha_factor(self.state.global_alpha);
        let mut paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(color.into());
        let to_scratch = Transform::from_translate(offset_x - left, offset_y - top)
            .post_scale(1.0 / downscale, 1.0 / downscale);
        scratch.fill_path(path, &paint, tiny_skia::FillRule::Winding, to_scratch, None);

        apply_gaussian_blur(&mut scratch, sigma / downscale);

        let composite = PixmapPaint {
            quality: if downscale > 1.0 {
                FilterQuality::Bilinear
            } else {
                FilterQuality::Nearest
            },
            ..Default::default()
        };
        let to_device = Transform::from_scale(downscale, downscale).post_translate(left, top);
        self.pixmap
            .draw_pixmap(0, 0, scratch.as_ref(), &composite, to_device, clip_mask);
    }
}
