//! Image drawing, pixel readback, and PNG output for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::CanvasImageDataRef;
use tiny_skia::{PixmapPaint, PixmapRef};

impl Canvas2dContext {
    /// Draw a premultiplied pixmap into the destination rectangle (user space).
    fn draw_pixmap_scaled(&mut self, pixmap: PixmapRef<'_>, dx: f32, dy: f32, dw: f32, dh: f32) {
        if !(dw.is_finite() && dh.is_finite()) || dw <= 0.0 || dh <= 0.0 {
            return;
        }
        let paint = PixmapPaint {
            opacity: self.state.global_alpha,
            quality: self.get_image_filter_quality(),
            ..Default::default()
        };

        let scale_x = dw / pixmap.width() as f32;
        let scale_y = dh / pixmap.height() as f32;
        let transform = self
            .state
            .transform
            .pre_translate(dx, dy)
            .pre_scale(scale_x, scale_y);

        let clip_mask = self.create_clip_mask();
        self.pixmap
            .draw_pixmap(0, 0, pixmap, &paint, transform, clip_mask.as_ref());
    }

    /// Draw non-premultiplied RGBA data scaled into the given rectangle.
    pub fn draw_image_data_scaled(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> Canvas2dResult<()> {
        log::debug!(
            target: "canvas",
            "drawImage {}x{} -> {} {} {} {}",
            image.width, image.height, dx, dy, dw, dh
        );
        let pixmap = image.to_pixmap().ok_or_else(|| {
            Canvas2dError::InvalidImageData(format!(
                "Data length {} does not match {}x{} RGBA image",
                image.data.len(),
                image.width,
                image.height
            ))
        })?;
        self.draw_pixmap_scaled(pixmap.as_ref(), dx, dy, dw, dh);
        Ok(())
    }

    /// Draw another surface scaled into the given rectangle.
    pub fn draw_canvas_scaled(
        &mut self,
        source: &Canvas2dContext,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        log::debug!(target: "canvas", "drawCanvas {}x{} -> {} {} {} {}", source.width, source.height, dx, dy, dw, dh);
        self.draw_pixmap_scaled(source.pixmap.as_ref(), dx, dy, dw, dh);
    }

    /// Read back the whole surface as non-premultiplied RGBA.
    pub fn get_image_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        data
    }

    /// Read back the surface as RGB, flattening transparency onto `background`.
    pub fn get_rgb_data(&self, background: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.pixels().len() * 3);
        for pixel in self.pixmap.pixels() {
            // Premultiplied source-over an opaque backdrop
            let inv = 255 - pixel.alpha() as u32;
            let blend = |c: u8, bg: u8| (c as u32 + (bg as u32 * inv + 127) / 255).min(255) as u8;
            data.push(blend(pixel.red(), background[0]));
            data.push(blend(pixel.green(), background[1]));
            data.push(blend(pixel.blue(), background[2]));
        }
        data
    }

    /// Export the surface as PNG data.
    ///
    /// `ppi` is written to the pHYs chunk. Defaults to 72 when not specified.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Pixel density is stored as pixels per meter
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.get_image_data())?;
        }
        Ok(buf)
    }
}
