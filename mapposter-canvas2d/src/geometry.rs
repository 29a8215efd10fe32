//! Parameter structs for drawing operations.
//!
//! These replace long positional argument lists with named fields.

/// Parameters for a cubic Bezier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezierParams {
    /// First control point X.
    pub cp1x: f32,
    /// First control point Y.
    pub cp1y: f32,
    /// Second control point X.
    pub cp2x: f32,
    /// Second control point Y.
    pub cp2y: f32,
    /// End point X.
    pub x: f32,
    /// End point Y.
    pub y: f32,
}

/// Parameters for a quadratic Bezier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezierParams {
    /// Control point X.
    pub cpx: f32,
    /// Control point Y.
    pub cpy: f32,
    /// End point X.
    pub x: f32,
    /// End point Y.
    pub y: f32,
}

/// Parameters for a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectParams {
    /// X coordinate of the rectangle origin.
    pub x: f32,
    /// Y coordinate of the rectangle origin.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

/// Shadow cast by filled shapes, in user-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    /// Shadow color. A fully transparent color disables the shadow.
    pub color: CanvasColor,
    /// Blur radius. The gaussian sigma is half of this value.
    pub blur: f32,
    /// Horizontal offset.
    pub offset_x: f32,
    /// Vertical offset.
    pub offset_y: f32,
}

impl ShadowParams {
    /// Whether this shadow would produce any visible output.
    pub fn is_visible(&self) -> bool {
        self.color.a > 0 && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }
}

/// A backend-neutral RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl CanvasColor {
    pub const BLACK: CanvasColor = CanvasColor::from_rgba8(0, 0, 0, 255);
    pub const WHITE: CanvasColor = CanvasColor::from_rgba8(255, 255, 255, 255);
    pub const TRANSPARENT: CanvasColor = CanvasColor::from_rgba8(0, 0, 0, 0);

    /// Create a color from 8-bit RGBA components.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `factor`.
    pub fn with_alpha_factor(self, factor: f32) -> Self {
        Self {
            a: (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }
}

impl From<CanvasColor> for tiny_skia::Color {
    fn from(c: CanvasColor) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

/// A reference to non-premultiplied RGBA image data.
#[derive(Debug, Clone, Copy)]
pub struct CanvasImageDataRef<'a> {
    /// RGBA pixel data, non-premultiplied, 4 bytes per pixel.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasImageDataRef<'_> {
    /// Convert to a premultiplied tiny-skia pixmap.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub(crate) fn to_pixmap(&self) -> Option<tiny_skia::Pixmap> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return None;
        }
        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height)?;
        for (pixel, src) in pixmap.pixels_mut().iter_mut().zip(self.data.chunks_exact(4)) {
            *pixel = premultiply(src[0], src[1], src[2], src[3]);
        }
        Some(pixmap)
    }
}

/// Premultiply a straight-alpha pixel using integer math.
pub(crate) fn premultiply(r: u8, g: u8, b: u8, a: u8) -> tiny_skia::PremultipliedColorU8 {
    let (pr, pg, pb) = match a {
        255 => (r, g, b),
        0 => (0, 0, 0),
        _ => {
            let a16 = a as u16;
            (
                ((r as u16 * a16 + 127) / 255) as u8,
                ((g as u16 * a16 + 127) / 255) as u8,
                ((b as u16 * a16 + 127) / 255) as u8,
            )
        }
    };
    tiny_skia::PremultipliedColorU8::from_rgba(pr, pg, pb, a)
        .unwrap_or(tiny_skia::PremultipliedColorU8::TRANSPARENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_visibility() {
        let mut shadow = ShadowParams {
            color: CanvasColor::from_rgba8(0, 0, 0, 90),
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        assert!(!shadow.is_visible());
        shadow.offset_y = 2.0;
        assert!(shadow.is_visible());
        shadow.color = CanvasColor::TRANSPARENT;
        assert!(!shadow.is_visible());
    }

    #[test]
    fn test_image_data_length_mismatch() {
        let data = vec![0u8; 10];
        let image = CanvasImageDataRef {
            data: &data,
            width: 2,
            height: 2,
        };
        assert!(image.to_pixmap().is_none());
    }

    #[test]
    fn test_premultiply_half_alpha() {
        let px = premultiply(255, 100, 0, 128);
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
        assert_eq!(px.green(), 50);
        assert_eq!(px.blue(), 0);
    }
}
