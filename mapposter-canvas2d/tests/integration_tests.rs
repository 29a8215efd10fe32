//! Integration tests for mapposter-canvas2d.

use mapposter_canvas2d::{
    CanvasColor, CanvasImageDataRef, Canvas2dContext, CubicBezierParams, FontConfig, RectParams,
    ShadowParams,
};
use rstest::rstest;

fn surface(width: u32, height: u32) -> Canvas2dContext {
    let resolved = FontConfig {
        load_system_fonts: false,
        ..FontConfig::default()
    }
    .resolve();
    Canvas2dContext::with_resolved(width, height, &resolved).unwrap()
}

fn rgba_at(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let idx = ((y * width + x) * 4) as usize;
    [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
}

/// Test filling a closed polygon path.
#[test]
fn test_path_operations() {
    let mut ctx = surface(100, 100);

    ctx.set_fill_style("#00ff00").unwrap();
    ctx.begin_path();
    ctx.move_to(10.0, 10.0);
    ctx.line_to(90.0, 10.0);
    ctx.line_to(90.0, 90.0);
    ctx.line_to(10.0, 90.0);
    ctx.close_path();
    ctx.fill();

    let data = ctx.get_image_data();
    assert_eq!(rgba_at(&data, 100, 50, 50), [0, 255, 0, 255]);
}

/// A circle built from four cubic segments covers its center but not its corners.
#[test]
fn test_bezier_circle_clip() {
    const KAPPA: f32 = 0.552_284_8;
    let (cx, cy, r) = (50.0, 50.0, 40.0);
    let k = r * KAPPA;

    let mut ctx = surface(100, 100);
    ctx.begin_path();
    ctx.move_to(cx + r, cy);
    for (c1, c2, end) in [
        ((cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)),
        ((cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)),
        ((cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)),
        ((cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)),
    ] {
        ctx.bezier_curve_to(&CubicBezierParams {
            cp1x: c1.0,
            cp1y: c1.1,
            cp2x: c2.0,
            cp2y: c2.1,
            x: end.0,
            y: end.1,
        });
    }
    ctx.close_path();
    ctx.clip();

    ctx.set_fill_style("#336699").unwrap();
    ctx.fill_rect(&RectParams {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    });

    let data = ctx.get_image_data();
    assert_eq!(rgba_at(&data, 100, 50, 50), [0x33, 0x66, 0x99, 255]);
    assert_eq!(rgba_at(&data, 100, 15, 15)[3], 0);
    assert_eq!(rgba_at(&data, 100, 85, 85)[3], 0);
}

/// Drawing in design units under a scale transform lands at the scaled position.
#[rstest]
#[case(1.0)]
#[case(2.0)]
#[case(3.5)]
fn test_scaled_design_units(#[case] scale: f32) {
    let size = (40.0 * scale).ceil() as u32;
    let mut ctx = surface(size, size);
    ctx.scale(scale, scale);
    ctx.set_fill_style("#ff0000").unwrap();
    ctx.fill_rect(&RectParams {
        x: 20.0,
        y: 20.0,
        width: 20.0,
        height: 20.0,
    });

    let data = ctx.get_image_data();
    let inside = (30.0 * scale) as u32;
    let outside = (10.0 * scale) as u32;
    assert_eq!(rgba_at(&data, size, inside, inside), [255, 0, 0, 255]);
    assert_eq!(rgba_at(&data, size, outside, outside)[3], 0);
}

/// Shadows scale with the transform so glow looks the same at any resolution.
#[test]
fn test_shadow_offset_scales_with_transform() {
    let mut ctx = surface(200, 200);
    ctx.scale(2.0, 2.0);
    ctx.set_shadow(Some(ShadowParams {
        color: CanvasColor::BLACK,
        blur: 0.0,
        offset_x: 10.0,
        offset_y: 0.0,
    }));
    ctx.set_fill_style("#ffffff").unwrap();
    ctx.fill_rect(&RectParams {
        x: 10.0,
        y: 10.0,
        width: 20.0,
        height: 20.0,
    });

    let data = ctx.get_image_data();
    // Shape spans 20..60 device px, shadow 40..80
    assert_eq!(rgba_at(&data, 200, 70, 40), [0, 0, 0, 255]);
    assert_eq!(rgba_at(&data, 200, 30, 40), [255, 255, 255, 255]);
    assert_eq!(rgba_at(&data, 200, 90, 40)[3], 0);
}

/// Scaled image drawing composites over earlier content.
#[test]
fn test_image_over_background() {
    let mut ctx = surface(10, 10);
    ctx.fill_surface(CanvasColor::from_rgba8(255, 255, 255, 255));
    let tile = [0u8, 0, 0, 128].repeat(4);
    ctx.set_image_smoothing_enabled(false);
    ctx.draw_image_data_scaled(
        &CanvasImageDataRef {
            data: &tile,
            width: 2,
            height: 2,
        },
        0.0,
        0.0,
        10.0,
        10.0,
    )
    .unwrap();

    let [r, g, b, a] = rgba_at(&ctx.get_image_data(), 10, 5, 5);
    assert_eq!(a, 255);
    assert!(r > 120 && r < 135, "r = {r}");
    assert_eq!((r, g), (g, b));
}

/// PNG output decodes to the same pixels.
#[test]
fn test_png_output_decodes() {
    let mut ctx = surface(32, 16);
    ctx.set_fill_style("#123456").unwrap();
    ctx.fill_rect(&RectParams {
        x: 0.0,
        y: 0.0,
        width: 16.0,
        height: 16.0,
    });
    let png = ctx.to_png(Some(300.0)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surface.png");
    std::fs::write(&path, &png).unwrap();

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (32, 16));
    assert_eq!(decoded.get_pixel(4, 4).0, [0x12, 0x34, 0x56, 255]);
    assert_eq!(decoded.get_pixel(24, 4).0[3], 0);
}

/// RGB readback flattens onto the requested backdrop.
#[test]
fn test_rgb_readback() {
    let mut ctx = surface(4, 1);
    ctx.set_fill_style("#ff0000").unwrap();
    ctx.fill_rect(&RectParams {
        x: 0.0,
        y: 0.0,
        width: 2.0,
        height: 1.0,
    });
    let rgb = ctx.get_rgb_data([0, 0, 255]);
    assert_eq!(&rgb[0..3], &[255, 0, 0]);
    assert_eq!(&rgb[9..12], &[0, 0, 255]);
}
