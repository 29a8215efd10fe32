//! Gaussian blur approximation for shadow rendering.
//!
//! Three successive box blurs approximate a gaussian. Each pass is O(1) per
//! pixel regardless of radius.

use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Box widths whose three-pass convolution approximates a gaussian of `sigma`.
pub(crate) fn box_sizes_for_gaussian(sigma: f32) -> [usize; 3] {
    let n = 3.0_f32;
    let ideal = ((12.0 * sigma * sigma / n) + 1.0).sqrt();
    let mut lower = ideal.floor() as usize;
    if lower % 2 == 0 {
        lower = lower.saturating_sub(1);
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let lower_f = lower as f32;
    let m_ideal =
        (12.0 * sigma * sigma - n * lower_f * lower_f - 4.0 * n * lower_f - 3.0 * n) / (-4.0 * lower_f - 4.0);
    let m = m_ideal.round().max(0.0) as usize;
    let mut sizes = [upper; 3];
    for (i, size) in sizes.iter_mut().enumerate() {
        if i < m {
            *size = lower;
        }
    }
    sizes
}

/// Blur a premultiplied pixmap in place.
pub(crate) fn apply_gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    if sigma <= 0.0 || !sigma.is_finite() {
        return;
    }
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    if width == 0 || height == 0 {
        return;
    }

    let mut channels: Vec<[u32; 4]> = pixmap
        .pixels()
        .iter()
        .map(|p| [p.red() as u32, p.green() as u32, p.blue() as u32, p.alpha() as u32])
        .collect();
    let mut scratch = channels.clone();

    for size in box_sizes_for_gaussian(sigma) {
        let radius = (size - 1) / 2;
        if radius == 0 {
            continue;
        }
        box_blur_horizontal(&channels, &mut scratch, width, height, radius);
        box_blur_vertical(&scratch, &mut channels, width, height, radius);
    }

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(channels.iter()) {
        let a = src[3].min(255) as u8;
        // Keep premultiplied invariant: color channels never exceed alpha
        let r = src[0].min(a as u32) as u8;
        let g = src[1].min(a as u32) as u8;
        let b = src[2].min(a as u32) as u8;
        *dst = PremultipliedColorU8::from_rgba(r, g, b, a).unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
}

fn box_blur_horizontal(src: &[[u32; 4]], dst: &mut [[u32; 4]], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    for y in 0..height {
        let row = y * width;
        let mut sum = [0u32; 4];
        // Edge pixels are treated as transparent outside the pixmap
        for x in 0..=radius.min(width - 1) {
            add(&mut sum, &src[row + x]);
        }
        for x in 0..width {
            dst[row + x] = divide(&sum, window);
            let enter = x + radius + 1;
            if enter < width {
                add(&mut sum, &src[row + enter]);
            }
            if x >= radius {
                sub(&mut sum, &src[row + x - radius]);
            }
        }
    }
}

fn box_blur_vertical(src: &[[u32; 4]], dst: &mut [[u32; 4]], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    for x in 0..width {
        let mut sum = [0u32; 4];
        for y in 0..=radius.min(height - 1) {
            add(&mut sum, &src[y * width + x]);
        }
        for y in 0..height {
            dst[y * width + x] = divide(&sum, window);
            let enter = y + radius + 1;
            if enter < height {
                add(&mut sum, &src[enter * width + x]);
            }
            if y >= radius {
                sub(&mut sum, &src[(y - radius) * width + x]);
            }
        }
    }
}

#[inline]
fn add(sum: &mut [u32; 4], px: &[u32; 4]) {
    for i in 0..4 {
        sum[i] += px[i];
    }
}

#[inline]
fn sub(sum: &mut [u32; 4], px: &[u32; 4]) {
    for i in 0..4 {
        sum[i] -= px[i];
    }
}

#[inline]
fn divide(sum: &[u32; 4], window: u32) -> [u32; 4] {
    [
        (sum[0] + window / 2) / window,
        (sum[1] + window / 2) / window,
        (sum[2] + window / 2) / window,
        (sum[3] + window / 2) / window,
    ]
}
