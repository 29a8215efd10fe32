//! Procedural background textures.
//!
//! Tiles are generated from a fixed-seed hash so every export of the same
//! design produces the same grain.

use serde::{Deserialize, Serialize};

/// Edge length of a texture tile in design pixels.
pub const TILE_SIZE: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    Paper,
    Linen,
    Grain,
}

impl Texture {
    /// Non-premultiplied RGBA tile of `TILE_SIZE` x `TILE_SIZE`.
    ///
    /// The tile is a darkening/lightening overlay meant to be drawn over the
    /// background color at the texture opacity.
    pub fn tile(&self) -> Vec<u8> {
        let size = TILE_SIZE as usize;
        let mut data = Vec::with_capacity(size * size * 4);
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let n = noise(x, y, self.seed());
                let (shade, alpha) = match self {
                    // Soft fibrous paper: low-frequency blotches plus fine noise
                    Texture::Paper => {
                        let coarse = noise(x / 8, y / 8, 7);
                        let v = 0.65 * coarse + 0.35 * n;
                        (if v > 0.5 { 255 } else { 0 }, (((v - 0.5).abs() * 2.0) * 90.0) as u8)
                    }
                    // Woven threads: alternating horizontal and vertical strands
                    Texture::Linen => {
                        let warp = ((x % 4) as f32 / 3.0 - 0.5).abs();
                        let weft = ((y % 4) as f32 / 3.0 - 0.5).abs();
                        let v = (warp + weft) * 0.8 + 0.2 * n;
                        (0, (v * 110.0) as u8)
                    }
                    // Sparse dark and light speckles
                    Texture::Grain => {
                        if n > 0.93 {
                            (255, 150)
                        } else if n < 0.07 {
                            (0, 170)
                        } else {
                            (0, (n * 30.0) as u8)
                        }
                    }
                };
                data.extend_from_slice(&[shade, shade, shade, alpha]);
            }
        }
        data
    }

    fn seed(&self) -> u32 {
        match self {
            Texture::Paper => 0x9e37_79b9,
            Texture::Linen => 0x85eb_ca6b,
            Texture::Grain => 0xc2b2_ae35,
        }
    }
}

/// Hash a lattice point to a value in [0, 1).
fn noise(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x.wrapping_mul(0x27d4_eb2d) ^ y.wrapping_mul(0x1656_67b1) ^ seed;
    h ^= h >> 15;
    h = h.wrapping_mul(0x2c1b_3c6d);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297a_2d39);
    h ^= h >> 15;
    (h >> 8) as f32 / (1u32 << 24) as f32
}
