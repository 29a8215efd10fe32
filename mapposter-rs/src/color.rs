//! Serializable colors.

use mapposter_canvas2d::CanvasColor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB color that accepts any CSS color on input and serializes as
/// `#rrggbb` (or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);
    pub const WHITE: HexColor = HexColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the alpha channel by `factor` (clamped to 0..=1).
    pub fn with_alpha(self, factor: f32) -> Self {
        Self {
            a: (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn rgb_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_canvas(self) -> CanvasColor {
        CanvasColor::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl From<HexColor> for CanvasColor {
    fn from(c: HexColor) -> Self {
        c.to_canvas()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = csscolorparser::parse(s.trim()).map_err(|e| format!("{s:?}: {e}"))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self { r, g, b, a })
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e| serde::de::Error::custom(format!("invalid color {e}")))
    }
}
