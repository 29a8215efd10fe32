//! Pin markers and frame glow.

use crate::color::HexColor;
use crate::design::SizeTier;
use crate::frame::{FrameGeometry, HEART_PATH, HOUSE_PATH};
use crate::path::{circle_path, rect_path, PathSegment, Rect, UnitPath};
use serde::{Deserialize, Serialize};

pub const PIN_BASE_SIZE: f32 = 40.0;
pub const PIN_SHADOW_BLUR: f32 = 4.0;
pub const PIN_SHADOW_OFFSET_Y: f32 = 2.0;
pub const PIN_SHADOW_COLOR: HexColor = HexColor::rgba(0, 0, 0, 89);

/// Glow blur is `intensity * style blur * GLOW_BLUR_FACTOR`.
pub const GLOW_BLUR_FACTOR: f32 = 3.0;

/// A blurred shadow cast by a filled shape, in design pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: HexColor,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlowStyle {
    #[default]
    Soft,
    Neon,
    Halo,
    Sunset,
}

impl GlowStyle {
    pub fn base_blur(&self) -> f32 {
        match self {
            GlowStyle::Soft => 12.0,
            GlowStyle::Neon => 18.0,
            GlowStyle::Halo => 14.0,
            GlowStyle::Sunset => 16.0,
        }
    }

    /// Glow color. `Soft` follows the poster text color.
    pub fn color(&self, text_color: HexColor) -> HexColor {
        match self {
            GlowStyle::Soft => text_color.with_alpha(0.55),
            GlowStyle::Neon => HexColor::rgb(0x3d, 0xe0, 0xff),
            GlowStyle::Halo => HexColor::WHITE,
            GlowStyle::Sunset => HexColor::rgb(0xff, 0x8a, 0x3d),
        }
    }
}

/// A filled shape casting the glow around the frame, or `None` when the
/// frame cannot glow.
pub fn glow_shape(
    frame: &FrameGeometry,
    style: GlowStyle,
    intensity: f32,
    text_color: HexColor,
) -> Option<(Vec<PathSegment>, HexColor, Shadow)> {
    if !frame.shape.supports_glow() || intensity <= 0.0 {
        return None;
    }
    let color = style.color(text_color);
    let shadow = Shadow {
        color,
        blur: intensity * style.base_blur() * GLOW_BLUR_FACTOR,
        offset_x: 0.0,
        offset_y: 0.0,
    };
    Some((frame.outline_path(), color, shadow))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStyle {
    #[default]
    Basic,
    /// Classic teardrop marker.
    Fave,
    Lollipop,
    Heart,
    Home,
}

impl PinStyle {
    pub const ALL: [PinStyle; 5] = [
        PinStyle::Basic,
        PinStyle::Fave,
        PinStyle::Lollipop,
        PinStyle::Heart,
        PinStyle::Home,
    ];
}

pub fn pin_tier(tier: SizeTier) -> f32 {
    match tier {
        SizeTier::S => 0.75,
        SizeTier::M => 1.0,
        SizeTier::L => 1.35,
    }
}

/// How a pin part is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFill {
    Tint,
    White,
}

enum PartShape {
    Path(UnitPath),
    Circle { cx: f32, cy: f32, r: f32 },
    Rect(Rect),
}

struct PinPartRecipe {
    shape: PartShape,
    fill: PinFill,
}

/// Parts in paint order plus the unit-box point placed on the location.
struct PinRecipe {
    parts: &'static [PinPartRecipe],
    anchor: (f32, f32),
}

const TEARDROP: UnitPath = UnitPath(&[
    PathSegment::MoveTo { x: 0.5, y: 1.0 },
    PathSegment::CubicTo {
        c1x: 0.5,
        c1y: 1.0,
        c2x: 0.15,
        c2y: 0.62,
        x: 0.15,
        y: 0.38,
    },
    PathSegment::CubicTo {
        c1x: 0.15,
        c1y: 0.17,
        c2x: 0.31,
        c2y: 0.0,
        x: 0.5,
        y: 0.0,
    },
    PathSegment::CubicTo {
        c1x: 0.69,
        c1y: 0.0,
        c2x: 0.85,
        c2y: 0.17,
        x: 0.85,
        y: 0.38,
    },
    PathSegment::CubicTo {
        c1x: 0.85,
        c1y: 0.62,
        c2x: 0.5,
        c2y: 1.0,
        x: 0.5,
        y: 1.0,
    },
    PathSegment::Close,
]);

const BASIC: PinRecipe = PinRecipe {
    parts: &[
        PinPartRecipe {
            shape: PartShape::Circle {
                cx: 0.5,
                cy: 0.5,
                r: 0.28,
            },
            fill: PinFill::Tint,
        },
        PinPartRecipe {
            shape: PartShape::Circle {
                cx: 0.5,
                cy: 0.5,
                r: 0.1,
            },
            fill: PinFill::White,
        },
    ],
    anchor: (0.5, 0.5),
};

const FAVE: PinRecipe = PinRecipe {
    parts: &[
        PinPartRecipe {
            shape: PartShape::Path(TEARDROP),
            fill: PinFill::Tint,
        },
        PinPartRecipe {
            shape: PartShape::Circle {
                cx: 0.5,
                cy: 0.38,
                r: 0.13,
            },
            fill: PinFill::White,
        },
    ],
    anchor: (0.5, 1.0),
};

const LOLLIPOP: PinRecipe = PinRecipe {
    parts: &[
        PinPartRecipe {
            shape: PartShape::Rect(Rect::new(0.46, 0.5, 0.08, 0.5)),
            fill: PinFill::Tint,
        },
        PinPartRecipe {
            shape: PartShape::Circle {
                cx: 0.5,
                cy: 0.3,
                r: 0.28,
            },
            fill: PinFill::Tint,
        },
        PinPartRecipe {
            shape: PartShape::Circle {
                cx: 0.5,
                cy: 0.3,
                r: 0.09,
            },
            fill: PinFill::White,
        },
    ],
    anchor: (0.5, 1.0),
};

const HEART: PinRecipe = PinRecipe {
    parts: &[PinPartRecipe {
        shape: PartShape::Path(HEART_PATH),
        fill: PinFill::Tint,
    }],
    anchor: (0.5, 0.59),
};

const HOME: PinRecipe = PinRecipe {
    parts: &[
        PinPartRecipe {
            shape: PartShape::Path(HOUSE_PATH),
            fill: PinFill::Tint,
        },
        PinPartRecipe {
            shape: PartShape::Rect(Rect::new(0.43, 0.66, 0.14, 0.225)),
            fill: PinFill::White,
        },
    ],
    anchor: (0.5, 0.885),
};

fn recipe(style: PinStyle) -> &'static PinRecipe {
    match style {
        PinStyle::Basic => &BASIC,
        PinStyle::Fave => &FAVE,
        PinStyle::Lollipop => &LOLLIPOP,
        PinStyle::Heart => &HEART,
        PinStyle::Home => &HOME,
    }
}

/// One filled part of a placed pin.
#[derive(Debug, Clone, PartialEq)]
pub struct PinPart {
    pub path: Vec<PathSegment>,
    pub color: HexColor,
    /// Only the base part casts the drop shadow.
    pub shadow: Option<Shadow>,
}

/// Pin parts placed so the style's anchor sits on `(x, y)`.
pub fn pin_parts(style: PinStyle, tier: SizeTier, tint: HexColor, x: f32, y: f32) -> Vec<PinPart> {
    let size = PIN_BASE_SIZE * pin_tier(tier);
    let recipe = recipe(style);
    let (ax, ay) = recipe.anchor;
    let to_design = |ux: f32, uy: f32| (x + (ux - ax) * size, y + (uy - ay) * size);

    recipe
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let path = match &part.shape {
                PartShape::Path(unit) => unit.place(recipe.anchor, x, y, size),
                PartShape::Circle { cx, cy, r } => {
                    let (px, py) = to_design(*cx, *cy);
                    circle_path(px, py, r * size)
                }
                PartShape::Rect(rect) => {
                    let (px, py) = to_design(rect.x, rect.y);
                    rect_path(&Rect::new(px, py, rect.width * size, rect.height * size))
                }
            };
            let color = match part.fill {
                PinFill::Tint => tint,
                PinFill::White => HexColor::WHITE,
            };
            let shadow = (i == 0).then_some(Shadow {
                color: PIN_SHADOW_COLOR,
                blur: PIN_SHADOW_BLUR,
                offset_x: 0.0,
                offset_y: PIN_SHADOW_OFFSET_Y,
            });
            PinPart {
                path,
                color,
                shadow,
            }
        })
        .collect()
}
