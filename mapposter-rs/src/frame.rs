//! Frame shapes and their geometry at design resolution.

use crate::path::{circle_path, rect_path, PathSegment, Rect, UnitPath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inset applied to the square clip so the border stroke covers the map edge.
pub const SQUARE_CLIP_INSET: f32 = 2.0;

/// The house silhouette is drawn larger than its box; the outline spans
/// 0.115..0.885 of the unit box, so this factor puts it on the box edge.
pub const HOUSE_OVERSIZE: f32 = 1.3;

/// Heart silhouette in the unit box.
pub const HEART_PATH: UnitPath = UnitPath(&[
    PathSegment::MoveTo { x: 0.5, y: 0.22 },
    PathSegment::CubicTo {
        c1x: 0.38,
        c1y: 0.02,
        c2x: 0.0,
        c2y: 0.08,
        x: 0.02,
        y: 0.38,
    },
    PathSegment::CubicTo {
        c1x: 0.04,
        c1y: 0.62,
        c2x: 0.3,
        c2y: 0.78,
        x: 0.5,
        y: 0.96,
    },
    PathSegment::CubicTo {
        c1x: 0.7,
        c1y: 0.78,
        c2x: 0.96,
        c2y: 0.62,
        x: 0.98,
        y: 0.38,
    },
    PathSegment::CubicTo {
        c1x: 1.0,
        c1y: 0.08,
        c2x: 0.62,
        c2y: 0.02,
        x: 0.5,
        y: 0.22,
    },
    PathSegment::Close,
]);

/// House silhouette (gable roof with eaves) in the unit box.
pub const HOUSE_PATH: UnitPath = UnitPath(&[
    PathSegment::MoveTo { x: 0.5, y: 0.115 },
    PathSegment::LineTo { x: 0.885, y: 0.45 },
    PathSegment::LineTo { x: 0.80, y: 0.45 },
    PathSegment::LineTo { x: 0.80, y: 0.885 },
    PathSegment::LineTo { x: 0.20, y: 0.885 },
    PathSegment::LineTo { x: 0.20, y: 0.45 },
    PathSegment::LineTo { x: 0.115, y: 0.45 },
    PathSegment::Close,
]);

/// The closed set of frame silhouettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameShape {
    Square,
    #[default]
    Circle,
    Heart,
    House,
}

impl FrameShape {
    pub const ALL: [FrameShape; 4] = [
        FrameShape::Square,
        FrameShape::Circle,
        FrameShape::Heart,
        FrameShape::House,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameShape::Square => "square",
            FrameShape::Circle => "circle",
            FrameShape::Heart => "heart",
            FrameShape::House => "house",
        }
    }

    /// Square frames never glow.
    pub fn supports_glow(&self) -> bool {
        !matches!(self, FrameShape::Square)
    }

    /// Fixed frame box for this shape, with or without a headline above it.
    pub fn preset(&self, has_headline: bool) -> Rect {
        match (self, has_headline) {
            (FrameShape::Square | FrameShape::Circle, false) => Rect::new(100.0, 110.0, 600.0, 600.0),
            (FrameShape::Square | FrameShape::Circle, true) => Rect::new(130.0, 190.0, 540.0, 540.0),
            (FrameShape::Heart, false) => Rect::new(90.0, 100.0, 620.0, 580.0),
            (FrameShape::Heart, true) => Rect::new(120.0, 180.0, 560.0, 524.0),
            (FrameShape::House, false) => Rect::new(110.0, 100.0, 580.0, 620.0),
            (FrameShape::House, true) => Rect::new(140.0, 180.0, 520.0, 556.0),
        }
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrameShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown frame shape {s:?}"))
    }
}

/// Placement of a frame on the poster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameGeometry {
    pub shape: FrameShape,
    pub rect: Rect,
}

impl FrameGeometry {
    pub fn x(&self) -> f32 {
        self.rect.x
    }

    pub fn y(&self) -> f32 {
        self.rect.y
    }

    pub fn width(&self) -> f32 {
        self.rect.width
    }

    pub fn height(&self) -> f32 {
        self.rect.height
    }

    pub fn bottom(&self) -> f32 {
        self.rect.bottom()
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect.center()
    }

    /// The silhouette the basemap is clipped to.
    pub fn clip_path(&self) -> Vec<PathSegment> {
        self.clip_path_for(&self.rect)
    }

    /// The silhouette for an arbitrary box, using this frame's shape.
    pub fn clip_path_for(&self, rect: &Rect) -> Vec<PathSegment> {
        match self.shape {
            FrameShape::Square => rect_path(&rect.inset(SQUARE_CLIP_INSET)),
            FrameShape::Circle => {
                let (cx, cy) = rect.center();
                circle_path(cx, cy, rect.width.min(rect.height) / 2.0)
            }
            FrameShape::Heart => HEART_PATH.fit(rect, 1.0),
            FrameShape::House => HOUSE_PATH.fit(rect, HOUSE_OVERSIZE),
        }
    }

    /// The outline stroked by the frame border and filled by the glow.
    pub fn outline_path(&self) -> Vec<PathSegment> {
        match self.shape {
            FrameShape::Square => rect_path(&self.rect),
            _ => self.clip_path(),
        }
    }
}

/// Frame box and silhouette for `shape`, depending on whether a headline is shown.
pub fn frame_geometry(shape: FrameShape, has_headline: bool) -> FrameGeometry {
    FrameGeometry {
        shape,
        rect: shape.preset(has_headline),
    }
}
