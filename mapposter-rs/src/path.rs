//! Backend-independent vector paths in design pixels.

use serde::Serialize;

/// Bezier magic number for approximating a quarter circle with one cubic.
pub const KAPPA: f32 = 0.552_284_8;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// The largest square centered in this rectangle.
    pub fn centered_square(&self) -> Rect {
        let side = self.width.min(self.height);
        let (cx, cy) = self.center();
        Rect::new(cx - side / 2.0, cy - side / 2.0, side, side)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// One drawing command of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathSegment {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    CubicTo { c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32 },
    Close,
}

impl PathSegment {
    /// Apply `f` to every point of the segment, control points included.
    pub fn map_points(self, f: impl Fn(f32, f32) -> (f32, f32)) -> PathSegment {
        match self {
            PathSegment::MoveTo { x, y } => {
                let (x, y) = f(x, y);
                PathSegment::MoveTo { x, y }
            }
            PathSegment::LineTo { x, y } => {
                let (x, y) = f(x, y);
                PathSegment::LineTo { x, y }
            }
            PathSegment::QuadTo { cx, cy, x, y } => {
                let (cx, cy) = f(cx, cy);
                let (x, y) = f(x, y);
                PathSegment::QuadTo { cx, cy, x, y }
            }
            PathSegment::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                let (c1x, c1y) = f(c1x, c1y);
                let (c2x, c2y) = f(c2x, c2y);
                let (x, y) = f(x, y);
                PathSegment::CubicTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                }
            }
            PathSegment::Close => PathSegment::Close,
        }
    }

    fn points(&self) -> impl Iterator<Item = (f32, f32)> {
        let pts: [Option<(f32, f32)>; 3] = match *self {
            PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => [Some((x, y)), None, None],
            PathSegment::QuadTo { cx, cy, x, y } => [Some((cx, cy)), Some((x, y)), None],
            PathSegment::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => [Some((c1x, c1y)), Some((c2x, c2y)), Some((x, y))],
            PathSegment::Close => [None, None, None],
        };
        pts.into_iter().flatten()
    }
}

/// A path authored in the unit box (0..1 on both axes, y down).
#[derive(Debug, Clone, Copy)]
pub struct UnitPath(pub &'static [PathSegment]);

impl UnitPath {
    /// Scale uniformly by `min(box) * oversize`, centered in `rect`.
    pub fn fit(&self, rect: &Rect, oversize: f32) -> Vec<PathSegment> {
        let side = rect.width.min(rect.height) * oversize;
        let (cx, cy) = rect.center();
        let (ox, oy) = (cx - side / 2.0, cy - side / 2.0);
        self.0
            .iter()
            .map(|seg| seg.map_points(|x, y| (ox + x * side, oy + y * side)))
            .collect()
    }

    /// Scale to a square of `size` so the unit point `anchor` lands on `(x, y)`.
    pub fn place(&self, anchor: (f32, f32), x: f32, y: f32, size: f32) -> Vec<PathSegment> {
        let (ox, oy) = (x - anchor.0 * size, y - anchor.1 * size);
        self.0
            .iter()
            .map(|seg| seg.map_points(|px, py| (ox + px * size, oy + py * size)))
            .collect()
    }
}

/// A closed rectangle path.
pub fn rect_path(rect: &Rect) -> Vec<PathSegment> {
    vec![
        PathSegment::MoveTo { x: rect.x, y: rect.y },
        PathSegment::LineTo {
            x: rect.right(),
            y: rect.y,
        },
        PathSegment::LineTo {
            x: rect.right(),
            y: rect.bottom(),
        },
        PathSegment::LineTo {
            x: rect.x,
            y: rect.bottom(),
        },
        PathSegment::Close,
    ]
}

/// A closed circle made of four cubic segments.
pub fn circle_path(cx: f32, cy: f32, r: f32) -> Vec<PathSegment> {
    let k = r * KAPPA;
    vec![
        PathSegment::MoveTo { x: cx + r, y: cy },
        PathSegment::CubicTo {
            c1x: cx + r,
            c1y: cy + k,
            c2x: cx + k,
            c2y: cy + r,
            x: cx,
            y: cy + r,
        },
        PathSegment::CubicTo {
            c1x: cx - k,
            c1y: cy + r,
            c2x: cx - r,
            c2y: cy + k,
            x: cx - r,
            y: cy,
        },
        PathSegment::CubicTo {
            c1x: cx - r,
            c1y: cy - k,
            c2x: cx - k,
            c2y: cy - r,
            x: cx,
            y: cy - r,
        },
        PathSegment::CubicTo {
            c1x: cx + k,
            c1y: cy - r,
            c2x: cx + r,
            c2y: cy - k,
            x: cx + r,
            y: cy,
        },
        PathSegment::Close,
    ]
}

/// Bounding box of all points, control points included.
pub fn path_bounds(path: &[PathSegment]) -> Option<Rect> {
    let mut pts = path.iter().flat_map(|seg| seg.points());
    let (x0, y0) = pts.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    for (x, y) in pts {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: UnitPath = UnitPath(&[
        PathSegment::MoveTo { x: 0.5, y: 0.0 },
        PathSegment::LineTo { x: 1.0, y: 1.0 },
        PathSegment::LineTo { x: 0.0, y: 1.0 },
        PathSegment::Close,
    ]);

    #[test]
    fn test_fit_preserves_aspect_and_centers() {
        let rect = Rect::new(100.0, 0.0, 400.0, 200.0);
        let bounds = path_bounds(&TRIANGLE.fit(&rect, 1.0)).unwrap();
        assert_eq!(bounds, Rect::new(200.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_fit_oversize_grows_around_center() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = path_bounds(&TRIANGLE.fit(&rect, 2.0)).unwrap();
        assert_eq!(bounds, Rect::new(-50.0, -50.0, 200.0, 200.0));
    }

    #[test]
    fn test_place_puts_anchor_on_point() {
        let placed = TRIANGLE.place((0.5, 1.0), 300.0, 400.0, 40.0);
        let bounds = path_bounds(&placed).unwrap();
        assert_eq!(bounds, Rect::new(280.0, 360.0, 40.0, 40.0));
    }

    #[test]
    fn test_circle_bounds() {
        let bounds = path_bounds(&circle_path(50.0, 60.0, 10.0)).unwrap();
        assert_eq!(bounds, Rect::new(40.0, 50.0, 20.0, 20.0));
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.inset(2.0), Rect::new(12.0, 22.0, 96.0, 46.0));
        assert_eq!(rect.centered_square(), Rect::new(35.0, 20.0, 50.0, 50.0));
        assert_eq!(rect.center(), (60.0, 45.0));
        assert!(rect.contains(60.0, 45.0));
        assert!(!rect.contains(5.0, 45.0));
    }
}
