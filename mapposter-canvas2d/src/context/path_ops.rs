//! Path building operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::{CubicBezierParams, QuadraticBezierParams, RectParams};
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        log::debug!(target: "canvas", "beginPath");
        self.path_builder = tiny_skia::PathBuilder::new();
        self.has_current_point = false;
    }

    /// Transform a point by the current transformation matrix.
    /// Path coordinates are transformed when added to the path.
    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        Self::map_point_with_transform(&self.state.transform, x, y)
    }

    pub(crate) fn map_point_with_transform(transform: &Transform, x: f32, y: f32) -> (f32, f32) {
        (
            transform.sx * x + transform.kx * y + transform.tx,
            transform.ky * x + transform.sy * y + transform.ty,
        )
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.move_to(tx, ty);
        self.current_x = tx;
        self.current_y = ty;
        self.subpath_start_x = tx;
        self.subpath_start_y = ty;
        self.has_current_point = true;
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.transform_point(x, y);
        if !self.has_current_point {
            // A line with no current point starts a new subpath
            self.move_to(x, y);
            return;
        }
        self.path_builder.line_to(tx, ty);
        self.current_x = tx;
        self.current_y = ty;
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        self.path_builder.close();
        self.current_x = self.subpath_start_x;
        self.current_y = self.subpath_start_y;
    }

    /// Add a cubic bezier curve.
    pub fn bezier_curve_to(&mut self, params: &CubicBezierParams) {
        if !self.has_current_point {
            self.move_to(params.cp1x, params.cp1y);
        }
        let (tcp1x, tcp1y) = self.transform_point(params.cp1x, params.cp1y);
        let (tcp2x, tcp2y) = self.transform_point(params.cp2x, params.cp2y);
        let (tx, ty) = self.transform_point(params.x, params.y);
        self.path_builder.cubic_to(tcp1x, tcp1y, tcp2x, tcp2y, tx, ty);
        self.current_x = tx;
        self.current_y = ty;
    }

    /// Add a quadratic bezier curve.
    pub fn quadratic_curve_to(&mut self, params: &QuadraticBezierParams) {
        if !self.has_current_point {
            self.move_to(params.cpx, params.cpy);
        }
        let (tcpx, tcpy) = self.transform_point(params.cpx, params.cpy);
        let (tx, ty) = self.transform_point(params.x, params.y);
        self.path_builder.quad_to(tcpx, tcpy, tx, ty);
        self.current_x = tx;
        self.current_y = ty;
    }

    /// Add a rectangle to the path.
    pub fn rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "rect {} {} {} {}", params.x, params.y, params.width, params.height);
        let (x0, y0) = self.transform_point(params.x, params.y);
        let (x1, y1) = self.transform_point(params.x + params.width, params.y);
        let (x2, y2) = self.transform_point(params.x + params.width, params.y + params.height);
        let (x3, y3) = self.transform_point(params.x, params.y + params.height);

        self.path_builder.move_to(x0, y0);
        self.path_builder.line_to(x1, y1);
        self.path_builder.line_to(x2, y2);
        self.path_builder.line_to(x3, y3);
        self.path_builder.close();

        self.current_x = x0;
        self.current_y = y0;
        self.subpath_start_x = x0;
        self.subpath_start_y = y0;
        self.has_current_point = true;
    }

    /// Device-space bounds of the current path, if it is non-empty.
    pub fn current_path_bounds(&self) -> Option<tiny_skia::Rect> {
        self.path_builder.clone().finish().map(|path| path.bounds())
    }
}
