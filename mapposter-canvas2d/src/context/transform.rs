//! Transform operations for Canvas2dContext.

use super::Canvas2dContext;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Translate the coordinate system.
    pub fn translate(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "translate {} {}", x, y);
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    /// Scale the coordinate system.
    pub fn scale(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "scale {} {}", x, y);
        self.state.transform = self.state.transform.pre_scale(x, y);
    }

    /// Reset the transform to identity.
    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::identity();
    }

    /// Get the current transformation matrix.
    pub fn get_transform(&self) -> Transform {
        self.state.transform
    }

    /// Average axis scale of the current transform, used to scale
    /// user-space lengths such as stroke widths and blur radii.
    pub(crate) fn transform_scale(&self) -> f32 {
        let t = &self.state.transform;
        ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0
    }
}
