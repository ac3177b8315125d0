// Surface Module - Immediate-mode 2D drawing interface with a transform stack
use crate::types::{Point, Rgba};

/// 2D affine transform: (x, y) -> (a*x + c*y + tx, b*x + d*y + ty)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    // self * other: `other` is applied first
    fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Length multiplier for the uniform part of the transform
    pub fn scale_factor(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Push/pop stack of transforms; the top is the current transform
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: Vec<Transform>,
}

impl Default for TransformStack {
    fn default() -> Self {
        TransformStack { stack: vec![Transform::IDENTITY] }
    }
}

impl TransformStack {
    pub fn current(&self) -> Transform {
        // The root entry is never popped
        self.stack[self.stack.len() - 1]
    }

    fn set_current(&mut self, t: Transform) {
        let last = self.stack.len() - 1;
        self.stack[last] = t;
    }

    pub fn push(&mut self) {
        self.stack.push(self.current());
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn reset(&mut self) {
        self.stack.truncate(1);
        self.stack[0] = Transform::IDENTITY;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let t = Transform { tx: dx, ty: dy, ..Transform::IDENTITY };
        self.set_current(self.current().then(&t));
    }

    pub fn rotate(&mut self, degrees: f64) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let t = Transform { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 };
        self.set_current(self.current().then(&t));
    }

    pub fn scale(&mut self, factor: f64) {
        let t = Transform { a: factor, d: factor, ..Transform::IDENTITY };
        self.set_current(self.current().then(&t));
    }
}

/// Drawing collaborator used by the background and the wheels.
///
/// Coordinates, diameters and stroke weights are in local units and are mapped
/// through the current transform. Rotation is in degrees.
pub trait Surface {
    /// Clear everything to an opaque color
    fn background(&mut self, color: Rgba);

    fn push(&mut self);
    fn pop(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, degrees: f64);
    fn scale(&mut self, factor: f64);

    fn fill_circle(&mut self, center: Point, diameter: f64, color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, weight: f64, color: Rgba);
    fn stroke_quadratic(&mut self, start: Point, ctrl: Point, end: Point, weight: f64, color: Rgba);
}
