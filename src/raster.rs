// Raster Module - Software RGBA surface with anti-aliased circles, lines and curves
use image::RgbaImage;

use crate::surface::{Surface, TransformStack};
use crate::types::{Point, Rgba};

// Quadratic curves are flattened into this many line segments
const CURVE_SEGMENTS: usize = 24;

pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>, // Linear-ish RGB in 0.0..=255.0, always opaque
    transforms: TransformStack,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Raster {
            width,
            height,
            pixels: vec![[0.0; 3]; (width * height) as usize],
            transforms: TransformStack::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 3]; (width * height) as usize];
        self.transforms.reset();
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.pixels[(y * self.width + x) as usize];
        Rgba::rgb(p[0].round() as u8, p[1].round() as u8, p[2].round() as u8)
    }

    /// Average color of a pixel block, clipped to the raster
    pub fn average(&self, x0: u32, y0: u32, w: u32, h: u32) -> Rgba {
        let x1 = (x0 + w).min(self.width);
        let y1 = (y0 + h).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return Rgba::BLACK;
        }

        let mut sum = [0.0f32; 3];
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let p = self.pixels[row + x as usize];
                sum[0] += p[0];
                sum[1] += p[1];
                sum[2] += p[2];
            }
        }
        let n = ((x1 - x0) * (y1 - y0)) as f32;
        Rgba::rgb(
            (sum[0] / n).round() as u8,
            (sum[1] / n).round() as u8,
            (sum[2] / n).round() as u8,
        )
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixel(x, y);
            image::Rgba([c.r, c.g, c.b, 255])
        })
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[(y as u32 * self.width + x as u32) as usize];
        dst[0] += (color.r as f32 - dst[0]) * alpha;
        dst[1] += (color.g as f32 - dst[1]) * alpha;
        dst[2] += (color.b as f32 - dst[2]) * alpha;
    }

    // Pixel range covering [lo, hi] on one axis, clipped to `limit`
    fn span(lo: f64, hi: f64, limit: u32) -> Option<(i64, i64)> {
        let start = (lo.floor() as i64).max(0);
        let end = (hi.ceil() as i64).min(limit as i64 - 1);
        if start > end || !lo.is_finite() || !hi.is_finite() {
            None
        } else {
            Some((start, end))
        }
    }

    // Filled disc in device space with a one-pixel soft edge
    fn fill_disc(&mut self, center: Point, radius: f64, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let Some((x0, x1)) = Self::span(center.x - radius - 1.0, center.x + radius + 1.0, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - radius - 1.0, center.y + radius + 1.0, self.height) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
                let coverage = (radius - d + 0.5) as f32;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    // Round-capped segment in device space
    fn fill_capsule(&mut self, a: Point, b: Point, half_width: f64, color: Rgba) {
        if half_width <= 0.0 {
            return;
        }
        let pad = half_width + 1.0;
        let Some((x0, x1)) = Self::span(a.x.min(b.x) - pad, a.x.max(b.x) + pad, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(a.y.min(b.y) - pad, a.y.max(b.y) + pad, self.height) else {
            return;
        };

        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let nearest = Point::new(a.x + dx * t, a.y + dy * t);
                let coverage = (half_width - p.distance(nearest) + 0.5) as f32;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

impl Surface for Raster {
    fn background(&mut self, color: Rgba) {
        let c = [color.r as f32, color.g as f32, color.b as f32];
        self.pixels.iter_mut().for_each(|p| *p = c);
        self.transforms.reset();
    }

    fn push(&mut self) {
        self.transforms.push();
    }

    fn pop(&mut self) {
        self.transforms.pop();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transforms.translate(dx, dy);
    }

    fn rotate(&mut self, degrees: f64) {
        self.transforms.rotate(degrees);
    }

    fn scale(&mut self, factor: f64) {
        self.transforms.scale(factor);
    }

    fn fill_circle(&mut self, center: Point, diameter: f64, color: Rgba) {
        let t = self.transforms.current();
        self.fill_disc(t.apply(center), diameter * 0.5 * t.scale_factor(), color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, weight: f64, color: Rgba) {
        let t = self.transforms.current();
        self.fill_capsule(t.apply(from), t.apply(to), weight * 0.5 * t.scale_factor(), color);
    }

    fn stroke_quadratic(&mut self, start: Point, ctrl: Point, end: Point, weight: f64, color: Rgba) {
        let t = self.transforms.current();
        let half_width = weight * 0.5 * t.scale_factor();

        let mut prev = t.apply(start);
        for i in 1..=CURVE_SEGMENTS {
            let s = i as f64 / CURVE_SEGMENTS as f64;
            let u = 1.0 - s;
            let local = Point::new(
                u * u * start.x + 2.0 * u * s * ctrl.x + s * s * end.x,
                u * u * start.y + 2.0 * u * s * ctrl.y + s * s * end.y,
            );
            let next = t.apply(local);
            self.fill_capsule(prev, next, half_width, color);
            prev = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgba = Rgba::rgb(4, 87, 131);

    #[test]
    fn test_background_and_circle() {
        let mut raster = Raster::new(40, 40);
        raster.background(BG);
        raster.fill_circle(Point::new(20.0, 20.0), 20.0, Rgba::WHITE);

        assert_eq!(raster.pixel(20, 20), Rgba::WHITE);
        assert_eq!(raster.pixel(0, 0), BG);
        // Just outside the radius
        assert_eq!(raster.pixel(20, 32), BG);
    }

    #[test]
    fn test_translucent_blend() {
        let mut raster = Raster::new(4, 4);
        raster.background(Rgba::BLACK);
        raster.fill_circle(Point::new(2.0, 2.0), 6.0, Rgba::WHITE.with_alpha(128));
        let p = raster.pixel(2, 2);
        assert!((126..=130).contains(&p.r), "{:?}", p);
    }

    #[test]
    fn test_transforms_apply_to_primitives() {
        let mut raster = Raster::new(60, 60);
        raster.background(Rgba::BLACK);
        raster.push();
        raster.translate(30.0, 30.0);
        raster.scale(2.0);
        raster.rotate(90.0);
        // Local (10, 0) lands at device (30, 50) after rotation and scaling
        raster.fill_circle(Point::new(10.0, 0.0), 3.0, Rgba::WHITE);
        raster.pop();

        assert_eq!(raster.pixel(30, 50), Rgba::WHITE);
        assert_eq!(raster.pixel(50, 30), Rgba::BLACK);
    }

    #[test]
    fn test_line_and_curve() {
        let mut raster = Raster::new(50, 50);
        raster.background(Rgba::BLACK);
        raster.stroke_line(Point::new(5.0, 10.0), Point::new(45.0, 10.0), 4.0, Rgba::WHITE);
        assert_eq!(raster.pixel(25, 10), Rgba::WHITE);
        assert_eq!(raster.pixel(25, 20), Rgba::BLACK);

        raster.stroke_quadratic(
            Point::new(5.0, 40.0),
            Point::new(25.0, 20.0),
            Point::new(45.0, 40.0),
            4.0,
            Rgba::WHITE,
        );
        // Curve midpoint is (25, 30)
        assert_eq!(raster.pixel(25, 30), Rgba::WHITE);
        assert_eq!(raster.pixel(25, 45), Rgba::BLACK);
    }

    #[test]
    fn test_clipping_and_export() {
        let mut raster = Raster::new(10, 8);
        raster.background(BG);
        raster.fill_circle(Point::new(-50.0, -50.0), 30.0, Rgba::WHITE);
        raster.fill_circle(Point::new(9.0, 7.0), 100.0, Rgba::WHITE);
        assert_eq!(raster.pixel(9, 7), Rgba::WHITE);

        let image = raster.to_image();
        assert_eq!(image.dimensions(), (10, 8));

        raster.resize(20, 5);
        assert_eq!(raster.dimensions(), (20, 5));
        assert_eq!(raster.average(0, 0, 100, 100), Rgba::BLACK);
    }
}
