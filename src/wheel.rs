// Wheel Module - Decorative wheel with rotating pattern layers, breathing pulse and tail
use std::rc::Rc;

use crate::palettes::Palette;
use crate::policy::GenerationPolicy;
use crate::surface::Surface;
use crate::types::{Point, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStyle {
    Dots,
    Rays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerStyle {
    Solid,
    Dots,
    Rays,
}

/// One rotating ring of dots or rays
#[derive(Debug, Clone)]
pub struct PatternLayer {
    pub radius: f64,
    pub dot_size: f64,
    pub count: usize,
    pub angle: f64, // degrees
    pub speed: f64, // degrees per frame
    pub style: LayerStyle,
    pub color: Rgba,
}

/// Core pattern of the wheel; only rotates when it is not a solid disc
#[derive(Debug, Clone)]
pub struct InnerPattern {
    pub radius: f64,
    pub dot_size: f64,
    pub count: usize,
    pub angle: f64,
    pub speed: f64,
    pub style: InnerStyle,
}

// (dot count, radius fraction, dot size range as fraction of r, speed range)
const LAYER_SPECS: [(usize, f64, (f64, f64), (f64, f64)); 3] = [
    (30, 0.90, (0.10, 0.14), (0.4, 0.8)),
    (20, 0.75, (0.12, 0.12), (-0.6, -0.3)),
    (18, 0.55, (0.10, 0.10), (0.2, 0.5)),
];

const INNER_RADIUS: f64 = 0.35;
const INNER_DOT_SIZE: f64 = 0.08;
const INNER_COUNT: usize = 30;

#[derive(Debug, Clone)]
pub struct Wheel {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub palette: Rc<Palette>,
    pub layers: [PatternLayer; 3],
    pub inner: InnerPattern,
    // Breathing pulse: phase and speed are in degrees, amplitude is a fraction of r
    pub pulse_phase: f64,
    pub pulse_speed: f64,
    pub pulse_amp: f64,
}

impl Wheel {
    pub fn new(x: f64, y: f64, r: f64, palette: Rc<Palette>, policy: &mut dyn GenerationPolicy) -> Self {
        // The starting phase keeps the sketch's [0, 2*PI) draw even though the phase is in degrees
        let pulse_phase = policy.uniform(0.0, std::f64::consts::TAU);
        let pulse_speed = policy.uniform(0.1, 1.0);
        let pulse_amp = policy.uniform(0.05, 0.15);

        let dot_colors = [palette.dots1, palette.dots2, palette.dots3];
        let layers = std::array::from_fn(|i| {
            let (count, radius, (size_lo, size_hi), (speed_lo, speed_hi)) = LAYER_SPECS[i];
            PatternLayer {
                radius: r * radius,
                dot_size: r * policy.uniform(size_lo, size_hi),
                count,
                angle: policy.uniform(0.0, 360.0),
                speed: policy.uniform(speed_lo, speed_hi),
                style: policy.choose_layer_style(),
                color: dot_colors[i],
            }
        });

        let inner = InnerPattern {
            radius: r * INNER_RADIUS,
            dot_size: r * INNER_DOT_SIZE,
            count: INNER_COUNT,
            angle: policy.uniform(0.0, 360.0),
            speed: policy.uniform(-0.7, 0.7),
            style: policy.choose_inner_style(),
        };

        Wheel {
            x,
            y,
            r,
            palette,
            layers,
            inner,
            pulse_phase,
            pulse_speed,
            pulse_amp,
        }
    }

    /// Advance one frame of rotation and breathing
    pub fn update(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.angle += layer.speed;
        }
        if self.inner.style != InnerStyle::Solid {
            self.inner.angle += self.inner.speed;
        }
        self.pulse_phase += self.pulse_speed;
    }

    pub fn breathing_scale(&self) -> f64 {
        breathing_scale(self.pulse_phase, self.pulse_amp)
    }

    pub fn display(&self, surface: &mut dyn Surface) {
        let r = self.r;
        let p = &self.palette;

        surface.push();
        surface.translate(self.x, self.y);
        surface.scale(self.breathing_scale());

        surface.fill_circle(Point::ORIGIN, r * 2.0, p.outer);
        surface.fill_circle(Point::ORIGIN, r * 1.9, p.ring1);
        self.draw_layer(surface, &self.layers[0]);

        surface.fill_circle(Point::ORIGIN, r * 1.55, p.ring2);
        self.draw_layer(surface, &self.layers[1]);
        self.draw_layer(surface, &self.layers[2]);

        surface.fill_circle(Point::ORIGIN, r * 0.95, p.ring3);

        surface.push();
        surface.rotate(self.inner.angle);
        match self.inner.style {
            InnerStyle::Solid => {
                surface.fill_circle(Point::ORIGIN, r * 0.6, p.inner);
            }
            InnerStyle::Dots => {
                draw_dot_ring(surface, self.inner.radius, self.inner.dot_size, p.dots3, self.inner.count);
                surface.fill_circle(Point::ORIGIN, r * 0.5, p.inner);
            }
            InnerStyle::Rays => {
                self.draw_rays(surface, self.inner.radius, p.rays, self.inner.count);
                surface.fill_circle(Point::ORIGIN, r * 0.5, p.inner);
            }
        }
        // Both discs sit at the origin so the inner rotation does not show
        surface.fill_circle(Point::ORIGIN, r * 0.32, p.center);
        surface.fill_circle(Point::ORIGIN, r * 0.12, Rgba::BLACK);
        surface.pop();

        self.draw_tail(surface);
        surface.pop();
    }

    fn draw_layer(&self, surface: &mut dyn Surface, layer: &PatternLayer) {
        surface.push();
        surface.rotate(layer.angle);
        match layer.style {
            LayerStyle::Dots => draw_dot_ring(surface, layer.radius, layer.dot_size, layer.color, layer.count),
            LayerStyle::Rays => self.draw_rays(surface, layer.radius, self.palette.rays, layer.count),
        }
        surface.pop();
    }

    fn draw_rays(&self, surface: &mut dyn Surface, radius: f64, color: Rgba, count: usize) {
        let weight = self.r * 0.05;
        for angle in ring_angles(count) {
            surface.stroke_line(
                Point::polar(radius * 0.4, angle),
                Point::polar(radius, angle),
                weight,
                color,
            );
        }
    }

    fn draw_tail(&self, surface: &mut dyn Surface) {
        let r = self.r;
        surface.stroke_quadratic(
            Point::ORIGIN,
            Point::new(r * 0.7, -r * 0.5),
            Point::new(r * 1.2, -r * 0.1),
            r * 0.08,
            self.palette.tail,
        );
    }
}

/// Uniform scale of a wheel at `phase` degrees
pub fn breathing_scale(phase_degrees: f64, amplitude: f64) -> f64 {
    1.0 + phase_degrees.to_radians().sin() * amplitude
}

// Evenly spaced angles in degrees, starting at 0
fn ring_angles(count: usize) -> impl Iterator<Item = f64> {
    let step = if count == 0 { 0.0 } else { 360.0 / count as f64 };
    (0..count).map(move |i| step * i as f64)
}

fn draw_dot_ring(surface: &mut dyn Surface, radius: f64, dot_size: f64, color: Rgba, count: usize) {
    for angle in ring_angles(count) {
        surface.fill_circle(Point::polar(radius, angle), dot_size, color);
    }
}
