// Background Module - Drifting translucent particle texture painted behind the wheels
use crate::policy::GenerationPolicy;
use crate::surface::Surface;
use crate::types::{Point, Rgba};

pub const DEFAULT_BACKGROUND: Rgba = Rgba::rgb(4, 87, 131); // teal base
pub const DEFAULT_PARTICLE_COLORS: &str = "FFFFFF,C7EBFF,FFAEC0,FFCF70,9EE7C8,F48BFD,A7F0FF,FFC2DD";

const WRAP_MARGIN: f64 = 10.0;
const MAX_SPEED: f64 = 0.5;
const INITIAL_SPEED: f64 = 0.4;
const JITTER: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub size: f64, // drawn diameter
    pub color: Rgba,
}

impl Particle {
    // Move, nudge the velocity, then wrap around the margin on each axis
    fn step(&mut self, width: f64, height: f64, policy: &mut dyn GenerationPolicy) {
        self.x += self.speed_x;
        self.y += self.speed_y;

        self.speed_x = (self.speed_x + policy.uniform(-JITTER, JITTER)).clamp(-MAX_SPEED, MAX_SPEED);
        self.speed_y = (self.speed_y + policy.uniform(-JITTER, JITTER)).clamp(-MAX_SPEED, MAX_SPEED);

        self.x = wrap(self.x, width);
        self.y = wrap(self.y, height);
    }
}

// Toroidal wrap with a margin on both sides
fn wrap(v: f64, extent: f64) -> f64 {
    if v < -WRAP_MARGIN {
        extent + WRAP_MARGIN
    } else if v > extent + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        v
    }
}

pub struct BackgroundField {
    pub particles: Vec<Particle>,
    pub width: f64,
    pub height: f64,
    pub clear_color: Rgba,
}

impl BackgroundField {
    pub fn new(
        count: usize,
        width: f64,
        height: f64,
        base_colors: &[Rgba],
        policy: &mut dyn GenerationPolicy,
    ) -> Self {
        let base_colors: &[Rgba] = if base_colors.is_empty() { &[Rgba::WHITE] } else { base_colors };

        let particles = (0..count)
            .map(|_| {
                let x = policy.uniform(0.0, width);
                let y = policy.uniform(0.0, height);
                let size = policy.uniform(3.0, 15.0);
                let speed_x = policy.uniform(-INITIAL_SPEED, INITIAL_SPEED);
                let speed_y = policy.uniform(-INITIAL_SPEED, INITIAL_SPEED);
                let base = base_colors[policy.choose_index(base_colors.len())];
                let alpha = policy.uniform(20.0, 120.0) as u8;
                Particle { x, y, speed_x, speed_y, size, color: base.with_alpha(alpha) }
            })
            .collect();

        BackgroundField {
            particles,
            width,
            height,
            clear_color: DEFAULT_BACKGROUND,
        }
    }

    /// New canvas bounds; particles are kept and wrap on their next step
    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Physics only, one frame
    pub fn tick(&mut self, policy: &mut dyn GenerationPolicy) {
        let (w, h) = (self.width, self.height);
        for p in self.particles.iter_mut() {
            p.step(w, h, policy);
        }
    }

    /// Clear the surface, draw every particle where it is, then advance the field
    pub fn paint(&mut self, surface: &mut dyn Surface, policy: &mut dyn GenerationPolicy) {
        surface.background(self.clear_color);
        for p in &self.particles {
            surface.fill_circle(Point::new(p.x, p.y), p.size, p.color);
        }
        self.tick(policy);
    }
}
