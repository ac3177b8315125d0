// Animation Module - Per-frame orchestration of background and wheels
use crate::background::BackgroundField;
use crate::layout::{self, GridSpec};
use crate::palettes::PaletteCatalog;
use crate::policy::GenerationPolicy;
use crate::surface::Surface;
use crate::types::Rgba;
use crate::wheel::Wheel;

/// Whether wheels advance between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    enabled: bool,
}

impl AnimationState {
    pub fn new(enabled: bool) -> Self {
        AnimationState { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the flag and return the new value
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

/// Settings the controller needs to build a scene
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub particle_count: usize,
    pub particle_colors: Vec<Rgba>,
    pub background: Rgba,
    pub density: f64,
    pub animate: bool,
}

pub struct AnimationController {
    state: AnimationState,
    background: BackgroundField,
    wheels: Vec<Wheel>,
    catalog: PaletteCatalog,
    policy: Box<dyn GenerationPolicy>,
    width: f64,
    height: f64,
    density: f64,
    frame_count: u64,
}

impl AnimationController {
    pub fn new(
        width: f64,
        height: f64,
        settings: &SceneSettings,
        catalog: PaletteCatalog,
        mut policy: Box<dyn GenerationPolicy>,
    ) -> Self {
        let mut background = BackgroundField::new(
            settings.particle_count,
            width,
            height,
            &settings.particle_colors,
            policy.as_mut(),
        );
        background.clear_color = settings.background;
        let wheels = layout::layout(width, height, settings.density, &catalog, policy.as_mut());

        AnimationController {
            state: AnimationState::new(settings.animate),
            background,
            wheels,
            catalog,
            policy,
            width,
            height,
            density: settings.density,
            frame_count: 0,
        }
    }

    /// Paint one frame: background first, then every wheel in layout order
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        self.background.paint(surface, self.policy.as_mut());

        let animate = self.state.is_enabled();
        for wheel in self.wheels.iter_mut() {
            if animate {
                wheel.update();
            }
            wheel.display(surface);
        }
        self.frame_count += 1;
    }

    /// Key input: only 'a' / 'A' is handled. Returns true when the key toggled animation.
    pub fn handle_key(&mut self, key: char) -> bool {
        if key.eq_ignore_ascii_case(&'a') {
            let enabled = self.state.toggle();
            log::debug!("animation {}", if enabled { "enabled" } else { "paused" });
            true
        } else {
            false
        }
    }

    /// Replace the whole wheel set for a new canvas size; particles are kept
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.background.set_bounds(width, height);
        self.relayout();
    }

    pub fn set_density(&mut self, density: f64) {
        if density != self.density {
            self.density = density;
            self.relayout();
        }
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background.clear_color = color;
    }

    fn relayout(&mut self) {
        self.wheels = layout::layout(
            self.width,
            self.height,
            self.density,
            &self.catalog,
            self.policy.as_mut(),
        );
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    pub fn particle_count(&self) -> usize {
        self.background.particles.len()
    }

    pub fn palette_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec::for_canvas(self.width, self.height, self.density)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
