// Policy Module - Source of every random decision made while generating the sketch
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

use crate::palettes::{Palette, PaletteCatalog};
use crate::wheel::{InnerStyle, LayerStyle};

/// Random choices used by the background, layout and wheel construction.
///
/// Only `uniform` and `choose_index` need implementing; the style and palette
/// choices are derived from them so a seeded policy reproduces a whole layout.
pub trait GenerationPolicy {
    /// Uniform sample in [lo, hi); returns `lo` for an empty range
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Uniform index in [0, len); returns 0 when `len` is 0
    fn choose_index(&mut self, len: usize) -> usize;

    // Dot-heavy: three in four layers get dots
    fn choose_layer_style(&mut self) -> LayerStyle {
        if self.uniform(0.0, 1.0) < 0.75 {
            LayerStyle::Dots
        } else {
            LayerStyle::Rays
        }
    }

    fn choose_inner_style(&mut self) -> InnerStyle {
        match self.choose_index(3) {
            0 => InnerStyle::Solid,
            1 => InnerStyle::Dots,
            _ => InnerStyle::Rays,
        }
    }

    fn choose_palette(&mut self, catalog: &PaletteCatalog) -> Rc<Palette> {
        catalog.pick(self)
    }
}

/// `GenerationPolicy` backed by a `StdRng`
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn seeded(seed: u64) -> Self {
        RandomPolicy { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        RandomPolicy { rng: StdRng::from_entropy() }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl GenerationPolicy for RandomPolicy {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if !(lo < hi) {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic policy: always the midpoint of the range and the first index
    pub(crate) struct MidpointPolicy;

    impl GenerationPolicy for MidpointPolicy {
        fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
            (lo + hi) / 2.0
        }

        fn choose_index(&mut self, _len: usize) -> usize {
            0
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut policy = RandomPolicy::seeded(1);
        for _ in 0..1000 {
            let v = policy.uniform(-0.02, 0.02);
            assert!((-0.02..0.02).contains(&v));
        }
        assert_eq!(policy.uniform(3.0, 3.0), 3.0);
        assert_eq!(policy.uniform(5.0, 1.0), 5.0);
        assert_eq!(policy.choose_index(0), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomPolicy::seeded(99);
        let mut b = RandomPolicy::seeded(99);
        for _ in 0..50 {
            assert_eq!(a.uniform(0.0, 360.0), b.uniform(0.0, 360.0));
            assert_eq!(a.choose_index(10), b.choose_index(10));
        }
    }

    #[test]
    fn test_layer_style_is_dot_heavy() {
        let mut policy = RandomPolicy::seeded(2024);
        let dots = (0..4000)
            .filter(|_| policy.choose_layer_style() == LayerStyle::Dots)
            .count();
        let ratio = dots as f64 / 4000.0;
        assert!((0.70..0.80).contains(&ratio), "dots ratio {}", ratio);
    }

    #[test]
    fn test_inner_style_covers_all() {
        let mut policy = RandomPolicy::seeded(5);
        let styles: Vec<InnerStyle> = (0..300).map(|_| policy.choose_inner_style()).collect();
        assert!(styles.contains(&InnerStyle::Solid));
        assert!(styles.contains(&InnerStyle::Dots));
        assert!(styles.contains(&InnerStyle::Rays));
    }
}
