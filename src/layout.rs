// Layout Module - Hexagonal grid of wheels covering the canvas with overscan
use crate::palettes::PaletteCatalog;
use crate::policy::GenerationPolicy;
use crate::wheel::Wheel;

pub const DEFAULT_DENSITY: f64 = 10.0;

/// Grid geometry for one canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub base_radius: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub cols: usize,
    pub rows: usize,
}

impl GridSpec {
    /// `density` is how many base radii fit across the shorter canvas side
    pub fn for_canvas(width: f64, height: f64, density: f64) -> Self {
        let width = sane_extent(width);
        let height = sane_extent(height);
        let density = if density.is_finite() && density > 0.0 { density } else { DEFAULT_DENSITY };

        let base_radius = width.min(height) / density;
        let spacing_x = base_radius * 2.0;
        let spacing_y = base_radius * 3f64.sqrt();

        // Cover one base radius past every edge
        let start_x = -base_radius;
        let start_y = -base_radius;
        let end_x = width + base_radius;
        let end_y = height + base_radius;

        let cols = ((end_x - start_x) / spacing_x).ceil() as usize + 1;
        let rows = ((end_y - start_y) / spacing_y).ceil() as usize + 1;

        GridSpec { base_radius, spacing_x, spacing_y, start_x, start_y, cols, rows }
    }

    /// Odd rows are shifted by half a column
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let row_offset = if row % 2 == 0 { 0.0 } else { self.spacing_x / 2.0 };
        (
            self.start_x + col as f64 * self.spacing_x + row_offset,
            self.start_y + row as f64 * self.spacing_y,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

fn sane_extent(v: f64) -> f64 {
    if v.is_finite() && v >= 1.0 {
        v
    } else {
        1.0
    }
}

/// One wheel per grid cell in row-major order, including cells off the canvas
pub fn layout(
    width: f64,
    height: f64,
    density: f64,
    catalog: &PaletteCatalog,
    policy: &mut dyn GenerationPolicy,
) -> Vec<Wheel> {
    let grid = GridSpec::for_canvas(width, height, density);
    let mut wheels = Vec::with_capacity(grid.cell_count());

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (x, y) = grid.cell_center(col, row);
            let r = (grid.base_radius * policy.uniform(0.75, 0.9)).min(grid.base_radius);
            let palette = policy.choose_palette(catalog);
            wheels.push(Wheel::new(x, y, r, palette, policy));
        }
    }

    log::debug!(
        "layout {}x{}: base radius {:.1}, {} cols x {} rows",
        width,
        height,
        grid.base_radius,
        grid.cols,
        grid.rows
    );
    wheels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RandomPolicy;

    fn run(w: f64, h: f64, seed: u64) -> (GridSpec, Vec<Wheel>) {
        let catalog = PaletteCatalog::builtin();
        let mut policy = RandomPolicy::seeded(seed);
        (GridSpec::for_canvas(w, h, DEFAULT_DENSITY), layout(w, h, DEFAULT_DENSITY, &catalog, &mut policy))
    }

    #[test]
    fn test_radius_never_exceeds_base() {
        for &(w, h) in &[(1000.0, 800.0), (1.0, 1.0), (37.0, 2000.0), (1920.0, 1080.0), (3.5, 3.5)] {
            let (grid, wheels) = run(w, h, 1);
            assert!(!wheels.is_empty());
            assert_eq!(wheels.len(), grid.cell_count());
            for wheel in &wheels {
                assert!(wheel.r <= f64::min(w, h) / 10.0 + 1e-12);
                assert!(wheel.r >= 0.75 * grid.base_radius - 1e-12);
            }
        }
    }

    #[test]
    fn test_hex_spacing_and_stagger() {
        let (grid, wheels) = run(1000.0, 800.0, 2);
        let base = 80.0;
        assert_eq!(grid.base_radius, base);

        for row in 0..grid.rows {
            let cells = &wheels[row * grid.cols..(row + 1) * grid.cols];
            for pair in cells.windows(2) {
                assert!((pair[1].x - pair[0].x - 2.0 * base).abs() < 1e-9);
                assert_eq!(pair[1].y, pair[0].y);
            }
            let expected_offset = if row % 2 == 0 { 0.0 } else { base };
            assert!((cells[0].x - (-base + expected_offset)).abs() < 1e-9);
            assert!((cells[0].y - (-base + row as f64 * base * 3f64.sqrt())).abs() < 1e-9);
        }
    }

    #[test]
    fn test_covers_overscanned_canvas() {
        // 1000x800: base radius 80, region x in [-80, 1080], y in [-80, 880]
        let (grid, wheels) = run(1000.0, 800.0, 3);
        assert_eq!(grid.cols, 9);
        assert_eq!(grid.rows, 8);

        let max_x = wheels.iter().map(|w| w.x).fold(f64::MIN, f64::max);
        let max_y = wheels.iter().map(|w| w.y).fold(f64::MIN, f64::max);
        let min_x = wheels.iter().map(|w| w.x).fold(f64::MAX, f64::min);
        let min_y = wheels.iter().map(|w| w.y).fold(f64::MAX, f64::min);
        assert!(min_x <= -80.0 && min_y <= -80.0);
        assert!(max_x >= 1080.0 && max_y >= 880.0);

        // Every row reaches the right edge of the region within one spacing
        for row in 0..grid.rows {
            let last = &wheels[(row + 1) * grid.cols - 1];
            assert!(1080.0 - last.x <= grid.spacing_x);
        }
    }

    #[test]
    fn test_positions_are_deterministic() {
        let (_, a) = run(1280.0, 720.0, 10);
        let (_, b) = run(1280.0, 720.0, 99);
        assert_eq!(a.len(), b.len());
        for (wa, wb) in a.iter().zip(b.iter()) {
            assert_eq!((wa.x, wa.y), (wb.x, wb.y));
        }

        let (_, c) = run(1280.0, 720.0, 10);
        for (wa, wc) in a.iter().zip(c.iter()) {
            assert_eq!(wa.r, wc.r);
            assert_eq!(wa.palette.name, wc.palette.name);
        }
    }

    #[test]
    fn test_degenerate_canvas() {
        let grid = GridSpec::for_canvas(0.0, f64::NAN, 0.0);
        assert_eq!(grid.base_radius, 0.1);
        assert!(grid.cols > 0 && grid.rows > 0);
    }

    #[test]
    fn test_density_changes_base_radius() {
        let grid = GridSpec::for_canvas(1000.0, 800.0, 5.0);
        assert_eq!(grid.base_radius, 160.0);
        assert_eq!(grid.spacing_x, 320.0);
    }
}
