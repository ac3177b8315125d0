// Export Module - Headless rendering of the sketch to numbered PNG frames
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::animation::AnimationController;
use crate::config::SketchConfig;
use crate::palettes::PaletteCatalog;
use crate::policy::RandomPolicy;
use crate::raster::Raster;
use crate::types::ModeExitReason;

pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:05}.png", index)
}

/// Render `config.export_frames` frames at the export size and write them to `config.export_dir`
pub fn run_export_mode(config: &SketchConfig, catalog: PaletteCatalog) -> Result<ModeExitReason> {
    let out_dir = PathBuf::from(&config.export_dir);
    let written = export_frames(config, catalog, &out_dir)?;
    println!("Wrote {} frames to {}", written.len(), out_dir.display());
    Ok(ModeExitReason::Finished)
}

pub fn export_frames(config: &SketchConfig, catalog: PaletteCatalog, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let (width, height) = (config.export_width, config.export_height);
    let mut raster = Raster::new(width, height);
    let mut controller = AnimationController::new(
        width as f64,
        height as f64,
        &config.scene_settings()?,
        catalog,
        Box::new(RandomPolicy::new(config.seed)),
    );

    log::info!(
        "exporting {} frames at {}x{} ({} wheels, {} particles)",
        config.export_frames,
        width,
        height,
        controller.wheels().len(),
        controller.particle_count()
    );

    let started = Instant::now();
    let mut written = Vec::with_capacity(config.export_frames);
    for index in 0..config.export_frames {
        controller.frame(&mut raster);
        let path = out_dir.join(frame_file_name(index));
        raster
            .to_image()
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);

        if (index + 1) % 30 == 0 {
            log::info!("{} / {} frames", index + 1, config.export_frames);
        }
    }

    log::info!("export finished in {:.1}s", started.elapsed().as_secs_f64());
    Ok(written)
}
