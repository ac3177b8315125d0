// Wheels - animated field of decorative wheels over a drifting particle background

use anyhow::Result;
use clap::Parser;
use notify::{Config, Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;

mod animation;
mod background;
mod config;
mod export;
mod layout;
mod palettes;
mod policy;
mod raster;
mod surface;
mod terminal;
mod types;
mod wheel;

use config::{Args, SketchConfig};
use palettes::PaletteCatalog;
use types::ModeExitReason;

/// Watch the config file and post a notification on every modification.
/// A missing file or an unavailable watcher just means no live reloads.
fn spawn_config_watcher(config_path: Option<PathBuf>) -> mpsc::Receiver<()> {
    let (change_tx, change_rx) = mpsc::channel();

    let Some(config_path) = config_path.filter(|p| p.exists()) else {
        return change_rx;
    };

    std::thread::spawn(move || {
        let (tx, rx) = mpsc::channel();
        let mut watcher = match RecommendedWatcher::new(tx, Config::default()) {
            Ok(w) => w,
            Err(e) => {
                log::debug!("config watcher unavailable: {}", e);
                return;
            }
        };

        if let Err(e) = watcher.watch(&config_path, RecursiveMode::NonRecursive) {
            log::debug!("cannot watch {}: {}", config_path.display(), e);
            return;
        }

        loop {
            match rx.recv() {
                Ok(Ok(NotifyEvent { kind, .. })) => {
                    if matches!(kind, notify::EventKind::Modify(_)) && change_tx.send(()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
                _ => {}
            }
        }
    });

    change_rx
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.list_palettes {
        for name in PaletteCatalog::builtin().names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut config = match SketchConfig::load_or_default(args.cfg.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ Failed to load config file: {:#}", e);
            eprintln!("Please fix the config file or delete it to fall back to defaults.");
            return Err(e);
        }
    };
    config.merge_with_args(&args);

    // Palettes and colors are validated once, before anything is drawn
    let catalog = PaletteCatalog::from_selection(&config.palettes)?;
    config.scene_settings()?;

    if let Some(path) = config.config_path.as_ref().filter(|p| p.exists()) {
        log::info!("using config file {}", path.display());
    }

    let result = if args.export.is_some() {
        println!("Exporting {} frames to {} ...", config.export_frames, config.export_dir);
        export::run_export_mode(&config, catalog)
    } else {
        let config_change_rx = spawn_config_watcher(config.config_path.clone());
        terminal::run_live_mode(&config, &args, catalog, config_change_rx)
    };

    match result {
        Ok(ModeExitReason::UserQuit) => {
            println!("\n👋 Application exiting.");
            Ok(())
        }
        Ok(ModeExitReason::Finished) => Ok(()),
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            Err(e)
        }
    }
}
